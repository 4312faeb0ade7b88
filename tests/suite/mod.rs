mod common;
mod process;
mod resolve;
