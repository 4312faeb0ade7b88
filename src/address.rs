//! Conversions between the address spaces involved in resolution.
//!
//! Four kinds of quantities are in play and they are never
//! interchangeable:
//! - an *absolute address* is an address as the traced process saw it
//!   at runtime, including any relocation and address space layout
//!   randomization
//! - a *mapping offset* is an absolute address relative to the start of
//!   the memory mapping containing it
//! - a *file offset* is the position of a byte in the module's on-disk
//!   layout
//! - a *virtual address* is an address as recorded in the module's
//!   symbol table, relative to its link-time base
//!
//! The relations are:
//! ```text
//! file_offset = abs_addr - mapping_start + executable_segment_offset
//! virt_addr   = file_offset + load_bias
//! ```
//!
//! All helpers use checked arithmetic and report `None` instead of
//! silently wrapping around.

use crate::Addr;


/// Convert an absolute address inside a mapping starting at
/// `mapping_start` into an offset into the module file.
#[inline]
pub fn abs_addr_to_file_offset(
    abs_addr: Addr,
    mapping_start: Addr,
    executable_segment_offset: u64,
) -> Option<u64> {
    abs_addr
        .checked_sub(mapping_start)?
        .checked_add(executable_segment_offset)
}

/// Convert an offset into the module file back into the absolute
/// address it is loaded at, given the start of its memory mapping.
#[inline]
pub fn file_offset_to_abs_addr(
    file_offset: u64,
    mapping_start: Addr,
    executable_segment_offset: u64,
) -> Option<Addr> {
    mapping_start
        .checked_add(file_offset)?
        .checked_sub(executable_segment_offset)
}

/// Convert a file offset into a module virtual address.
#[inline]
pub fn file_offset_to_virt_addr(file_offset: u64, load_bias: u64) -> Option<Addr> {
    file_offset.checked_add(load_bias)
}

/// Convert a module virtual address into a file offset.
#[inline]
pub fn virt_addr_to_file_offset(virt_addr: Addr, load_bias: u64) -> Option<u64> {
    virt_addr.checked_sub(load_bias)
}

/// Convert a module virtual address (e.g., the start of a function as
/// recorded in a symbol table) into an absolute address.
///
/// This is the inverse of [`abs_addr_to_file_offset`] followed by
/// [`file_offset_to_virt_addr`]:
/// ```text
/// abs_addr = virt_addr - load_bias - executable_segment_offset + mapping_start
/// ```
#[inline]
pub fn virt_addr_to_abs_addr(
    virt_addr: Addr,
    mapping_start: Addr,
    load_bias: u64,
    executable_segment_offset: u64,
) -> Option<Addr> {
    let file_offset = virt_addr_to_file_offset(virt_addr, load_bias)?;
    file_offset_to_abs_addr(file_offset, mapping_start, executable_segment_offset)
}
