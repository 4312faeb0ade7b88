#[cfg(feature = "tracing")]
#[macro_use]
#[allow(unused_imports)]
mod imp {
    pub(crate) use tracing::debug;
    pub(crate) use tracing::error;
    pub(crate) use tracing::info;
    pub(crate) use tracing::instrument;
    pub(crate) use tracing::trace;
    pub(crate) use tracing::warn;
}

#[cfg(not(feature = "tracing"))]
#[macro_use]
#[allow(unused_imports)]
mod imp {
    // The arguments are still type checked and "used", so that
    // variables only referenced in log statements do not trigger
    // warnings when the feature is disabled.
    macro_rules! noop {
        ($($args:tt)*) => {{
            if false {
                let _ = ::std::format_args!($($args)*);
            }
        }};
    }
    pub(crate) use noop as debug;
    pub(crate) use noop as error;
    pub(crate) use noop as info;
    pub(crate) use noop as trace;
    pub(crate) use noop as warn;
}

#[allow(unused_imports)]
pub(crate) use imp::*;
