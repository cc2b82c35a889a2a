#![allow(unused_macros)]

// Internal logging facade. With the `tracing` feature enabled these
// forward to `tracing`; otherwise they compile to nothing and the
// arguments are never evaluated.

macro_rules! trace {
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        {
            tracing::trace!($($arg)+);
        }
    };
}

macro_rules! debug {
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        {
            tracing::debug!($($arg)+);
        }
    };
}

macro_rules! warning {
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        {
            tracing::warn!($($arg)+);
        }
    };
}
