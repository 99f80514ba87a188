//! Logging shorthands on top of `tracing`.
//!
//! The terminal formatter renders events carrying the `success` field with
//! their own symbol, everything else goes through the plain level macros.

/// Emits an `INFO` event flagged as a completed milestone.
#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        ::tracing::info!(success = true, $($arg)+)
    };
}
