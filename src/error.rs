use thiserror::Error;

/// Errors raised while constructing a [`Checker`][`crate::Checker`].
///
/// Failing checks are never errors; they are reported as
/// [`CheckResult`][`crate::CheckResult`]s.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid JSON document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Only raised when `serde_json` is built with `arbitrary_precision`,
    /// which any crate in the dependency graph can switch on. Otherwise every
    /// decoded number is an `f64` and out-of-range literals are `Parse` errors.
    #[error("number at {path:?} is not representable as f64")]
    Number { path: String },
}
