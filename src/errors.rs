use thiserror::Error;

/// Error taxonomy for the sketch/optimizer/index core.
///
/// Every fallible operation validates its preconditions up front and
/// returns before any partial mutation takes place.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied parameter was out of range or inconsistent with
    /// another parameter (threshold outside `[0,1]`, `k == 0`,
    /// `bands * rows > k`, mismatched sketch widths, ...).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Defensive: an invariant the implementation relies on did not hold.
    /// Should be unreachable for any valid input.
    #[error("internal error: {0}")]
    Internal(String),
}
