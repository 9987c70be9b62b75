/// Errors raised by domain rules, independent of storage and transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// One or more field rules failed. The message lists each failure as
    /// `field: message`, joined by `; `.
    #[error("{0}")]
    Validation(String),
}
