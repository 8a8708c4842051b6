use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All errors generated in `factor-lens`.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Error)]
pub enum LensError {
    /// Precondition violation on a caller-supplied value. Fatal to the call,
    /// never retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The source has no data for the request. Recoverable: callers surface
    /// an empty-result state rather than crash.
    #[error("no data available from source")]
    NoData,

    /// The data-fetch or model-rebuild collaborator failed.
    #[error("upstream collaborator failed: {0}")]
    Upstream(String),
}

impl LensError {
    /// Determine if a [`RegimeSession`](crate::regime::session::RegimeSession)
    /// can keep serving its last-good data after this error.
    pub fn is_recoverable(&self) -> bool {
        match self {
            LensError::InvalidInput(_) => false,
            LensError::NoData | LensError::Upstream(_) => true,
        }
    }

    /// Convenience constructor for collaborator implementations reporting a
    /// failed fetch or rebuild.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lens_error_is_recoverable() {
        struct TestCase {
            input: LensError,
            expected: bool,
        }

        let tests = vec![
            TestCase {
                // TC0: is not recoverable w/ LensError::InvalidInput
                input: LensError::invalid_input("table date axis is not sorted ascending"),
                expected: false,
            },
            TestCase {
                // TC1: is recoverable w/ LensError::NoData
                input: LensError::NoData,
                expected: true,
            },
            TestCase {
                // TC2: is recoverable w/ LensError::Upstream
                input: LensError::upstream("rebuild request timed out"),
                expected: true,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = test.input.is_recoverable();
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }
}
