//! Query errors
//!
//! Every failure is scoped to the single append or evaluation call that
//! triggered it. Nothing is retried.

use std::error::Error as StdError;

/// Boxed error produced by a caller-supplied callback.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Bad operator argument, raised when the operator is appended.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `first()` found nothing to return.
    #[error("sequence contains no elements")]
    EmptySequence,

    /// A caller callback failed during evaluation.
    #[error("callback failed: {0}")]
    Callback(#[source] BoxError),
}

pub type Result<T, E = QueryError> = std::result::Result<T, E>;

impl QueryError {
    /// Wrap an error returned by a caller callback.
    ///
    /// A `QueryError` coming back out of a callback (a nested pipeline
    /// evaluated inside a `try_select`, say) is returned as is.
    pub fn callback(err: impl Into<BoxError>) -> Self {
        match err.into().downcast::<QueryError>() {
            Ok(inner) => *inner,
            Err(other) => QueryError::Callback(other),
        }
    }

    pub fn is_empty_sequence(&self) -> bool {
        matches!(self, QueryError::EmptySequence)
    }
}

macro_rules! invalid_argument {
    ($($arg:tt)*) => {
        crate::error::QueryError::InvalidArgument(std::format!($($arg)*))
    };
}
pub(crate) use invalid_argument;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("bad record {0}")]
    struct BadRecord(u32);

    #[test]
    fn test_callback_keeps_source() {
        let err = QueryError::callback(BadRecord(7));
        assert!(matches!(err, QueryError::Callback(_)));
        assert_eq!(err.to_string(), "callback failed: bad record 7");

        let source = err.source().expect("source");
        assert_eq!(source.downcast_ref::<BadRecord>().map(|b| b.0), Some(7));
    }

    #[test]
    fn test_callback_passes_query_error_through() {
        let err = QueryError::callback(QueryError::EmptySequence);
        assert!(err.is_empty_sequence());
    }

    #[test]
    fn test_invalid_argument_macro() {
        let err = invalid_argument!("skip count {} is negative", -3);
        assert_eq!(err.to_string(), "invalid argument: skip count -3 is negative");
    }
}
