//! Business rules between handlers and repositories.
//!
//! Services never pick HTTP statuses. They return a value, a tagged
//! "nothing matched" outcome, or a [`ServiceError`].

pub mod conversation;
pub mod message;
pub mod thought;

use thiserror::Error;

use murmur_core::StoreError;

use crate::error::AppError;

/// Convenience alias for service return types.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service-level errors.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("You already shared your thought today")]
    DuplicateThought,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Map to an [`AppError`]; `context` becomes the message of unexpected failures.
    pub fn into_app_error(self, context: &str) -> AppError {
        match self {
            ServiceError::DuplicateThought => AppError::BusinessRule(self.to_string()),
            ServiceError::Store(e) => AppError::internal(context, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_thought_is_a_business_rule() {
        let err = ServiceError::DuplicateThought.into_app_error("ignored");
        assert!(
            matches!(err, AppError::BusinessRule(ref m) if m == "You already shared your thought today")
        );
    }

    #[test]
    fn store_failures_are_internal_with_context() {
        let err = ServiceError::from(StoreError::Schema("broken".into()))
            .into_app_error("Error creating thought!");
        match err {
            AppError::Internal { message, detail } => {
                assert_eq!(message, "Error creating thought!");
                assert!(detail.contains("broken"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
