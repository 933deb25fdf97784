use thiserror::Error;

use crate::db::StoreError;
use crate::directory::MembershipStatus;

/// Failures of the access-code operations.
///
/// The split matters to the HTTP layer: `NotAMember`/`MemberNotActive` are
/// requester-side precondition violations (400), `AccessDenied` is a
/// redeemer-side authorization failure (403), and `Store` is an
/// infrastructure fault (500). Soft validity outcomes — code not found,
/// expired, subject vanished — are *not* errors; they come back as a
/// `Validation` with `valid: false`.
#[derive(Debug, Error)]
pub enum CodeError {
    #[error("you are not a member of this organization")]
    NotAMember,

    #[error("your membership in this organization is not active (status: {status})")]
    MemberNotActive { status: MembershipStatus },

    #[error("{0}")]
    AccessDenied(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CodeError {
    pub(crate) fn redeemer_not_member() -> Self {
        CodeError::AccessDenied("redeemer is not a member of this organization".to_string())
    }

    pub(crate) fn redeemer_not_validator() -> Self {
        CodeError::AccessDenied(
            "you do not have VALIDATOR permission in this organization".to_string(),
        )
    }
}
