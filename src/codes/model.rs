use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// How long a freshly issued code stays redeemable.
pub const CODE_TTL_MINUTES: i64 = 5;

/// Length of the human-enterable code string.
pub const CODE_LENGTH: usize = 6;

/// A time-boxed, single-use entry code.
///
/// `is_valid` flips true→false exactly once — on redemption, on discovery
/// of expiry, or when a newer code for the same membership supersedes it —
/// and never back. Rows are never deleted.
#[derive(Debug, Clone)]
pub struct AccessCode {
    pub id: Uuid,
    /// The membership being vouched for (canonical subject reference).
    pub membership_id: Uuid,
    /// Denormalized from the membership at issuance, so redemption can
    /// check the redeemer's organization without resolving the subject.
    pub organization_id: Uuid,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

impl AccessCode {
    /// Issue a new code for a membership, valid for the fixed TTL from now.
    pub fn issue(membership_id: Uuid, organization_id: Uuid, code: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            membership_id,
            organization_id,
            code,
            expires_at: now + Duration::minutes(CODE_TTL_MINUTES),
            is_valid: true,
            created_at: now,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// A code is redeemable iff it is still valid and not yet expired.
    pub fn is_redeemable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_valid && !self.is_expired_at(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_code_is_redeemable() {
        let code = AccessCode::issue(Uuid::new_v4(), Uuid::new_v4(), "042137".to_string());

        assert!(code.is_valid);
        assert!(code.is_redeemable_at(Utc::now()));

        let window = code.expires_at - code.created_at;
        assert_eq!(window, Duration::minutes(CODE_TTL_MINUTES));
    }

    #[test]
    fn test_code_expires_at_boundary() {
        let code = AccessCode::issue(Uuid::new_v4(), Uuid::new_v4(), "000000".to_string());

        // Valid strictly before expiry, expired at and after it.
        assert!(code.is_redeemable_at(code.expires_at - Duration::seconds(1)));
        assert!(code.is_expired_at(code.expires_at));
        assert!(!code.is_redeemable_at(code.expires_at));
        assert!(!code.is_redeemable_at(code.expires_at + Duration::seconds(1)));
    }

    #[test]
    fn test_invalidated_code_is_not_redeemable() {
        let mut code = AccessCode::issue(Uuid::new_v4(), Uuid::new_v4(), "915506".to_string());
        code.is_valid = false;

        assert!(!code.is_redeemable_at(Utc::now()));
    }
}
