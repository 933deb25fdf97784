// Membership directory: read-only lookups over hub membership records.
//
// The access-code service consumes this through the `MembershipDirectory`
// trait so tests can substitute an in-memory double. The production
// implementation is a pair of point lookups against Postgres — no
// pagination, no caching.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::db::StoreError;

// ============================================
// Roles & Statuses
// ============================================

/// Role a member holds within one organization.
///
/// Stored as uppercase text; parsing is exhaustive so an unexpected value
/// in storage surfaces as an error instead of silently failing a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MembershipRole {
    Member,
    Validator,
    Admin,
}

impl MembershipRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::Member => "MEMBER",
            MembershipRole::Validator => "VALIDATOR",
            MembershipRole::Admin => "ADMIN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MEMBER" => Some(MembershipRole::Member),
            "VALIDATOR" => Some(MembershipRole::Validator),
            "ADMIN" => Some(MembershipRole::Admin),
            _ => None,
        }
    }

    /// Whether this role may redeem access codes at a checkpoint.
    pub fn can_validate(&self) -> bool {
        matches!(self, MembershipRole::Validator | MembershipRole::Admin)
    }
}

/// Lifecycle status of a membership. Only ACTIVE members participate in
/// code issuance or redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MembershipStatus {
    Pending,
    Active,
    Inactive,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Pending => "PENDING",
            MembershipStatus::Active => "ACTIVE",
            MembershipStatus::Inactive => "INACTIVE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(MembershipStatus::Pending),
            "ACTIVE" => Some(MembershipStatus::Active),
            "INACTIVE" => Some(MembershipStatus::Inactive),
            _ => None,
        }
    }
}

impl std::fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================
// Membership Record
// ============================================

/// One user's membership in one organization, hydrated with the display
/// fields a checkpoint operator sees on a successful redemption.
#[derive(Debug, Clone)]
pub struct MembershipRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub role: MembershipRole,
    pub status: MembershipStatus,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

// ============================================
// Directory Trait
// ============================================

#[async_trait]
pub trait MembershipDirectory: Send + Sync {
    /// Point lookup by (user, organization).
    async fn find_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<MembershipRecord>, StoreError>;

    /// Point lookup by membership id.
    async fn find_membership_by_id(
        &self,
        membership_id: Uuid,
    ) -> Result<Option<MembershipRecord>, StoreError>;
}

// ============================================
// Postgres Implementation
// ============================================

pub struct PgMembershipDirectory {
    pool: PgPool,
}

impl PgMembershipDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &sqlx::postgres::PgRow) -> Result<MembershipRecord, StoreError> {
    let role_raw: String = row.get("role");
    let status_raw: String = row.get("status");

    let role = MembershipRole::parse(&role_raw)
        .ok_or_else(|| StoreError::Other(format!("unknown membership role '{}'", role_raw)))?;
    let status = MembershipStatus::parse(&status_raw)
        .ok_or_else(|| StoreError::Other(format!("unknown membership status '{}'", status_raw)))?;

    Ok(MembershipRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        organization_id: row.get("organization_id"),
        role,
        status,
        display_name: row.get("display_name"),
        photo_url: row.get("photo_url"),
    })
}

#[async_trait]
impl MembershipDirectory for PgMembershipDirectory {
    async fn find_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<MembershipRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT
                om.id,
                om.user_id,
                om.organization_id,
                om.role,
                om.status,
                u.display_name,
                u.photo_url
            FROM organization_members om
            JOIN users u ON u.id = om.user_id
            WHERE om.user_id = $1 AND om.organization_id = $2
            "#,
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn find_membership_by_id(
        &self,
        membership_id: Uuid,
    ) -> Result<Option<MembershipRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT
                om.id,
                om.user_id,
                om.organization_id,
                om.role,
                om.status,
                u.display_name,
                u.photo_url
            FROM organization_members om
            JOIN users u ON u.id = om.user_id
            WHERE om.id = $1
            "#,
        )
        .bind(membership_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(record_from_row).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [
            MembershipRole::Member,
            MembershipRole::Validator,
            MembershipRole::Admin,
        ] {
            assert_eq!(MembershipRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(MembershipRole::parse("OWNER"), None);
        assert_eq!(MembershipRole::parse("member"), None);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            MembershipStatus::Pending,
            MembershipStatus::Active,
            MembershipStatus::Inactive,
        ] {
            assert_eq!(MembershipStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(MembershipStatus::parse("SUSPENDED"), None);
    }

    #[test]
    fn test_only_validator_and_admin_can_validate() {
        assert!(!MembershipRole::Member.can_validate());
        assert!(MembershipRole::Validator.can_validate());
        assert!(MembershipRole::Admin.can_validate());
    }
}
