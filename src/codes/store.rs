use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::model::AccessCode;
use crate::db::StoreError;

// ============================================
// Store Trait
// ============================================

/// Persistence contract for access codes.
///
/// Invalidation is the only mutation after insert, and it is idempotent.
/// `compare_and_invalidate` is the one conditional write: it reports
/// whether *this* call flipped the row, which is what makes redemption
/// exactly-once under concurrent scans.
#[async_trait]
pub trait CodeStore: Send + Sync {
    async fn insert(&self, code: &AccessCode) -> Result<(), StoreError>;

    /// Look up a currently-valid code by its literal string.
    ///
    /// Uniqueness of the string across subjects is not enforced; if two
    /// subjects happen to hold the same 6 digits, whichever valid row
    /// matches first wins. Accepted statistically at this scale.
    async fn find_valid_by_code(&self, code: &str) -> Result<Option<AccessCode>, StoreError>;

    /// Unconditionally mark a code invalid. Idempotent.
    async fn invalidate(&self, id: Uuid) -> Result<(), StoreError>;

    /// Mark every currently-valid code for a membership invalid.
    /// Returns how many rows were flipped.
    async fn invalidate_for_membership(&self, membership_id: Uuid) -> Result<u64, StoreError>;

    /// Mark a code invalid iff it is still valid.
    /// Returns true iff this call performed the flip.
    async fn compare_and_invalidate(&self, id: Uuid) -> Result<bool, StoreError>;
}

// ============================================
// Postgres Implementation
// ============================================

pub struct PgCodeStore {
    pool: PgPool,
}

impl PgCodeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn code_from_row(row: &sqlx::postgres::PgRow) -> AccessCode {
    AccessCode {
        id: row.get("id"),
        membership_id: row.get("membership_id"),
        organization_id: row.get("organization_id"),
        code: row.get("code"),
        expires_at: row.get("expires_at"),
        is_valid: row.get("is_valid"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl CodeStore for PgCodeStore {
    async fn insert(&self, code: &AccessCode) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO access_codes (
                id, membership_id, organization_id, code,
                expires_at, is_valid, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(code.id)
        .bind(code.membership_id)
        .bind(code.organization_id)
        .bind(&code.code)
        .bind(code.expires_at)
        .bind(code.is_valid)
        .bind(code.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_valid_by_code(&self, code: &str) -> Result<Option<AccessCode>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, membership_id, organization_id, code,
                   expires_at, is_valid, created_at
            FROM access_codes
            WHERE code = $1 AND is_valid
            LIMIT 1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(code_from_row))
    }

    async fn invalidate(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE access_codes SET is_valid = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn invalidate_for_membership(&self, membership_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE access_codes SET is_valid = FALSE WHERE membership_id = $1 AND is_valid",
        )
        .bind(membership_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn compare_and_invalidate(&self, id: Uuid) -> Result<bool, StoreError> {
        // Single conditional update: per-row atomicity makes the winner of
        // a concurrent redemption the only caller to see rows_affected = 1.
        let result =
            sqlx::query("UPDATE access_codes SET is_valid = FALSE WHERE id = $1 AND is_valid")
                .bind(id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }
}
