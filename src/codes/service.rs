use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use super::error::CodeError;
use super::model::AccessCode;
use super::store::CodeStore;
use crate::directory::{MembershipDirectory, MembershipRecord, MembershipRole, MembershipStatus};
use crate::utils::generate_access_code;

// ============================================
// Redemption Outcomes
// ============================================

pub const MSG_CODE_NOT_FOUND: &str = "code invalid, not found, or already used";
pub const MSG_CODE_EXPIRED: &str = "code expired";
pub const MSG_SUBJECT_MISSING: &str = "code's user not found in organization";
pub const MSG_AUTHORIZED: &str = "Access Authorized!";

/// Member payload shown to the checkpoint operator for visual confirmation.
#[derive(Debug, Clone, Serialize)]
pub struct MemberSummary {
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub role: MembershipRole,
    pub status: MembershipStatus,
}

impl From<MembershipRecord> for MemberSummary {
    fn from(record: MembershipRecord) -> Self {
        Self {
            user_id: record.user_id,
            display_name: record.display_name,
            photo_url: record.photo_url,
            role: record.role,
            status: record.status,
        }
    }
}

/// Outcome of a redemption attempt.
///
/// `valid: false` covers the expected, benign rejections (garbage scan,
/// expired code, vanished subject) that the operator's UI renders as a
/// rejection screen. Authorization failures are NOT expressed here — those
/// raise `CodeError::AccessDenied` instead.
#[derive(Debug, Serialize)]
pub struct Validation {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<MemberSummary>,
}

impl Validation {
    fn rejected(message: &str) -> Self {
        Self {
            valid: false,
            message: message.to_string(),
            member: None,
        }
    }

    fn authorized(member: MemberSummary) -> Self {
        Self {
            valid: true,
            message: MSG_AUTHORIZED.to_string(),
            member: Some(member),
        }
    }
}

// ============================================
// Service
// ============================================

/// Issues and redeems time-boxed, single-use access codes.
#[derive(Clone)]
pub struct AccessCodeService {
    store: Arc<dyn CodeStore>,
    directory: Arc<dyn MembershipDirectory>,
}

impl AccessCodeService {
    pub fn new(store: Arc<dyn CodeStore>, directory: Arc<dyn MembershipDirectory>) -> Self {
        Self { store, directory }
    }

    /// Issue a fresh code for the requester's membership in an organization.
    ///
    /// The requester must hold an ACTIVE membership. Every code previously
    /// issued for that membership is invalidated first, so at most one
    /// valid code exists per membership after any sequential issuance.
    pub async fn generate_code(
        &self,
        requester_user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<AccessCode, CodeError> {
        let membership = self
            .directory
            .find_membership(requester_user_id, organization_id)
            .await?
            .ok_or(CodeError::NotAMember)?;

        if membership.status != MembershipStatus::Active {
            return Err(CodeError::MemberNotActive {
                status: membership.status,
            });
        }

        // Unconditional bulk supersede — not gated on anything being found.
        let superseded = self.store.invalidate_for_membership(membership.id).await?;
        if superseded > 0 {
            tracing::debug!(
                membership_id = %membership.id,
                superseded,
                "invalidated outstanding codes before issuing a new one"
            );
        }

        let code = AccessCode::issue(membership.id, organization_id, generate_access_code());
        self.store.insert(&code).await?;

        tracing::info!(
            membership_id = %membership.id,
            organization_id = %organization_id,
            expires_at = %code.expires_at,
            "issued access code"
        );

        Ok(code)
    }

    /// Redeem a scanned code on behalf of a validator.
    ///
    /// Ordered checks, each short-circuiting: code lookup, expiry, redeemer
    /// membership, redeemer permission, consumption, subject resolution.
    /// Consumption happens only after the redeemer is authorized, so a
    /// denied redeemer can never burn the subject's code.
    pub async fn validate_code(
        &self,
        code: &str,
        redeemer_user_id: Uuid,
    ) -> Result<Validation, CodeError> {
        let found = match self.store.find_valid_by_code(code).await? {
            Some(found) => found,
            None => return Ok(Validation::rejected(MSG_CODE_NOT_FOUND)),
        };

        // The lookup only returns valid rows, so the sole way a code can be
        // unredeemable here is expiry. Flip it permanently on discovery.
        if !found.is_redeemable_at(Utc::now()) {
            self.store.invalidate(found.id).await?;
            return Ok(Validation::rejected(MSG_CODE_EXPIRED));
        }

        let redeemer = self
            .directory
            .find_membership(redeemer_user_id, found.organization_id)
            .await?;

        let redeemer = match redeemer {
            Some(redeemer) => redeemer,
            None => {
                tracing::warn!(
                    redeemer_user_id = %redeemer_user_id,
                    organization_id = %found.organization_id,
                    "redemption attempt by non-member"
                );
                return Err(CodeError::redeemer_not_member());
            }
        };

        if !redeemer.role.can_validate() || redeemer.status != MembershipStatus::Active {
            tracing::warn!(
                redeemer_user_id = %redeemer_user_id,
                organization_id = %found.organization_id,
                role = redeemer.role.as_str(),
                status = redeemer.status.as_str(),
                "redemption attempt without validator permission"
            );
            return Err(CodeError::redeemer_not_validator());
        }

        // Consume exactly once. Losing the conditional update means a
        // concurrent scan already redeemed this code.
        if !self.store.compare_and_invalidate(found.id).await? {
            return Ok(Validation::rejected(MSG_CODE_NOT_FOUND));
        }

        let subject = self
            .directory
            .find_membership_by_id(found.membership_id)
            .await?;

        match subject {
            Some(subject) => Ok(Validation::authorized(subject.into())),
            // Legitimately issued and consumed, but the membership vanished
            // between issuance and redemption.
            None => Ok(Validation::rejected(MSG_SUBJECT_MISSING)),
        }
    }
}

// ============================================
// Tests
// ============================================
