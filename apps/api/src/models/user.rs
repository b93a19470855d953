use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_tier", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Paid,
    Premium,
}

impl SubscriptionTier {
    /// Only the free tier is metered by credits.
    pub fn is_free(self) -> bool {
        matches!(self, SubscriptionTier::Free)
    }
}

/// User account and entitlement. Credits are decremented by generation and
/// topped up by billing (not part of this service).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub subscription_tier: SubscriptionTier,
    pub credits_remaining: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Whether the account may start another generation right now.
    pub fn has_credits(&self) -> bool {
        !self.subscription_tier.is_free() || self.credits_remaining > 0
    }
}
