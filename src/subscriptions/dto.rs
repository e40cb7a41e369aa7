use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::Subscription;

/// Create payload. Fields default so that a missing required field fails
/// business validation (400) rather than body deserialization.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub monthly_price: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub start_month: String,
    pub end_month: Option<String>,
}

/// Partial update payload. `end_month: Some("")` clears the stored value,
/// absent `end_month` leaves it untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub service_name: Option<String>,
    pub monthly_price: Option<String>,
    pub start_month: Option<String>,
    pub end_month: Option<String>,
}

/// Pagination values stay strings here; the handler parses them leniently
/// and unparseable values fall back to the defaults.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TotalQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionDto {
    pub id: Uuid,
    pub service_name: String,
    pub monthly_price: String,
    pub user_id: Uuid,
    pub start_month: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_month: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Subscription> for SubscriptionDto {
    fn from(s: Subscription) -> Self {
        Self {
            id: s.id,
            service_name: s.service_name,
            monthly_price: s.monthly_price,
            user_id: s.user_id,
            start_month: s.start_month,
            end_month: s.end_month,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Echoes the raw request months back alongside the computed total.
#[derive(Debug, Serialize)]
pub struct TotalResponse {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    pub total: String,
}
