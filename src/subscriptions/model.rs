use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Persisted subscription as read back from Postgres. Price and month
/// columns are selected as text (`::text`, `to_char`) so the values stay
/// exact decimal/calendar strings end to end.
#[derive(Debug, Clone, FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub service_name: String,
    pub monthly_price: String,
    pub user_id: Uuid,
    pub start_month: String,
    pub end_month: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Create command as received from the adapter, months still unparsed.
#[derive(Debug, Clone)]
pub struct CreateInput {
    pub service_name: String,
    pub monthly_price: String,
    pub user_id: Uuid,
    pub start_month: String,
    pub end_month: Option<String>,
}

/// Validated create command handed to the repository.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub service_name: String,
    pub monthly_price: String,
    pub user_id: Uuid,
    pub start_month: Date,
    pub end_month: Option<Date>,
}

/// Partial update command; absent fields leave prior values untouched.
/// An explicitly empty `end_month` string clears the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateInput {
    pub service_name: Option<String>,
    pub monthly_price: Option<String>,
    pub start_month: Option<String>,
    pub end_month: Option<String>,
}

/// Validated update fields for the repository. `end_month` is tri-state:
/// `None` = untouched, `Some(None)` = clear, `Some(Some(d))` = set.
#[derive(Debug, Clone, Default)]
pub struct UpdateFields {
    pub service_name: Option<String>,
    pub monthly_price: Option<String>,
    pub start_month: Option<Date>,
    pub end_month: Option<Option<Date>>,
}

#[derive(Debug, Clone)]
pub struct ListFilter {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
