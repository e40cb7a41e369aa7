use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, Json};
use crate::state::AppState;

use super::dto::{
    CreateRequest, ListQuery, SubscriptionDto, TotalQuery, TotalResponse, UpdateRequest,
};
use super::model::{CreateInput, ListFilter, UpdateInput};
use super::services;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

fn parse_user_id(s: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(s).map_err(|_| ApiError::invalid("invalid user_id"))
}

/// Unparseable and out-of-range values fall back to the defaults rather
/// than erroring.
fn page(limit: Option<&str>, offset: Option<&str>) -> (i64, i64) {
    let limit = match limit.and_then(|s| s.parse::<i64>().ok()) {
        Some(n) if n > 0 && n <= MAX_LIMIT => n,
        _ => DEFAULT_LIMIT,
    };
    let offset = match offset.and_then(|s| s.parse::<i64>().ok()) {
        Some(n) if n >= 0 => n,
        _ => 0,
    };
    (limit, offset)
}

#[instrument(skip(state, req))]
pub async fn create_subscription(
    State(state): State<AppState>,
    Json(req): Json<CreateRequest>,
) -> ApiResult<(StatusCode, Json<SubscriptionDto>)> {
    let user_id = parse_user_id(&req.user_id)?;
    let input = CreateInput {
        service_name: req.service_name,
        monthly_price: req.monthly_price,
        user_id,
        start_month: req.start_month,
        end_month: req.end_month,
    };
    let record = services::create(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

#[instrument(skip(state))]
pub async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SubscriptionDto>> {
    let record = services::get(&state.db, id).await?;
    Ok(Json(record.into()))
}

#[instrument(skip(state))]
pub async fn list_subscriptions(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> ApiResult<Json<Vec<SubscriptionDto>>> {
    let user_id = match q.user_id.as_deref() {
        Some(s) if !s.is_empty() => Some(parse_user_id(s)?),
        _ => None,
    };
    let (limit, offset) = page(q.limit.as_deref(), q.offset.as_deref());
    let filter = ListFilter {
        user_id,
        service_name: q.service_name.filter(|s| !s.is_empty()),
        limit,
        offset,
    };
    let records = services::list(&state.db, filter).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, req))]
pub async fn update_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRequest>,
) -> ApiResult<Json<SubscriptionDto>> {
    let input = UpdateInput {
        service_name: req.service_name,
        monthly_price: req.monthly_price,
        start_month: req.start_month,
        end_month: req.end_month,
    };
    let record = services::update(&state.db, id, input).await?;
    Ok(Json(record.into()))
}

#[instrument(skip(state))]
pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !services::delete(&state.db, id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn total(
    State(state): State<AppState>,
    Query(q): Query<TotalQuery>,
) -> ApiResult<Json<TotalResponse>> {
    let (from, to) = match (q.from, q.to) {
        (Some(from), Some(to)) if !from.is_empty() && !to.is_empty() => (from, to),
        _ => return Err(ApiError::invalid("from and to are required (YYYY-MM)")),
    };
    let user_id = match q.user_id.as_deref() {
        Some(s) if !s.is_empty() => Some(parse_user_id(s)?),
        _ => None,
    };
    let service_name = q.service_name.filter(|s| !s.is_empty());
    let total =
        services::total(&state.db, &from, &to, user_id, service_name.as_deref()).await?;
    Ok(Json(TotalResponse {
        from,
        to,
        user_id: user_id.map(|u| u.to_string()),
        service_name,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_when_absent() {
        assert_eq!(page(None, None), (50, 0));
    }

    #[test]
    fn page_passes_values_in_range() {
        assert_eq!(page(Some("1"), Some("10")), (1, 10));
        assert_eq!(page(Some("200"), Some("0")), (200, 0));
    }

    #[test]
    fn page_falls_back_on_out_of_range_values() {
        assert_eq!(page(Some("0"), None), (50, 0));
        assert_eq!(page(Some("-5"), Some("-1")), (50, 0));
        assert_eq!(page(Some("201"), None), (50, 0));
    }

    #[test]
    fn page_falls_back_on_unparseable_values() {
        assert_eq!(page(Some("abc"), Some("xyz")), (50, 0));
        assert_eq!(page(Some(""), Some("")), (50, 0));
    }

    #[test]
    fn user_id_parse_failure_is_invalid_input() {
        let err = parse_user_id("not-a-uuid").unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert!(parse_user_id("123e4567-e89b-12d3-a456-426614174000").is_ok());
    }
}
