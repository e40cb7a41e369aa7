use sqlx::{PgPool, Postgres, QueryBuilder};
use time::Date;
use uuid::Uuid;

use super::model::{ListFilter, NewSubscription, Subscription, UpdateFields};

/// Column list shared by every statement that reads a subscription back.
/// Price and months come out as text so decimal and calendar values stay
/// exact on the wire.
const RETURNED_COLUMNS: &str = "id, service_name, monthly_price::text AS monthly_price, user_id, \
     to_char(start_month, 'YYYY-MM') AS start_month, \
     to_char(end_month, 'YYYY-MM') AS end_month, \
     created_at, updated_at";

pub async fn create(db: &PgPool, new: NewSubscription) -> sqlx::Result<Subscription> {
    let sql = format!(
        "INSERT INTO subscriptions (service_name, monthly_price, user_id, start_month, end_month) \
         VALUES ($1, $2::numeric(12,2), $3, $4, $5) \
         RETURNING {RETURNED_COLUMNS}"
    );
    sqlx::query_as::<_, Subscription>(&sql)
        .bind(new.service_name)
        .bind(new.monthly_price)
        .bind(new.user_id)
        .bind(new.start_month)
        .bind(new.end_month)
        .fetch_one(db)
        .await
}

pub async fn get(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Subscription>> {
    let sql = format!("SELECT {RETURNED_COLUMNS} FROM subscriptions WHERE id = $1");
    sqlx::query_as::<_, Subscription>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Builds the list query: each active filter appends one ANDed predicate,
/// absent filters are omitted entirely. Ordering by creation time keeps
/// pagination deterministic.
fn list_query(filter: &ListFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {RETURNED_COLUMNS} FROM subscriptions"));
    let mut sep = " WHERE ";
    if let Some(user_id) = filter.user_id {
        qb.push(sep).push("user_id = ").push_bind(user_id);
        sep = " AND ";
    }
    if let Some(name) = &filter.service_name {
        qb.push(sep)
            .push("service_name ILIKE ")
            .push_bind(format!("%{name}%"));
    }
    qb.push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(filter.limit)
        .push(" OFFSET ")
        .push_bind(filter.offset);
    qb
}

pub async fn list(db: &PgPool, filter: &ListFilter) -> sqlx::Result<Vec<Subscription>> {
    list_query(filter)
        .build_query_as::<Subscription>()
        .fetch_all(db)
        .await
}

/// Builds the partial-update statement: only provided fields become SET
/// clauses, `updated_at` is always refreshed. `Some(None)` for the end
/// month emits an explicit `end_month = NULL`.
fn update_query(id: Uuid, fields: &UpdateFields) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE subscriptions SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(name) = &fields.service_name {
            set.push("service_name = ");
            set.push_bind_unseparated(name.clone());
        }
        if let Some(price) = &fields.monthly_price {
            set.push("monthly_price = ");
            set.push_bind_unseparated(price.clone());
            set.push_unseparated("::numeric(12,2)");
        }
        if let Some(start) = fields.start_month {
            set.push("start_month = ");
            set.push_bind_unseparated(start);
        }
        match fields.end_month {
            Some(Some(end)) => {
                set.push("end_month = ");
                set.push_bind_unseparated(end);
            }
            Some(None) => {
                set.push("end_month = NULL");
            }
            None => {}
        }
        set.push("updated_at = now()");
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(format!(" RETURNING {RETURNED_COLUMNS}"));
    qb
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    fields: &UpdateFields,
) -> sqlx::Result<Option<Subscription>> {
    update_query(id, fields)
        .build_query_as::<Subscription>()
        .fetch_optional(db)
        .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Sums the monthly price over every month in `[from, to]` that each
/// matching subscription covers; a subscription active for three of the
/// queried months contributes three times its price.
pub async fn total(
    db: &PgPool,
    from: Date,
    to: Date,
    user_id: Option<Uuid>,
    service_name: Option<&str>,
) -> sqlx::Result<String> {
    sqlx::query_scalar::<_, String>(
        r#"
        WITH months AS (
            SELECT generate_series($1::date, $2::date, interval '1 month')::date AS month
        )
        SELECT COALESCE(to_char(SUM(s.monthly_price)::numeric(12,2), 'FM9999999990D00'), '0.00')
        FROM months m
        JOIN subscriptions s
          ON s.start_month <= m.month
         AND (s.end_month IS NULL OR s.end_month >= m.month)
        WHERE ($3::uuid IS NULL OR s.user_id = $3)
          AND ($4::text IS NULL OR s.service_name ILIKE '%' || $4 || '%')
        "#,
    )
    .bind(from)
    .bind(to)
    .bind(user_id)
    .bind(service_name)
    .fetch_one(db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn filter(user_id: Option<Uuid>, service_name: Option<&str>) -> ListFilter {
        ListFilter {
            user_id,
            service_name: service_name.map(String::from),
            limit: 50,
            offset: 0,
        }
    }

    #[test]
    fn list_query_without_filters_has_no_where_clause() {
        let qb = list_query(&filter(None, None));
        let sql = qb.sql();
        assert!(!sql.contains("WHERE"));
        assert!(sql.contains("ORDER BY created_at DESC LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn list_query_ands_both_filters() {
        let qb = list_query(&filter(Some(Uuid::new_v4()), Some("netflix")));
        let sql = qb.sql();
        assert!(sql.contains("WHERE user_id = $1 AND service_name ILIKE $2"));
        assert!(sql.contains("LIMIT $3 OFFSET $4"));
    }

    #[test]
    fn list_query_with_only_service_filter() {
        let qb = list_query(&filter(None, Some("spotify")));
        let sql = qb.sql();
        assert!(sql.contains("WHERE service_name ILIKE $1"));
        assert!(!sql.contains("AND"));
    }

    #[test]
    fn update_query_always_refreshes_updated_at() {
        let qb = update_query(Uuid::new_v4(), &UpdateFields::default());
        let sql = qb.sql();
        assert!(sql.contains("SET updated_at = now()"));
        assert!(sql.contains("WHERE id = $1"));
        assert!(sql.contains("RETURNING"));
    }

    #[test]
    fn update_query_sets_only_provided_fields() {
        let fields = UpdateFields {
            monthly_price: Some("12.50".into()),
            start_month: Some(date!(2024 - 02 - 01)),
            ..Default::default()
        };
        let qb = update_query(Uuid::new_v4(), &fields);
        let sql = qb.sql();
        assert!(sql.contains("monthly_price = $1::numeric(12,2)"));
        assert!(sql.contains("start_month = $2"));
        assert!(!sql.contains("service_name = "));
        assert!(sql.contains("updated_at = now()"));
    }

    #[test]
    fn update_query_clears_end_month_with_explicit_null() {
        let fields = UpdateFields {
            end_month: Some(None),
            ..Default::default()
        };
        let qb = update_query(Uuid::new_v4(), &fields);
        let sql = qb.sql();
        assert!(sql.contains("end_month = NULL"));
        // No bind parameter for the cleared month, only the id.
        assert!(sql.contains("WHERE id = $1"));
    }
}
