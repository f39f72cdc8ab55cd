//! Raw-SQL aggregate queries for the statistics engine.
//!
//! Current status uses the most-recent-result-per-test window pattern:
//! `DISTINCT ON (test_id) ... ORDER BY test_id, created_at DESC, id DESC`.
//! The id tie-break is deterministic because ids are UUIDv7 (time-ordered,
//! insertion order).

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, FromQueryResult, Statement, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::LabelsCondition;

/// One status bucket of a tally.
#[derive(Debug, FromQueryResult)]
pub struct TallyRow {
    pub status: String,
    pub value: i64,
}

/// One (day, status) bucket of a date histogram.
#[derive(Debug, FromQueryResult)]
pub struct DayRow {
    pub day: NaiveDate,
    pub status: String,
    pub value: i64,
}

/// One (attribute value, status) bucket of an attribute histogram.
#[derive(Debug, FromQueryResult)]
pub struct AttributeRow {
    pub point: String,
    pub status: String,
    pub value: i64,
}

/// Progress counts for one plan subtree.
#[derive(Debug, FromQueryResult)]
pub struct ProgressRow {
    pub id: Uuid,
    pub tests_total: i64,
    pub tests_progress_total: i64,
    pub tests_progress_period: i64,
}

/// Collects bind values while handing out `$n` placeholders.
struct Binder {
    values: Vec<Value>,
}

impl Binder {
    fn new() -> Self {
        Binder { values: Vec::new() }
    }

    fn bind(&mut self, value: impl Into<Value>) -> String {
        self.values.push(value.into());
        format!("${}", self.values.len())
    }

    fn bind_uuids(&mut self, ids: &[Uuid]) -> String {
        ids.iter()
            .map(|id| self.bind(*id))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Count tests by current status across the given plans.
///
/// Tests with no result count as `untested`. Label filters restrict to
/// tests whose case carries the listed labels (AND: all of them, OR: at
/// least one); `not_labels` excludes cases carrying any listed label.
pub async fn status_tally<C: ConnectionTrait>(
    conn: &C,
    plan_ids: &[Uuid],
    labels: &[Uuid],
    not_labels: &[Uuid],
    labels_condition: LabelsCondition,
) -> AppResult<Vec<TallyRow>> {
    if plan_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut binder = Binder::new();
    let plan_list = binder.bind_uuids(plan_ids);

    let mut filters = String::new();
    if !labels.is_empty() {
        let label_list = binder.bind_uuids(labels);
        match labels_condition {
            LabelsCondition::Or => {
                filters.push_str(&format!(
                    r#"
                AND EXISTS (
                    SELECT 1 FROM labeled_items li
                    WHERE li.kind = 'case' AND li.item_id = t.case_id
                      AND li.deleted_at IS NULL AND li.label_id IN ({label_list})
                )"#
                ));
            }
            LabelsCondition::And => {
                let count = binder.bind(labels.len() as i64);
                filters.push_str(&format!(
                    r#"
                AND (
                    SELECT COUNT(DISTINCT li.label_id) FROM labeled_items li
                    WHERE li.kind = 'case' AND li.item_id = t.case_id
                      AND li.deleted_at IS NULL AND li.label_id IN ({label_list})
                ) = {count}"#
                ));
            }
        }
    }
    if !not_labels.is_empty() {
        let not_list = binder.bind_uuids(not_labels);
        filters.push_str(&format!(
            r#"
                AND NOT EXISTS (
                    SELECT 1 FROM labeled_items li
                    WHERE li.kind = 'case' AND li.item_id = t.case_id
                      AND li.deleted_at IS NULL AND li.label_id IN ({not_list})
                )"#
        ));
    }

    let sql = format!(
        r#"
        SELECT COALESCE(last.status, 'untested') AS status, COUNT(*)::BIGINT AS value
        FROM tests t
        LEFT JOIN (
            SELECT DISTINCT ON (test_id) test_id, status
            FROM test_results
            WHERE deleted_at IS NULL
            ORDER BY test_id, created_at DESC, id DESC
        ) last ON last.test_id = t.id
        WHERE t.plan_id IN ({plan_list})
          AND t.deleted_at IS NULL{filters}
        GROUP BY 1
        ORDER BY 1
        "#
    );

    let rows = TallyRow::find_by_statement(Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        &sql,
        binder.values,
    ))
    .all(conn)
    .await
    .map_err(|e| AppError::Database(format!("Failed to compute status tally: {}", e)))?;

    Ok(rows)
}

/// Count results by (calendar day, status) within `[start, end)`.
///
/// Sparse on the SQL side; the service layer zero-fills missing days.
pub async fn histogram_by_day<C: ConnectionTrait>(
    conn: &C,
    plan_ids: &[Uuid],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> AppResult<Vec<DayRow>> {
    if plan_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut binder = Binder::new();
    let plan_list = binder.bind_uuids(plan_ids);
    let start_ph = binder.bind(start);
    let end_ph = binder.bind(end);

    let sql = format!(
        r#"
        SELECT (r.created_at AT TIME ZONE 'UTC')::date AS day,
               r.status AS status,
               COUNT(*)::BIGINT AS value
        FROM test_results r
        INNER JOIN tests t ON t.id = r.test_id AND t.deleted_at IS NULL
        WHERE t.plan_id IN ({plan_list})
          AND r.deleted_at IS NULL
          AND r.created_at >= {start_ph}
          AND r.created_at < {end_ph}
        GROUP BY 1, 2
        ORDER BY 1, 2
        "#
    );

    let rows = DayRow::find_by_statement(Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        &sql,
        binder.values,
    ))
    .all(conn)
    .await
    .map_err(|e| AppError::Database(format!("Failed to compute day histogram: {}", e)))?;

    Ok(rows)
}

/// Count results by (attribute value, status) within `[start, end)`.
///
/// Only observed attribute values appear; results lacking the attribute
/// are skipped entirely.
pub async fn histogram_by_attribute<C: ConnectionTrait>(
    conn: &C,
    plan_ids: &[Uuid],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    attribute: &str,
) -> AppResult<Vec<AttributeRow>> {
    if plan_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut binder = Binder::new();
    let plan_list = binder.bind_uuids(plan_ids);
    let start_ph = binder.bind(start);
    let end_ph = binder.bind(end);
    let attr_ph = binder.bind(attribute);

    let sql = format!(
        r#"
        SELECT r.attributes ->> {attr_ph} AS point,
               r.status AS status,
               COUNT(*)::BIGINT AS value
        FROM test_results r
        INNER JOIN tests t ON t.id = r.test_id AND t.deleted_at IS NULL
        WHERE t.plan_id IN ({plan_list})
          AND r.deleted_at IS NULL
          AND r.created_at >= {start_ph}
          AND r.created_at < {end_ph}
          AND r.attributes ->> {attr_ph} IS NOT NULL
        GROUP BY 1, 2
        ORDER BY 1, 2
        "#
    );

    let rows = AttributeRow::find_by_statement(Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        &sql,
        binder.values,
    ))
    .all(conn)
    .await
    .map_err(|e| AppError::Database(format!("Failed to compute attribute histogram: {}", e)))?;

    Ok(rows)
}

/// Progress counts per plan, each covering that plan's whole subtree.
///
/// `tests_total` counts live tests anywhere under the plan;
/// `tests_progress_total` those whose latest result exists at all;
/// `tests_progress_period` those whose latest result landed inside
/// `[start, end]`.
pub async fn progress<C: ConnectionTrait>(
    conn: &C,
    plan_ids: &[Uuid],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> AppResult<Vec<ProgressRow>> {
    if plan_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut binder = Binder::new();
    let plan_list = binder.bind_uuids(plan_ids);
    let start_ph = binder.bind(start);
    let end_ph = binder.bind(end);

    // Subtree membership via interval containment against the parent row.
    let sql = format!(
        r#"
        SELECT p.id AS id,
               COUNT(t.id)::BIGINT AS tests_total,
               COUNT(last.test_id)::BIGINT AS tests_progress_total,
               COUNT(last.test_id) FILTER (
                   WHERE last.created_at >= {start_ph} AND last.created_at <= {end_ph}
               )::BIGINT AS tests_progress_period
        FROM test_plans p
        INNER JOIN test_plans sub
            ON sub.tree_id = p.tree_id
           AND sub.lft >= p.lft AND sub.rght <= p.rght
           AND sub.deleted_at IS NULL
        LEFT JOIN tests t ON t.plan_id = sub.id AND t.deleted_at IS NULL
        LEFT JOIN (
            SELECT DISTINCT ON (test_id) test_id, created_at
            FROM test_results
            WHERE deleted_at IS NULL
            ORDER BY test_id, created_at DESC, id DESC
        ) last ON last.test_id = t.id
        WHERE p.id IN ({plan_list})
        GROUP BY p.id
        "#
    );

    let rows = ProgressRow::find_by_statement(Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        &sql,
        binder.values,
    ))
    .all(conn)
    .await
    .map_err(|e| AppError::Database(format!("Failed to compute progress: {}", e)))?;

    Ok(rows)
}
