//! Shaping layer over the raw statistics queries.
//!
//! The SQL side returns sparse (bucket, status, count) rows; this module
//! turns them into response shapes, zero-filling day histograms so charts
//! get one point per calendar day even when nothing ran.

use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::config::Config;
use crate::db::statistics::{AttributeRow, DayRow, ProgressRow, TallyRow};
use crate::db::{self, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::{
    HistogramPoint, HistogramQuery, ProgressEntry, ProgressQuery, StatisticsQuery,
    StatusTallyEntry,
};

/// Dense day buckets over `[start, end]` inclusive.
///
/// Every day carries an entry for every status observed anywhere in the
/// range, zero when that day saw none of it.
pub fn fill_date_buckets(start: NaiveDate, end: NaiveDate, rows: &[DayRow]) -> Vec<HistogramPoint> {
    let mut statuses: Vec<&str> = rows.iter().map(|r| r.status.as_str()).collect();
    statuses.sort_unstable();
    statuses.dedup();

    let mut points = Vec::new();
    let mut day = start;
    while day <= end {
        let values = statuses
            .iter()
            .map(|status| StatusTallyEntry {
                label: (*status).to_string(),
                value: rows
                    .iter()
                    .find(|r| r.day == day && r.status == *status)
                    .map(|r| r.value)
                    .unwrap_or(0),
            })
            .collect();
        points.push(HistogramPoint {
            point: day.format("%Y-%m-%d").to_string(),
            values,
        });
        day += Duration::days(1);
    }
    points
}

/// Sparse attribute buckets: only observed values appear, in the order the
/// query returned them.
pub fn attribute_buckets(rows: Vec<AttributeRow>) -> Vec<HistogramPoint> {
    let mut points: Vec<HistogramPoint> = Vec::new();
    for row in rows {
        match points.last_mut() {
            Some(last) if last.point == row.point => last.values.push(StatusTallyEntry {
                label: row.status,
                value: row.value,
            }),
            _ => points.push(HistogramPoint {
                point: row.point,
                values: vec![StatusTallyEntry {
                    label: row.status,
                    value: row.value,
                }],
            }),
        }
    }
    points
}

fn shape_tally(rows: Vec<TallyRow>) -> Vec<StatusTallyEntry> {
    rows.into_iter()
        .map(|r| StatusTallyEntry {
            label: r.status,
            value: r.value,
        })
        .collect()
}

fn shape_progress(rows: Vec<ProgressRow>) -> Vec<ProgressEntry> {
    rows.into_iter()
        .map(|r| ProgressEntry {
            id: r.id,
            tests_total: r.tests_total,
            tests_progress_total: r.tests_progress_total,
            tests_progress_period: r.tests_progress_period,
        })
        .collect()
}

async fn scoped_plan_ids(
    pool: &DbPool,
    plan_id: Uuid,
    include_descendants: bool,
) -> AppResult<Vec<Uuid>> {
    let plan = db::plans::require_plan(pool.connection(), plan_id).await?;
    if include_descendants {
        let subtree = db::plans::descendants(pool.connection(), &plan, true).await?;
        Ok(subtree.into_iter().map(|p| p.id).collect())
    } else {
        Ok(vec![plan.id])
    }
}

/// Current-status tally for a plan, optionally widened to its subtree.
pub async fn plan_statistics(
    pool: &DbPool,
    plan_id: Uuid,
    query: StatisticsQuery,
) -> AppResult<Vec<StatusTallyEntry>> {
    let plan_ids = scoped_plan_ids(pool, plan_id, query.include_descendants).await?;
    let rows = db::statistics::status_tally(
        pool.connection(),
        &plan_ids,
        query.labels.as_deref().unwrap_or_default(),
        query.not_labels.as_deref().unwrap_or_default(),
        query.labels_condition,
    )
    .await?;
    Ok(shape_tally(rows))
}

/// Result histogram for a plan subtree: dense by day, or sparse by a named
/// result attribute.
pub async fn plan_histogram(
    pool: &DbPool,
    plan_id: Uuid,
    query: HistogramQuery,
) -> AppResult<Vec<HistogramPoint>> {
    if query.start_date > query.end_date {
        return Err(AppError::validation(
            "end_date",
            "end date must not precede the start date",
        ));
    }
    let start = query.start_date.and_hms_opt(0, 0, 0).map(|t| t.and_utc());
    let end_excl = query
        .end_date
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc());
    let (Some(start), Some(end_excl)) = (start, end_excl) else {
        return Err(AppError::validation("end_date", "date out of range"));
    };

    let plan_ids = scoped_plan_ids(pool, plan_id, true).await?;

    match query.attribute.as_deref() {
        Some(attribute) if !attribute.is_empty() => {
            let rows = db::statistics::histogram_by_attribute(
                pool.connection(),
                &plan_ids,
                start,
                end_excl,
                attribute,
            )
            .await?;
            Ok(attribute_buckets(rows))
        }
        _ => {
            let rows =
                db::statistics::histogram_by_day(pool.connection(), &plan_ids, start, end_excl)
                    .await?;
            Ok(fill_date_buckets(query.start_date, query.end_date, &rows))
        }
    }
}

fn period(config: &Config, query: &ProgressQuery) -> (chrono::DateTime<Utc>, chrono::DateTime<Utc>)
{
    let days = query.period_days.unwrap_or(config.progress_window_days);
    let end = Utc::now();
    (end - Duration::days(days), end)
}

/// Progress counters for each direct child of a plan.
pub async fn plan_progress(
    pool: &DbPool,
    config: &Config,
    plan_id: Uuid,
    query: ProgressQuery,
) -> AppResult<Vec<ProgressEntry>> {
    db::plans::require_plan(pool.connection(), plan_id).await?;
    let children = db::plans::children(pool.connection(), plan_id).await?;
    let scope: Vec<Uuid> = children.iter().map(|c| c.id).collect();

    let (start, end) = period(config, &query);
    let rows = db::statistics::progress(pool.connection(), &scope, start, end).await?;
    Ok(shape_progress(rows))
}

/// Progress counters for each root plan of a project.
pub async fn project_progress(
    pool: &DbPool,
    config: &Config,
    project_id: Uuid,
    query: ProgressQuery,
) -> AppResult<Vec<ProgressEntry>> {
    db::projects::require_project(pool.connection(), project_id).await?;
    let roots = db::plans::roots_by_project(pool.connection(), project_id).await?;
    let scope: Vec<Uuid> = roots.into_iter().map(|p| p.id).collect();

    let (start, end) = period(config, &query);
    let rows = db::statistics::progress(pool.connection(), &scope, start, end).await?;
    Ok(shape_progress(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn day_row(date: NaiveDate, status: &str, value: i64) -> DayRow {
        DayRow {
            day: date,
            status: status.to_string(),
            value,
        }
    }

    #[test]
    fn test_fill_date_buckets_is_dense() {
        let rows = vec![
            day_row(day(2026, 3, 1), "passed", 4),
            day_row(day(2026, 3, 3), "failed", 1),
        ];
        let points = fill_date_buckets(day(2026, 3, 1), day(2026, 3, 4), &rows);

        assert_eq!(points.len(), 4);
        assert_eq!(points[0].point, "2026-03-01");
        assert_eq!(points[3].point, "2026-03-04");
        // Every day carries every observed status.
        for point in &points {
            assert_eq!(point.values.len(), 2);
        }
        // March 2nd saw nothing.
        assert!(points[1].values.iter().all(|v| v.value == 0));
        let failed_on_3rd = points[2]
            .values
            .iter()
            .find(|v| v.label == "failed")
            .unwrap();
        assert_eq!(failed_on_3rd.value, 1);
    }

    #[test]
    fn test_fill_date_buckets_empty_range_still_yields_days() {
        let points = fill_date_buckets(day(2026, 3, 1), day(2026, 3, 2), &[]);
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.values.is_empty()));
    }

    #[test]
    fn test_fill_date_buckets_single_day() {
        let rows = vec![day_row(day(2026, 3, 1), "passed", 2)];
        let points = fill_date_buckets(day(2026, 3, 1), day(2026, 3, 1), &rows);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].values[0].value, 2);
    }

    #[test]
    fn test_attribute_buckets_stay_sparse() {
        let rows = vec![
            AttributeRow {
                point: "chrome".to_string(),
                status: "failed".to_string(),
                value: 1,
            },
            AttributeRow {
                point: "chrome".to_string(),
                status: "passed".to_string(),
                value: 7,
            },
            AttributeRow {
                point: "firefox".to_string(),
                status: "passed".to_string(),
                value: 3,
            },
        ];
        let points = attribute_buckets(rows);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].point, "chrome");
        assert_eq!(points[0].values.len(), 2);
        assert_eq!(points[1].point, "firefox");
        assert_eq!(points[1].values.len(), 1);
    }

    #[test]
    fn test_progress_shaping_preserves_invariant() {
        let rows = vec![ProgressRow {
            id: Uuid::now_v7(),
            tests_total: 10,
            tests_progress_total: 6,
            tests_progress_period: 2,
        }];
        let shaped = shape_progress(rows);
        assert_eq!(shaped.len(), 1);
        assert!(shaped[0].tests_progress_total >= shaped[0].tests_progress_period);
        assert!(shaped[0].tests_total >= shaped[0].tests_progress_total);
    }
}
