//! Plan and suite materialization.
//!
//! Turns creation/update requests into rows: the bulk parameterized path
//! generates one plan per parameter combination, pairs every generated
//! plan with every requested case, and rebuilds each touched tree exactly
//! once. Updates reconcile a plan's Test pairings against the requested
//! case list by symmetric difference.

use std::collections::{BTreeSet, HashMap};

use sea_orm::TransactionTrait;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::db::plans::{NewPlan, PlanTree};
use crate::db::suites::{NewSuite, SuiteTree};
use crate::db::test_records::NewTest;
use crate::db::tree_store::{self, TreeEntity};
use crate::db::{self, DbPool};
use crate::entity::{parameter, test_plan};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreatePlanRequest, CreateSuiteRequest, PlanResponse, SuiteResponse, UpdatePlanRequest,
    UpdateSuiteRequest,
};
use crate::services::combinations;

/// The set difference between a plan's current case pairings and the
/// requested ones.
#[derive(Debug, PartialEq, Eq)]
pub struct Reconciliation {
    pub to_add: Vec<Uuid>,
    pub to_remove: Vec<Uuid>,
}

impl Reconciliation {
    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Compute which pairings to create and which to soft-delete so the plan's
/// case set matches `desired`. Duplicates in either input collapse.
pub fn reconcile(current: &[Uuid], desired: &[Uuid]) -> Reconciliation {
    let current_set: BTreeSet<Uuid> = current.iter().copied().collect();
    let desired_set: BTreeSet<Uuid> = desired.iter().copied().collect();
    Reconciliation {
        to_add: desired_set.difference(&current_set).copied().collect(),
        to_remove: current_set.difference(&desired_set).copied().collect(),
    }
}

/// Placement guard for creates and moves: unarchiving a mid-subtree plan
/// can leave archived plans above it, so the whole chain up to the root
/// must be clear, not just the immediate parent.
pub fn archived_in_ancestry(chain: &[test_plan::Model]) -> bool {
    chain.iter().any(|p| p.is_archive)
}

/// Name for one generated plan: the base name suffixed with the
/// combination's parameter values in group-encounter order.
pub fn combination_name(base: &str, combo: &[parameter::Model]) -> String {
    if combo.is_empty() {
        return base.to_string();
    }
    let values: Vec<&str> = combo.iter().map(|p| p.data.as_str()).collect();
    format!("{} [{}]", base, values.join(", "))
}

/// Create one plan, or a batch of sibling plans when parameters are given.
///
/// All generated plans land under the same parent and share one tree
/// rebuild per distinct tree. The whole batch commits atomically.
pub async fn create_plans(
    pool: &DbPool,
    config: &Config,
    payload: CreatePlanRequest,
) -> AppResult<Vec<PlanResponse>> {
    if payload.started_at >= payload.due_date {
        return Err(AppError::validation(
            "due_date",
            "due date must be after the start date",
        ));
    }

    let txn = pool
        .connection()
        .begin()
        .await
        .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

    db::projects::require_project(&txn, payload.project).await?;

    let parent = match payload.parent {
        Some(parent_id) => {
            let parent = db::plans::require_plan(&txn, parent_id).await?;
            let chain = db::plans::ancestors(&txn, &parent, true).await?;
            if archived_in_ancestry(&chain) {
                return Err(AppError::validation(
                    "parent",
                    "cannot place a plan under an archived ancestor",
                ));
            }
            tree_store::lock_tree(&txn, PlanTree::LOCK_SPACE, parent.tree_id).await?;
            Some(parent)
        }
        None => None,
    };

    let combos = match &payload.parameters {
        Some(ids) if !ids.is_empty() => {
            let params = db::projects::get_parameters_ordered(&txn, ids).await?;
            let unique: BTreeSet<Uuid> = ids.iter().copied().collect();
            if params.len() != unique.len() {
                return Err(AppError::NotFound("Parameter".to_string()));
            }
            let total = combinations::combination_count(&params);
            if total > config.max_combinations {
                return Err(AppError::validation(
                    "parameters",
                    format!(
                        "request would generate {} plans, limit is {}",
                        total, config.max_combinations
                    ),
                ));
            }
            combinations::combine(&params)
        }
        _ => vec![Vec::new()],
    };

    let description = payload.description.clone().unwrap_or_default();
    let mut new_plans = Vec::with_capacity(combos.len());
    let mut parameter_pairs: Vec<(Uuid, Uuid)> = Vec::new();
    for combo in &combos {
        let id = Uuid::now_v7();
        let (parent_id, tree_id, level) = match &parent {
            Some(p) => (Some(p.id), p.tree_id, p.level + 1),
            // Each root plan starts its own tree, keyed by its own id.
            None => (None, id, 0),
        };
        for param in combo {
            parameter_pairs.push((id, param.id));
        }
        new_plans.push(NewPlan {
            id,
            project_id: payload.project,
            parent_id,
            tree_id,
            level,
            name: combination_name(&payload.name, combo),
            description: description.clone(),
            started_at: payload.started_at,
            due_date: payload.due_date,
            finished_at: payload.finished_at,
        });
    }

    let trees: BTreeSet<Uuid> = new_plans.iter().map(|p| p.tree_id).collect();
    let created = db::plans::insert_plans(&txn, new_plans).await?;
    db::plans::insert_plan_parameters(&txn, &parameter_pairs).await?;

    // Pair every created plan with every requested case.
    if let Some(case_ids) = &payload.test_cases {
        if !case_ids.is_empty() {
            let cases = db::cases::get_cases(&txn, case_ids).await?;
            let unique: BTreeSet<Uuid> = case_ids.iter().copied().collect();
            if cases.len() != unique.len() {
                return Err(AppError::NotFound("Test case".to_string()));
            }
            let mut tests = Vec::with_capacity(created.len() * cases.len());
            for plan in &created {
                for case in &cases {
                    tests.push(NewTest {
                        project_id: plan.project_id,
                        plan_id: plan.id,
                        case_id: case.id,
                        assignee_id: None,
                    });
                }
            }
            db::test_records::bulk_insert_tests(&txn, tests).await?;
        }
    }

    for tree_id in trees {
        tree_store::partial_rebuild::<PlanTree>(&txn, tree_id).await?;
    }

    txn.commit()
        .await
        .map_err(|e| AppError::Database(format!("Failed to commit plan creation: {}", e)))?;

    info!(count = created.len(), "created test plans");

    let mut params_by_plan: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (plan_id, parameter_id) in parameter_pairs {
        params_by_plan.entry(plan_id).or_default().push(parameter_id);
    }
    Ok(created
        .into_iter()
        .map(|plan| {
            let params = params_by_plan.remove(&plan.id).unwrap_or_default();
            PlanResponse::from_model(plan, params)
        })
        .collect())
}

/// Update a plan's fields, optionally moving it and reconciling its
/// Test pairings.
pub async fn update_plan(
    pool: &DbPool,
    plan_id: Uuid,
    payload: UpdatePlanRequest,
) -> AppResult<PlanResponse> {
    let txn = pool
        .connection()
        .begin()
        .await
        .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

    let plan = db::plans::require_plan(&txn, plan_id).await?;

    let started = payload.started_at.unwrap_or(plan.started_at);
    let due = payload.due_date.unwrap_or(plan.due_date);
    if started >= due {
        return Err(AppError::validation(
            "due_date",
            "due date must be after the start date",
        ));
    }

    if let Some(new_parent) = payload.parent {
        if new_parent != plan.parent_id {
            match new_parent {
                Some(parent_id) => {
                    if parent_id == plan.id {
                        return Err(AppError::TreeCycle);
                    }
                    let parent = db::plans::require_plan(&txn, parent_id).await?;
                    let chain = db::plans::ancestors(&txn, &parent, true).await?;
                    if archived_in_ancestry(&chain) {
                        return Err(AppError::validation(
                            "parent",
                            "cannot place a plan under an archived ancestor",
                        ));
                    }
                    tree_store::move_node::<PlanTree>(
                        &txn,
                        plan.id,
                        plan.tree_id,
                        Some((parent.id, parent.tree_id)),
                    )
                    .await?;
                }
                // Explicit null detaches the subtree into a root of its own.
                None => {
                    tree_store::move_node::<PlanTree>(&txn, plan.id, plan.tree_id, None).await?;
                }
            }
        }
    }

    // Presence of the key drives reconciliation; an empty list unpairs
    // every case.
    if let Some(desired) = &payload.test_cases {
        let current = db::test_records::case_ids_of_plan(&txn, plan.id).await?;
        let diff = reconcile(&current, desired);
        if !diff.to_add.is_empty() {
            let cases = db::cases::get_cases(&txn, &diff.to_add).await?;
            if cases.len() != diff.to_add.len() {
                return Err(AppError::NotFound("Test case".to_string()));
            }
            let tests = cases
                .iter()
                .map(|case| NewTest {
                    project_id: plan.project_id,
                    plan_id: plan.id,
                    case_id: case.id,
                    assignee_id: None,
                })
                .collect();
            db::test_records::bulk_insert_tests(&txn, tests).await?;
        }
        db::test_records::soft_delete_pairings(&txn, plan.id, &diff.to_remove).await?;
    }

    db::plans::update_fields(
        &txn,
        plan,
        payload.name,
        payload.description,
        payload.started_at,
        payload.due_date,
        payload.finished_at,
        payload.is_archive,
    )
    .await?;

    // Re-fetch: a move above may have changed parent/tree placement.
    let fresh = db::plans::require_plan(&txn, plan_id).await?;
    let params = db::plans::parameter_ids_of(&txn, fresh.id).await?;

    txn.commit()
        .await
        .map_err(|e| AppError::Database(format!("Failed to commit plan update: {}", e)))?;

    Ok(PlanResponse::from_model(fresh, params))
}

/// Create one suite under an optional parent.
pub async fn create_suite(pool: &DbPool, payload: CreateSuiteRequest) -> AppResult<SuiteResponse> {
    let txn = pool
        .connection()
        .begin()
        .await
        .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

    db::projects::require_project(&txn, payload.project).await?;

    let (parent_id, tree_id, level) = match payload.parent {
        Some(parent_id) => {
            let parent = db::suites::require_suite(&txn, parent_id).await?;
            tree_store::lock_tree(&txn, SuiteTree::LOCK_SPACE, parent.tree_id).await?;
            (Some(parent.id), parent.tree_id, parent.level + 1)
        }
        None => (None, Uuid::now_v7(), 0),
    };

    let suite = db::suites::insert_suite(
        &txn,
        NewSuite {
            project_id: payload.project,
            parent_id,
            tree_id,
            level,
            name: payload.name,
            description: payload.description.unwrap_or_default(),
        },
    )
    .await?;
    tree_store::partial_rebuild::<SuiteTree>(&txn, tree_id).await?;

    txn.commit()
        .await
        .map_err(|e| AppError::Database(format!("Failed to commit suite creation: {}", e)))?;

    Ok(suite.into())
}

/// Update a suite's fields, optionally moving it.
pub async fn update_suite(
    pool: &DbPool,
    suite_id: Uuid,
    payload: UpdateSuiteRequest,
) -> AppResult<SuiteResponse> {
    let txn = pool
        .connection()
        .begin()
        .await
        .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

    let suite = db::suites::require_suite(&txn, suite_id).await?;

    if let Some(new_parent) = payload.parent {
        if new_parent != suite.parent_id {
            match new_parent {
                Some(parent_id) => {
                    if parent_id == suite.id {
                        return Err(AppError::TreeCycle);
                    }
                    let parent = db::suites::require_suite(&txn, parent_id).await?;
                    tree_store::move_node::<SuiteTree>(
                        &txn,
                        suite.id,
                        suite.tree_id,
                        Some((parent.id, parent.tree_id)),
                    )
                    .await?;
                }
                None => {
                    tree_store::move_node::<SuiteTree>(&txn, suite.id, suite.tree_id, None)
                        .await?;
                }
            }
        }
    }

    db::suites::update_fields(&txn, suite, payload.name, payload.description).await?;
    let fresh = db::suites::require_suite(&txn, suite_id).await?;

    txn.commit()
        .await
        .map_err(|e| AppError::Database(format!("Failed to commit suite update: {}", e)))?;

    Ok(fresh.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn param(group: &str, value: &str) -> parameter::Model {
        let now = Utc::now();
        parameter::Model {
            id: Uuid::now_v7(),
            project_id: Uuid::now_v7(),
            group_name: group.to_string(),
            data: value.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn plan_row(is_archive: bool) -> test_plan::Model {
        let now = Utc::now();
        test_plan::Model {
            id: Uuid::now_v7(),
            project_id: Uuid::now_v7(),
            parent_id: None,
            tree_id: Uuid::now_v7(),
            lft: 1,
            rght: 2,
            level: 0,
            name: "plan".to_string(),
            description: String::new(),
            started_at: now,
            due_date: now,
            finished_at: None,
            is_archive,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_archived_in_ancestry_catches_any_link() {
        // An unarchived parent under an archived grandparent still blocks
        // placement.
        assert!(archived_in_ancestry(&[plan_row(true), plan_row(false)]));
        assert!(!archived_in_ancestry(&[plan_row(false), plan_row(false)]));
        assert!(!archived_in_ancestry(&[]));
    }

    #[test]
    fn test_reconcile_symmetric_difference() {
        let keep = Uuid::now_v7();
        let gone = Uuid::now_v7();
        let new = Uuid::now_v7();

        let diff = reconcile(&[keep, gone], &[keep, new]);
        assert_eq!(diff.to_add, vec![new]);
        assert_eq!(diff.to_remove, vec![gone]);
    }

    #[test]
    fn test_reconcile_identical_sets_is_noop() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        assert!(reconcile(&[a, b], &[b, a]).is_noop());
    }

    #[test]
    fn test_reconcile_empty_desired_removes_everything() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let diff = reconcile(&[a, b], &[]);
        assert!(diff.to_add.is_empty());
        assert_eq!(diff.to_remove.len(), 2);
    }

    #[test]
    fn test_reconcile_collapses_duplicates() {
        let a = Uuid::now_v7();
        let diff = reconcile(&[], &[a, a, a]);
        assert_eq!(diff.to_add, vec![a]);
    }

    #[test]
    fn test_combination_name_suffixes_values() {
        let combo = vec![param("browser", "firefox"), param("os", "linux")];
        assert_eq!(
            combination_name("Nightly", &combo),
            "Nightly [firefox, linux]"
        );
    }

    #[test]
    fn test_combination_name_plain_without_parameters() {
        assert_eq!(combination_name("Nightly", &[]), "Nightly");
    }
}
