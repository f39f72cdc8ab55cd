//! Deep-copy engine for suites and cases.
//!
//! Copying is planned as pure row transforms first (fresh ids, remapped
//! foreign keys, rewritten attachment references), then applied in one
//! transaction with a single tree rebuild per tree that received rows.
//! Labels behave asymmetrically: with an explicit destination project the
//! copy reuses an existing label of the same name and type there; without
//! one it always creates fresh label rows.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseTransaction, TransactionTrait};
use tracing::info;
use uuid::Uuid;

use crate::db::suites::SuiteTree;
use crate::db::tree_store::{self, TreeEntity};
use crate::db::{self, DbPool};
use crate::entity::{attachment, label, labeled_item, test_case, test_case_step, test_suite};
use crate::error::{AppError, AppResult};
use crate::models::{CopiedEntry, CopyCasesRequest, CopyResponse, CopySuitesRequest, RefKind};

/// Planned suite rows plus the bookkeeping the rest of the copy needs.
pub struct SuiteCopyPlan {
    /// New rows with placeholder bounds, pre-order per subtree.
    pub rows: Vec<test_suite::Model>,
    /// Source suite id to its copy's id.
    pub id_map: HashMap<Uuid, Uuid>,
    /// Every tree id that received rows and needs a rebuild.
    pub trees: BTreeSet<Uuid>,
}

/// Plan copies of whole subtrees.
///
/// Each element of `subtrees` is one requested root followed by its
/// descendants in pre-order. With a destination suite every copy joins its
/// tree under it; otherwise each copied root starts a tree of its own.
/// `overrides` renames requested roots only.
pub fn plan_suite_copies(
    subtrees: &[Vec<test_suite::Model>],
    overrides: &HashMap<Uuid, String>,
    dst: Option<&test_suite::Model>,
    dst_project: Option<Uuid>,
    now: DateTime<Utc>,
) -> SuiteCopyPlan {
    let mut rows = Vec::new();
    let mut id_map = HashMap::new();
    let mut trees = BTreeSet::new();

    for subtree in subtrees {
        let Some(root) = subtree.first() else { continue };

        let mut local: HashMap<Uuid, Uuid> = HashMap::new();
        for src in subtree {
            local.insert(src.id, Uuid::now_v7());
        }

        let root_copy_id = local[&root.id];
        let tree_id = dst.map(|d| d.tree_id).unwrap_or(root_copy_id);
        let base_level = dst.map(|d| d.level + 1).unwrap_or(0);
        trees.insert(tree_id);

        for src in subtree {
            let parent_id = if src.id == root.id {
                dst.map(|d| d.id)
            } else {
                src.parent_id.and_then(|p| local.get(&p).copied())
            };
            let name = if src.id == root.id {
                overrides.get(&src.id).cloned().unwrap_or_else(|| src.name.clone())
            } else {
                src.name.clone()
            };
            rows.push(test_suite::Model {
                id: local[&src.id],
                project_id: dst_project.unwrap_or(src.project_id),
                parent_id,
                tree_id,
                lft: 0,
                rght: 0,
                level: base_level + (src.level - root.level),
                name,
                description: src.description.clone(),
                created_at: now,
                updated_at: now,
                deleted_at: None,
            });
        }
        id_map.extend(local);
    }

    SuiteCopyPlan { rows, id_map, trees }
}

/// Plan case copies into remapped suites. Copies restart their version
/// history at 1; the executor records the initial snapshot.
pub fn plan_case_copies(
    cases: &[test_case::Model],
    suite_map: &HashMap<Uuid, Uuid>,
    overrides: &HashMap<Uuid, String>,
    dst_project: Option<Uuid>,
    now: DateTime<Utc>,
) -> (Vec<test_case::Model>, HashMap<Uuid, Uuid>) {
    let mut rows = Vec::new();
    let mut id_map = HashMap::new();

    for case in cases {
        let Some(&suite_id) = suite_map.get(&case.suite_id) else {
            continue;
        };
        let id = Uuid::now_v7();
        id_map.insert(case.id, id);
        rows.push(test_case::Model {
            id,
            project_id: dst_project.unwrap_or(case.project_id),
            suite_id,
            name: overrides.get(&case.id).cloned().unwrap_or_else(|| case.name.clone()),
            setup: case.setup.clone(),
            scenario: case.scenario.clone(),
            expected: case.expected.clone(),
            teardown: case.teardown.clone(),
            description: case.description.clone(),
            estimate: case.estimate,
            is_steps: case.is_steps,
            current_version: 1,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        });
    }
    (rows, id_map)
}

/// Plan step copies into remapped cases.
pub fn plan_step_copies(
    steps: &[test_case_step::Model],
    case_map: &HashMap<Uuid, Uuid>,
    dst_project: Option<Uuid>,
    now: DateTime<Utc>,
) -> (Vec<test_case_step::Model>, HashMap<Uuid, Uuid>) {
    let mut rows = Vec::new();
    let mut id_map = HashMap::new();

    for step in steps {
        let Some(&test_case_id) = case_map.get(&step.test_case_id) else {
            continue;
        };
        let id = Uuid::now_v7();
        id_map.insert(step.id, id);
        rows.push(test_case_step::Model {
            id,
            test_case_id,
            project_id: dst_project.unwrap_or(step.project_id),
            name: step.name.clone(),
            scenario: step.scenario.clone(),
            expected: step.expected.clone(),
            sort_order: step.sort_order,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        });
    }
    (rows, id_map)
}

/// Plan attachment copies onto remapped items, keeping the source kind.
pub fn plan_attachment_copies(
    attachments: &[attachment::Model],
    item_map: &HashMap<Uuid, Uuid>,
    dst_project: Option<Uuid>,
    now: DateTime<Utc>,
) -> (Vec<attachment::Model>, HashMap<Uuid, Uuid>) {
    let mut rows = Vec::new();
    let mut id_map = HashMap::new();

    for src in attachments {
        let Some(&item_id) = item_map.get(&src.item_id) else {
            continue;
        };
        let id = Uuid::now_v7();
        id_map.insert(src.id, id);
        rows.push(attachment::Model {
            id,
            project_id: dst_project.unwrap_or(src.project_id),
            kind: src.kind.clone(),
            item_id,
            name: src.name.clone(),
            content: src.content.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        });
    }
    (rows, id_map)
}

/// Rewrite `attachments/{old}/` references in rich text to point at the
/// copied attachments. Returns `None` when nothing matched.
pub fn rewrite_attachment_refs(
    text: &str,
    attachment_map: &HashMap<Uuid, Uuid>,
) -> Option<String> {
    let mut out = text.to_string();
    let mut changed = false;
    for (old, new) in attachment_map {
        let needle = format!("attachments/{}/", old);
        if out.contains(&needle) {
            out = out.replace(&needle, &format!("attachments/{}/", new));
            changed = true;
        }
    }
    changed.then_some(out)
}

/// Plan label-assignment copies for remapped cases.
pub fn plan_label_items(
    items: &[labeled_item::Model],
    label_map: &HashMap<Uuid, Uuid>,
    case_map: &HashMap<Uuid, Uuid>,
    now: DateTime<Utc>,
) -> Vec<labeled_item::Model> {
    items
        .iter()
        .filter_map(|item| {
            let label_id = *label_map.get(&item.label_id)?;
            let item_id = *case_map.get(&item.item_id)?;
            Some(labeled_item::Model {
                id: Uuid::now_v7(),
                label_id,
                kind: item.kind.clone(),
                item_id,
                created_at: now,
                deleted_at: None,
            })
        })
        .collect()
}

/// Reuse-or-create decision for copied labels.
///
/// `resolved` holds, per source label id, an existing destination label
/// found by case-insensitive name+type lookup; the caller populates it
/// only when a destination project is in play. Unresolved labels are
/// created fresh, in `dst_project` when one was given, else alongside the
/// source label.
pub fn plan_label_copy(
    src_labels: &[label::Model],
    resolved: &HashMap<Uuid, Uuid>,
    dst_project: Option<Uuid>,
    now: DateTime<Utc>,
) -> (Vec<label::Model>, HashMap<Uuid, Uuid>) {
    let mut new_labels = Vec::new();
    let mut label_map = HashMap::new();
    for src in src_labels {
        match resolved.get(&src.id) {
            Some(existing) => {
                label_map.insert(src.id, *existing);
            }
            None => {
                let id = Uuid::now_v7();
                label_map.insert(src.id, id);
                new_labels.push(label::Model {
                    id,
                    project_id: dst_project.unwrap_or(src.project_id),
                    name: src.name.clone(),
                    label_type: src.label_type,
                    created_at: now,
                    updated_at: now,
                    deleted_at: None,
                });
            }
        }
    }
    (new_labels, label_map)
}

fn rewrite_case_texts(cases: &mut [test_case::Model], attachment_map: &HashMap<Uuid, Uuid>) {
    for case in cases {
        for text in [
            &mut case.setup,
            &mut case.scenario,
            &mut case.expected,
            &mut case.teardown,
            &mut case.description,
        ] {
            if let Some(updated) = rewrite_attachment_refs(text, attachment_map) {
                *text = updated;
            }
        }
    }
}

fn rewrite_step_texts(steps: &mut [test_case_step::Model], attachment_map: &HashMap<Uuid, Uuid>) {
    for step in steps {
        for text in [&mut step.scenario, &mut step.expected] {
            if let Some(updated) = rewrite_attachment_refs(text, attachment_map) {
                *text = updated;
            }
        }
    }
}

fn entries(map: &HashMap<Uuid, Uuid>) -> Vec<CopiedEntry> {
    let mut out: Vec<CopiedEntry> = map
        .iter()
        .map(|(src, new)| CopiedEntry {
            src_id: *src,
            new_id: *new,
        })
        .collect();
    out.sort_by_key(|e| e.src_id);
    out
}

/// Copy the label assignments of the source cases onto their copies.
///
/// Reuse by case-insensitive name+type happens only within
/// `reuse_project`; without one every label is created fresh.
async fn copy_case_labels(
    txn: &DatabaseTransaction,
    src_case_ids: &[Uuid],
    case_map: &HashMap<Uuid, Uuid>,
    reuse_project: Option<Uuid>,
    now: DateTime<Utc>,
) -> AppResult<()> {
    let src_items = db::labels::items_for_cases(txn, src_case_ids).await?;
    let label_ids: Vec<Uuid> = {
        let set: BTreeSet<Uuid> = src_items.iter().map(|i| i.label_id).collect();
        set.into_iter().collect()
    };
    let src_labels = db::labels::get_labels(txn, &label_ids).await?;

    let mut resolved = HashMap::new();
    if let Some(project_id) = reuse_project {
        for src in &src_labels {
            if let Some(existing) =
                db::labels::find_by_name_type(txn, project_id, &src.name, src.label_type).await?
            {
                resolved.insert(src.id, existing.id);
            }
        }
    }

    let (new_labels, label_map) = plan_label_copy(&src_labels, &resolved, reuse_project, now);
    let new_items = plan_label_items(&src_items, &label_map, case_map, now);

    db::labels::bulk_insert_labels(txn, new_labels).await?;
    db::labels::bulk_insert_items(txn, new_items).await?;
    Ok(())
}

/// Copy whole suite subtrees with everything hanging off them.
pub async fn copy_suites(pool: &DbPool, payload: CopySuitesRequest) -> AppResult<CopyResponse> {
    if payload.suites.is_empty() {
        return Err(AppError::validation(
            "suites",
            "at least one suite is required",
        ));
    }

    let txn = pool
        .connection()
        .begin()
        .await
        .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

    let dst = match payload.dst_suite_id {
        Some(id) => Some(db::suites::require_suite(&txn, id).await?),
        None => None,
    };
    if let Some(project_id) = payload.dst_project_id {
        db::projects::require_project(&txn, project_id).await?;
        if let Some(d) = &dst {
            if d.project_id != project_id {
                return Err(AppError::validation(
                    "dst_suite_id",
                    "destination suite does not belong to the destination project",
                ));
            }
        }
    }

    let mut overrides = HashMap::new();
    let mut subtrees = Vec::with_capacity(payload.suites.len());
    for spec in &payload.suites {
        let root = db::suites::require_suite(&txn, spec.id).await?;
        if let Some(d) = &dst {
            if d.project_id != root.project_id && payload.dst_project_id.is_none() {
                return Err(AppError::validation(
                    "dst_project_id",
                    "copying into another project requires an explicit destination project",
                ));
            }
            if d.tree_id == root.tree_id && d.lft >= root.lft && d.rght <= root.rght {
                return Err(AppError::TreeCycle);
            }
        }
        if let Some(name) = &spec.new_name {
            overrides.insert(root.id, name.clone());
        }
        subtrees.push(db::suites::descendants(&txn, &root, true).await?);
    }

    if let Some(d) = &dst {
        tree_store::lock_tree(&txn, SuiteTree::LOCK_SPACE, d.tree_id).await?;
    }

    let now = Utc::now();
    let plan = plan_suite_copies(
        &subtrees,
        &overrides,
        dst.as_ref(),
        payload.dst_project_id,
        now,
    );

    let src_suite_ids: Vec<Uuid> = plan.id_map.keys().copied().collect();
    let src_cases = db::cases::list_by_suites(&txn, &src_suite_ids).await?;
    let (mut new_cases, case_map) =
        plan_case_copies(&src_cases, &plan.id_map, &HashMap::new(), payload.dst_project_id, now);

    let src_case_ids: Vec<Uuid> = case_map.keys().copied().collect();
    let src_steps = db::cases::steps_by_cases(&txn, &src_case_ids).await?;
    let (mut new_steps, step_map) =
        plan_step_copies(&src_steps, &case_map, payload.dst_project_id, now);

    let src_step_ids: Vec<Uuid> = step_map.keys().copied().collect();
    let mut src_attachments =
        db::attachments::list_for_items(&txn, RefKind::Case, &src_case_ids).await?;
    src_attachments
        .extend(db::attachments::list_for_items(&txn, RefKind::Step, &src_step_ids).await?);

    let mut item_map = case_map.clone();
    item_map.extend(step_map.iter().map(|(k, v)| (*k, *v)));
    let (new_attachments, attachment_map) =
        plan_attachment_copies(&src_attachments, &item_map, payload.dst_project_id, now);

    rewrite_case_texts(&mut new_cases, &attachment_map);
    rewrite_step_texts(&mut new_steps, &attachment_map);

    db::suites::bulk_insert_suites(&txn, plan.rows).await?;
    db::cases::bulk_insert_cases(&txn, new_cases.clone()).await?;
    db::cases::bulk_insert_steps(&txn, new_steps).await?;
    db::attachments::bulk_insert(&txn, new_attachments).await?;

    // Labels last: reuse across projects only with an explicit destination.
    copy_case_labels(&txn, &src_case_ids, &case_map, payload.dst_project_id, now).await?;

    for case in &new_cases {
        db::versions::snapshot(&txn, case).await?;
    }

    for tree_id in &plan.trees {
        tree_store::partial_rebuild::<SuiteTree>(&txn, *tree_id).await?;
    }

    txn.commit()
        .await
        .map_err(|e| AppError::Database(format!("Failed to commit suite copy: {}", e)))?;

    info!(
        suites = plan.id_map.len(),
        cases = case_map.len(),
        "copied suite subtrees"
    );

    Ok(CopyResponse {
        suites: entries(&plan.id_map),
        cases: entries(&case_map),
    })
}

/// Copy individual cases into one destination suite. Steps, attachments
/// and label assignments travel with their case; the destination suite
/// pins the project, so labels reuse matches there by name and type.
pub async fn copy_cases(pool: &DbPool, payload: CopyCasesRequest) -> AppResult<CopyResponse> {
    if payload.cases.is_empty() {
        return Err(AppError::validation(
            "cases",
            "at least one case is required",
        ));
    }

    let txn = pool
        .connection()
        .begin()
        .await
        .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

    let dst = db::suites::require_suite(&txn, payload.dst_suite_id).await?;

    let ids: Vec<Uuid> = payload.cases.iter().map(|c| c.id).collect();
    let src_cases = db::cases::get_cases(&txn, &ids).await?;
    let unique: BTreeSet<Uuid> = ids.iter().copied().collect();
    if src_cases.len() != unique.len() {
        return Err(AppError::NotFound("Test case".to_string()));
    }

    let overrides: HashMap<Uuid, String> = payload
        .cases
        .iter()
        .filter_map(|c| c.new_name.clone().map(|n| (c.id, n)))
        .collect();
    let suite_map: HashMap<Uuid, Uuid> =
        src_cases.iter().map(|c| (c.suite_id, dst.id)).collect();

    let now = Utc::now();
    let (mut new_cases, case_map) =
        plan_case_copies(&src_cases, &suite_map, &overrides, Some(dst.project_id), now);

    let src_case_ids: Vec<Uuid> = case_map.keys().copied().collect();
    let src_steps = db::cases::steps_by_cases(&txn, &src_case_ids).await?;
    let (mut new_steps, step_map) =
        plan_step_copies(&src_steps, &case_map, Some(dst.project_id), now);

    let src_step_ids: Vec<Uuid> = step_map.keys().copied().collect();
    let mut src_attachments =
        db::attachments::list_for_items(&txn, RefKind::Case, &src_case_ids).await?;
    src_attachments
        .extend(db::attachments::list_for_items(&txn, RefKind::Step, &src_step_ids).await?);

    let mut item_map = case_map.clone();
    item_map.extend(step_map.iter().map(|(k, v)| (*k, *v)));
    let (new_attachments, attachment_map) =
        plan_attachment_copies(&src_attachments, &item_map, Some(dst.project_id), now);

    rewrite_case_texts(&mut new_cases, &attachment_map);
    rewrite_step_texts(&mut new_steps, &attachment_map);

    db::cases::bulk_insert_cases(&txn, new_cases.clone()).await?;
    db::cases::bulk_insert_steps(&txn, new_steps).await?;
    db::attachments::bulk_insert(&txn, new_attachments).await?;
    copy_case_labels(&txn, &src_case_ids, &case_map, Some(dst.project_id), now).await?;

    for case in &new_cases {
        db::versions::snapshot(&txn, case).await?;
    }

    txn.commit()
        .await
        .map_err(|e| AppError::Database(format!("Failed to commit case copy: {}", e)))?;

    info!(cases = case_map.len(), "copied cases");

    Ok(CopyResponse {
        suites: Vec::new(),
        cases: entries(&case_map),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suite(
        project: Uuid,
        parent: Option<Uuid>,
        tree: Uuid,
        lft: i32,
        rght: i32,
        level: i32,
        name: &str,
    ) -> test_suite::Model {
        let now = Utc::now();
        test_suite::Model {
            id: Uuid::now_v7(),
            project_id: project,
            parent_id: parent,
            tree_id: tree,
            lft,
            rght,
            level,
            name: name.to_string(),
            description: String::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn case(project: Uuid, suite_id: Uuid, name: &str, scenario: &str) -> test_case::Model {
        let now = Utc::now();
        test_case::Model {
            id: Uuid::now_v7(),
            project_id: project,
            suite_id,
            name: name.to_string(),
            setup: String::new(),
            scenario: scenario.to_string(),
            expected: String::new(),
            teardown: String::new(),
            description: String::new(),
            estimate: None,
            is_steps: false,
            current_version: 5,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_plan_suite_copies_remaps_parents_and_trees() {
        let project = Uuid::now_v7();
        let tree = Uuid::now_v7();
        let root = suite(project, None, tree, 1, 6, 0, "root");
        let mut child = suite(project, Some(root.id), tree, 2, 5, 1, "child");
        child.parent_id = Some(root.id);
        let mut leaf = suite(project, Some(child.id), tree, 3, 4, 2, "leaf");
        leaf.parent_id = Some(child.id);

        let subtree = vec![root.clone(), child.clone(), leaf.clone()];
        let plan =
            plan_suite_copies(&[subtree], &HashMap::new(), None, None, Utc::now());

        assert_eq!(plan.rows.len(), 3);
        let new_root = &plan.rows[0];
        let new_child = &plan.rows[1];
        let new_leaf = &plan.rows[2];

        // Fresh ids, detached root, own tree keyed by the copy's id.
        assert_ne!(new_root.id, root.id);
        assert_eq!(new_root.parent_id, None);
        assert_eq!(new_root.tree_id, new_root.id);
        assert_eq!(new_root.level, 0);

        assert_eq!(new_child.parent_id, Some(new_root.id));
        assert_eq!(new_leaf.parent_id, Some(new_child.id));
        assert_eq!(new_leaf.level, 2);
        assert!(plan.trees.contains(&new_root.tree_id));
        assert_eq!(plan.id_map[&leaf.id], new_leaf.id);
    }

    #[test]
    fn test_plan_suite_copies_into_destination() {
        let project = Uuid::now_v7();
        let dst_tree = Uuid::now_v7();
        let dst = suite(project, None, dst_tree, 1, 2, 3, "target");
        let src = suite(project, None, Uuid::now_v7(), 1, 2, 0, "source");

        let plan = plan_suite_copies(
            &[vec![src.clone()]],
            &HashMap::new(),
            Some(&dst),
            None,
            Utc::now(),
        );

        let copied = &plan.rows[0];
        assert_eq!(copied.parent_id, Some(dst.id));
        assert_eq!(copied.tree_id, dst_tree);
        assert_eq!(copied.level, 4);
        assert_eq!(plan.trees.len(), 1);
    }

    #[test]
    fn test_plan_suite_copies_renames_roots_only() {
        let project = Uuid::now_v7();
        let tree = Uuid::now_v7();
        let root = suite(project, None, tree, 1, 4, 0, "old name");
        let mut child = suite(project, Some(root.id), tree, 2, 3, 1, "kept");
        child.parent_id = Some(root.id);

        let mut overrides = HashMap::new();
        overrides.insert(root.id, "new name".to_string());
        // A stray override for a non-root id must not apply.
        overrides.insert(child.id, "must not apply".to_string());

        let plan = plan_suite_copies(
            &[vec![root, child]],
            &overrides,
            None,
            None,
            Utc::now(),
        );
        assert_eq!(plan.rows[0].name, "new name");
        assert_eq!(plan.rows[1].name, "kept");
    }

    #[test]
    fn test_plan_case_copies_resets_version_and_remaps_suite() {
        let project = Uuid::now_v7();
        let old_suite = Uuid::now_v7();
        let new_suite = Uuid::now_v7();
        let src = case(project, old_suite, "login", "steps");

        let mut suite_map = HashMap::new();
        suite_map.insert(old_suite, new_suite);

        let (rows, map) =
            plan_case_copies(&[src.clone()], &suite_map, &HashMap::new(), None, Utc::now());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].suite_id, new_suite);
        assert_eq!(rows[0].current_version, 1);
        assert_eq!(map[&src.id], rows[0].id);
    }

    #[test]
    fn test_plan_case_copies_skips_unmapped_suites() {
        let src = case(Uuid::now_v7(), Uuid::now_v7(), "orphan", "");
        let (rows, map) =
            plan_case_copies(&[src], &HashMap::new(), &HashMap::new(), None, Utc::now());
        assert!(rows.is_empty());
        assert!(map.is_empty());
    }

    #[test]
    fn test_rewrite_attachment_refs_substitutes_mapped_ids() {
        let old = Uuid::now_v7();
        let new = Uuid::now_v7();
        let mut map = HashMap::new();
        map.insert(old, new);

        let text = format!("see ![img](attachments/{}/shot.png) twice attachments/{}/x", old, old);
        let rewritten = rewrite_attachment_refs(&text, &map).unwrap();
        assert!(rewritten.contains(&format!("attachments/{}/shot.png", new)));
        assert!(!rewritten.contains(&old.to_string()));
    }

    #[test]
    fn test_rewrite_attachment_refs_leaves_foreign_ids() {
        let mut map = HashMap::new();
        map.insert(Uuid::now_v7(), Uuid::now_v7());

        let foreign = Uuid::now_v7();
        let text = format!("attachments/{}/keep.png", foreign);
        assert!(rewrite_attachment_refs(&text, &map).is_none());
    }

    #[test]
    fn test_plan_label_items_follows_both_maps() {
        let now = Utc::now();
        let src_label = Uuid::now_v7();
        let new_label = Uuid::now_v7();
        let src_case = Uuid::now_v7();
        let new_case = Uuid::now_v7();

        let item = labeled_item::Model {
            id: Uuid::now_v7(),
            label_id: src_label,
            kind: "case".to_string(),
            item_id: src_case,
            created_at: now,
            deleted_at: None,
        };

        let mut label_map = HashMap::new();
        label_map.insert(src_label, new_label);
        let mut case_map = HashMap::new();
        case_map.insert(src_case, new_case);

        let planned = plan_label_items(&[item], &label_map, &case_map, now);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].label_id, new_label);
        assert_eq!(planned[0].item_id, new_case);
    }

    fn label_row(project: Uuid, name: &str, label_type: i32) -> label::Model {
        let now = Utc::now();
        label::Model {
            id: Uuid::now_v7(),
            project_id: project,
            name: name.to_string(),
            label_type,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_plan_label_copy_reuses_resolved_labels() {
        let src_project = Uuid::now_v7();
        let dst_project = Uuid::now_v7();
        let src = label_row(src_project, "smoke", 0);
        let existing = Uuid::now_v7();

        let mut resolved = HashMap::new();
        resolved.insert(src.id, existing);

        let (created, map) =
            plan_label_copy(&[src.clone()], &resolved, Some(dst_project), Utc::now());
        assert!(created.is_empty());
        assert_eq!(map[&src.id], existing);
    }

    #[test]
    fn test_plan_label_copy_creates_in_destination_when_unresolved() {
        let src_project = Uuid::now_v7();
        let dst_project = Uuid::now_v7();
        let src = label_row(src_project, "smoke", 0);

        let (created, map) =
            plan_label_copy(&[src.clone()], &HashMap::new(), Some(dst_project), Utc::now());
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].project_id, dst_project);
        assert_eq!(created[0].name, "smoke");
        assert_eq!(map[&src.id], created[0].id);
    }

    #[test]
    fn test_plan_label_copy_without_destination_never_reuses() {
        // No destination project: the caller resolves nothing, so every
        // label is recreated next to its source.
        let src_project = Uuid::now_v7();
        let src = label_row(src_project, "regression", 1);

        let (created, map) =
            plan_label_copy(&[src.clone()], &HashMap::new(), None, Utc::now());
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].project_id, src_project);
        assert_ne!(created[0].id, src.id);
        assert_eq!(map[&src.id], created[0].id);
    }

    #[test]
    fn test_case_copy_label_planning_carries_assignments() {
        // Individual-case copy: destination suite pins the project, labels
        // resolve there and the join rows follow the copied case ids.
        let now = Utc::now();
        let dst_project = Uuid::now_v7();
        let src_case = Uuid::now_v7();
        let new_case = Uuid::now_v7();
        let src = label_row(Uuid::now_v7(), "flaky", 0);

        let item = labeled_item::Model {
            id: Uuid::now_v7(),
            label_id: src.id,
            kind: "case".to_string(),
            item_id: src_case,
            created_at: now,
            deleted_at: None,
        };
        let mut case_map = HashMap::new();
        case_map.insert(src_case, new_case);

        let (created, label_map) =
            plan_label_copy(&[src], &HashMap::new(), Some(dst_project), now);
        let planned = plan_label_items(&[item], &label_map, &case_map, now);

        assert_eq!(created.len(), 1);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].item_id, new_case);
        assert_eq!(planned[0].label_id, created[0].id);
    }
}
