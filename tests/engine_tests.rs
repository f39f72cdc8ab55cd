//! Engine-level tests across the pure planners: combination generation
//! feeding plan naming, tree planning for copied subtrees, and the
//! encoding invariants the tree store relies on.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use tms_lib::entity::{parameter, test_suite};
use tms_lib::services::combinations;
use tms_lib::services::copy::{plan_suite_copies, rewrite_attachment_refs};
use tms_lib::services::materializer::{combination_name, reconcile};
use tms_lib::tree::{assign_bounds, validate_encoding, TreeRow};

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

fn suite(
    parent: Option<&test_suite::Model>,
    tree: Uuid,
    lft: i32,
    rght: i32,
    level: i32,
    name: &str,
) -> test_suite::Model {
    let now = Utc::now();
    test_suite::Model {
        id: Uuid::now_v7(),
        project_id: Uuid::now_v7(),
        parent_id: parent.map(|p| p.id),
        tree_id: tree,
        lft,
        rght,
        level,
        name: name.to_string(),
        created_at: now,
        updated_at: now,
        deleted_at: None,
        description: String::new(),
    }
}

/// Generated plan names must cover exactly the cross product, each name
/// carrying one value per group.
#[test]
fn test_combinations_drive_unique_plan_names() {
    let params = vec![
        param("browser", "firefox"),
        param("browser", "chrome"),
        param("os", "linux"),
        param("os", "macos"),
        param("os", "windows"),
    ];

    let combos = combinations::combine(&params);
    assert_eq!(combos.len(), 6);
    assert_eq!(combinations::combination_count(&params), 6);

    let names: Vec<String> = combos
        .iter()
        .map(|c| combination_name("Release 2.1", c))
        .collect();
    let mut unique = names.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 6);
    assert!(names.iter().all(|n| n.starts_with("Release 2.1 [")));
}

/// Reconciling to the same set twice must be a no-op the second time.
#[test]
fn test_reconciliation_is_idempotent() {
    let a = Uuid::now_v7();
    let b = Uuid::now_v7();
    let c = Uuid::now_v7();

    let first = reconcile(&[a, b], &[b, c]);
    assert_eq!(first.to_add, vec![c]);
    assert_eq!(first.to_remove, vec![a]);

    // After applying the first diff the pairings are [b, c].
    let second = reconcile(&[b, c], &[b, c]);
    assert!(second.is_noop());
}

/// A planned subtree copy, once run through bounds assignment, must yield
/// a valid encoding with the same shape as the source.
#[test]
fn test_copied_subtree_produces_valid_encoding() {
    let tree = Uuid::now_v7();
    let root = suite(None, tree, 1, 8, 0, "root");
    let child_a = suite(Some(&root), tree, 2, 5, 1, "a");
    let leaf = suite(Some(&child_a), tree, 3, 4, 2, "leaf");
    let child_b = suite(Some(&root), tree, 6, 7, 1, "b");

    let plan = plan_suite_copies(
        &[vec![root, child_a, leaf, child_b]],
        &HashMap::new(),
        None,
        None,
        Utc::now(),
    );

    let rows: Vec<TreeRow> = plan
        .rows
        .iter()
        .map(|s| TreeRow {
            id: s.id,
            parent_id: s.parent_id,
            tree_id: s.tree_id,
            lft: s.lft,
            rght: s.rght,
            level: s.level,
        })
        .collect();

    let updates = assign_bounds(&rows).expect("copied subtree must be consistent");
    assert_eq!(updates.len(), 4);

    let encoded: Vec<TreeRow> = rows
        .iter()
        .map(|r| {
            let u = updates.iter().find(|u| u.id == r.id).unwrap();
            TreeRow {
                lft: u.lft,
                rght: u.rght,
                level: u.level,
                ..r.clone()
            }
        })
        .collect();
    assert!(validate_encoding(&encoded).is_ok());

    // Same shape: one root spanning all four nodes.
    let root_row = encoded.iter().find(|r| r.parent_id.is_none()).unwrap();
    assert_eq!(root_row.lft, 1);
    assert_eq!(root_row.rght, 8);
}

/// Attachment references must only rewrite ids the copy actually mapped.
#[test]
fn test_attachment_rewrite_respects_mapping_boundaries() {
    let mapped_old = Uuid::now_v7();
    let mapped_new = Uuid::now_v7();
    let unmapped = Uuid::now_v7();

    let mut map = HashMap::new();
    map.insert(mapped_old, mapped_new);

    let text = format!(
        "![a](attachments/{}/a.png) ![b](attachments/{}/b.png)",
        mapped_old, unmapped
    );
    let rewritten = rewrite_attachment_refs(&text, &map).expect("one reference must match");
    assert!(rewritten.contains(&format!("attachments/{}/a.png", mapped_new)));
    assert!(rewritten.contains(&format!("attachments/{}/b.png", unmapped)));
}
