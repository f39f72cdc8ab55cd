//! Pure nested-set tree algorithms.
//!
//! The interval encoding used by suites and plans is computed here as a
//! pure function over the parent/child adjacency, independent of storage.
//! The db layer loads rows for one tree, calls into this module, and
//! persists whatever changed.

use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

/// One node of a tree as loaded from storage.
///
/// `lft`/`rght` form the nested-set interval: a node's interval strictly
/// contains every descendant's interval and is disjoint from every
/// non-descendant's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub tree_id: Uuid,
    pub lft: i32,
    pub rght: i32,
    pub level: i32,
}

/// New bounds for one node, produced by a rebuild pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundsUpdate {
    pub id: Uuid,
    pub lft: i32,
    pub rght: i32,
    pub level: i32,
}

/// Structural problems detected in a stored encoding or adjacency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsistencyIssue {
    #[error("node {0} references a parent that is not part of the tree")]
    OrphanNode(Uuid),
    #[error("adjacency contains a cycle involving node {0}")]
    AdjacencyCycle(Uuid),
    #[error("node {0} has an inverted or empty interval")]
    InvertedInterval(Uuid),
    #[error("node {0} overlaps a sibling or escapes its parent interval")]
    OverlappingIntervals(Uuid),
    #[error("node {0} has depth level {1} but its parent chain implies {2}")]
    WrongLevel(Uuid, i32, i32),
    #[error("node {0} interval width implies {1} descendants but {2} exist")]
    DescendantCountMismatch(Uuid, i32, i32),
}

/// Recompute `lft`/`rght`/`level` for every row from the adjacency alone.
///
/// Intervals are assigned by depth-first pre-order traversal: left bound on
/// entry, right bound on exit, numbering from 1 and continuous across the
/// tree. Children are visited in (stored lft, id) order so repeated calls
/// are idempotent and sibling order survives a rebuild. Fails when the
/// adjacency itself is broken (orphaned parent reference or a parent cycle).
pub fn assign_bounds(rows: &[TreeRow]) -> Result<Vec<BoundsUpdate>, ConsistencyIssue> {
    let by_id: HashMap<Uuid, &TreeRow> = rows.iter().map(|r| (r.id, r)).collect();

    let mut children: HashMap<Option<Uuid>, Vec<&TreeRow>> = HashMap::new();
    for row in rows {
        if let Some(pid) = row.parent_id
            && !by_id.contains_key(&pid)
        {
            return Err(ConsistencyIssue::OrphanNode(row.id));
        }
        children.entry(row.parent_id).or_default().push(row);
    }
    for siblings in children.values_mut() {
        // Placeholder bounds (0) mean "freshly inserted": append after
        // existing siblings instead of reshuffling them.
        siblings.sort_by_key(|r| (if r.lft <= 0 { i32::MAX } else { r.lft }, r.id));
    }

    let roots = children.remove(&None).unwrap_or_default();

    let mut updates = Vec::with_capacity(rows.len());
    let mut visited: HashSet<Uuid> = HashSet::new();
    let mut counter: i32 = 0;

    // Iterative DFS; each stack frame is (node, level, entry lft slot index).
    for root in roots {
        let mut stack: Vec<(&TreeRow, i32, usize)> = vec![(root, 0, usize::MAX)];
        while let Some((node, level, update_idx)) = stack.pop() {
            if update_idx == usize::MAX {
                // Entry: assign the left bound, revisit for the right bound.
                if !visited.insert(node.id) {
                    return Err(ConsistencyIssue::AdjacencyCycle(node.id));
                }
                counter += 1;
                updates.push(BoundsUpdate {
                    id: node.id,
                    lft: counter,
                    rght: 0,
                    level,
                });
                let idx = updates.len() - 1;
                stack.push((node, level, idx));
                if let Some(kids) = children.get(&Some(node.id)) {
                    for kid in kids.iter().rev() {
                        stack.push((kid, level + 1, usize::MAX));
                    }
                }
            } else {
                counter += 1;
                updates[update_idx].rght = counter;
            }
        }
    }

    if visited.len() != rows.len() {
        // Unvisited nodes can only mean a parent cycle detached from roots.
        let stranded = rows
            .iter()
            .find(|r| !visited.contains(&r.id))
            .map(|r| r.id)
            .unwrap_or_default();
        return Err(ConsistencyIssue::AdjacencyCycle(stranded));
    }

    Ok(updates)
}

/// Check that the stored encoding is a valid nested set for its adjacency.
///
/// Verifies interval orientation, strict nesting inside the parent,
/// sibling disjointness, depth levels, and the descendant-count identity
/// `(rght - lft - 1) / 2 == descendants`.
pub fn validate_encoding(rows: &[TreeRow]) -> Result<(), ConsistencyIssue> {
    let by_id: HashMap<Uuid, &TreeRow> = rows.iter().map(|r| (r.id, r)).collect();

    for row in rows {
        if row.lft >= row.rght {
            return Err(ConsistencyIssue::InvertedInterval(row.id));
        }
        let expected_level = chain_depth(row, &by_id)?;
        if row.level != expected_level {
            return Err(ConsistencyIssue::WrongLevel(row.id, row.level, expected_level));
        }
        if let Some(pid) = row.parent_id {
            let parent = by_id[&pid];
            if row.lft <= parent.lft || row.rght >= parent.rght {
                return Err(ConsistencyIssue::OverlappingIntervals(row.id));
            }
        }
    }

    // Sweep by left bound with a stack of open right bounds: any interval
    // that starts inside an open interval must also end inside it.
    let mut ordered: Vec<&TreeRow> = rows.iter().collect();
    ordered.sort_by_key(|r| r.lft);
    let mut open: Vec<(Uuid, i32)> = Vec::new();
    for row in &ordered {
        while let Some(&(_, top)) = open.last() {
            if top < row.lft {
                open.pop();
            } else {
                break;
            }
        }
        if let Some(&(_, top)) = open.last()
            && row.rght > top
        {
            return Err(ConsistencyIssue::OverlappingIntervals(row.id));
        }
        open.push((row.id, row.rght));
    }

    // Descendant-count identity.
    for row in rows {
        let width_count = (row.rght - row.lft - 1) / 2;
        let actual = rows
            .iter()
            .filter(|r| r.id != row.id && r.lft > row.lft && r.rght < row.rght)
            .count() as i32;
        if width_count != actual {
            return Err(ConsistencyIssue::DescendantCountMismatch(
                row.id,
                width_count,
                actual,
            ));
        }
    }

    Ok(())
}

fn chain_depth(
    row: &TreeRow,
    by_id: &HashMap<Uuid, &TreeRow>,
) -> Result<i32, ConsistencyIssue> {
    let mut depth = 0;
    let mut current = row;
    let mut seen: HashSet<Uuid> = HashSet::new();
    while let Some(pid) = current.parent_id {
        if !seen.insert(current.id) {
            return Err(ConsistencyIssue::AdjacencyCycle(current.id));
        }
        current = by_id
            .get(&pid)
            .ok_or(ConsistencyIssue::OrphanNode(current.id))?;
        depth += 1;
    }
    Ok(depth)
}

/// True when `candidate` sits strictly inside `of`'s interval in the same tree.
pub fn is_descendant(candidate: &TreeRow, of: &TreeRow) -> bool {
    candidate.tree_id == of.tree_id && candidate.lft > of.lft && candidate.rght < of.rght
}

/// Would reparenting `node_id` under `new_parent_id` create a cycle?
///
/// Walks the parent chain from the prospective parent; reaching `node_id`
/// (or the parent being the node itself) means the move is illegal.
pub fn would_cycle(node_id: Uuid, new_parent_id: Uuid, rows: &[TreeRow]) -> bool {
    if node_id == new_parent_id {
        return true;
    }
    let by_id: HashMap<Uuid, &TreeRow> = rows.iter().map(|r| (r.id, r)).collect();
    let mut current = new_parent_id;
    let mut hops = 0;
    while let Some(row) = by_id.get(&current) {
        if row.id == node_id {
            return true;
        }
        match row.parent_id {
            Some(pid) => current = pid,
            None => return false,
        }
        hops += 1;
        if hops > rows.len() {
            // Broken parent chain; treat as a cycle so the move is refused.
            return true;
        }
    }
    false
}

/// Keep only the updates that change a stored row.
///
/// The partial-rebuild path persists this minimal set instead of rewriting
/// the whole tree.
pub fn diff_bounds(rows: &[TreeRow], updates: Vec<BoundsUpdate>) -> Vec<BoundsUpdate> {
    let current: BTreeMap<Uuid, (i32, i32, i32)> = rows
        .iter()
        .map(|r| (r.id, (r.lft, r.rght, r.level)))
        .collect();
    updates
        .into_iter()
        .filter(|u| current.get(&u.id) != Some(&(u.lft, u.rght, u.level)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u128, parent: Option<u128>, lft: i32, rght: i32, level: i32) -> TreeRow {
        TreeRow {
            id: Uuid::from_u128(id),
            parent_id: parent.map(Uuid::from_u128),
            tree_id: Uuid::from_u128(0xFEED),
            lft,
            rght,
            level,
        }
    }

    fn apply(rows: &mut [TreeRow], updates: &[BoundsUpdate]) {
        for u in updates {
            let r = rows.iter_mut().find(|r| r.id == u.id).unwrap();
            r.lft = u.lft;
            r.rght = u.rght;
            r.level = u.level;
        }
    }

    #[test]
    fn test_assign_bounds_single_root() {
        let rows = vec![row(1, None, 0, 0, 0)];
        let updates = assign_bounds(&rows).unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!((updates[0].lft, updates[0].rght, updates[0].level), (1, 2, 0));
    }

    #[test]
    fn test_assign_bounds_nested_chain() {
        // 1 -> 2 -> 3
        let mut rows = vec![
            row(1, None, 0, 0, 0),
            row(2, Some(1), 0, 0, 0),
            row(3, Some(2), 0, 0, 0),
        ];
        let updates = assign_bounds(&rows).unwrap();
        apply(&mut rows, &updates);

        let get = |id: u128| rows.iter().find(|r| r.id == Uuid::from_u128(id)).unwrap();
        assert_eq!((get(1).lft, get(1).rght, get(1).level), (1, 6, 0));
        assert_eq!((get(2).lft, get(2).rght, get(2).level), (2, 5, 1));
        assert_eq!((get(3).lft, get(3).rght, get(3).level), (3, 4, 2));
        validate_encoding(&rows).unwrap();
    }

    #[test]
    fn test_siblings_are_disjoint_and_nested_in_parent() {
        let mut rows = vec![
            row(1, None, 0, 0, 0),
            row(2, Some(1), 0, 0, 0),
            row(3, Some(1), 0, 0, 0),
            row(4, Some(1), 0, 0, 0),
        ];
        let updates = assign_bounds(&rows).unwrap();
        apply(&mut rows, &updates);

        let parent = rows.iter().find(|r| r.parent_id.is_none()).unwrap().clone();
        let kids: Vec<_> = rows.iter().filter(|r| r.parent_id.is_some()).collect();
        for kid in &kids {
            assert!(kid.lft > parent.lft && kid.rght < parent.rght);
        }
        for a in &kids {
            for b in &kids {
                if a.id != b.id {
                    assert!(a.rght < b.lft || b.rght < a.lft, "siblings overlap");
                }
            }
        }
        // Descendant-count identity on the parent.
        assert_eq!((parent.rght - parent.lft - 1) / 2, 3);
        validate_encoding(&rows).unwrap();
    }

    #[test]
    fn test_assign_bounds_is_idempotent() {
        let mut rows = vec![
            row(1, None, 0, 0, 0),
            row(2, Some(1), 0, 0, 0),
            row(3, Some(2), 0, 0, 0),
            row(4, Some(1), 0, 0, 0),
        ];
        let first = assign_bounds(&rows).unwrap();
        apply(&mut rows, &first);
        let second = assign_bounds(&rows).unwrap();
        assert!(diff_bounds(&rows, second).is_empty());
    }

    #[test]
    fn test_assign_bounds_detects_orphan() {
        let rows = vec![row(1, None, 0, 0, 0), row(2, Some(99), 0, 0, 0)];
        assert_eq!(
            assign_bounds(&rows),
            Err(ConsistencyIssue::OrphanNode(Uuid::from_u128(2)))
        );
    }

    #[test]
    fn test_assign_bounds_detects_parent_cycle() {
        let rows = vec![row(1, Some(2), 0, 0, 0), row(2, Some(1), 0, 0, 0)];
        assert!(matches!(
            assign_bounds(&rows),
            Err(ConsistencyIssue::AdjacencyCycle(_))
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_interval() {
        let rows = vec![row(1, None, 5, 2, 0)];
        assert_eq!(
            validate_encoding(&rows),
            Err(ConsistencyIssue::InvertedInterval(Uuid::from_u128(1)))
        );
    }

    #[test]
    fn test_validate_rejects_overlapping_siblings() {
        let rows = vec![
            row(1, None, 1, 8, 0),
            row(2, Some(1), 2, 5, 1),
            row(3, Some(1), 4, 7, 1),
        ];
        assert!(validate_encoding(&rows).is_err());
    }

    #[test]
    fn test_validate_rejects_wrong_level() {
        let mut rows = vec![row(1, None, 0, 0, 0), row(2, Some(1), 0, 0, 0)];
        let updates = assign_bounds(&rows).unwrap();
        apply(&mut rows, &updates);
        rows[1].level = 5;
        assert!(matches!(
            validate_encoding(&rows),
            Err(ConsistencyIssue::WrongLevel(_, 5, 1))
        ));
    }

    #[test]
    fn test_validate_rejects_descendant_count_mismatch() {
        // Root claims width for two descendants but only one exists inside.
        let rows = vec![row(1, None, 1, 6, 0), row(2, Some(1), 2, 3, 1)];
        assert!(matches!(
            validate_encoding(&rows),
            Err(ConsistencyIssue::DescendantCountMismatch(_, 2, 1))
        ));
    }

    #[test]
    fn test_would_cycle() {
        let mut rows = vec![
            row(1, None, 0, 0, 0),
            row(2, Some(1), 0, 0, 0),
            row(3, Some(2), 0, 0, 0),
        ];
        let updates = assign_bounds(&rows).unwrap();
        apply(&mut rows, &updates);

        // Moving the root under its grandchild is a cycle.
        assert!(would_cycle(Uuid::from_u128(1), Uuid::from_u128(3), &rows));
        // A node is its own ancestor.
        assert!(would_cycle(Uuid::from_u128(2), Uuid::from_u128(2), &rows));
        // Moving a leaf under the root is fine.
        assert!(!would_cycle(Uuid::from_u128(3), Uuid::from_u128(1), &rows));
    }

    #[test]
    fn test_is_descendant_uses_interval_containment() {
        let mut rows = vec![
            row(1, None, 0, 0, 0),
            row(2, Some(1), 0, 0, 0),
            row(3, None, 0, 0, 0),
        ];
        // Node 3 is a second root in the same tree id; bounds are continuous.
        let updates = assign_bounds(&rows).unwrap();
        apply(&mut rows, &updates);

        let get = |id: u128| rows.iter().find(|r| r.id == Uuid::from_u128(id)).unwrap();
        assert!(is_descendant(get(2), get(1)));
        assert!(!is_descendant(get(3), get(1)));
        assert!(!is_descendant(get(1), get(2)));
    }

    #[test]
    fn test_diff_bounds_minimal_update_set() {
        let mut rows = vec![
            row(1, None, 0, 0, 0),
            row(2, Some(1), 0, 0, 0),
        ];
        let updates = assign_bounds(&rows).unwrap();
        apply(&mut rows, &updates);

        // Adding a sibling leaves node 2's bounds intact only where possible;
        // here the root widens and the new node gets bounds, node 2 keeps its.
        rows.push(row(3, Some(1), 0, 0, 0));
        let updates = assign_bounds(&rows).unwrap();
        let delta = diff_bounds(&rows, updates);
        let touched: Vec<Uuid> = delta.iter().map(|u| u.id).collect();
        assert!(touched.contains(&Uuid::from_u128(1)));
        assert!(touched.contains(&Uuid::from_u128(3)));
        assert!(!touched.contains(&Uuid::from_u128(2)));
    }
}
