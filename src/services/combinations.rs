//! Parameter combination engine.
//!
//! Groups parameters by `group_name` and computes the Cartesian product
//! across groups: every combination picks exactly one parameter from each
//! distinct group. Pure function; no side effects.

use crate::entity::parameter;

/// Compute all combinations picking one parameter per group.
///
/// Groups are ordered by first encounter in the input, parameters keep
/// their per-group input order, so the output order is deterministic for a
/// deterministic input. Zero groups yield a single empty combination
/// (meaning "no parameterization"); G groups of sizes n_1..n_G yield
/// ∏ n_i combinations of size G.
pub fn combine(params: &[parameter::Model]) -> Vec<Vec<parameter::Model>> {
    // Group in encounter order.
    let mut groups: Vec<(&str, Vec<&parameter::Model>)> = Vec::new();
    for param in params {
        match groups.iter_mut().find(|(name, _)| *name == param.group_name) {
            Some((_, members)) => members.push(param),
            None => groups.push((param.group_name.as_str(), vec![param])),
        }
    }

    let mut combos: Vec<Vec<parameter::Model>> = vec![Vec::new()];
    for (_, members) in &groups {
        let mut next = Vec::with_capacity(combos.len() * members.len());
        for combo in &combos {
            for member in members {
                let mut extended = combo.clone();
                extended.push((*member).clone());
                next.push(extended);
            }
        }
        combos = next;
    }
    combos
}

/// Number of combinations `combine` would produce, without materializing
/// them. Used to cap combinatorial explosion before bulk creation.
pub fn combination_count(params: &[parameter::Model]) -> usize {
    let mut groups: Vec<(&str, usize)> = Vec::new();
    for param in params {
        match groups.iter_mut().find(|(name, _)| *name == param.group_name) {
            Some((_, n)) => *n += 1,
            None => groups.push((param.group_name.as_str(), 1)),
        }
    }
    groups.iter().map(|(_, n)| n).product()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn param(id: u128, group: &str, data: &str) -> parameter::Model {
        parameter::Model {
            id: Uuid::from_u128(id),
            project_id: Uuid::from_u128(1),
            group_name: group.to_string(),
            data: data.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_no_parameters_yields_one_empty_combination() {
        let combos = combine(&[]);
        assert_eq!(combos.len(), 1);
        assert!(combos[0].is_empty());
    }

    #[test]
    fn test_single_group_yields_singletons() {
        let params = vec![
            param(1, "os", "linux"),
            param(2, "os", "macos"),
            param(3, "os", "windows"),
        ];
        let combos = combine(&params);
        assert_eq!(combos.len(), 3);
        for (i, combo) in combos.iter().enumerate() {
            assert_eq!(combo.len(), 1);
            assert_eq!(combo[0].id, Uuid::from_u128(i as u128 + 1));
        }
    }

    #[test]
    fn test_two_groups_cross_product() {
        // 3 browsers x 2 operating systems -> 6 combinations of size 2.
        let params = vec![
            param(1, "browser", "firefox"),
            param(2, "browser", "chrome"),
            param(3, "browser", "safari"),
            param(4, "os", "linux"),
            param(5, "os", "macos"),
        ];
        let combos = combine(&params);
        assert_eq!(combos.len(), 6);
        for combo in &combos {
            assert_eq!(combo.len(), 2);
            assert_eq!(combo[0].group_name, "browser");
            assert_eq!(combo[1].group_name, "os");
        }
        // No two combinations share an identical parameter set.
        let mut seen: Vec<Vec<Uuid>> = combos
            .iter()
            .map(|c| c.iter().map(|p| p.id).collect())
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_three_groups_of_four() {
        let mut params = Vec::new();
        let mut id = 1u128;
        for group in ["a", "b", "c"] {
            for i in 0..4 {
                params.push(param(id, group, &format!("{group}{i}")));
                id += 1;
            }
        }
        assert_eq!(combine(&params).len(), 64);
        assert_eq!(combination_count(&params), 64);
    }

    #[test]
    fn test_order_is_group_encounter_then_member_order() {
        let params = vec![
            param(1, "g1", "a"),
            param(2, "g2", "x"),
            param(3, "g1", "b"),
        ];
        let combos = combine(&params);
        let ids: Vec<Vec<Uuid>> = combos
            .iter()
            .map(|c| c.iter().map(|p| p.id).collect())
            .collect();
        assert_eq!(
            ids,
            vec![
                vec![Uuid::from_u128(1), Uuid::from_u128(2)],
                vec![Uuid::from_u128(3), Uuid::from_u128(2)],
            ]
        );
    }

    #[test]
    fn test_combination_count_matches_combine() {
        let params = vec![
            param(1, "a", "1"),
            param(2, "a", "2"),
            param(3, "b", "1"),
        ];
        assert_eq!(combination_count(&params), combine(&params).len());
        assert_eq!(combination_count(&[]), 1);
    }
}
