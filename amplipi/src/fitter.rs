//! Covers a source's zones with whole groups so the control surface can show
//! one group slider instead of several zone sliders.
//!
//! Only groups whose every member is in the candidate zone set qualify. Each
//! round takes all groups tied for the highest coverage, removes their zones
//! and repeats on the remainder. Output order follows input order.

use std::collections::HashSet;

use crate::models::{Group, Zone, ZoneId};

/// Outcome of one selection round.
#[derive(Debug, Clone, PartialEq)]
pub struct BestGroups {
    /// Groups tied for the highest coverage, in input order. Empty when no group qualifies.
    /// Tied groups overlapping an earlier tied group are held back.
    pub best: Vec<Group>,
    /// Input zones not covered by any group in `best`.
    pub zones: Vec<Zone>,
    /// Input groups minus `best`.
    pub groups: Vec<Group>,
}

/// Coarsest whole-group covering of a zone set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Representation {
    /// Zones left over after every qualifying group was taken.
    pub zones: Vec<Zone>,
    /// Every group selected, in selection order.
    pub groups: Vec<Group>,
}

impl Representation {
    pub fn covered_zone_ids(&self) -> Vec<ZoneId> {
        self.groups
            .iter()
            .flat_map(|group| group.zones.iter().copied())
            .collect()
    }

    pub fn control_count(&self) -> usize {
        self.zones.len() + self.groups.len()
    }
}

/// True iff `group` has members and every one of them is in `zone_ids`.
pub fn is_whole_group_subset(group: &Group, zone_ids: &HashSet<ZoneId>) -> bool {
    !group.zones.is_empty() && group.zones.iter().all(|id| zone_ids.contains(id))
}

/// Number of `zones` that are members of `group`.
pub fn match_count(zones: &[Zone], group: &Group) -> usize {
    zones.iter().filter(|zone| group.contains(zone.id)).count()
}

pub fn select_best_groups(zones: &[Zone], groups: &[Group]) -> BestGroups {
    let zone_ids: HashSet<ZoneId> = zones.iter().map(|zone| zone.id).collect();

    let scored: Vec<(usize, usize)> = groups
        .iter()
        .enumerate()
        .filter(|(_, group)| is_whole_group_subset(group, &zone_ids))
        .map(|(index, group)| (index, match_count(zones, group)))
        .filter(|(_, score)| *score > 0)
        .collect();

    let top = scored.iter().map(|(_, score)| *score).max();
    let Some(top) = top else {
        return BestGroups {
            best: Vec::new(),
            zones: zones.to_vec(),
            groups: groups.to_vec(),
        };
    };

    let winners: HashSet<usize> = scored
        .iter()
        .filter(|(_, score)| *score == top)
        .map(|(index, _)| *index)
        .collect();

    // A tied group sharing a zone with an earlier tied group is left for later
    // rounds so no zone is covered twice.
    let mut covered: HashSet<ZoneId> = HashSet::new();
    let mut best = Vec::new();
    let mut rest = Vec::new();
    for (index, group) in groups.iter().enumerate() {
        let disjoint = group.zones.iter().all(|id| !covered.contains(id));
        if winners.contains(&index) && disjoint {
            covered.extend(group.zones.iter().copied());
            best.push(group.clone());
        } else {
            rest.push(group.clone());
        }
    }

    let remaining = zones
        .iter()
        .filter(|zone| !covered.contains(&zone.id))
        .cloned()
        .collect();

    BestGroups {
        best,
        zones: remaining,
        groups: rest,
    }
}

pub fn fittest_representation(zones: &[Zone], groups: &[Group]) -> Representation {
    let mut used_groups = Vec::new();
    let mut zones = zones.to_vec();
    let mut groups = groups.to_vec();

    loop {
        let round = select_best_groups(&zones, &groups);
        if round.best.is_empty() {
            break;
        }
        log::trace!(
            "fitter selected {} group(s), {} zone(s) left",
            round.best.len(),
            round.zones.len()
        );
        used_groups.extend(round.best);
        zones = round.zones;
        groups = round.groups;
    }

    Representation {
        zones,
        groups: used_groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones(ids: &[u32]) -> Vec<Zone> {
        ids.iter().map(|id| Zone::new(*id, 0.5)).collect()
    }

    fn ids(zones: &[Zone]) -> Vec<u32> {
        zones.iter().map(|zone| zone.id.0).collect()
    }

    fn group_ids(groups: &[Group]) -> Vec<u32> {
        groups.iter().map(|group| group.id.0).collect()
    }

    #[test]
    fn test_whole_group_subset() {
        let set: HashSet<ZoneId> = [1, 2, 3].into_iter().map(ZoneId).collect();

        assert!(is_whole_group_subset(&Group::new(10, "A", &[1, 2]), &set));
        assert!(!is_whole_group_subset(&Group::new(11, "B", &[2, 9]), &set));
        assert!(!is_whole_group_subset(&Group::new(12, "Empty", &[]), &set));
    }

    #[test]
    fn test_match_count() {
        let group = Group::new(10, "A", &[1, 2, 7]);
        assert_eq!(match_count(&zones(&[1, 2, 3]), &group), 2);
        assert_eq!(match_count(&zones(&[4]), &group), 0);
    }

    #[test]
    fn test_select_best_groups_takes_largest() {
        let groups = vec![
            Group::new(10, "Small", &[1]),
            Group::new(11, "Large", &[2, 3]),
        ];
        let round = select_best_groups(&zones(&[1, 2, 3]), &groups);

        assert_eq!(group_ids(&round.best), vec![11]);
        assert_eq!(ids(&round.zones), vec![1]);
        assert_eq!(group_ids(&round.groups), vec![10]);
    }

    #[test]
    fn test_select_best_groups_returns_all_ties_in_input_order() {
        let groups = vec![
            Group::new(12, "Up", &[3, 4]),
            Group::new(10, "Down", &[1, 2]),
            Group::new(11, "Solo", &[5]),
        ];
        let round = select_best_groups(&zones(&[1, 2, 3, 4, 5]), &groups);

        assert_eq!(group_ids(&round.best), vec![12, 10]);
        assert_eq!(ids(&round.zones), vec![5]);
        assert_eq!(group_ids(&round.groups), vec![11]);
    }

    #[test]
    fn test_select_best_groups_defers_overlapping_tie() {
        let groups = vec![
            Group::new(10, "Left", &[1, 2]),
            Group::new(11, "Right", &[2, 3]),
        ];
        let round = select_best_groups(&zones(&[1, 2, 3]), &groups);

        assert_eq!(group_ids(&round.best), vec![10]);
        assert_eq!(ids(&round.zones), vec![3]);
        assert_eq!(group_ids(&round.groups), vec![11]);

        let representation = fittest_representation(&zones(&[1, 2, 3]), &groups);
        assert_eq!(group_ids(&representation.groups), vec![10]);
        assert_eq!(ids(&representation.zones), vec![3]);
    }

    #[test]
    fn test_select_best_groups_none_qualify() {
        let groups = vec![Group::new(10, "Outside", &[1, 9])];
        let input = zones(&[1, 2]);
        let round = select_best_groups(&input, &groups);

        assert!(round.best.is_empty());
        assert_eq!(round.zones, input);
        assert_eq!(round.groups, groups);
    }

    #[test]
    fn test_fittest_representation_scenario() {
        let groups = vec![Group::new(10, "Living", &[1, 2]), Group::new(11, "Den", &[3])];
        let representation = fittest_representation(&zones(&[1, 2, 3, 4]), &groups);

        assert_eq!(group_ids(&representation.groups), vec![10, 11]);
        assert_eq!(ids(&representation.zones), vec![4]);
        assert_eq!(representation.control_count(), 3);
        assert_eq!(
            representation.covered_zone_ids(),
            vec![ZoneId(1), ZoneId(2), ZoneId(3)]
        );
    }

    #[test]
    fn test_covered_zone_ids_of_empty_representation() {
        let representation = fittest_representation(&zones(&[1, 2]), &[]);

        assert!(representation.covered_zone_ids().is_empty());
        assert_eq!(representation.control_count(), 2);
    }

    #[test]
    fn test_fittest_representation_terminates_with_empty_groups() {
        let groups = vec![Group::new(10, "Empty", &[]), Group::new(11, "Pair", &[1, 2])];
        let representation = fittest_representation(&zones(&[1, 2]), &groups);

        assert_eq!(group_ids(&representation.groups), vec![11]);
        assert!(representation.zones.is_empty());
    }

    #[test]
    fn test_fittest_representation_empty_inputs() {
        let representation = fittest_representation(&[], &[Group::new(1, "A", &[1])]);
        assert!(representation.groups.is_empty());
        assert!(representation.zones.is_empty());

        let representation = fittest_representation(&zones(&[1]), &[]);
        assert_eq!(ids(&representation.zones), vec![1]);
    }
}
