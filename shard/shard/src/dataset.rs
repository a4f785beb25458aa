//! Grouping fragments into vessels.
//!
//! Fragments are named `<vessel>_cell<suffix>`, for example
//! `RND_Pot_0_0_cell.001`. Fragments sharing a vessel prefix broke from the
//! same object and are reconstructed together. Vessels are renumbered
//! `Pot_001`, `Pot_002`, ... in sorted order of their original prefix, and
//! each fragment's prefix is rewritten to match.

use std::collections::BTreeMap;

use shard_types::Fragment;
use tracing::{debug, warn};

/// Separator between the vessel prefix and the cell suffix.
pub const CELL_MARKER: &str = "_cell";

/// Vessel prefix of a fragment name, if it has one.
///
/// # Example
///
/// ```
/// use shard::dataset::vessel_prefix;
///
/// assert_eq!(vessel_prefix("RND_Pot_0_0_cell.001"), Some("RND_Pot_0_0"));
/// assert_eq!(vessel_prefix("loose_piece"), None);
/// ```
#[must_use]
pub fn vessel_prefix(name: &str) -> Option<&str> {
    name.split_once(CELL_MARKER)
        .map(|(prefix, _)| prefix)
        .filter(|prefix| !prefix.is_empty())
}

/// Output id of the vessel at `index` in sorted order, starting at
/// `Pot_001`.
#[must_use]
pub fn vessel_id(index: usize) -> String {
    format!("Pot_{:03}", index + 1)
}

/// One object's fragments, renamed to the vessel's output id.
#[derive(Debug, Clone)]
pub struct Vessel {
    /// Output id, e.g. `Pot_001`.
    pub id: String,
    /// Prefix the fragments carried before renaming.
    pub source_prefix: String,
    /// Renamed fragments, in input order.
    pub fragments: Vec<Fragment>,
}

/// Fragments split into vessels.
#[derive(Debug, Clone, Default)]
pub struct VesselGrouping {
    /// Vessels in output id order.
    pub vessels: Vec<Vessel>,
    /// Names of fragments without a vessel prefix; they are left out.
    pub ungrouped: Vec<String>,
}

/// Group fragments by vessel prefix and rename them.
///
/// # Example
///
/// ```
/// use shard::dataset::group_vessels;
/// use shard::types::{Fragment, ShardMesh};
///
/// let names = ["RND_Pot_1_0_cell.001", "RND_Pot_0_0_cell.002", "RND_Pot_0_0_cell.001"];
/// let fragments = names.iter().map(|n| Fragment::new(*n, ShardMesh::new())).collect();
///
/// let grouping = group_vessels(fragments);
/// assert_eq!(grouping.vessels.len(), 2);
/// assert_eq!(grouping.vessels[0].id, "Pot_001");
/// assert_eq!(grouping.vessels[0].source_prefix, "RND_Pot_0_0");
/// assert_eq!(grouping.vessels[0].fragments[0].name(), "Pot_001_cell.002");
/// assert_eq!(grouping.vessels[1].fragments[0].name(), "Pot_002_cell.001");
/// ```
#[must_use]
pub fn group_vessels(fragments: Vec<Fragment>) -> VesselGrouping {
    let mut groups: BTreeMap<String, Vec<Fragment>> = BTreeMap::new();
    let mut ungrouped = Vec::new();

    for fragment in fragments {
        match vessel_prefix(fragment.name()).map(str::to_string) {
            Some(prefix) => groups.entry(prefix).or_default().push(fragment),
            None => ungrouped.push(fragment.name().to_string()),
        }
    }

    if !ungrouped.is_empty() {
        warn!(count = ungrouped.len(), "fragments without a vessel prefix");
    }

    let vessels = groups
        .into_iter()
        .enumerate()
        .map(|(index, (prefix, mut fragments))| {
            let id = vessel_id(index);
            for fragment in &mut fragments {
                let renamed = rename(fragment.name(), &prefix, &id);
                fragment.set_name(renamed);
            }
            debug!(vessel = %id, source = %prefix, fragments = fragments.len(), "grouped vessel");
            Vessel {
                id,
                source_prefix: prefix,
                fragments,
            }
        })
        .collect();

    VesselGrouping { vessels, ungrouped }
}

fn rename(name: &str, prefix: &str, id: &str) -> String {
    name.strip_prefix(prefix)
        .map_or_else(|| name.to_string(), |rest| format!("{id}{rest}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use shard_types::ShardMesh;

    fn named(names: &[&str]) -> Vec<Fragment> {
        names
            .iter()
            .map(|n| Fragment::new(*n, ShardMesh::new()))
            .collect()
    }

    #[test]
    fn prefix_stops_at_first_marker() {
        assert_eq!(vessel_prefix("A_cell_cell.1"), Some("A"));
        assert_eq!(vessel_prefix("_cell.001"), None);
        assert_eq!(vessel_prefix("Lathe_Pot_cell"), Some("Lathe_Pot"));
    }

    #[test]
    fn ids_are_zero_padded() {
        assert_eq!(vessel_id(0), "Pot_001");
        assert_eq!(vessel_id(41), "Pot_042");
        assert_eq!(vessel_id(999), "Pot_1000");
    }

    #[test]
    fn vessels_sorted_by_source_prefix() {
        let grouping = group_vessels(named(&[
            "b_cell.1",
            "a_cell.2",
            "orphan",
            "b_cell.2",
            "a_cell.1",
        ]));

        let ids: Vec<(&str, &str)> = grouping
            .vessels
            .iter()
            .map(|v| (v.id.as_str(), v.source_prefix.as_str()))
            .collect();
        assert_eq!(ids, vec![("Pot_001", "a"), ("Pot_002", "b")]);

        let names: Vec<&str> = grouping.vessels[0]
            .fragments
            .iter()
            .map(Fragment::name)
            .collect();
        assert_eq!(names, vec!["Pot_001_cell.2", "Pot_001_cell.1"]);
        assert_eq!(grouping.ungrouped, vec!["orphan".to_string()]);
    }
}
