//! Facet adjacency graph.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use shard_types::FacetId;

/// An unordered pair of facets that touched before the break.
///
/// Always stored with the smaller id first. Serializes as `[a, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AdjacencyEdge(FacetId, FacetId);

impl AdjacencyEdge {
    /// Create an edge, normalizing the pair so the smaller id comes first.
    #[must_use]
    pub const fn new(a: FacetId, b: FacetId) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    /// Smaller facet id.
    #[must_use]
    pub const fn a(&self) -> FacetId {
        self.0
    }

    /// Larger facet id.
    #[must_use]
    pub const fn b(&self) -> FacetId {
        self.1
    }

    /// The other end of the edge, if `facet` is one of its ends.
    #[must_use]
    pub const fn other(&self, facet: FacetId) -> Option<FacetId> {
        if facet == self.0 {
            Some(self.1)
        } else if facet == self.1 {
            Some(self.0)
        } else {
            None
        }
    }
}

/// Edges in discovery order, each unordered pair at most once.
///
/// Serializes as a plain array of `[a, b]` pairs, which is the
/// `adjacency.json` format.
///
/// # Example
///
/// ```
/// use shard_match::AdjacencyGraph;
///
/// let mut graph = AdjacencyGraph::new();
/// assert!(graph.insert(2, 1));
/// assert!(!graph.insert(1, 2));
/// assert!(graph.insert(3, 1));
///
/// assert_eq!(graph.len(), 2);
/// assert_eq!(serde_json::to_string(&graph).unwrap(), "[[1,2],[1,3]]");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<AdjacencyEdge>", into = "Vec<AdjacencyEdge>")]
pub struct AdjacencyGraph {
    edges: Vec<AdjacencyEdge>,
    seen: HashSet<AdjacencyEdge>,
}

impl AdjacencyGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the unordered pair `(a, b)`.
    ///
    /// Returns `false` if the pair was already present. Self-loops are
    /// rejected the same way.
    pub fn insert(&mut self, a: FacetId, b: FacetId) -> bool {
        if a == b {
            return false;
        }
        let edge = AdjacencyEdge::new(a, b);
        if !self.seen.insert(edge) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    /// Check whether the unordered pair `(a, b)` is present.
    #[must_use]
    pub fn contains(&self, a: FacetId, b: FacetId) -> bool {
        self.seen.contains(&AdjacencyEdge::new(a, b))
    }

    /// Edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[AdjacencyEdge] {
        &self.edges
    }

    /// Facets adjacent to `facet`, in insertion order.
    pub fn neighbors_of(&self, facet: FacetId) -> impl Iterator<Item = FacetId> + '_ {
        self.edges.iter().filter_map(move |e| e.other(facet))
    }

    /// Number of edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Check if the graph has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edges as `[a, b]` pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<[FacetId; 2]> {
        self.edges.iter().map(|e| [e.0, e.1]).collect()
    }
}

impl PartialEq for AdjacencyGraph {
    fn eq(&self, other: &Self) -> bool {
        self.edges == other.edges
    }
}

impl Eq for AdjacencyGraph {}

impl From<Vec<AdjacencyEdge>> for AdjacencyGraph {
    fn from(edges: Vec<AdjacencyEdge>) -> Self {
        edges.into_iter().collect()
    }
}

impl From<AdjacencyGraph> for Vec<AdjacencyEdge> {
    fn from(graph: AdjacencyGraph) -> Self {
        graph.edges
    }
}

impl FromIterator<AdjacencyEdge> for AdjacencyGraph {
    fn from_iter<I: IntoIterator<Item = AdjacencyEdge>>(iter: I) -> Self {
        let mut graph = Self::new();
        for edge in iter {
            graph.insert(edge.0, edge.1);
        }
        graph
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn edge_is_normalized() {
        let e = AdjacencyEdge::new(7, 3);
        assert_eq!((e.a(), e.b()), (3, 7));
        assert_eq!(e, AdjacencyEdge::new(3, 7));
        assert_eq!(e.other(3), Some(7));
        assert_eq!(e.other(7), Some(3));
        assert_eq!(e.other(5), None);
    }

    #[test]
    fn duplicates_and_self_loops_rejected() {
        let mut g = AdjacencyGraph::new();
        assert!(g.insert(1, 2));
        assert!(!g.insert(2, 1));
        assert!(!g.insert(4, 4));
        assert!(g.insert(2, 3));
        assert_eq!(g.to_pairs(), vec![[1, 2], [2, 3]]);
        assert!(g.contains(3, 2));
        assert!(!g.contains(1, 3));
        assert_eq!(g.neighbors_of(2).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn json_is_array_of_pairs() {
        let mut g = AdjacencyGraph::new();
        g.insert(5, 1);
        g.insert(2, 4);
        let json = serde_json::to_string(&g).unwrap();
        assert_eq!(json, "[[1,5],[2,4]]");

        let back: AdjacencyGraph = serde_json::from_str("[[1,5],[4,2],[5,1]]").unwrap();
        assert_eq!(back.to_pairs(), vec![[1, 5], [2, 4]]);
    }
}
