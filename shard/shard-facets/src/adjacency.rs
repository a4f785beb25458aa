//! Shared-edge face adjacency within one fragment.

use hashbrown::HashMap;
use shard_types::ShardMesh;
use smallvec::SmallVec;

/// Face adjacency information for a polygon mesh.
///
/// Two faces are adjacent if they share an edge (two vertex indices).
/// Edges shared by more than two faces link every pair of them. Neighbor
/// lists are sorted ascending so traversals are deterministic.
#[derive(Debug, Clone)]
pub struct FaceAdjacency {
    adjacent: Vec<Vec<usize>>,
}

impl FaceAdjacency {
    /// Build face adjacency from a mesh.
    ///
    /// # Example
    ///
    /// ```
    /// use shard_facets::FaceAdjacency;
    /// use shard_types::{Point3, ShardMesh};
    ///
    /// let mesh = ShardMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
    /// let adj = FaceAdjacency::from_mesh(&mesh);
    ///
    /// // Every side of a box touches four others.
    /// assert_eq!(adj.neighbors(0), &[2, 3, 4, 5]);
    /// assert!(!adj.are_adjacent(0, 1));
    /// ```
    #[must_use]
    pub fn from_mesh(mesh: &ShardMesh) -> Self {
        let mut edge_to_faces: HashMap<(u32, u32), SmallVec<[usize; 2]>> = HashMap::new();

        for (face_idx, face) in mesh.faces.iter().enumerate() {
            for edge in face.edges() {
                let faces = edge_to_faces.entry(edge).or_default();
                if faces.last() != Some(&face_idx) {
                    faces.push(face_idx);
                }
            }
        }

        let mut adjacent: Vec<Vec<usize>> = vec![Vec::new(); mesh.faces.len()];
        for faces in edge_to_faces.values() {
            for (i, &a) in faces.iter().enumerate() {
                for &b in &faces[i + 1..] {
                    adjacent[a].push(b);
                    adjacent[b].push(a);
                }
            }
        }

        for adj_list in &mut adjacent {
            adj_list.sort_unstable();
            adj_list.dedup();
        }

        Self { adjacent }
    }

    /// Get the neighbors of a face, ascending.
    ///
    /// Returns an empty slice if the face index is out of bounds.
    #[must_use]
    pub fn neighbors(&self, face_idx: usize) -> &[usize] {
        self.adjacent.get(face_idx).map_or(&[], Vec::as_slice)
    }

    /// Get the number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.adjacent.len()
    }

    /// Check if two faces are adjacent.
    #[must_use]
    pub fn are_adjacent(&self, face_a: usize, face_b: usize) -> bool {
        self.adjacent
            .get(face_a)
            .is_some_and(|neighbors| neighbors.binary_search(&face_b).is_ok())
    }

    /// Check whether `faces` induce a connected subgraph.
    ///
    /// An empty set counts as connected.
    #[must_use]
    pub fn is_connected(&self, faces: &[usize]) -> bool {
        let Some(&start) = faces.first() else {
            return true;
        };
        let members: hashbrown::HashSet<usize> = faces.iter().copied().collect();
        let mut visited = hashbrown::HashSet::with_capacity(members.len());
        let mut stack = vec![start];

        while let Some(face) = stack.pop() {
            if !visited.insert(face) {
                continue;
            }
            for &neighbor in self.neighbors(face) {
                if members.contains(&neighbor) && !visited.contains(&neighbor) {
                    stack.push(neighbor);
                }
            }
        }

        visited.len() == members.len()
    }
}
