use crate::core::structure::Cluster;
use nalgebra::Vector3;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;

/// Bond-graph fragment detection for a carved (non-periodic) cluster.
///
/// A well-formed Wulff particle is a single connected component; more than
/// one fragment usually means the facet distances were too tight for the
/// lattice spacing. This is a diagnostic, never a failure.
pub struct FragmentAnalyzer {
    bond_cutoff: f64,
}

impl FragmentAnalyzer {
    /// Atoms closer than `bond_cutoff` (Å) are considered bonded.
    pub fn new(bond_cutoff: f64) -> Self {
        Self { bond_cutoff }
    }

    /// Sizes of the connected components, largest first.
    ///
    /// # Complexity
    /// O(N²) pair scan. Clusters of interest stay small enough that a cell
    /// list is not worth the bookkeeping; positions are non-periodic so no
    /// minimum-image handling is needed.
    pub fn fragment_sizes(&self, cluster: &Cluster) -> Vec<usize> {
        let positions: Vec<Vector3<f64>> = cluster
            .atoms
            .iter()
            .map(|atom| cluster.lattice.to_cartesian(&atom.fractional_coords))
            .collect();

        let num_atoms = positions.len();
        let mut graph = UnGraph::<usize, ()>::with_capacity(num_atoms, num_atoms * 3);
        let node_indices: Vec<NodeIndex> = (0..num_atoms).map(|i| graph.add_node(i)).collect();

        let cutoff_sq = self.bond_cutoff.powi(2);
        for i in 0..num_atoms {
            for j in (i + 1)..num_atoms {
                if (positions[j] - positions[i]).norm_squared() < cutoff_sq {
                    graph.add_edge(node_indices[i], node_indices[j], ());
                }
            }
        }

        // BFS sweep: one component per unvisited seed.
        let mut visited = vec![false; num_atoms];
        let mut sizes = Vec::new();
        for i in 0..num_atoms {
            if visited[i] {
                continue;
            }
            let mut size = 0;
            let mut bfs = Bfs::new(&graph, node_indices[i]);
            while let Some(nx) = bfs.next(&graph) {
                let atom_index = graph[nx];
                if !visited[atom_index] {
                    visited[atom_index] = true;
                    size += 1;
                }
            }
            if size > 0 {
                sizes.push(size);
            }
        }

        sizes.sort_unstable_by(|a, b| b.cmp(a));
        sizes
    }
}
