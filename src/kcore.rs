//! Degree and k-core machinery: core numbers and the degeneracy ordering.
//!
//! The decomposition is the standard bucket peeling scheme: vertices sit in
//! buckets indexed by current degree; repeatedly remove a minimum-degree
//! vertex, record its core number, and demote its surviving neighbors one
//! bucket. Runs in `O(n + m)`.
//!
//! Two consumers drive the interface: the heuristic walks the removal order
//! from the back (densest vertices first), and the pruner compares core
//! numbers against the best-known clique size, since a clique of size `k`
//! lives entirely inside the `(k - 1)`-core.

use crate::graph::Graph;
use crate::prune::PruneMask;

// ============================================================================
// CoreDecomposition
// ============================================================================

/// Core numbers, removal order and the maximum core of a graph.
#[derive(Clone, Debug)]
pub struct CoreDecomposition {
    core: Vec<u32>,
    order: Vec<u32>,
    max_core: u32,
}

impl CoreDecomposition {
    /// Computes the decomposition of the full graph.
    pub fn compute(graph: &Graph) -> Self {
        Self::peel(graph, |_| false)
    }

    /// Recomputes the decomposition on the subgraph induced by the live
    /// vertices of `mask`. Pruned vertices get core number 0 and do not
    /// appear in the removal order.
    pub fn recompute(graph: &Graph, mask: &PruneMask) -> Self {
        Self::peel(graph, |v| mask.is_pruned(v))
    }

    /// Per-vertex core numbers.
    #[inline(always)]
    pub fn core(&self) -> &[u32] {
        &self.core
    }

    /// Largest `k` with a non-empty k-core; `|C_max| <= max_core + 1`.
    #[inline(always)]
    pub fn max_core(&self) -> u32 {
        self.max_core
    }

    /// Vertices in removal order: non-decreasing core number, with equal
    /// initial degrees placed in ascending id order. Iterate in reverse for
    /// a densest-first sweep.
    #[inline(always)]
    pub fn order(&self) -> &[u32] {
        &self.order
    }

    fn peel<F: Fn(usize) -> bool>(graph: &Graph, removed: F) -> Self {
        let n = graph.num_vertices();
        let mut core = vec![0u32; n];

        // Live degrees; removed vertices never enter the buckets.
        let mut deg = vec![0u32; n];
        let mut live = 0usize;
        for v in 0..n {
            if removed(v) {
                continue;
            }
            live += 1;
            deg[v] = graph
                .neighbors(v)
                .iter()
                .filter(|&&w| !removed(w as usize))
                .count() as u32;
        }
        let md = deg.iter().copied().max().unwrap_or(0) as usize;

        // bin[d] = start of the degree-d block in `vert`.
        let mut bin = vec![0usize; md + 1];
        for v in 0..n {
            if !removed(v) {
                bin[deg[v] as usize] += 1;
            }
        }
        let mut start = 0usize;
        for d in 0..=md {
            let count = bin[d];
            bin[d] = start;
            start += count;
        }

        let mut vert = vec![0u32; live];
        let mut pos = vec![usize::MAX; n];
        for v in 0..n {
            if removed(v) {
                continue;
            }
            let d = deg[v] as usize;
            vert[bin[d]] = v as u32;
            pos[v] = bin[d];
            bin[d] += 1;
        }
        for d in (1..=md).rev() {
            bin[d] = bin[d - 1];
        }
        bin[0] = 0;

        let mut max_core = 0u32;
        for i in 0..live {
            let v = vert[i] as usize;
            core[v] = deg[v];
            max_core = max_core.max(deg[v]);

            for &wu in graph.neighbors(v) {
                let u = wu as usize;
                if removed(u) || pos[u] <= i {
                    continue;
                }
                if deg[u] > deg[v] {
                    // Swap u with the first member of its bucket, then
                    // shrink that bucket from the front.
                    let du = deg[u] as usize;
                    let pu = pos[u];
                    let pw = bin[du];
                    let w = vert[pw] as usize;
                    if u != w {
                        vert[pu] = w as u32;
                        vert[pw] = u as u32;
                        pos[u] = pw;
                        pos[w] = pu;
                    }
                    bin[du] += 1;
                    deg[u] -= 1;
                }
            }
        }

        Self {
            core,
            order: vert,
            max_core,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{complete, graph_from_edges, petersen};

    #[test]
    fn complete_graph_cores() {
        let g = complete(5);
        let d = CoreDecomposition::compute(&g);
        assert!(d.core().iter().all(|&c| c == 4));
        assert_eq!(d.max_core(), 4);
        assert_eq!(d.order().len(), 5);
    }

    #[test]
    fn cycle_cores_are_two() {
        let g = graph_from_edges(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0)]);
        let d = CoreDecomposition::compute(&g);
        assert!(d.core().iter().all(|&c| c == 2));
        assert_eq!(d.max_core(), 2);
    }

    #[test]
    fn path_cores_are_one() {
        let g = graph_from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
        let d = CoreDecomposition::compute(&g);
        assert!(d.core().iter().all(|&c| c == 1));
    }

    #[test]
    fn pendant_vertex_gets_core_one() {
        // Triangle plus a pendant on vertex 0.
        let g = graph_from_edges(4, &[(0, 1), (1, 2), (2, 0), (0, 3)]);
        let d = CoreDecomposition::compute(&g);
        assert_eq!(d.core(), &[2, 2, 2, 1]);
        assert_eq!(d.max_core(), 2);
        // The pendant peels first.
        assert_eq!(d.order()[0], 3);
    }

    #[test]
    fn empty_graph_has_zero_cores() {
        let g = graph_from_edges(10, &[]);
        let d = CoreDecomposition::compute(&g);
        assert!(d.core().iter().all(|&c| c == 0));
        assert_eq!(d.max_core(), 0);
        assert_eq!(d.order().len(), 10);
    }

    #[test]
    fn petersen_is_three_regular_three_core() {
        let g = petersen();
        let d = CoreDecomposition::compute(&g);
        assert!(d.core().iter().all(|&c| c == 3));
        assert_eq!(d.max_core(), 3);
    }

    #[test]
    fn order_is_nondecreasing_in_core() {
        let g = graph_from_edges(
            8,
            &[
                (0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3), // K4
                (3, 4), (4, 5), // tail
                (5, 6), (6, 7), (7, 5), // triangle
            ],
        );
        let d = CoreDecomposition::compute(&g);
        let cores: Vec<u32> = d.order().iter().map(|&v| d.core()[v as usize]).collect();
        assert!(cores.windows(2).all(|w| w[0] <= w[1]), "order {cores:?}");
    }

    #[test]
    fn kcore_subgraph_has_min_degree_k() {
        // For every vertex v, the subgraph induced by {u : core[u] >= core[v]}
        // must give v at least core[v] neighbors.
        let g = graph_from_edges(
            9,
            &[
                (0, 1), (0, 2), (1, 2),
                (2, 3), (3, 4), (4, 2),
                (4, 5), (5, 6), (6, 7), (7, 8), (8, 5), (5, 7), (6, 8),
            ],
        );
        let d = CoreDecomposition::compute(&g);
        for v in 0..9 {
            let k = d.core()[v];
            let inside = g
                .neighbors(v)
                .iter()
                .filter(|&&w| d.core()[w as usize] >= k)
                .count();
            assert!(
                inside as u32 >= k,
                "vertex {v}: core {k} but only {inside} neighbors in the {k}-core"
            );
        }
    }

    #[test]
    fn recompute_matches_induced_subgraph() {
        use crate::prune::PruneMask;

        // Two triangles sharing the bridge 2-3; remove vertex 3 and the
        // second triangle collapses to an edge.
        let g = graph_from_edges(6, &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 5), (5, 3)]);
        let mask = PruneMask::new(6);
        mask.prune(3);

        let d = CoreDecomposition::recompute(&g, &mask);
        assert_eq!(d.core()[3], 0);
        assert_eq!(d.core()[0], 2);
        assert_eq!(d.core()[4], 1);
        assert_eq!(d.core()[5], 1);
        assert_eq!(d.order().len(), 5);
        assert!(!d.order().contains(&3));

        // Cross-check against a fresh decomposition of the induced graph.
        let induced = g.induce(&mask.snapshot());
        let fresh = CoreDecomposition::compute(&induced);
        for v in 0..6 {
            if v != 3 {
                assert_eq!(d.core()[v], fresh.core()[v], "core mismatch at {v}");
            }
        }
    }

    #[test]
    fn core_bounds_clique_size() {
        // max clique size <= max_core + 1 on a mixed graph.
        let g = graph_from_edges(
            7,
            &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3), (3, 4), (4, 5), (5, 6)],
        );
        let d = CoreDecomposition::compute(&g);
        assert_eq!(d.max_core(), 3); // K4 members
    }
}
