//! Vertex elimination driven by the best-known clique size.
//!
//! The prune mask is the only cross-thread writeable filter in the search.
//! Bits move from live to pruned exactly once and never back, so lock-free
//! readers can act on a stale view without ever resurrecting a vertex:
//! at worst they visit a vertex that a concurrent prune already ruled out,
//! and the core bound rejects it again inside the seed.
//!
//! Writers must hold the best-state mutex (see [`crate::best`]); reads are
//! plain acquire loads.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::graph::Graph;

// ============================================================================
// PruneMask
// ============================================================================

/// Monotone per-vertex removal mask shared across search threads.
#[derive(Debug)]
pub struct PruneMask {
    bits: Vec<AtomicBool>,
}

impl PruneMask {
    /// Creates an all-live mask for `n` vertices.
    pub fn new(n: usize) -> Self {
        Self {
            bits: (0..n).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    /// Number of vertices covered by the mask.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns true if the mask covers no vertices.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Returns whether `v` has been removed.
    #[inline(always)]
    pub fn is_pruned(&self, v: usize) -> bool {
        self.bits[v].load(Ordering::Acquire)
    }

    /// Marks `v` as removed. Callers hold the best-state lock.
    #[inline(always)]
    pub fn prune(&self, v: usize) {
        self.bits[v].store(true, Ordering::Release);
    }

    /// Number of vertices still live.
    pub fn live_count(&self) -> usize {
        self.bits
            .iter()
            .filter(|b| !b.load(Ordering::Acquire))
            .count()
    }

    /// Copies the mask into a plain boolean vector, e.g. for
    /// [`Graph::induce`].
    pub fn snapshot(&self) -> Vec<bool> {
        self.bits
            .iter()
            .map(|b| b.load(Ordering::Acquire))
            .collect()
    }
}

// ============================================================================
// Pruning passes
// ============================================================================

/// Removes every live vertex whose core number is below `mc`.
///
/// A clique of size `mc + 1` lies inside the `mc`-core, so only vertices
/// with `core >= mc` can still improve on a best of `mc`. Returns the
/// number of vertices pruned by this call; a repeat call with the same
/// `mc` is a no-op. The adjacency is not rewritten, callers skip pruned
/// endpoints during traversal.
pub fn prune_below_core(mask: &PruneMask, core: &[u32], mc: usize) -> usize {
    let mut pruned = 0;
    for (v, &k) in core.iter().enumerate() {
        if (k as usize) < mc && !mask.is_pruned(v) {
            mask.prune(v);
            pruned += 1;
        }
    }
    pruned
}

/// Initial elimination pass before the exact search.
///
/// First applies the core bound, then repeatedly removes vertices whose
/// live neighborhood has fewer than `lb` members, until a fixed point. A
/// vertex with fewer than `lb` live neighbors cannot belong to any clique
/// larger than `lb`.
///
/// Returns the total number of vertices pruned.
pub fn initial_prune(graph: &Graph, mask: &PruneMask, core: &[u32], lb: usize) -> usize {
    let n = graph.num_vertices();
    debug_assert_eq!(mask.len(), n);

    let mut total = prune_below_core(mask, core, lb);

    loop {
        let mut round = 0;
        for v in 0..n {
            if mask.is_pruned(v) {
                continue;
            }
            let live = graph
                .neighbors(v)
                .iter()
                .filter(|&&w| !mask.is_pruned(w as usize))
                .count();
            if live < lb {
                mask.prune(v);
                round += 1;
            }
        }
        total += round;
        if round == 0 {
            break;
        }
    }
    total
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{complete, graph_from_edges};
    use crate::kcore::CoreDecomposition;

    #[test]
    fn mask_starts_all_live() {
        let mask = PruneMask::new(5);
        assert_eq!(mask.live_count(), 5);
        assert!((0..5).all(|v| !mask.is_pruned(v)));
    }

    #[test]
    fn prune_is_monotone() {
        let mask = PruneMask::new(3);
        mask.prune(1);
        mask.prune(1);
        assert!(mask.is_pruned(1));
        assert_eq!(mask.live_count(), 2);
        assert_eq!(mask.snapshot(), vec![false, true, false]);
    }

    #[test]
    fn core_prune_removes_exactly_low_cores() {
        // Triangle 0-1-2 with pendant 3 attached to 0: cores [2,2,2,1].
        let g = graph_from_edges(4, &[(0, 1), (1, 2), (2, 0), (0, 3)]);
        let cores = CoreDecomposition::compute(&g);
        let mask = PruneMask::new(4);

        // A best of 1 still admits edges through the pendant; a best of 2
        // rules it out.
        assert_eq!(prune_below_core(&mask, cores.core(), 1), 0);

        let pruned = prune_below_core(&mask, cores.core(), 2);
        assert_eq!(pruned, 1);
        assert!(mask.is_pruned(3));
        assert!(!mask.is_pruned(0));

        // Idempotent on repeat.
        assert_eq!(prune_below_core(&mask, cores.core(), 2), 0);
    }

    #[test]
    fn survivors_can_still_reach_a_larger_clique() {
        let g = graph_from_edges(
            7,
            &[(0, 1), (1, 2), (2, 0), (0, 3), (3, 4), (4, 5), (5, 3), (5, 6)],
        );
        let cores = CoreDecomposition::compute(&g);
        let mask = PruneMask::new(7);
        let mc = 2;
        prune_below_core(&mask, cores.core(), mc);
        assert!(mask.is_pruned(6));
        for v in 0..7 {
            if !mask.is_pruned(v) {
                assert!(cores.core()[v] as usize >= mc);
            }
        }
    }

    #[test]
    fn initial_prune_reaches_fixed_point() {
        // A K4 with a path 4-5-6 hanging off vertex 0. With lb = 3 the path
        // dies on the core bound, and no K4 member loses enough neighbors
        // to cascade.
        let g = graph_from_edges(
            7,
            &[
                (0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3),
                (0, 4), (4, 5), (5, 6),
            ],
        );
        let cores = CoreDecomposition::compute(&g);
        let mask = PruneMask::new(7);

        let pruned = initial_prune(&g, &mask, cores.core(), 3);
        assert_eq!(pruned, 3);
        for v in 0..4 {
            assert!(!mask.is_pruned(v), "K4 member {v} must survive");
        }
        for v in 4..7 {
            assert!(mask.is_pruned(v), "tail vertex {v} must be pruned");
        }
    }

    #[test]
    fn initial_prune_clears_star_above_its_core() {
        let g = graph_from_edges(4, &[(0, 1), (0, 2), (0, 3)]);
        let cores = CoreDecomposition::compute(&g);
        let mask = PruneMask::new(4);

        let pruned = initial_prune(&g, &mask, cores.core(), 2);
        assert_eq!(pruned, 4);
        assert_eq!(mask.live_count(), 0);
    }

    #[test]
    fn neighborhood_pass_cascades_over_a_reused_mask() {
        // Diamond: triangle 0-1-2 plus vertex 3 adjacent to 1 and 2.
        // Removing vertex 1 (say, by an earlier dynamic prune) leaves every
        // survivor short of two live neighbors, so the fixed point clears
        // the whole component even though every core number is 2.
        let g = graph_from_edges(4, &[(0, 1), (1, 2), (2, 0), (1, 3), (2, 3)]);
        let cores = CoreDecomposition::compute(&g);
        let mask = PruneMask::new(4);
        mask.prune(1);

        let pruned = initial_prune(&g, &mask, cores.core(), 2);
        assert_eq!(pruned, 3);
        assert_eq!(mask.live_count(), 0);
    }

    #[test]
    fn complete_graph_survives_any_prune_below_omega() {
        let g = complete(5);
        let cores = CoreDecomposition::compute(&g);
        let mask = PruneMask::new(5);
        let pruned = initial_prune(&g, &mask, cores.core(), 4);
        assert_eq!(pruned, 0);
        assert_eq!(mask.live_count(), 5);
    }
}
