//! Greedy parallel seeder: a fast lower bound before the exact search.
//!
//! Seeds are visited densest-first (the k-core removal order walked from
//! the back). Each seed builds its filtered neighborhood, sorts it by the
//! configured score and dives greedily: always extend with the
//! highest-scored surviving candidate. The dive is cheap because every
//! level only intersects with one neighborhood, yet it lands close enough
//! to the optimum that the pruner can discard most of the graph before the
//! branch-and-bound starts.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::best::BestState;
use crate::config::{splitmix64, HeuristicStrategy};
use crate::graph::{Graph, Vertex};
use crate::kcore::CoreDecomposition;

// ============================================================================
// Scratch
// ============================================================================

/// Per-worker scratch reused across seeds.
struct Scratch {
    /// Reversible neighborhood marker, all-false between seeds.
    ind: Vec<bool>,
    /// Clique path under construction.
    path: Vec<u32>,
    /// Candidate buffer for the top level.
    cand: Vec<Vertex>,
}

impl Scratch {
    fn new(n: usize, max_degree: u32) -> Self {
        Self {
            ind: vec![false; n],
            path: Vec::with_capacity(max_degree as usize + 1),
            cand: Vec::with_capacity(max_degree as usize + 1),
        }
    }
}

// ============================================================================
// HeuristicSearcher
// ============================================================================

/// Parallel greedy clique seeder.
pub struct HeuristicSearcher<'g> {
    graph: &'g Graph,
    core: &'g [u32],
    order: &'g [u32],
    strat: HeuristicStrategy,
    base_seed: u64,
    verbose: bool,
}

impl<'g> HeuristicSearcher<'g> {
    /// Creates a seeder over `graph` with the given decomposition.
    pub fn new(
        graph: &'g Graph,
        cores: &'g CoreDecomposition,
        strat: HeuristicStrategy,
        base_seed: u64,
    ) -> Self {
        Self {
            graph,
            core: cores.core(),
            order: cores.order(),
            strat,
            base_seed,
            verbose: false,
        }
    }

    /// Enables publish-time progress lines.
    pub fn verbose(mut self, on: bool) -> Self {
        self.verbose = on;
        self
    }

    /// Runs the parallel sweep, publishing improvements into `best`.
    /// Returns the best size at completion.
    ///
    /// Workers observing [`BestState::found_ub`] skip their remaining
    /// seeds.
    pub fn search(&self, best: &BestState) -> usize {
        let n = self.graph.num_vertices();
        let max_degree = self.graph.max_degree();

        (0..self.order.len())
            .into_par_iter()
            .rev()
            .for_each_init(
                || Scratch::new(n, max_degree),
                |scratch, i| {
                    if best.found_ub() {
                        return;
                    }
                    self.expand_seed(self.order[i] as usize, i, best, scratch);
                },
            );

        best.size()
    }

    /// Processes one seed: candidate build, score sort, greedy dive,
    /// publish on strict improvement.
    fn expand_seed(&self, v: usize, index: usize, best: &BestState, scratch: &mut Scratch) {
        let mc_prev = best.size();
        let mut mc_cur = mc_prev;
        // A clique of mc + 1 lives in the mc-core, so core == mc still
        // qualifies.
        if (self.core[v] as usize) < mc_cur {
            return;
        }

        let mut rng = matches!(self.strat, HeuristicStrategy::Rand)
            .then(|| SmallRng::seed_from_u64(splitmix64(self.base_seed ^ index as u64)));

        scratch.cand.clear();
        for &w in self.graph.neighbors(v) {
            let u = w as usize;
            if (self.core[u] as usize) >= mc_cur {
                scratch.cand.push(Vertex::new(w, self.score(u, rng.as_mut())));
            }
        }
        if scratch.cand.len() <= mc_cur {
            return;
        }
        scratch.cand.sort_unstable_by_key(|c| (c.bound, c.id));

        scratch.path.clear();
        let mut p = std::mem::take(&mut scratch.cand);
        self.dive(&mut p, 1, &mut mc_cur, &mut scratch.path, &mut scratch.ind);
        scratch.cand = p;

        if mc_cur > mc_prev {
            scratch.path.push(v as u32);
            if best.try_publish(&mut scratch.path) && self.verbose {
                println!("[heuristic]\t current max clique = {}", best.size());
            }
        }
    }

    /// Greedy dive: pop the highest-scored candidate, intersect the rest
    /// with its neighborhood, descend. Leaves `ind` all-false on return.
    fn dive(
        &self,
        p: &mut Vec<Vertex>,
        sz: usize,
        mc: &mut usize,
        path: &mut Vec<u32>,
        ind: &mut [bool],
    ) {
        if let Some(top) = p.pop() {
            let u = top.id as usize;

            for &w in self.graph.neighbors(u) {
                ind[w as usize] = true;
            }
            let mut r: Vec<Vertex> = p
                .iter()
                .copied()
                .filter(|c| ind[c.id as usize] && (self.core[c.id as usize] as usize) >= *mc)
                .collect();
            for &w in self.graph.neighbors(u) {
                ind[w as usize] = false;
            }

            let mc_prev = *mc;
            self.dive(&mut r, sz + 1, mc, path, ind);
            if *mc > mc_prev {
                path.push(u as u32);
            }
        } else if sz > *mc {
            *mc = sz;
        }
    }

    /// The configured candidate score for vertex `v`.
    fn score(&self, v: usize, rng: Option<&mut SmallRng>) -> u32 {
        match self.strat {
            HeuristicStrategy::Kcore => self.core[v],
            HeuristicStrategy::Deg => self.graph.degree(v),
            HeuristicStrategy::KcoreDeg => self.core[v].saturating_mul(self.graph.degree(v)),
            HeuristicStrategy::Var => {
                let k = self.core[v];
                if k == 0 {
                    0
                } else {
                    k * (self.graph.degree(v) / k)
                }
            }
            HeuristicStrategy::Rand => match rng {
                Some(r) => r.random_range(0..self.graph.num_vertices() as u32),
                None => v as u32,
            },
            HeuristicStrategy::Id => v as u32,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
