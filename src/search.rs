//! Exact parallel branch-and-bound maximum clique search.
//!
//! Seeds (live vertices, ordered by a configurable key) are distributed to
//! rayon's work-stealing pool; each seed builds its filtered neighborhood,
//! takes a greedy-coloring upper bound and branches with re-coloring at
//! every level. The shared best size prunes everything: core numbers below
//! it disqualify candidates, color bounds at or below the remaining gap cut
//! whole suffixes, and the pruner periodically retires vertices whose core
//! can no longer matter.
//!
//! The sparse and dense code paths are the same algorithm over two
//! membership oracles: a reversible mark vector over the CSR for sparse
//! graphs, a bitmap probe when a dense adjacency is attached.

use crossbeam::queue::ArrayQueue;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::best::BestState;
use crate::config::{splitmix64, ConfigError, EdgeSortOrder, SearchParams, VertexOrder};
use crate::graph::{DenseAdj, Graph, Vertex};
use crate::heuristic::HeuristicSearcher;
use crate::kcore::CoreDecomposition;
use crate::prune::{self, PruneMask};

// ============================================================================
// Outcome
// ============================================================================

/// Result of a completed (or budget-limited) search.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    /// Size of the best clique found.
    pub size: usize,
    /// The witness clique, in original vertex ids.
    pub clique: Vec<u32>,
    /// True when the wall-clock budget expired before the frontier was
    /// exhausted; the clique is still the best found so far.
    pub time_expired: bool,
}

// ============================================================================
// Neighbor membership oracles
// ============================================================================

/// Membership oracle for "is `w` a neighbor of the marked vertex".
///
/// Every `mark` is paired with a `clear` on all exit paths, keeping the
/// sparse oracle's mark vector all-false between uses.
trait NeighborFilter {
    fn mark(&mut self, u: usize);
    fn hit(&self, w: usize) -> bool;
    fn clear(&mut self, u: usize);
}

/// Sparse oracle: flips a thread-local boolean per neighbor of the marked
/// vertex, answering hits in O(1) after an O(deg) setup.
struct CsrFilter<'a> {
    graph: &'a Graph,
    ind: &'a mut [bool],
}

impl NeighborFilter for CsrFilter<'_> {
    #[inline]
    fn mark(&mut self, u: usize) {
        for &w in self.graph.neighbors(u) {
            self.ind[w as usize] = true;
        }
    }

    #[inline(always)]
    fn hit(&self, w: usize) -> bool {
        self.ind[w]
    }

    #[inline]
    fn clear(&mut self, u: usize) {
        for &w in self.graph.neighbors(u) {
            self.ind[w as usize] = false;
        }
    }
}

/// Dense oracle: probes the bitmap row of the marked vertex directly.
struct DenseFilter<'a> {
    adj: &'a DenseAdj,
    current: usize,
}

impl NeighborFilter for DenseFilter<'_> {
    #[inline(always)]
    fn mark(&mut self, u: usize) {
        self.current = u;
    }

    #[inline(always)]
    fn hit(&self, w: usize) -> bool {
        self.adj.contains(self.current, w)
    }

    #[inline(always)]
    fn clear(&mut self, _u: usize) {}
}

// ============================================================================
// Scratch
// ============================================================================

/// Per-seed working buffers, recycled through a lock-free pool so a worker
/// allocates at most once.
struct Scratch {
    p: Vec<Vertex>,
    c: Vec<u32>,
    ind: Vec<bool>,
    colors: Vec<Vec<u32>>,
}

impl Scratch {
    fn new(n: usize, max_degree: u32) -> Self {
        Self {
            p: Vec::with_capacity(max_degree as usize + 1),
            c: Vec::with_capacity(max_degree as usize + 1),
            ind: vec![false; n],
            colors: Vec::new(),
        }
    }
}

// ============================================================================
// MaxCliqueSearcher
// ============================================================================

/// Parallel branch-and-bound searcher over a pruned graph.
pub struct MaxCliqueSearcher<'g> {
    graph: &'g Graph,
    core: &'g [u32],
    vertex_order: VertexOrder,
    decreasing_order: bool,
    time_limit: Duration,
    remove_time: Duration,
    base_seed: u64,
    verbose: bool,
}

/// Shared per-run bookkeeping for cancellation and dynamic pruning.
struct RunState<'a> {
    best: &'a BestState,
    mask: &'a PruneMask,
    core: &'a [u32],
    started: Instant,
    time_limit: Duration,
    remove_time: Duration,
    last_prune_ms: AtomicU64,
    time_expired: AtomicBool,
}

impl RunState<'_> {
    /// Checked at seed boundaries only; no mid-recursion cancellation.
    fn out_of_time(&self) -> bool {
        if self.time_expired.load(Ordering::Relaxed) {
            return true;
        }
        if self.started.elapsed() > self.time_limit {
            self.time_expired.store(true, Ordering::Relaxed);
            return true;
        }
        false
    }

    /// Re-prunes against the freshly published best size when at least
    /// `remove_time` has passed since the last prune. The CAS elects a
    /// single pruning thread; the mask writes happen under the best-state
    /// lock.
    fn after_publish(&self) {
        let now = self.started.elapsed().as_millis() as u64;
        let last = self.last_prune_ms.load(Ordering::Relaxed);
        if u128::from(now.saturating_sub(last)) < self.remove_time.as_millis() {
            return;
        }
        if self
            .last_prune_ms
            .compare_exchange(last, now, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return;
        }
        let mc = self.best.size();
        self.best
            .locked(|| prune::prune_below_core(self.mask, self.core, mc));
    }
}

impl<'g> MaxCliqueSearcher<'g> {
    /// Creates a searcher borrowing the graph and its (possibly
    /// recomputed) core decomposition.
    pub fn new(
        graph: &'g Graph,
        cores: &'g CoreDecomposition,
        params: &SearchParams,
        base_seed: u64,
    ) -> Self {
        Self {
            graph,
            core: cores.core(),
            vertex_order: params.vertex_search_order,
            decreasing_order: params.decreasing_order,
            time_limit: Duration::try_from_secs_f64(params.time_limit).unwrap_or(Duration::MAX),
            remove_time: Duration::try_from_secs_f64(params.remove_time).unwrap_or(Duration::MAX),
            base_seed,
            verbose: false,
        }
    }

    /// Enables publish-time progress lines.
    pub fn verbose(mut self, on: bool) -> Self {
        self.verbose = on;
        self
    }

    /// Runs the search to frontier exhaustion, `found_ub`, or the time
    /// budget. Returns whether the budget expired.
    pub fn search(&self, best: &BestState, mask: &PruneMask) -> bool {
        let n = self.graph.num_vertices();
        let keys = self.vertex_keys();
        let frontier = self.order_vertices(&keys, best, mask);
        let run = RunState {
            best,
            mask,
            core: self.core,
            started: Instant::now(),
            time_limit: self.time_limit,
            remove_time: self.remove_time,
            last_prune_ms: AtomicU64::new(0),
            time_expired: AtomicBool::new(false),
        };

        let pool: ArrayQueue<Scratch> = ArrayQueue::new(rayon::current_num_threads().max(1));
        let max_degree = self.graph.max_degree();

        (0..frontier.len()).into_par_iter().rev().for_each(|i| {
            if run.best.found_ub() || run.out_of_time() {
                return;
            }
            let mut scratch = pool
                .pop()
                .unwrap_or_else(|| Scratch::new(n, max_degree));
            self.run_seed(frontier[i].id as usize, &keys, &run, &mut scratch);
            let _ = pool.push(scratch);
        });

        run.time_expired.load(Ordering::Relaxed)
    }

    /// Builds the seed frontier: live vertices keyed by the configured
    /// order, sorted ascending (or descending when `decreasing_order`),
    /// processed from the back.
    fn order_vertices(&self, keys: &[u32], best: &BestState, mask: &PruneMask) -> Vec<Vertex> {
        let mc = best.size();
        let mut frontier: Vec<Vertex> = (0..self.graph.num_vertices())
            .filter(|&v| !mask.is_pruned(v) && (self.core[v] as usize) >= mc)
            .map(|v| Vertex::new(v as u32, keys[v]))
            .collect();
        if self.decreasing_order {
            frontier.sort_unstable_by(|a, b| b.bound.cmp(&a.bound).then(a.id.cmp(&b.id)));
        } else {
            frontier.sort_unstable_by(|a, b| a.bound.cmp(&b.bound).then(a.id.cmp(&b.id)));
        }
        frontier
    }

    /// Per-vertex seed keys for the configured vertex order.
    fn vertex_keys(&self) -> Vec<u32> {
        let n = self.graph.num_vertices();
        match self.vertex_order {
            VertexOrder::Kcore => self.core.to_vec(),
            VertexOrder::Deg => self.graph.degrees().to_vec(),
            VertexOrder::KcoreDeg => (0..n)
                .map(|v| self.core[v].saturating_mul(self.graph.degree(v)))
                .collect(),
            VertexOrder::DualDeg => (0..n)
                .map(|v| {
                    let sum: u64 = self
                        .graph
                        .neighbors(v)
                        .iter()
                        .map(|&w| u64::from(self.graph.degree(w as usize)))
                        .sum();
                    sum.min(u64::from(u32::MAX)) as u32
                })
                .collect(),
            VertexOrder::DualKcore => (0..n)
                .map(|v| {
                    let sum: u64 = self
                        .graph
                        .neighbors(v)
                        .iter()
                        .map(|&w| u64::from(self.core[w as usize]))
                        .sum();
                    sum.min(u64::from(u32::MAX)) as u32
                })
                .collect(),
            VertexOrder::Rand => {
                let mut rng = SmallRng::seed_from_u64(splitmix64(self.base_seed));
                (0..n).map(|_| rng.random_range(0..n.max(1) as u32)).collect()
            }
        }
    }

    /// One seed: candidate build, key sort, color bound, branch.
    fn run_seed(&self, v: usize, keys: &[u32], run: &RunState<'_>, scratch: &mut Scratch) {
        let mc = run.best.size();
        // core == mc still admits an (mc + 1)-clique through this seed.
        if run.mask.is_pruned(v) || (self.core[v] as usize) < mc {
            return;
        }

        let Scratch { p, c, ind, colors } = scratch;
        p.clear();
        for &w in self.graph.neighbors(v) {
            let u = w as usize;
            if !run.mask.is_pruned(u) && (self.core[u] as usize) >= mc {
                p.push(Vertex::new(w, keys[u]));
            }
        }
        if p.len() < mc {
            return;
        }
        if self.decreasing_order {
            p.sort_unstable_by(|a, b| b.bound.cmp(&a.bound).then(a.id.cmp(&b.id)));
        } else {
            p.sort_unstable_by(|a, b| a.bound.cmp(&b.bound).then(a.id.cmp(&b.id)));
        }

        c.clear();
        c.push(v as u32);

        match self.graph.dense() {
            Some(adj) => {
                let mut filter = DenseFilter { adj, current: v };
                self.bound_and_branch(p, c, colors, &mut filter, run);
            }
            None => {
                let mut filter = CsrFilter {
                    graph: self.graph,
                    ind,
                };
                self.bound_and_branch(p, c, colors, &mut filter, run);
            }
        }
    }

    /// Applies the seed-level color bound, then branches.
    fn bound_and_branch<F: NeighborFilter>(
        &self,
        p: &mut Vec<Vertex>,
        c: &mut Vec<u32>,
        colors: &mut Vec<Vec<u32>>,
        filter: &mut F,
        run: &RunState<'_>,
    ) {
        color_sort(p, colors, filter);
        let max_color = p.last().map_or(0, |t| t.bound as usize);
        if c.len() + max_color <= run.best.size() {
            return;
        }
        self.branch(p, c, colors, filter, run);
    }

    /// Branch-and-bound over a colored candidate set.
    ///
    /// `C` holds the current partial clique; the loop consumes candidates
    /// from the high-color end and stops as soon as the best remaining
    /// bound cannot beat the shared best.
    fn branch<F: NeighborFilter>(
        &self,
        p: &mut Vec<Vertex>,
        c: &mut Vec<u32>,
        colors: &mut Vec<Vec<u32>>,
        filter: &mut F,
        run: &RunState<'_>,
    ) {
        while let Some(&top) = p.last() {
            if c.len() + top.bound as usize <= run.best.size() {
                return;
            }
            p.pop();
            let u = top.id as usize;

            let mc = run.best.size();
            filter.mark(u);
            let mut r: Vec<Vertex> = p
                .iter()
                .copied()
                .filter(|cand| {
                    let w = cand.id as usize;
                    filter.hit(w)
                        && !run.mask.is_pruned(w)
                        && (self.core[w] as usize) >= mc
                })
                .collect();
            filter.clear(u);

            c.push(u as u32);
            if r.is_empty() {
                if c.len() > run.best.size() {
                    let mut found = c.clone();
                    if run.best.try_publish(&mut found) {
                        if self.verbose {
                            println!("[branch]\t current max clique = {}", run.best.size());
                        }
                        run.after_publish();
                    }
                }
            } else {
                color_sort(&mut r, colors, filter);
                let bound = r.last().map_or(0, |t| t.bound as usize);
                if c.len() + bound > run.best.size() {
                    self.branch(&mut r, c, colors, filter, run);
                }
            }
            c.pop();
        }
    }
}

// ============================================================================
// Greedy coloring
// ============================================================================

/// Greedy coloring used as the clique upper bound.
///
/// Each candidate gets the smallest color class containing none of its
/// neighbors; `P` is rebuilt grouped by class, ascending, with
/// `bound = color index + 1`. The number of classes bounds the largest
/// clique inside `P`, and the ascending layout lets the branch loop cut
/// whole suffixes on one comparison.
fn color_sort<F: NeighborFilter>(p: &mut Vec<Vertex>, colors: &mut Vec<Vec<u32>>, filter: &mut F) {
    for class in colors.iter_mut() {
        class.clear();
    }
    let mut used = 0usize;

    for j in 0..p.len() {
        let w = p[j].id;
        filter.mark(w as usize);
        let mut k = 0usize;
        while k < used && colors[k].iter().any(|&m| filter.hit(m as usize)) {
            k += 1;
        }
        filter.clear(w as usize);

        if k == used {
            used += 1;
            if colors.len() < used {
                colors.push(Vec::new());
            }
        }
        colors[k].push(w);
    }

    p.clear();
    for (k, class) in colors.iter().take(used).enumerate() {
        for &w in class {
            p.push(Vertex::new(w, k as u32 + 1));
        }
    }
}

// ============================================================================
// Library driver
// ============================================================================

/// Computes the maximum clique of `graph` under `params`.
///
/// Sequences the pipeline: optional neighbor-list sort, core
/// decomposition, heuristic seeding, initial pruning with a core
/// recomputation on the survivors, then the exact search. A graph with at
/// least one vertex always yields a clique of size at least one.
///
/// # Errors
/// Returns [`ConfigError`] when the configuration fails validation.
pub fn max_clique(graph: &mut Graph, params: &SearchParams) -> Result<SearchOutcome, ConfigError> {
    params.validate()?;

    match params.edge_sort_order {
        EdgeSortOrder::None => {}
        EdgeSortOrder::Ascending => graph.degree_bucket_sort(false),
        EdgeSortOrder::Descending => graph.degree_bucket_sort(true),
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(params.threads)
        .build()
        .map_err(|e| ConfigError::OutOfRange {
            option: "threads",
            value: e.to_string(),
        })?;

    let base_seed = params.base_seed();
    let graph = &*graph;

    pool.install(|| {
        let cores = CoreDecomposition::compute(graph);
        let (ub, param_ub) = params.resolve_bounds(cores.max_core());
        let best = BestState::new(params.lb, param_ub);

        HeuristicSearcher::new(graph, &cores, params.heu_strat, base_seed).search(&best);

        let mut time_expired = false;
        if best.size() < ub && !best.found_ub() {
            let mask = PruneMask::new(graph.num_vertices());
            best.locked(|| prune::initial_prune(graph, &mask, cores.core(), best.size()));

            // Cores only shrink on the reduced graph; recomputing them
            // tightens every bound the branch uses.
            let reduced = CoreDecomposition::recompute(graph, &mask);
            best.locked(|| prune::prune_below_core(&mask, reduced.core(), best.size()));

            let searcher = MaxCliqueSearcher::new(graph, &reduced, params, base_seed);
            time_expired = searcher.search(&best, &mask);
        }

        let (size, mut clique) = best.into_result();
        // A non-empty graph always has the singleton clique.
        if clique.is_empty() && size == 0 && graph.num_vertices() > 0 {
            clique.push(0);
        }
        let size = size.max(clique.len());
        Ok(SearchOutcome {
            size,
            clique,
            time_expired,
        })
    })
}

// ============================================================================
// Tests
// ============================================================================
