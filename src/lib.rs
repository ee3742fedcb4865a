//! # Maximum Clique Search
//!
//! A high-performance Rust library for computing the maximum clique of
//! large sparse undirected graphs.
//!
//! This crate provides:
//! - A compact CSR graph with an optional dense bitmap adjacency for
//!   dense subproblems.
//! - An `O(n + m)` k-core decomposition feeding degeneracy orderings and
//!   pruning bounds.
//! - A parallel greedy heuristic that seeds a strong lower bound.
//! - A parallel branch-and-bound **exact** searcher with greedy-coloring
//!   upper bounds and dynamic vertex pruning.
//!
//! ## Quick Start
//!
//! ```
//! use maxclique::graph::Graph;
//! use maxclique::config::SearchParams;
//! use maxclique::search::max_clique;
//!
//! // Two triangles sharing no vertex: the maximum clique has size 3.
//! let edges = [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)];
//! let mut graph = Graph::from_edge_list(6, &edges, 0).unwrap();
//!
//! let params = SearchParams { threads: 2, ..SearchParams::default() };
//! let result = max_clique(&mut graph, &params).unwrap();
//! assert_eq!(result.size, 3);
//! assert!(graph.is_clique(&result.clique));
//! ```
//!
//! ## Loading Graph Files
//!
//! ```no_run
//! use maxclique::io::read_graph;
//!
//! // Matrix Market, edge list, and METIS inputs are detected by extension.
//! let graph = read_graph("web-google.mtx").expect("readable graph");
//! println!("n = {}, m = {}", graph.num_vertices(), graph.num_edges());
//! ```
//!
//! ## Modules
//!
//! - [`graph`]: CSR representation, dense bitmap, neighbor-list ordering.
//! - [`kcore`]: core numbers, degeneracy ordering, post-prune recomputation.
//! - [`prune`]: the monotone removal mask and its elimination passes.
//! - [`heuristic`]: the parallel greedy lower-bound seeder.
//! - [`search`]: the parallel exact branch-and-bound searcher and driver.
//! - [`best`]: the shared best-clique state.
//! - [`config`]: search options and strategy parsing.
//! - [`io`]: Matrix Market / edge list / METIS readers.
//!
//! ## Performance Notes
//!
//! - Workers share exactly three mutable items: the monotone best size,
//!   the `found_ub` latch, and the witness vector; everything else is
//!   thread-local scratch reused across seeds.
//! - Candidate filtering is `O(|P|)` per branch level via a reversible
//!   neighborhood marker; dense instances use bitmap probes instead.
//! - For maximum performance, compile with:
//!   `RUSTFLAGS="-C target-cpu=native" cargo build --release`

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::inline_always)] // Intentional for hot-path code
#![allow(clippy::many_single_char_names)] // Mathematical variable names
#![allow(clippy::needless_range_loop)] // Often clearer for index juggling
#![allow(clippy::multiple_crate_versions)] // Cargo.lock management is external

pub mod best;
pub mod config;
pub mod graph;
pub mod heuristic;
pub mod io;
pub mod kcore;
pub mod prune;
pub mod search;

/// Re-export commonly used types for convenience.
pub mod prelude {
    pub use crate::best::BestState;
    pub use crate::config::{
        ConfigError, EdgeSortOrder, HeuristicStrategy, SearchParams, VertexOrder,
    };
    pub use crate::graph::{Graph, GraphError, Vertex};
    pub use crate::heuristic::HeuristicSearcher;
    pub use crate::io::read_graph;
    pub use crate::kcore::CoreDecomposition;
    pub use crate::prune::PruneMask;
    pub use crate::search::{max_clique, MaxCliqueSearcher, SearchOutcome};
}
