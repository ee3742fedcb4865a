use std::time::Instant;

use maxclique::config::SearchParams;
use maxclique::io::read_graph;
use maxclique::search::max_clique;

fn main() {
    let mut params = SearchParams::default();
    let mut file: Option<String> = None;
    let mut dense_budget_mb: Option<usize> = None;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-t" | "--threads" => {
                params.threads = parse_value(&args, i);
                i += 2;
            }
            "-l" | "--lb" => {
                params.lb = parse_value(&args, i);
                i += 2;
            }
            "-u" | "--ub" => {
                params.ub = parse_value(&args, i);
                i += 2;
            }
            "--param-ub" => {
                params.param_ub = parse_value(&args, i);
                i += 2;
            }
            "--time-limit" => {
                params.time_limit = parse_value(&args, i);
                i += 2;
            }
            "--remove-time" => {
                params.remove_time = parse_value(&args, i);
                i += 2;
            }
            "--heu" => {
                params.heu_strat = parse_value(&args, i);
                i += 2;
            }
            "--order" => {
                params.vertex_search_order = parse_value(&args, i);
                i += 2;
            }
            "--decreasing" => {
                params.decreasing_order = true;
                i += 1;
            }
            "--edge-sort" => {
                params.edge_sort_order = parse_value(&args, i);
                i += 2;
            }
            "--seed" => {
                params.seed = Some(parse_value(&args, i));
                i += 2;
            }
            "--dense" => {
                dense_budget_mb = Some(parse_value(&args, i));
                i += 2;
            }
            "--help" | "-h" => usage_and_exit(0),
            s if !s.starts_with('-') && file.is_none() => {
                file = Some(s.to_owned());
                i += 1;
            }
            _ => usage_and_exit(2),
        }
    }

    let Some(file) = file else { usage_and_exit(2) };

    let mut graph = match read_graph(&file) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("error reading {file}: {e}");
            std::process::exit(1);
        }
    };

    println!("--------------------------------------------------");
    println!("File: {file}");
    println!(
        "Vertices: {} | Edges: {} | Density: {:.6}",
        graph.num_vertices(),
        graph.num_edges(),
        graph.density()
    );
    println!(
        "Degrees: min = {}, max = {}, avg = {:.2}",
        graph.min_degree(),
        graph.max_degree(),
        graph.avg_degree()
    );
    println!(
        "Threads: {} | Heuristic: {:?} | Order: {:?}",
        params.threads, params.heu_strat, params.vertex_search_order
    );
    if let Some(mb) = dense_budget_mb {
        let built = graph.build_dense(mb * 1024 * 1024);
        println!(
            "Dense adjacency: {}",
            if built { "built" } else { "over budget, skipped" }
        );
    }
    println!("--------------------------------------------------");

    let start = Instant::now();
    let outcome = match max_clique(&mut graph, &params) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(2);
        }
    };

    if outcome.time_expired {
        println!("Time limit reached; reporting the best clique found so far.");
    }
    if !graph.is_clique(&outcome.clique) {
        eprintln!("internal error: reported witness is not a clique");
        std::process::exit(1);
    }

    println!(
        "Maximum clique: size = {} | time = {:.3}s",
        outcome.size,
        start.elapsed().as_secs_f64()
    );
    let ids: Vec<String> = outcome.clique.iter().map(ToString::to_string).collect();
    println!("Clique: {}", ids.join(" "));
}

/// Parses the value following flag `args[i]`, exiting with usage on error.
fn parse_value<T: std::str::FromStr>(args: &[String], i: usize) -> T {
    let Some(raw) = args.get(i + 1) else { usage_and_exit(2) };
    match raw.parse::<T>() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("invalid value for {}: {raw}", args[i]);
            usage_and_exit(2)
        }
    }
}

fn usage_and_exit(code: i32) -> ! {
    eprintln!(
        "Usage:\n  maxclique FILE [options]\n\nOptions:\n  -t, --threads N        Worker threads (default: all cores)\n  -l, --lb N             Starting lower bound (default: 0)\n  -u, --ub N             Known upper bound; 0 = unknown (default: 0)\n      --param-ub N       Early-exit threshold; 0 = use ub (default: 0)\n      --time-limit SECS  Wall-clock budget (default: 3600)\n      --remove-time SECS Interval between dynamic prunes (default: 4)\n      --heu STRAT        kcore|deg|kcore_deg|var|rand|id (default: kcore)\n      --order ORDER      kcore|deg|dual_deg|dual_kcore|kcore_deg|rand\n      --decreasing       Sort seeds by decreasing bound\n      --edge-sort ORDER  none|asc|desc neighbor sort by endpoint degree\n      --seed N           Base RNG seed for deterministic replay\n      --dense MB         Build the dense adjacency if it fits in MB\n  -h, --help             Show this help\n\nInput formats: .mtx (Matrix Market), .graph (METIS), anything else is\nread as a whitespace edge list with the offset auto-detected.\n"
    );
    std::process::exit(code)
}
