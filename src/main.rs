use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use crossterm::style::Stylize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use swap_puzzle::{Cell, GridState, PathSearch, SearchConfig, StateGraph, Swap};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    /// Breadth-first search over the exhaustive state graph (small grids only)
    Bfs,
    /// Breadth-first search generating neighbors on demand
    Incremental,
    /// A* search
    Astar,
}

/// Scramble (or load) a swap puzzle and print a shortest solution.
#[derive(Debug, Parser)]
#[command(name = "swap-puzzle")]
struct Args {
    /// Grid rows when scrambling
    #[arg(long, default_value_t = 3)]
    rows: usize,

    /// Grid columns when scrambling
    #[arg(long, default_value_t = 3)]
    cols: usize,

    /// Load the grid from a file ("m n" line followed by m rows)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Seed for a reproducible scramble
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = Algorithm::Astar)]
    algorithm: Algorithm,

    /// TOML file with search limits
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("swap_puzzle=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SearchConfig::load(path)?,
        None => SearchConfig::default(),
    };

    let puzzle = match &args.file {
        Some(path) => GridState::from_file(path)?,
        None => {
            if args.rows == 0 || args.cols == 0 {
                return Err("rows and cols must be positive".into());
            }
            let mut rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            GridState::shuffled(args.rows, args.cols, &mut rng)
        }
    };
    let target = GridState::sorted(puzzle.rows(), puzzle.cols());

    println!("Shuffled Puzzle:\n{}", puzzle);

    let search = PathSearch::new(config);
    let path = match args.algorithm {
        Algorithm::Bfs => {
            let graph = StateGraph::exhaustive(puzzle.rows(), puzzle.cols(), search.config())?;
            search.bfs(&graph, &puzzle, &target)?
        }
        Algorithm::Incremental => search.incremental_bfs(&puzzle, &target)?,
        Algorithm::Astar => search.a_star(&puzzle, &target)?,
    };

    let Some(path) = path else {
        println!("No solution found");
        return Ok(());
    };
    info!(algorithm = ?args.algorithm, moves = path.len_moves(), "solved");
    println!("Found optimal solution with: {} moves\n", path.len_moves());

    for (swap, state) in path.swaps().into_iter().zip(&path.states()[1..]) {
        println!("{}\n{}", swap, render(state, swap));
    }

    Ok(())
}

/// Formats `state` with the two swapped cells highlighted.
fn render(state: &GridState, swap: Swap) -> String {
    let width = (state.rows() * state.cols()).to_string().len();
    let mut out = String::new();
    for row in 0..state.rows() {
        for col in 0..state.cols() {
            let value = state.get((row, col)).unwrap_or_default();
            let text = format!("{:width$}", value);
            let cell = Cell::new(row, col);
            if cell == swap.first || cell == swap.second {
                out.push_str(&format!("{} ", text.bold().yellow()));
            } else {
                out.push_str(&format!("{} ", text));
            }
        }
        out.push('\n');
    }
    out
}
