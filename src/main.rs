use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use slider::board::MAX_SIZE;
use slider::solver::DEFAULT_MAX_DEPTH;
use slider::{
    Board, Direction, GoalManhattan, Heuristic, ManhattanHeuristic, NullHeuristic, Puzzles,
    SolveResult, Solver, Strategy,
};
use std::time::Instant;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyType {
    Bfs,
    Dfs,
    Iddfs,
    Astar,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HeuristicType {
    /// Manhattan distance measured against the goal board
    Goal,
    /// Manhattan distance measured against the canonical layout
    Canonical,
    Null,
}

fn print_solution(start: &Board, solution: &[Direction]) {
    println!("\nStarting position:\n{}", start);
    let mut board = start.clone();
    let total = solution.len();
    for (count, &direction) in solution.iter().enumerate() {
        let Some(next) = board.apply(direction) else {
            warn!("move {} ({}) leaves the grid", count + 1, direction);
            return;
        };
        board = next;
        println!("Blank {} ({}/{}):\n{}", direction, count + 1, total, board);
    }
}

struct LevelStats {
    solved: bool,
    steps: usize,
    states_explored: usize,
    elapsed_ms: u128,
}

struct SolveOpts {
    level_num: usize,
    strategy: Strategy,
    max_nodes: usize,
    print_solution: bool,
}

fn solve_level_helper<H: Heuristic>(
    board: &Board,
    goal: &Board,
    opts: &SolveOpts,
    heuristic: H,
) -> anyhow::Result<LevelStats> {
    let blank = board
        .blank_position()
        .context("start board has no blank cell")?;

    let mut solver = Solver::new()
        .with_heuristic(heuristic)
        .with_max_nodes(opts.max_nodes);
    let start = Instant::now();
    let result = solver.solve(opts.strategy, board, blank, goal);
    let elapsed_ms = start.elapsed().as_millis();
    let states_explored = solver.nodes_explored();

    let (solved_char, steps, solved) = match &result {
        SolveResult::Solved(solution) => ('Y', solution.len(), true),
        SolveResult::Cutoff => ('N', 0, false),
        SolveResult::Impossible => ('X', 0, false),
    };

    println!(
        "puzzle: {:<3}  solved: {}  steps: {:<5}  states: {:<12}  elapsed: {} ms",
        opts.level_num, solved_char, steps, states_explored, elapsed_ms
    );

    if opts.print_solution {
        if let SolveResult::Solved(solution) = result {
            print_solution(board, &solution);
        }
    }

    Ok(LevelStats {
        solved,
        steps,
        states_explored,
        elapsed_ms,
    })
}

fn solve_level(
    board: &Board,
    goal: &Board,
    opts: &SolveOpts,
    heuristic_type: HeuristicType,
) -> anyhow::Result<LevelStats> {
    match heuristic_type {
        HeuristicType::Goal => solve_level_helper(board, goal, opts, GoalManhattan::new(goal)),
        HeuristicType::Canonical => solve_level_helper(board, goal, opts, ManhattanHeuristic),
        HeuristicType::Null => solve_level_helper(board, goal, opts, NullHeuristic),
    }
}

#[derive(Parser)]
#[command(name = "slider")]
#[command(about = "A sliding puzzle solver", long_about = None)]
struct Args {
    /// Path to the puzzles file (boards separated by blank or `;` lines)
    #[arg(value_name = "FILE", required_unless_present = "random")]
    puzzles_file: Option<String>,

    /// Puzzle number to solve (1-indexed), or start of range; all puzzles if omitted
    #[arg(value_name = "LEVEL")]
    level_start: Option<usize>,

    /// Optional end of puzzle range (inclusive, 1-indexed)
    #[arg(value_name = "LEVEL_END")]
    level_end: Option<usize>,

    /// Solve randomly scrambled boards of this size instead of reading a file
    #[arg(short = 'r', long, value_name = "SIZE", conflicts_with = "puzzles_file")]
    random: Option<usize>,

    /// Number of random blank moves used to scramble each random board
    #[arg(long, default_value = "40")]
    scramble_moves: usize,

    /// Number of random boards to generate
    #[arg(short = 'c', long, default_value = "1")]
    count: usize,

    /// Search strategy
    #[arg(short = 's', long, value_enum, default_value = "astar")]
    strategy: StrategyType,

    /// Depth bound for the dfs and iddfs strategies
    #[arg(short = 'm', long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Maximum number of nodes to expand before giving up
    #[arg(short = 'n', long)]
    max_nodes: Option<usize>,

    /// Heuristic used by A*
    #[arg(short = 'H', long, value_enum, default_value = "goal")]
    heuristic: HeuristicType,

    /// File holding the goal board (defaults to the canonical layout)
    #[arg(short = 'g', long, value_name = "GOAL_FILE")]
    goal: Option<String>,

    /// Print the solution step-by-step
    #[arg(short, long)]
    print_solution: bool,

    /// Search even when the goal is unreachable by parity
    #[arg(long, default_value = "false")]
    no_solvability_check: bool,
}

fn strategy(args: &Args) -> Strategy {
    match args.strategy {
        StrategyType::Bfs => Strategy::Bfs,
        StrategyType::Dfs => Strategy::Dfs {
            max_depth: args.max_depth,
        },
        StrategyType::Iddfs => Strategy::Iddfs {
            max_depth: args.max_depth,
        },
        StrategyType::Astar => Strategy::AStar,
    }
}

/// Boards to solve, paired with their 1-indexed puzzle numbers.
fn load_boards(args: &Args) -> anyhow::Result<Vec<(usize, Board)>> {
    if let Some(size) = args.random {
        if !(2..=MAX_SIZE).contains(&size) {
            bail!("board size must be between 2 and {}", MAX_SIZE);
        }
        let mut rng = rand::thread_rng();
        let goal = Board::canonical(size);
        return Ok((1..=args.count)
            .map(|num| (num, goal.scramble(args.scramble_moves, &mut rng)))
            .collect());
    }

    let path = args
        .puzzles_file
        .as_deref()
        .context("no puzzles file given")?;
    let puzzles =
        Puzzles::from_file(path).with_context(|| format!("failed to load puzzles from {}", path))?;

    if puzzles.is_empty() {
        bail!("{} contains no puzzles", path);
    }

    let level_start = args.level_start.unwrap_or(1);
    let level_end = match (args.level_start, args.level_end) {
        (_, Some(end)) => end,
        (Some(start), None) => start,
        (None, None) => puzzles.len(),
    };

    if level_start == 0 {
        bail!("puzzle numbers must be at least 1");
    }
    if level_end < level_start {
        bail!("puzzle end must be >= puzzle start");
    }
    if level_end > puzzles.len() {
        bail!(
            "puzzle {} not found (file contains {} puzzles)",
            level_end,
            puzzles.len()
        );
    }

    Ok((level_start..=level_end)
        .filter_map(|num| puzzles.get(num - 1).map(|board| (num, board.clone())))
        .collect())
}

fn load_goal(path: &str) -> anyhow::Result<Board> {
    let puzzles =
        Puzzles::from_file(path).with_context(|| format!("failed to load goal from {}", path))?;
    puzzles
        .get(0)
        .cloned()
        .with_context(|| format!("{} contains no goal board", path))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let boards = load_boards(&args)?;
    let custom_goal = args.goal.as_deref().map(load_goal).transpose()?;

    if args.print_solution && boards.len() > 1 {
        bail!("solution printing only supported when solving a single puzzle");
    }

    let strategy = strategy(&args);
    info!("solving {} puzzle(s) with {}", boards.len(), strategy);

    let mut total_solved = 0;
    let mut total_steps = 0;
    let mut total_states = 0;
    let mut total_time_ms = 0;

    for (level_num, board) in &boards {
        let goal = match &custom_goal {
            Some(goal) => goal.clone(),
            None => Board::canonical(board.size()),
        };

        if goal.size() != board.size() {
            warn!(
                "puzzle {} is {}x{} but the goal is {}x{}, skipping",
                level_num,
                board.size(),
                board.size(),
                goal.size(),
                goal.size()
            );
            continue;
        }

        if !args.no_solvability_check && !board.can_reach(&goal) {
            warn!("puzzle {} cannot reach the goal, skipping", level_num);
            println!(
                "puzzle: {:<3}  solved: X  steps: {:<5}  states: {:<12}  elapsed: 0 ms",
                level_num, 0, 0
            );
            continue;
        }

        let opts = SolveOpts {
            level_num: *level_num,
            strategy,
            max_nodes: args.max_nodes.unwrap_or(usize::MAX),
            print_solution: args.print_solution,
        };
        let stats = solve_level(board, &goal, &opts, args.heuristic)
            .with_context(|| format!("puzzle {}", level_num))?;

        if stats.solved {
            total_solved += 1;
        }
        total_steps += stats.steps;
        total_states += stats.states_explored;
        total_time_ms += stats.elapsed_ms;
    }

    if boards.len() > 1 {
        println!("---");
        println!(
            "solved: {:>3}/{:<3}        steps: {:<5}  states: {:<12}  elapsed: {} ms",
            total_solved,
            boards.len(),
            total_steps,
            total_states,
            total_time_ms
        );
    }

    Ok(())
}
