use chessle_solver::cli::{CliInterface, parse_cli};
use chessle_solver::corpus::{
    Corpus, EMBEDDED_CORPUS, load_corpus_from_file, load_corpus_from_str_with_min_games,
    starting_guesses_path,
};
use chessle_solver::feedback::render_feedback;
use chessle_solver::logging::{default_log_path, init_logging};
use chessle_solver::opening::Opening;
use chessle_solver::session::{simulate_run, simulate_runs};
use chessle_solver::tui::TuiInterface;
use chessle_solver::{game_loop, info_log};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = parse_cli();

    if let Some(path) = cli.log_file.clone().or_else(default_log_path)
        && let Err(e) = init_logging(&path)
    {
        eprintln!("Logging disabled ({}): {e}", path.display());
    }

    let corpus = match &cli.corpus_path {
        Some(path) => match load_corpus_from_file(path, cli.length, cli.min_games) {
            Ok(corpus) => corpus,
            Err(e) => {
                eprintln!("Failed to load openings from '{path}': {e}");
                return ExitCode::FAILURE;
            }
        },
        None => load_corpus_from_str_with_min_games(EMBEDDED_CORPUS, cli.length, cli.min_games),
    };
    if corpus.is_empty() {
        eprintln!("No openings of {} moves were found.", cli.length);
        return ExitCode::FAILURE;
    }
    info_log!("Corpus ready: {} openings", corpus.len());
    println!("Loaded {} openings.", corpus.len());

    if let Some(solution) = &cli.solution {
        return run_single_simulation(&corpus, &Opening::parse(solution));
    }

    if let Some(games) = cli.simulate {
        let mut rng = match cli.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        return run_simulations(&corpus, games, &mut rng);
    }

    let cache_path = if cli.no_cache {
        None
    } else {
        starting_guesses_path(corpus.opening_length())
    };

    let result = if cli.tui {
        match TuiInterface::new(corpus.opening_length()) {
            Ok(mut interface) => game_loop(&corpus, &mut interface, cache_path.as_deref()),
            Err(e) => {
                eprintln!("Failed to start the terminal interface: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        let stdin = io::stdin();
        let mut interface = CliInterface::new(stdin.lock(), corpus.opening_length());
        game_loop(&corpus, &mut interface, cache_path.as_deref())
    };

    info_log!(
        "Session finished: {} solved, {} stuck",
        result.solved.len(),
        result.stuck
    );
    ExitCode::SUCCESS
}

fn run_single_simulation(corpus: &Corpus, solution: &Opening) -> ExitCode {
    println!("Solution: {solution}");
    match simulate_run(corpus, solution) {
        Ok(rounds) => {
            for round in &rounds {
                println!("{}\n{}", round.guess, render_feedback(&round.feedback));
            }
            println!("Found the solution in {} guesses!", rounds.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Simulation failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_simulations(corpus: &Corpus, games: usize, rng: &mut StdRng) -> ExitCode {
    let summary = match simulate_runs(corpus, games, rng) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Simulation failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("Simulated {} games.", summary.games());
    if let (Some(mean), Some(max)) = (summary.mean(), summary.max()) {
        println!("Average guesses: {mean:.2} (worst {max})");
    }
    for (guesses, count) in summary.histogram() {
        println!("{guesses:>3} guesses: {count}");
    }
    if summary.stuck > 0 {
        println!("Stuck on contradictory feedback: {}", summary.stuck);
    }
    ExitCode::SUCCESS
}
