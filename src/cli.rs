use crate::feedback::{Feedback, parse_feedback, render_feedback};
use crate::game_state::{FeedbackInput, GameInterface, StartingGuessesInfo, UserAction};
use crate::opening::Opening;
use crate::selector::Recommendation;
use clap::Parser;
use std::io::BufRead;
use std::path::{Path, PathBuf};

const MAX_CANDIDATES_DISPLAY: usize = 5;

/// Chessle solver CLI options
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to an opening corpus file (one line of SAN moves per opening)
    #[arg(short = 'i', long = "input")]
    pub corpus_path: Option<String>,

    /// Number of moves in each opening
    #[arg(short = 'l', long = "length", default_value_t = crate::corpus::DEFAULT_OPENING_LENGTH)]
    pub length: usize,

    /// Drop continuations that appear on fewer corpus lines than this
    #[arg(long = "min-games", default_value_t = 0)]
    pub min_games: u64,

    /// Use the full-screen terminal interface
    #[arg(long)]
    pub tui: bool,

    /// Simulate this many games against random solutions instead of playing
    #[arg(long, value_name = "GAMES")]
    pub simulate: Option<usize>,

    /// Simulate a single game against this solution
    #[arg(long, value_name = "MOVES", conflicts_with = "simulate")]
    pub solution: Option<String>,

    /// Seed for picking simulated solutions
    #[arg(long)]
    pub seed: Option<u64>,

    /// Where to write the log file
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Do not read or write the starting guess cache
    #[arg(long = "no-cache")]
    pub no_cache: bool,
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

// UI Input/Output functions

#[derive(Debug, PartialEq, Eq)]
pub enum GuessInput {
    Valid(Opening),
    Accept,
    Invalid,
    Exit,
    NewGame,
}

fn is_valid_guess(guess: &Opening, length: usize) -> bool {
    guess.len() == length
}

/// Reads one line; `None` on end of input or a read error.
fn read_input_line<R: BufRead>(reader: &mut R) -> Option<String> {
    let mut input = String::new();
    match reader.read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim().to_string()),
    }
}

pub fn display_starting_guesses(guesses: &[Opening], used_cache: bool, cache_path: Option<&Path>) {
    println!("Strong first guesses:");
    for (i, guess) in guesses.iter().enumerate() {
        println!("{}. {}", i + 1, guess);
    }

    if let Some(path) = cache_path {
        if used_cache {
            println!("(Loaded from cache: {}.)", path.display());
        } else {
            println!("(Computed and cached to: {}.)", path.display());
        }
    }
}

pub fn read_guess<R: BufRead>(
    reader: &mut R,
    length: usize,
    recommendation: Option<&Recommendation>,
) -> GuessInput {
    match recommendation {
        Some(rec) => println!(
            "\nEnter your guess ({length} moves), press ENTER to play {}, 'next' for a new game or 'exit' to quit:",
            rec.guess
        ),
        None => println!(
            "\nEnter your guess ({length} moves), 'next' for a new game or 'exit' to quit:"
        ),
    }
    let Some(input) = read_input_line(reader) else {
        return GuessInput::Exit;
    };

    if input.is_empty() {
        return GuessInput::Accept;
    }
    if input.eq_ignore_ascii_case("exit") {
        return GuessInput::Exit;
    }
    if input.eq_ignore_ascii_case("next") {
        return GuessInput::NewGame;
    }

    let guess = Opening::parse(&input);
    if is_valid_guess(&guess, length) {
        GuessInput::Valid(guess)
    } else {
        println!(
            "Invalid guess. Please enter {length} moves separated by spaces (got {}).",
            guess.len()
        );
        GuessInput::Invalid
    }
}

pub fn read_feedback<R: BufRead>(reader: &mut R, length: usize) -> FeedbackInput {
    println!("Enter feedback (c=correct, m=misplaced, i=incorrect, e.g. ccmiiiiiii):");
    let Some(input) = read_input_line(reader) else {
        return FeedbackInput::Exit;
    };
    if input.eq_ignore_ascii_case("exit") {
        return FeedbackInput::Exit;
    }

    match parse_feedback(&input, length) {
        Ok(feedback) => FeedbackInput::Marked(feedback),
        Err(e) => {
            println!("Invalid feedback: {e}.");
            FeedbackInput::Invalid
        }
    }
}

pub fn display_feedback(guess: &Opening, feedback: &[Feedback]) {
    println!("{guess}");
    println!("{}", render_feedback(feedback));
}

pub fn display_candidates(candidates: &[&Opening]) {
    println!("Possible openings ({})", candidates.len());
    for opening in candidates.iter().take(MAX_CANDIDATES_DISPLAY) {
        println!("{opening}");
    }
    if candidates.len() > MAX_CANDIDATES_DISPLAY {
        println!("...and {} more", candidates.len() - MAX_CANDIDATES_DISPLAY);
    }
}

pub fn display_recommendation(recommendation: &Recommendation) {
    println!(
        "Recommended guess: {} (score {}, {} openings left)",
        recommendation.guess, recommendation.score, recommendation.remaining
    );
}

pub fn display_exit_message() {
    println!("Exiting.");
}

pub fn display_new_game_message(opening_count: usize) {
    println!("New game started. Loaded {opening_count} openings.");
}

pub fn display_no_candidates_message() {
    println!("No openings match that feedback. Check your inputs and start a new game with 'next'.");
}

pub fn display_solution_found(solution: &Opening, guesses: usize) {
    println!("Solution found in {guesses} guesses: {solution}");
}

pub fn display_error(message: &str) {
    println!("{message}");
}

/// CLI implementation of the `GameInterface` trait
/// This struct wraps a `BufRead` reader and implements the game interface for CLI interaction
pub struct CliInterface<R: BufRead> {
    reader: R,
    length: usize,
}

impl<R: BufRead> CliInterface<R> {
    pub fn new(reader: R, length: usize) -> Self {
        Self { reader, length }
    }
}

impl<R: BufRead> GameInterface for CliInterface<R> {
    fn display_starting_guesses(&mut self, info: &StartingGuessesInfo) {
        display_starting_guesses(&info.guesses, info.used_cache, info.cache_path.as_deref());
    }

    fn read_guess(&mut self, recommendation: Option<&Recommendation>) -> Option<UserAction> {
        match read_guess(&mut self.reader, self.length, recommendation) {
            GuessInput::Valid(guess) => Some(UserAction::Guess(guess)),
            GuessInput::Accept => Some(UserAction::AcceptRecommendation),
            GuessInput::Exit => Some(UserAction::Exit),
            GuessInput::NewGame => Some(UserAction::NewGame),
            GuessInput::Invalid => None,
        }
    }

    fn read_feedback(&mut self, _guess: &Opening) -> FeedbackInput {
        read_feedback(&mut self.reader, self.length)
    }

    fn display_feedback(&mut self, guess: &Opening, feedback: &[Feedback]) {
        display_feedback(guess, feedback);
    }

    fn display_candidates(&mut self, candidates: &[&Opening]) {
        display_candidates(candidates);
    }

    fn display_recommendation(&mut self, recommendation: &Recommendation) {
        display_recommendation(recommendation);
    }

    fn display_no_candidates_message(&mut self) {
        display_no_candidates_message();
    }

    fn display_solution_found(&mut self, solution: &Opening, guesses: usize) {
        display_solution_found(solution, guesses);
    }

    fn display_error(&mut self, message: &str) {
        display_error(message);
    }

    fn display_exit_message(&mut self) {
        display_exit_message();
    }

    fn display_new_game_message(&mut self, opening_count: usize) {
        display_new_game_message(opening_count);
    }
}
