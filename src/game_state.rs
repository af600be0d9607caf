use crate::corpus::{Corpus, read_starting_guesses, write_starting_guesses};
use crate::feedback::Feedback;
use crate::opening::Opening;
use crate::selector::{Recommendation, rank_candidates};
use crate::session::{Session, SessionState};
use crate::{debug_log, info_log};
use std::path::{Path, PathBuf};

const STARTING_GUESS_COUNT: usize = 5;

/// Something the player asked for while being prompted for a guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// The player played their own opening.
    Guess(Opening),
    /// The player played the recommended opening.
    AcceptRecommendation,
    Exit,
    NewGame,
}

/// What the player answered when asked for feedback on a guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackInput {
    Marked(Vec<Feedback>),
    /// Unusable feedback; the round is abandoned and the guess prompt shown again.
    Invalid,
    Exit,
}

#[derive(Debug, Clone)]
pub struct StartingGuessesInfo {
    pub guesses: Vec<Opening>,
    pub used_cache: bool,
    pub cache_path: Option<PathBuf>,
}

/// Input and output hooks the interactive loop drives.
pub trait GameInterface {
    fn display_starting_guesses(&mut self, info: &StartingGuessesInfo);
    /// `None` means the input was invalid and the player should be asked again.
    fn read_guess(&mut self, recommendation: Option<&Recommendation>) -> Option<UserAction>;
    fn read_feedback(&mut self, guess: &Opening) -> FeedbackInput;
    fn display_feedback(&mut self, guess: &Opening, feedback: &[Feedback]);
    fn display_candidates(&mut self, candidates: &[&Opening]);
    fn display_recommendation(&mut self, recommendation: &Recommendation);
    fn display_no_candidates_message(&mut self);
    fn display_solution_found(&mut self, solution: &Opening, guesses: usize);
    fn display_error(&mut self, message: &str);
    fn display_exit_message(&mut self);
    fn display_new_game_message(&mut self, opening_count: usize);
}

/// Tally of the games played in one interactive run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameResult {
    /// Guess counts of solved games, in play order.
    pub solved: Vec<usize>,
    pub stuck: usize,
}

/// Runs interactive games until the player exits.
///
/// Each round the player plays an opening (usually the recommended one)
/// and reports the feedback the game gave them.
pub fn game_loop<I: GameInterface + ?Sized>(
    corpus: &Corpus,
    interface: &mut I,
    cache_path: Option<&Path>,
) -> GameResult {
    let (starting_guesses, used_cache) = load_or_compute_starting_guesses(corpus, cache_path);
    interface.display_starting_guesses(&StartingGuessesInfo {
        guesses: starting_guesses,
        used_cache,
        cache_path: cache_path.map(Path::to_path_buf),
    });

    let mut result = GameResult::default();
    let mut session = Session::new(corpus);
    let mut recommendation = Recommendation::from_candidates(session.candidates()).ok();

    loop {
        let guess = match interface.read_guess(recommendation.as_ref()) {
            None => continue,
            Some(UserAction::Exit) => {
                interface.display_exit_message();
                break;
            }
            Some(UserAction::NewGame) => {
                session.reset();
                recommendation = Recommendation::from_candidates(session.candidates()).ok();
                interface.display_new_game_message(corpus.len());
                if let Some(rec) = &recommendation {
                    interface.display_recommendation(rec);
                }
                continue;
            }
            Some(UserAction::AcceptRecommendation) => match &recommendation {
                Some(rec) => rec.guess.clone(),
                None => {
                    interface.display_error("There is no recommendation to accept.");
                    continue;
                }
            },
            Some(UserAction::Guess(guess)) => {
                if guess.len() != corpus.opening_length() {
                    interface.display_error(&format!(
                        "Openings have {} moves, that guess has {}.",
                        corpus.opening_length(),
                        guess.len()
                    ));
                    continue;
                }
                guess
            }
        };

        if session.state() != SessionState::Active {
            interface.display_error("This game is over. Start a new game with 'next'.");
            continue;
        }

        info_log!("Guess {}: {}", session.guess_count() + 1, guess);
        let feedback = match interface.read_feedback(&guess) {
            FeedbackInput::Marked(feedback) => feedback,
            FeedbackInput::Invalid => continue,
            FeedbackInput::Exit => {
                interface.display_exit_message();
                break;
            }
        };

        match session.submit(&guess, &feedback) {
            Err(e) => {
                debug_log!("Rejected round: {}", e);
                interface.display_error(&e.to_string());
            }
            Ok(SessionState::Solved) => {
                interface.display_feedback(&guess, &feedback);
                interface.display_solution_found(&guess, session.guess_count());
                result.solved.push(session.guess_count());
                recommendation = None;
            }
            Ok(SessionState::Stuck) => {
                interface.display_feedback(&guess, &feedback);
                interface.display_no_candidates_message();
                result.stuck += 1;
                recommendation = None;
            }
            Ok(SessionState::Active) => {
                interface.display_feedback(&guess, &feedback);
                interface.display_candidates(session.candidates());
                recommendation = Recommendation::from_candidates(session.candidates()).ok();
                if let Some(rec) = &recommendation {
                    interface.display_recommendation(rec);
                }
            }
        }
    }

    result
}

/// Best openings for the first guess, read from `cache_path` when it holds
/// guesses for this corpus, computed and written back otherwise.
pub fn load_or_compute_starting_guesses(
    corpus: &Corpus,
    cache_path: Option<&Path>,
) -> (Vec<Opening>, bool) {
    if let Some(path) = cache_path
        && let Some(guesses) = read_starting_guesses(path, corpus)
    {
        return (guesses, true);
    }

    let all: Vec<&Opening> = corpus.openings().iter().collect();
    let guesses: Vec<Opening> = rank_candidates(&all)
        .into_iter()
        .take(STARTING_GUESS_COUNT)
        .map(|(opening, _)| opening.clone())
        .collect();

    if let Some(path) = cache_path
        && let Err(e) = write_starting_guesses(path, corpus, &guesses)
    {
        info_log!("Could not write starting guesses to {}: {}", path.display(), e);
    }

    (guesses, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::load_corpus_from_str;
    use std::collections::VecDeque;

    /// Scripted interface that records what the loop showed.
    #[derive(Default)]
    struct Scripted {
        actions: VecDeque<Option<UserAction>>,
        feedback: VecDeque<FeedbackInput>,
        feedback_reads: usize,
        recommendations: Vec<Opening>,
        errors: Vec<String>,
        solved: Vec<(Opening, usize)>,
        stuck: usize,
        new_games: usize,
    }

    impl Scripted {
        fn new(actions: Vec<Option<UserAction>>, feedback: Vec<&str>) -> Self {
            Self {
                actions: actions.into(),
                feedback: feedback
                    .into_iter()
                    .map(|f| match f {
                        "exit" => FeedbackInput::Exit,
                        _ => crate::feedback::parse_feedback(f, 3)
                            .map_or(FeedbackInput::Invalid, FeedbackInput::Marked),
                    })
                    .collect(),
                ..Self::default()
            }
        }
    }

    impl GameInterface for Scripted {
        fn display_starting_guesses(&mut self, _info: &StartingGuessesInfo) {}

        fn read_guess(&mut self, _recommendation: Option<&Recommendation>) -> Option<UserAction> {
            self.actions.pop_front().unwrap_or(Some(UserAction::Exit))
        }

        fn read_feedback(&mut self, _guess: &Opening) -> FeedbackInput {
            self.feedback_reads += 1;
            self.feedback.pop_front().unwrap_or(FeedbackInput::Exit)
        }

        fn display_feedback(&mut self, _guess: &Opening, _feedback: &[Feedback]) {}

        fn display_candidates(&mut self, _candidates: &[&Opening]) {}

        fn display_recommendation(&mut self, recommendation: &Recommendation) {
            self.recommendations.push(recommendation.guess.clone());
        }

        fn display_no_candidates_message(&mut self) {
            self.stuck += 1;
        }

        fn display_solution_found(&mut self, solution: &Opening, guesses: usize) {
            self.solved.push((solution.clone(), guesses));
        }

        fn display_error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }

        fn display_exit_message(&mut self) {}

        fn display_new_game_message(&mut self, _opening_count: usize) {
            self.new_games += 1;
        }
    }

    fn corpus() -> Corpus {
        load_corpus_from_str("e4 e5 Nf3\ne4 c5 Nf3\nd4 d5 c4\nd4 Nf6 c4\n", 3)
    }

    fn guess(text: &str) -> Option<UserAction> {
        Some(UserAction::Guess(Opening::parse(text)))
    }

    #[test]
    fn test_immediate_exit() {
        let corpus = corpus();
        let mut ui = Scripted::new(vec![Some(UserAction::Exit)], vec![]);
        let result = game_loop(&corpus, &mut ui, None);
        assert_eq!(result, GameResult::default());
    }

    #[test]
    fn test_win_on_first_guess() {
        let corpus = corpus();
        let mut ui = Scripted::new(vec![guess("e4 e5 Nf3")], vec!["ccc"]);
        let result = game_loop(&corpus, &mut ui, None);
        assert_eq!(result.solved, vec![1]);
        assert_eq!(ui.solved, vec![(Opening::parse("e4 e5 Nf3"), 1)]);
    }

    #[test]
    fn test_accept_recommendation_then_win() {
        let corpus = corpus();
        let mut ui = Scripted::new(
            vec![
                Some(UserAction::AcceptRecommendation),
                Some(UserAction::AcceptRecommendation),
            ],
            vec!["cic", "ccc"],
        );
        let result = game_loop(&corpus, &mut ui, None);
        // e4 e5 Nf3 first, then the only remaining candidate.
        assert_eq!(ui.recommendations, vec![Opening::parse("e4 c5 Nf3")]);
        assert_eq!(result.solved, vec![2]);
    }

    #[test]
    fn test_wrong_length_guess_is_rejected() {
        let corpus = corpus();
        let mut ui = Scripted::new(vec![guess("e4 e5"), Some(UserAction::Exit)], vec![]);
        game_loop(&corpus, &mut ui, None);
        assert_eq!(ui.errors.len(), 1);
    }

    #[test]
    fn test_invalid_feedback_reprompts() {
        let corpus = corpus();
        let mut ui = Scripted::new(
            vec![guess("e4 e5 Nf3"), None, guess("e4 e5 Nf3")],
            vec!["xyz", "ccc"],
        );
        let result = game_loop(&corpus, &mut ui, None);
        assert_eq!(result.solved, vec![1]);
    }

    #[test]
    fn test_contradiction_then_new_game() {
        let corpus = corpus();
        let mut ui = Scripted::new(
            vec![
                guess("e4 e5 Nf3"),
                guess("d4 d5 c4"),
                Some(UserAction::NewGame),
                guess("d4 d5 c4"),
            ],
            vec!["ccm", "ccc"],
        );
        let result = game_loop(&corpus, &mut ui, None);
        assert_eq!(result.stuck, 1);
        assert_eq!(ui.stuck, 1);
        assert_eq!(ui.errors.len(), 1, "guess after stuck must be refused");
        assert_eq!(ui.feedback_reads, 2);
        assert_eq!(ui.new_games, 1);
        assert_eq!(result.solved, vec![1]);
    }

    #[test]
    fn test_guess_after_solved_skips_feedback() {
        let corpus = corpus();
        let mut ui = Scripted::new(vec![guess("e4 e5 Nf3"), guess("d4 d5 c4")], vec!["ccc"]);
        let result = game_loop(&corpus, &mut ui, None);
        assert_eq!(result.solved, vec![1]);
        assert_eq!(ui.feedback_reads, 1);
        assert_eq!(ui.errors.len(), 1);
    }

    #[test]
    fn test_exit_while_giving_feedback() {
        let corpus = corpus();
        let mut ui = Scripted::new(vec![guess("e4 e5 Nf3"), guess("d4 d5 c4")], vec!["exit"]);
        let result = game_loop(&corpus, &mut ui, None);
        assert_eq!(result, GameResult::default());
        assert_eq!(ui.feedback_reads, 1);
        assert_eq!(ui.actions.len(), 1, "loop must stop without asking again");
    }

    #[test]
    fn test_starting_guesses_are_cached() {
        let corpus = corpus();
        let path = std::env::temp_dir().join("chessle_solver_game_state_cache.txt");
        let _ = std::fs::remove_file(&path);

        let (computed, used_cache) = load_or_compute_starting_guesses(&corpus, Some(&path));
        assert!(!used_cache);
        assert_eq!(computed.len(), 4);

        let (cached, used_cache) = load_or_compute_starting_guesses(&corpus, Some(&path));
        assert!(used_cache);
        assert_eq!(cached, computed);

        let _ = std::fs::remove_file(&path);
    }
}
