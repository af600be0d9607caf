//! The solve loop: guess, receive feedback, narrow, repeat.
//!
//! A [`Session`] starts `Active` and ends either `Solved` (a guess matched
//! the solution exactly) or `Stuck` (the feedback ruled out every opening).

use crate::constraints::Constraints;
use crate::corpus::Corpus;
use crate::error::SolverError;
use crate::feedback::{Feedback, get_feedback, is_solved};
use crate::info_log;
use crate::opening::Opening;
use crate::selector::choose_next_guess;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Solved,
    /// The feedback is contradictory; the caller should start over.
    Stuck,
}

/// One guess and the feedback it received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub guess: Opening,
    pub feedback: Vec<Feedback>,
}

#[derive(Debug, Clone)]
pub struct Session<'a> {
    constraints: Constraints<'a>,
    state: SessionState,
    rounds: Vec<Round>,
}

impl<'a> Session<'a> {
    #[must_use]
    pub fn new(corpus: &'a Corpus) -> Self {
        let constraints = Constraints::new(corpus);
        let state = if constraints.is_contradictory() {
            SessionState::Stuck
        } else {
            SessionState::Active
        };
        Self {
            constraints,
            state,
            rounds: Vec::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    #[must_use]
    pub fn guess_count(&self) -> usize {
        self.rounds.len()
    }

    #[must_use]
    pub fn candidates(&self) -> &[&'a Opening] {
        self.constraints.candidate_set()
    }

    #[must_use]
    pub fn constraints(&self) -> &Constraints<'a> {
        &self.constraints
    }

    #[must_use]
    pub fn opening_length(&self) -> usize {
        self.constraints.corpus().opening_length()
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.constraints.corpus());
    }

    /// The selector's pick among the remaining candidates.
    pub fn next_guess(&self) -> Result<&'a Opening, SolverError> {
        match self.state {
            SessionState::Active => choose_next_guess(self.constraints.candidate_set()),
            SessionState::Stuck => Err(SolverError::Contradiction),
            SessionState::Solved => Err(SolverError::SessionOver),
        }
    }

    /// Feeds the outcome of one guess into the session.
    pub fn submit(
        &mut self,
        guess: &Opening,
        feedback: &[Feedback],
    ) -> Result<SessionState, SolverError> {
        if self.state != SessionState::Active {
            return Err(SolverError::SessionOver);
        }
        let length = self.opening_length();
        for actual in [guess.len(), feedback.len()] {
            if actual != length {
                return Err(SolverError::InvalidLength {
                    expected: length,
                    actual,
                });
            }
        }

        self.rounds.push(Round {
            guess: guess.clone(),
            feedback: feedback.to_vec(),
        });

        if is_solved(feedback) {
            self.state = SessionState::Solved;
            return Ok(self.state);
        }

        self.constraints.apply_feedback(guess, feedback)?;
        if self.constraints.is_contradictory() {
            self.state = SessionState::Stuck;
        }
        Ok(self.state)
    }
}

/// Plays one game against a known solution, returning every round.
///
/// Fails with `Contradiction` if the solver talks itself out of the
/// solution, which can happen when a guess repeats a move.
pub fn simulate_run(corpus: &Corpus, solution: &Opening) -> Result<Vec<Round>, SolverError> {
    if !corpus.contains(solution) {
        return Err(SolverError::UnknownOpening(solution.to_string()));
    }
    let mut session = Session::new(corpus);
    while session.state() == SessionState::Active {
        let guess = session.next_guess()?;
        let feedback = get_feedback(guess, solution)?;
        session.submit(guess, &feedback)?;
    }
    match session.state() {
        SessionState::Solved => {
            info_log!(
                "Solved {} in {} guesses",
                solution,
                session.guess_count()
            );
            Ok(session.rounds)
        }
        _ => Err(SolverError::Contradiction),
    }
}

/// Results of many simulated games.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationSummary {
    /// Guesses needed by each solved game.
    pub guess_counts: Vec<usize>,
    /// Games that ended stuck.
    pub stuck: usize,
}

impl SimulationSummary {
    #[must_use]
    pub fn games(&self) -> usize {
        self.guess_counts.len() + self.stuck
    }

    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        if self.guess_counts.is_empty() {
            return None;
        }
        let total: usize = self.guess_counts.iter().sum();
        Some(total as f64 / self.guess_counts.len() as f64)
    }

    #[must_use]
    pub fn max(&self) -> Option<usize> {
        self.guess_counts.iter().copied().max()
    }

    /// Guess count -> number of games.
    #[must_use]
    pub fn histogram(&self) -> BTreeMap<usize, usize> {
        let mut histogram = BTreeMap::new();
        for &count in &self.guess_counts {
            *histogram.entry(count).or_insert(0) += 1;
        }
        histogram
    }
}

/// Simulates `runs` games with solutions drawn at random from the corpus.
pub fn simulate_runs<R: Rng + ?Sized>(
    corpus: &Corpus,
    runs: usize,
    rng: &mut R,
) -> Result<SimulationSummary, SolverError> {
    let mut summary = SimulationSummary::default();
    for _ in 0..runs {
        let solution = corpus
            .openings()
            .choose(rng)
            .ok_or(SolverError::EmptyCorpus)?;
        match simulate_run(corpus, solution) {
            Ok(rounds) => summary.guess_counts.push(rounds.len()),
            Err(SolverError::Contradiction) => {
                info_log!("Got stuck on {}", solution);
                summary.stuck += 1;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{DEFAULT_OPENING_LENGTH, EMBEDDED_CORPUS, load_corpus_from_str};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use Feedback::{Absent, Correct, Present};

    fn corpus() -> Corpus {
        load_corpus_from_str(
            "e4 e5 Nf3\n\
             e4 c5 Nf3\n\
             d4 d5 c4\n\
             d4 Nf6 c4\n\
             c4 e5 Nc3\n\
             Nf3 d5 g3\n",
            3,
        )
    }

    #[test]
    fn test_new_session_is_active() {
        let corpus = corpus();
        let session = Session::new(&corpus);
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.guess_count(), 0);
        assert_eq!(session.candidates().len(), 6);
    }

    #[test]
    fn test_empty_corpus_is_stuck() {
        let corpus = Corpus::new(Vec::new(), 3).unwrap();
        let session = Session::new(&corpus);
        assert_eq!(session.state(), SessionState::Stuck);
        assert_eq!(session.next_guess(), Err(SolverError::Contradiction));
    }

    #[test]
    fn test_submit_all_correct_solves() {
        let corpus = corpus();
        let mut session = Session::new(&corpus);
        let guess = session.next_guess().unwrap().clone();
        let state = session
            .submit(&guess, &[Correct, Correct, Correct])
            .unwrap();
        assert_eq!(state, SessionState::Solved);
        assert_eq!(session.guess_count(), 1);
        assert_eq!(session.next_guess(), Err(SolverError::SessionOver));
    }

    #[test]
    fn test_submit_narrows_candidates() {
        let corpus = corpus();
        let mut session = Session::new(&corpus);
        let state = session
            .submit(&Opening::parse("e4 e5 Nf3"), &[Correct, Absent, Correct])
            .unwrap();
        assert_eq!(state, SessionState::Active);
        assert_eq!(session.candidates(), &[&Opening::parse("e4 c5 Nf3")]);
    }

    #[test]
    fn test_contradictory_feedback_gets_stuck() {
        let corpus = corpus();
        let mut session = Session::new(&corpus);
        let state = session
            .submit(&Opening::parse("e4 e5 Nf3"), &[Correct, Absent, Present])
            .unwrap();
        assert_eq!(state, SessionState::Stuck);
        assert_eq!(
            session.submit(&Opening::parse("d4 d5 c4"), &[Correct, Correct, Correct]),
            Err(SolverError::SessionOver)
        );
    }

    #[test]
    fn test_submit_rejects_bad_lengths() {
        let corpus = corpus();
        let mut session = Session::new(&corpus);
        assert_eq!(
            session.submit(&Opening::parse("e4 e5"), &[Correct, Correct]),
            Err(SolverError::InvalidLength {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(
            session.submit(&Opening::parse("e4 e5 Nf3"), &[Correct]),
            Err(SolverError::InvalidLength {
                expected: 3,
                actual: 1
            })
        );
        assert_eq!(session.guess_count(), 0);
    }

    #[test]
    fn test_reset() {
        let corpus = corpus();
        let mut session = Session::new(&corpus);
        session
            .submit(&Opening::parse("e4 e5 Nf3"), &[Correct, Absent, Correct])
            .unwrap();
        session.reset();
        assert_eq!(session.guess_count(), 0);
        assert_eq!(session.candidates().len(), 6);
    }

    #[test]
    fn test_simulate_every_solution() {
        let corpus = corpus();
        for solution in corpus.openings() {
            let rounds = simulate_run(&corpus, solution).unwrap();
            assert!(rounds.len() <= corpus.len());
            assert_eq!(&rounds.last().unwrap().guess, solution);
        }
    }

    #[test]
    fn test_simulate_unknown_solution() {
        let corpus = corpus();
        let result = simulate_run(&corpus, &Opening::parse("a3 a6 b3"));
        assert!(matches!(result, Err(SolverError::UnknownOpening(_))));
    }

    #[test]
    fn test_simulate_runs_on_embedded_corpus() {
        let corpus = load_corpus_from_str(EMBEDDED_CORPUS, DEFAULT_OPENING_LENGTH);
        let mut rng = StdRng::seed_from_u64(7);
        let summary = simulate_runs(&corpus, 20, &mut rng).unwrap();
        assert_eq!(summary.games(), 20);
        if let Some(max) = summary.max() {
            assert!(max <= corpus.len());
        }
    }

    #[test]
    fn test_summary_statistics() {
        let summary = SimulationSummary {
            guess_counts: vec![2, 3, 3, 5],
            stuck: 1,
        };
        assert_eq!(summary.games(), 5);
        assert_eq!(summary.mean(), Some(3.25));
        assert_eq!(summary.max(), Some(5));
        assert_eq!(
            summary.histogram().into_iter().collect::<Vec<_>>(),
            vec![(2, 1), (3, 2), (5, 1)]
        );
        assert_eq!(SimulationSummary::default().mean(), None);
    }
}
