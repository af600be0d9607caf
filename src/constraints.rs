//! Accumulated knowledge about the hidden opening.
//!
//! [`Constraints`] collects every fact learned from feedback and keeps the
//! list of corpus openings that are still consistent with all of them. Facts
//! are only ever added; starting over means calling [`Constraints::reset`].

use crate::corpus::Corpus;
use crate::error::SolverError;
use crate::feedback::Feedback;
use crate::opening::{Move, Opening};
use crate::debug_log;
use std::collections::{BTreeMap, HashSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct Constraints<'a> {
    corpus: &'a Corpus,
    /// Position -> move the solution has there.
    known_idxs: BTreeMap<usize, Move>,
    /// Moves somewhere in the solution, one entry per report.
    /// Checked as a set; repeated entries do not demand repeated moves.
    known_moves: Vec<Move>,
    /// Position -> moves the solution does not have there.
    non_idxs: BTreeMap<usize, HashSet<Move>>,
    /// Moves absent from every position not pinned by `known_idxs`.
    non_moves: HashSet<Move>,
    /// Set when two different moves were reported correct at one position.
    conflicting: bool,
    candidates: Vec<&'a Opening>,
}

impl<'a> Constraints<'a> {
    #[must_use]
    pub fn new(corpus: &'a Corpus) -> Self {
        Self {
            corpus,
            known_idxs: BTreeMap::new(),
            known_moves: Vec::new(),
            non_idxs: BTreeMap::new(),
            non_moves: HashSet::new(),
            conflicting: false,
            candidates: corpus.openings().iter().collect(),
        }
    }

    #[must_use]
    pub fn corpus(&self) -> &'a Corpus {
        self.corpus
    }

    /// Forget everything learned so far.
    pub fn reset(&mut self) {
        *self = Self::new(self.corpus);
    }

    fn check_index(&self, index: usize) -> Result<(), SolverError> {
        let length = self.corpus.opening_length();
        if index >= length {
            return Err(SolverError::PositionOutOfRange { index, length });
        }
        Ok(())
    }

    fn add_correct(&mut self, index: usize, mv: &Move) {
        match self.known_idxs.get(&index) {
            Some(existing) if existing != mv => {
                debug_log!(
                    "Conflicting correct moves at {}: {} and {}",
                    index,
                    existing,
                    mv
                );
                self.conflicting = true;
            }
            Some(_) => {}
            None => {
                self.known_idxs.insert(index, mv.clone());
            }
        }
    }

    fn add_absent(&mut self, mv: &Move) {
        self.non_moves.insert(mv.clone());
    }

    fn add_present(&mut self, index: usize, mv: &Move) {
        self.known_moves.push(mv.clone());
        self.non_idxs.entry(index).or_default().insert(mv.clone());
    }

    /// The solution has `mv` at `index`.
    pub fn record_correct(&mut self, index: usize, mv: &Move) -> Result<(), SolverError> {
        self.check_index(index)?;
        self.add_correct(index, mv);
        self.prune();
        Ok(())
    }

    /// The solution has no `mv` outside its pinned positions.
    pub fn record_absent(&mut self, mv: &Move) {
        self.add_absent(mv);
        self.prune();
    }

    /// The solution has `mv`, but not at `index`.
    pub fn record_present(&mut self, index: usize, mv: &Move) -> Result<(), SolverError> {
        self.check_index(index)?;
        self.add_present(index, mv);
        self.prune();
        Ok(())
    }

    /// Records a whole round of feedback and prunes once at the end.
    pub fn apply_feedback(
        &mut self,
        guess: &Opening,
        feedback: &[Feedback],
    ) -> Result<(), SolverError> {
        let length = self.corpus.opening_length();
        for actual in [guess.len(), feedback.len()] {
            if actual != length {
                return Err(SolverError::InvalidLength {
                    expected: length,
                    actual,
                });
            }
        }
        for (i, (mv, fb)) in guess.iter().zip(feedback).enumerate() {
            match fb {
                Feedback::Correct => self.add_correct(i, mv),
                Feedback::Absent => self.add_absent(mv),
                Feedback::Present => self.add_present(i, mv),
            }
        }
        self.prune();
        Ok(())
    }

    /// Openings still consistent with everything recorded, in corpus order.
    #[must_use]
    pub fn candidate_set(&self) -> &[&'a Opening] {
        &self.candidates
    }

    #[must_use]
    pub fn is_contradictory(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Whether `opening` agrees with every recorded fact.
    #[must_use]
    pub fn is_valid_opening(&self, opening: &Opening) -> bool {
        if self.conflicting {
            return false;
        }
        if self
            .known_idxs
            .iter()
            .any(|(&i, mv)| opening.moves().get(i) != Some(mv))
        {
            return false;
        }

        let played: HashSet<&Move> = opening.iter().collect();
        if !self.known_moves.iter().all(|mv| played.contains(mv)) {
            return false;
        }

        if opening.iter().enumerate().any(|(i, mv)| {
            self.non_idxs
                .get(&i)
                .is_some_and(|excluded| excluded.contains(mv))
        }) {
            return false;
        }

        // Pinned positions are exempt from the absent-move check.
        !opening
            .iter()
            .enumerate()
            .filter(|(i, mv)| self.known_idxs.get(i) != Some(*mv))
            .any(|(_, mv)| self.non_moves.contains(mv))
    }

    fn prune(&mut self) {
        let corpus: &'a Corpus = self.corpus;
        let all = corpus.openings();

        #[cfg(feature = "parallel")]
        let candidates: Vec<&'a Opening> = all
            .par_iter()
            .filter(|o| self.is_valid_opening(o))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let candidates: Vec<&'a Opening> =
            all.iter().filter(|o| self.is_valid_opening(o)).collect();

        debug_log!(
            "Pruned candidates: {} -> {}",
            self.candidates.len(),
            candidates.len()
        );
        self.candidates = candidates;
    }
}
