use crate::error::SolverError;
use crate::opening::{Move, Opening};
use std::collections::HashMap;

/// Per-move result of comparing a guess to the solution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feedback {
    /// Right move, right position.
    Correct,
    /// The move occurs elsewhere in the solution.
    Present,
    /// The move does not occur (after matched occurrences are used up).
    Absent,
}

impl Feedback {
    /// `c` = correct, `m` = misplaced, `i` = incorrect. Lowercase only.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'c' => Some(Self::Correct),
            'm' => Some(Self::Present),
            'i' => Some(Self::Absent),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_char(self) -> char {
        match self {
            Self::Correct => 'c',
            Self::Present => 'm',
            Self::Absent => 'i',
        }
    }

    #[must_use]
    pub fn emoji(self) -> char {
        match self {
            Self::Correct => '🟩',
            Self::Present => '🟨',
            Self::Absent => '⬜',
        }
    }
}

/// Compares `guess` against `solution`.
///
/// Exact matches are taken first and consume their solution move. The
/// remaining guess moves are then marked present left to right while unused
/// copies of that move are left in the solution, so surplus duplicates in
/// the guess come out absent.
pub fn get_feedback(guess: &Opening, solution: &Opening) -> Result<Vec<Feedback>, SolverError> {
    if guess.len() != solution.len() {
        return Err(SolverError::InvalidLength {
            expected: solution.len(),
            actual: guess.len(),
        });
    }

    let mut feedback = vec![Feedback::Absent; guess.len()];
    let mut remaining: HashMap<&Move, usize> = HashMap::new();

    // First pass: exact matches
    for (i, (g, s)) in guess.iter().zip(solution.iter()).enumerate() {
        if g == s {
            feedback[i] = Feedback::Correct;
        } else {
            *remaining.entry(s).or_insert(0) += 1;
        }
    }

    // Second pass: misplaced moves, leftmost first
    for (i, g) in guess.iter().enumerate() {
        if feedback[i] == Feedback::Correct {
            continue;
        }
        if let Some(count) = remaining.get_mut(g)
            && *count > 0
        {
            *count -= 1;
            feedback[i] = Feedback::Present;
        }
    }

    Ok(feedback)
}

/// Parses a feedback string such as `ccmiiiiiii`. Surrounding whitespace is
/// ignored; anything else outside `c`, `m`, `i` is rejected.
pub fn parse_feedback(text: &str, length: usize) -> Result<Vec<Feedback>, SolverError> {
    let symbols: Vec<char> = text.trim().chars().collect();
    if symbols.len() != length {
        return Err(SolverError::InvalidLength {
            expected: length,
            actual: symbols.len(),
        });
    }
    symbols
        .into_iter()
        .map(|c| Feedback::from_char(c).ok_or(SolverError::InvalidFeedbackSymbol(c)))
        .collect()
}

#[must_use]
pub fn is_solved(feedback: &[Feedback]) -> bool {
    feedback.iter().all(|f| *f == Feedback::Correct)
}

#[must_use]
pub fn render_feedback(feedback: &[Feedback]) -> String {
    feedback.iter().map(|f| f.emoji()).collect()
}

#[must_use]
pub fn feedback_to_string(feedback: &[Feedback]) -> String {
    feedback.iter().map(|f| f.to_char()).collect()
}
