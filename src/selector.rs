use crate::error::SolverError;
use crate::opening::{Move, Opening};
use std::collections::{HashMap, HashSet};

/// How often each move occurs across all positions of all `openings`.
pub fn build_move_counts<'o, I>(openings: I) -> HashMap<&'o Move, usize>
where
    I: IntoIterator<Item = &'o Opening>,
{
    let mut counts = HashMap::new();
    for opening in openings {
        for mv in opening {
            *counts.entry(mv).or_insert(0) += 1;
        }
    }
    counts
}

/// Sum of the counts of the distinct moves in `opening`.
#[must_use]
pub fn score_opening(opening: &Opening, counts: &HashMap<&Move, usize>) -> usize {
    let distinct: HashSet<&Move> = opening.iter().collect();
    distinct
        .into_iter()
        .map(|mv| counts.get(mv).copied().unwrap_or(0))
        .sum()
}

/// Picks the candidate made of the most common moves.
///
/// Ties go to the candidate that comes first.
pub fn choose_next_guess<'a>(candidates: &[&'a Opening]) -> Result<&'a Opening, SolverError> {
    let counts = build_move_counts(candidates.iter().copied());
    let mut best: Option<(&'a Opening, usize)> = None;
    for &opening in candidates {
        let score = score_opening(opening, &counts);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((opening, score));
        }
    }
    best.map(|(opening, _)| opening)
        .ok_or(SolverError::EmptyCorpus)
}

/// Candidates paired with their scores, best first. Equal scores keep
/// candidate order.
#[must_use]
pub fn rank_candidates<'a>(candidates: &[&'a Opening]) -> Vec<(&'a Opening, usize)> {
    let counts = build_move_counts(candidates.iter().copied());
    let mut scored: Vec<(&'a Opening, usize)> = candidates
        .iter()
        .map(|&opening| (opening, score_opening(opening, &counts)))
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
}

/// The suggested next guess, with context for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub guess: Opening,
    pub score: usize,
    /// Candidates left when the guess was chosen.
    pub remaining: usize,
}

impl Recommendation {
    pub fn from_candidates(candidates: &[&Opening]) -> Result<Self, SolverError> {
        let guess = choose_next_guess(candidates)?;
        let counts = build_move_counts(candidates.iter().copied());
        Ok(Self {
            score: score_opening(guess, &counts),
            guess: guess.clone(),
            remaining: candidates.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn openings(lines: &[&str]) -> Vec<Opening> {
        lines.iter().map(|l| Opening::parse(l)).collect()
    }

    #[test]
    fn test_move_counts_span_positions_and_candidates() {
        let ops = openings(&["e4 e5 Nf3", "e4 c5 Nf3", "Nf3 Nf6 Nf3"]);
        let counts = build_move_counts(&ops);
        assert_eq!(counts[&Move::from("e4")], 2);
        assert_eq!(counts[&Move::from("Nf3")], 4);
        assert_eq!(counts[&Move::from("c5")], 1);
    }

    #[test]
    fn test_score_counts_duplicates_once() {
        let ops = openings(&["Nf3 Nf6 Nf3", "e4 e5 Nf3"]);
        let counts = build_move_counts(&ops);
        // Nf3 = 3, Nf6 = 1
        assert_eq!(score_opening(&ops[0], &counts), 4);
        // e4 = 1, e5 = 1, Nf3 = 3
        assert_eq!(score_opening(&ops[1], &counts), 5);
    }

    #[test]
    fn test_choose_highest_score() {
        let ops = openings(&["d4 d5 c4", "e4 e5 Nf3", "e4 c5 Nf3", "e4 e5 Bc4"]);
        let candidates: Vec<&Opening> = ops.iter().collect();
        // e4 = 3, e5 = 2, Nf3 = 2 gives the second opening 7.
        assert_eq!(choose_next_guess(&candidates).unwrap(), &ops[1]);
    }

    #[test]
    fn test_ties_go_to_first_candidate() {
        let ops = openings(&["d4 d5", "e4 e5", "c4 c5"]);
        let candidates: Vec<&Opening> = ops.iter().collect();
        assert_eq!(choose_next_guess(&candidates).unwrap(), &ops[0]);

        let reversed: Vec<&Opening> = ops.iter().rev().collect();
        assert_eq!(choose_next_guess(&reversed).unwrap(), &ops[2]);
    }

    #[test]
    fn test_choose_is_deterministic() {
        let ops = openings(&["e4 e5 Nf3", "e4 c5 Nf3", "d4 d5 c4", "c4 e5 Nc3"]);
        let candidates: Vec<&Opening> = ops.iter().collect();
        let first = choose_next_guess(&candidates).unwrap();
        for _ in 0..10 {
            assert_eq!(choose_next_guess(&candidates).unwrap(), first);
        }
    }

    #[test]
    fn test_empty_candidates() {
        assert_eq!(choose_next_guess(&[]), Err(SolverError::EmptyCorpus));
        assert_eq!(
            Recommendation::from_candidates(&[]),
            Err(SolverError::EmptyCorpus)
        );
    }

    #[test]
    fn test_rank_candidates_is_stable() {
        let ops = openings(&["d4 d5", "e4 e5", "e4 c5", "c4 c5"]);
        let candidates: Vec<&Opening> = ops.iter().collect();
        let ranked: Vec<(String, usize)> = rank_candidates(&candidates)
            .into_iter()
            .map(|(o, s)| (o.to_plain_string(), s))
            .collect();
        assert_eq!(
            ranked,
            vec![
                ("e4 c5".to_string(), 4),
                ("e4 e5".to_string(), 3),
                ("c4 c5".to_string(), 3),
                ("d4 d5".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_recommendation() {
        let ops = openings(&["e4 e5", "e4 c5"]);
        let candidates: Vec<&Opening> = ops.iter().collect();
        let rec = Recommendation::from_candidates(&candidates).unwrap();
        assert_eq!(rec.guess, ops[0]);
        assert_eq!(rec.score, 3);
        assert_eq!(rec.remaining, 2);
    }
}
