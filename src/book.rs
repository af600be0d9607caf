//! Opening trees and fixed-depth line enumeration.
//!
//! A book answers one question: which moves are played after a given line.
//! [`enumerate_openings`] walks a book depth-first and returns every line of
//! exactly the requested depth, in the order the book reports continuations.

use crate::opening::{Move, Opening};

/// Source of continuations for a line of moves.
pub trait OpeningBook {
    /// Moves known to follow `line`, in preference order.
    fn continuations(&self, line: &[Move]) -> Vec<Move>;
}

#[derive(Debug, Clone, Default)]
struct Node {
    games: u64,
    children: Vec<(Move, Node)>,
}

impl Node {
    fn child(&self, mv: &Move) -> Option<&Node> {
        self.children
            .iter()
            .find(|(m, _)| m == mv)
            .map(|(_, node)| node)
    }

    fn child_mut(&mut self, mv: &Move) -> &mut Node {
        let pos = match self.children.iter().position(|(m, _)| m == mv) {
            Some(pos) => pos,
            None => {
                self.children.push((mv.clone(), Node::default()));
                self.children.len() - 1
            }
        };
        &mut self.children[pos].1
    }
}

/// In-memory trie of opening lines with per-move game counts.
#[derive(Debug, Clone, Default)]
pub struct MoveTree {
    root: Node,
    min_games: u64,
}

impl MoveTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide continuations played in fewer than `min_games` games.
    #[must_use]
    pub fn with_min_games(mut self, min_games: u64) -> Self {
        self.min_games = min_games;
        self
    }

    /// Adds a line, crediting `games` to every move along it.
    pub fn insert(&mut self, line: &[Move], games: u64) {
        let mut node = &mut self.root;
        for mv in line {
            node = node.child_mut(mv);
            node.games += games;
        }
    }

    fn node(&self, line: &[Move]) -> Option<&Node> {
        line.iter()
            .try_fold(&self.root, |node, mv| node.child(mv))
    }

    /// Total games recorded for the last move of `line`.
    #[must_use]
    pub fn games(&self, line: &[Move]) -> u64 {
        self.node(line).map_or(0, |node| node.games)
    }
}

impl OpeningBook for MoveTree {
    fn continuations(&self, line: &[Move]) -> Vec<Move> {
        self.node(line)
            .map(|node| {
                node.children
                    .iter()
                    .filter(|(_, child)| child.games >= self.min_games)
                    .map(|(mv, _)| mv.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Every line of exactly `depth` moves reachable in `book`.
///
/// Branches that run out of continuations early are dropped.
pub fn enumerate_openings<B: OpeningBook + ?Sized>(book: &B, depth: usize) -> Vec<Opening> {
    expand(book, &[], depth)
        .into_iter()
        .map(Opening::new)
        .collect()
}

fn expand<B: OpeningBook + ?Sized>(book: &B, line: &[Move], remaining: usize) -> Vec<Vec<Move>> {
    if remaining == 0 {
        return vec![line.to_vec()];
    }
    book.continuations(line)
        .into_iter()
        .flat_map(|mv| {
            let mut next = line.to_vec();
            next.push(mv);
            expand(book, &next, remaining - 1)
        })
        .collect()
}
