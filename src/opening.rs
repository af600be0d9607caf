use std::fmt;
use std::ops::Index;

/// A single ply in algebraic notation. The solver never looks inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move(String);

impl Move {
    pub fn new(san: impl Into<String>) -> Self {
        Self(san.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Move {
    fn from(san: &str) -> Self {
        Self::new(san)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An ordered sequence of moves starting from the initial position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Opening(Vec<Move>);

impl Opening {
    #[must_use]
    pub fn new(moves: Vec<Move>) -> Self {
        Self(moves)
    }

    /// Parses whitespace-separated SAN tokens.
    ///
    /// Move numbers are accepted and dropped, both as separate tokens
    /// (`1. e4 e5 2. Nf3`) and glued to the move (`1.e4 e5 2.Nf3`).
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let moves = text
            .split_whitespace()
            .map(strip_move_number)
            .filter(|token| !token.is_empty())
            .map(Move::from)
            .collect();
        Self(moves)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn moves(&self) -> &[Move] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.0.iter()
    }

    /// Space-separated moves without numbering, the format used by corpus files.
    #[must_use]
    pub fn to_plain_string(&self) -> String {
        self.0
            .iter()
            .map(Move::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn strip_move_number(token: &str) -> &str {
    let rest = token.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == token.len() || !rest.starts_with('.') {
        return token;
    }
    rest.trim_start_matches('.')
}

impl Index<usize> for Opening {
    type Output = Move;

    fn index(&self, index: usize) -> &Move {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a Opening {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Move>> for Opening {
    fn from(moves: Vec<Move>) -> Self {
        Self(moves)
    }
}

impl fmt::Display for Opening {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, mv) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if i % 2 == 0 {
                write!(f, "{}. ", i / 2 + 1)?;
            }
            write!(f, "{mv}")?;
        }
        Ok(())
    }
}
