use thiserror::Error;

/// Errors produced by the solving core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// A guess, solution or feedback does not have the corpus opening length.
    #[error("expected {expected} moves but got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Feedback contained a symbol other than `c`, `m` or `i`.
    #[error("invalid feedback symbol '{0}' (use c = correct, m = misplaced, i = incorrect)")]
    InvalidFeedbackSymbol(char),

    #[error("position {index} is out of range for openings of length {length}")]
    PositionOutOfRange { index: usize, length: usize },

    /// The accumulated feedback rules out every opening in the corpus.
    #[error("no openings are consistent with the feedback so far; restart the session")]
    Contradiction,

    /// The guess selector was handed no candidates at all.
    #[error("there are no candidate openings to choose from")]
    EmptyCorpus,

    #[error("opening is not in the corpus: {0}")]
    UnknownOpening(String),

    #[error("the session is already over; start a new game")]
    SessionOver,
}

/// Errors raised while building a corpus from an external source.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("could not read the opening corpus")]
    Io(#[from] std::io::Error),

    #[error("invalid opening corpus")]
    Solver(#[from] SolverError),
}
