// Library interface for chessle-solver
// This allows integration tests to access internal modules

pub mod book;
pub mod cli;
pub mod constraints;
pub mod corpus;
pub mod error;
pub mod feedback;
pub mod game_state;
pub mod logging;
pub mod opening;
pub mod selector;
pub mod session;
pub mod tui;

// Re-export commonly used items for easier testing
pub use constraints::Constraints;
pub use corpus::{Corpus, load_corpus_from_file, load_corpus_from_str};
pub use error::{CorpusError, SolverError};
pub use feedback::{Feedback, get_feedback, parse_feedback};
pub use game_state::{GameResult, game_loop};
pub use opening::{Move, Opening};
pub use selector::{Recommendation, choose_next_guess};
pub use session::{Round, Session, SessionState, simulate_run, simulate_runs};
