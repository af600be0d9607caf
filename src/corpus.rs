use crate::book::{MoveTree, OpeningBook, enumerate_openings};
use crate::error::{CorpusError, SolverError};
use crate::info_log;
use crate::opening::Opening;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

pub const EMBEDDED_CORPUS: &str = include_str!("resources/openings.txt");

pub const DEFAULT_OPENING_LENGTH: usize = 10;

/// The immutable universe of openings a game is played over.
///
/// All openings have the same length and appear once, in the order the
/// provider supplied them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    openings: Vec<Opening>,
    length: usize,
}

impl Corpus {
    /// Builds a corpus, keeping the first copy of any duplicate.
    ///
    /// Every opening must have exactly `length` moves.
    pub fn new(openings: Vec<Opening>, length: usize) -> Result<Self, SolverError> {
        if let Some(bad) = openings.iter().find(|o| o.len() != length) {
            return Err(SolverError::InvalidLength {
                expected: length,
                actual: bad.len(),
            });
        }
        let mut seen = HashSet::new();
        let openings = openings
            .into_iter()
            .filter(|o| seen.insert(o.clone()))
            .collect();
        Ok(Self { openings, length })
    }

    /// Every line of `depth` moves in `book`.
    pub fn from_book<B: OpeningBook + ?Sized>(book: &B, depth: usize) -> Self {
        let openings = enumerate_openings(book, depth);
        let mut seen = HashSet::new();
        let openings = openings
            .into_iter()
            .filter(|o| seen.insert(o.clone()))
            .collect();
        Self {
            openings,
            length: depth,
        }
    }

    #[must_use]
    pub fn openings(&self) -> &[Opening] {
        &self.openings
    }

    /// Number of moves in every opening.
    #[must_use]
    pub fn opening_length(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.openings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.openings.is_empty()
    }

    #[must_use]
    pub fn contains(&self, opening: &Opening) -> bool {
        self.openings.contains(opening)
    }

    /// FNV-1a hash of the length and the openings, one per line. Fixed across
    /// builds so a cache written by one binary is recognised by the next.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hash = FNV_OFFSET_BASIS;
        let mut feed = |text: &str| {
            for byte in text.bytes().chain(std::iter::once(b'\n')) {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(FNV_PRIME);
            }
        };
        feed(&self.length.to_string());
        for opening in &self.openings {
            feed(&opening.to_plain_string());
        }
        hash
    }
}

fn parse_line(line: &str) -> Option<Opening> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(Opening::parse(line))
}

fn corpus_from_lines<I>(lines: I, length: usize, min_games: u64) -> Corpus
where
    I: IntoIterator<Item = Opening>,
{
    let mut tree = MoveTree::new().with_min_games(min_games);
    for opening in lines {
        tree.insert(opening.moves(), 1);
    }
    Corpus::from_book(&tree, length)
}

/// Loads a corpus from text with one opening per line.
///
/// Blank lines and `#` comments are skipped. Lines shorter than `length`
/// are dropped and longer ones cut down to their first `length` moves.
#[must_use]
pub fn load_corpus_from_str(data: &str, length: usize) -> Corpus {
    load_corpus_from_str_with_min_games(data, length, 0)
}

/// Like [`load_corpus_from_str`] but drops continuations seen on fewer
/// than `min_games` lines.
#[must_use]
pub fn load_corpus_from_str_with_min_games(data: &str, length: usize, min_games: u64) -> Corpus {
    corpus_from_lines(data.lines().filter_map(parse_line), length, min_games)
}

pub fn load_corpus_from_file<P: AsRef<Path>>(
    path: P,
    length: usize,
    min_games: u64,
) -> Result<Corpus, CorpusError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut lines = Vec::new();
    for line in reader.lines() {
        if let Some(opening) = parse_line(&line?) {
            lines.push(opening);
        }
    }
    let corpus = corpus_from_lines(lines, length, min_games);
    info_log!("Loaded {} openings of length {}", corpus.len(), length);
    Ok(corpus)
}

/// Cache file for the precomputed starting guesses of `length`-move games.
#[must_use]
pub fn starting_guesses_path(length: usize) -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| {
        dir.join("chessle-solver")
            .join(format!("starting_guesses_{length}.txt"))
    })
}

const CACHE_HEADER: &str = "# corpus";

/// Reads cached starting guesses, ignoring the cache if it was written for
/// a different corpus or names openings the corpus does not have.
#[must_use]
pub fn read_starting_guesses(path: &Path, corpus: &Corpus) -> Option<Vec<Opening>> {
    let contents = fs::read_to_string(path).ok()?;
    let mut lines = contents.lines();
    let header = lines.next()?;
    let expected = format!("{CACHE_HEADER} {:016x}", corpus.fingerprint());
    if header.trim() != expected {
        info_log!("Ignoring stale starting guess cache at {}", path.display());
        return None;
    }
    let guesses: Vec<Opening> = lines.filter_map(parse_line).collect();
    if guesses.is_empty() || !guesses.iter().all(|g| corpus.contains(g)) {
        return None;
    }
    Some(guesses)
}

pub fn write_starting_guesses(
    path: &Path,
    corpus: &Corpus,
    guesses: &[Opening],
) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut contents = format!("{CACHE_HEADER} {:016x}\n", corpus.fingerprint());
    for guess in guesses {
        contents.push_str(&guess.to_plain_string());
        contents.push('\n');
    }
    fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_length() {
        let openings = vec![Opening::parse("e4 e5"), Opening::parse("d4")];
        assert_eq!(
            Corpus::new(openings, 2),
            Err(SolverError::InvalidLength {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_new_dedups_keeping_order() {
        let openings = vec![
            Opening::parse("e4 e5"),
            Opening::parse("d4 d5"),
            Opening::parse("e4 e5"),
        ];
        let corpus = Corpus::new(openings, 2).unwrap();
        assert_eq!(
            corpus.openings(),
            &[Opening::parse("e4 e5"), Opening::parse("d4 d5")]
        );
    }

    #[test]
    fn test_load_from_str_filters_and_truncates() {
        let data = "# comment\n\ne4 e5 Nf3\n1. d4 d5 2. c4\nc4\n  e4 c5 Nf3 d6  \n";
        let corpus = load_corpus_from_str(data, 3);
        assert_eq!(corpus.opening_length(), 3);
        assert_eq!(
            corpus.openings(),
            &[
                Opening::parse("e4 e5 Nf3"),
                Opening::parse("e4 c5 Nf3"),
                Opening::parse("d4 d5 c4"),
            ]
        );
    }

    #[test]
    fn test_load_with_min_games() {
        let data = "e4 e5\ne4 e5\ne4 c5\nd4 d5\nd4 d5\n";
        let corpus = load_corpus_from_str_with_min_games(data, 2, 2);
        assert_eq!(
            corpus.openings(),
            &[Opening::parse("e4 e5"), Opening::parse("d4 d5")]
        );
    }

    #[test]
    fn test_embedded_corpus_is_usable() {
        let corpus = load_corpus_from_str(EMBEDDED_CORPUS, DEFAULT_OPENING_LENGTH);
        assert!(corpus.len() > 20);
        assert!(
            corpus
                .openings()
                .iter()
                .all(|o| o.len() == DEFAULT_OPENING_LENGTH)
        );
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = load_corpus_from_file("/nonexistent/openings.txt", 10, 0);
        assert!(matches!(result, Err(CorpusError::Io(_))));
    }

    #[test]
    fn test_fingerprint_tracks_contents() {
        let a = load_corpus_from_str("e4 e5\nd4 d5", 2);
        let b = load_corpus_from_str("e4 e5\nd4 d5", 2);
        let c = load_corpus_from_str("e4 e5\nc4 e5", 2);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_fingerprint_is_fixed() {
        let corpus = load_corpus_from_str("e4 e5\nd4 d5", 2);
        assert_eq!(corpus.fingerprint(), 0x0ccd_9314_8ebe_5aab);
    }

    #[test]
    fn test_starting_guess_cache_round_trip() {
        let path = std::env::temp_dir().join("chessle_solver_unit_cache.txt");
        let _ = fs::remove_file(&path);

        let corpus = load_corpus_from_str("e4 e5\nd4 d5\nc4 e5", 2);
        let guesses = vec![Opening::parse("d4 d5"), Opening::parse("e4 e5")];
        write_starting_guesses(&path, &corpus, &guesses).unwrap();
        assert_eq!(read_starting_guesses(&path, &corpus), Some(guesses));

        let other = load_corpus_from_str("e4 e5\nd4 d5", 2);
        assert_eq!(read_starting_guesses(&path, &other), None);

        let _ = fs::remove_file(&path);
    }
}
