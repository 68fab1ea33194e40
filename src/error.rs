use std::{
    io,
    path::PathBuf,
    sync::{MutexGuard, PoisonError},
};

use crate::entropy::EntropyPool;

/// A enum that contains the different types of errors that the library returns as part of Result's.
#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// The word list handed to the generator can't be used, for example because it's empty.
    InvalidWordList(&'static str),
    /// The word file path handed to the generator can't be used.
    InvalidWordFile(String),
    /// `num_words`, `min_length` or `max_length` is outside of its basic bounds.
    InvalidParameters(String),
    InvalidRange {
        min_length: i64,
        max_length: i64,
    },
    TooManyWordsRequested {
        requested: i64,
        available: usize,
    },
    /// The length band is too narrow to find enough unique words within the retry budget.
    GenerationExhausted {
        num_words: usize,
        attempts: u64,
    },
    /// The secure random source failed and no fallback was permitted.
    EntropySourceFailure(rand::Error),
    WordFileLoad {
        path: PathBuf,
        reason: String,
    },
    Io(io::Error),
    ConfigError(config::ConfigError),
    Generic(&'static str),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<rand::Error> for Error {
    fn from(err: rand::Error) -> Self {
        Self::EntropySourceFailure(err)
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err)
    }
}

impl From<PoisonError<MutexGuard<'_, EntropyPool>>> for Error {
    fn from(_err: PoisonError<MutexGuard<'_, EntropyPool>>) -> Self {
        Self::Generic("Error obtaining entropy lock")
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::InvalidWordList(err) => write!(f, "invalid word list: {err}"),
            Self::InvalidWordFile(err) => write!(f, "invalid word file: {err}"),
            Self::InvalidParameters(err) => write!(f, "invalid parameters: {err}"),
            Self::InvalidRange {
                min_length,
                max_length,
            } => write!(
                f,
                "maxLength ({max_length}) must be greater than or equal to minLength ({min_length})"
            ),
            Self::TooManyWordsRequested {
                requested,
                available,
            } => write!(
                f,
                "requested {requested} words but the word list only contains {available}"
            ),
            Self::GenerationExhausted {
                num_words,
                attempts,
            } => write!(
                f,
                "could not find {num_words} unique words within the length range after {attempts} attempts"
            ),
            Self::EntropySourceFailure(err) => write!(f, "secure entropy source failed: {err}"),
            Self::WordFileLoad { path, reason } => {
                write!(f, "failed to read word file {}: {reason}", path.display())
            }
            Self::Io(err) => write!(f, "{err}"),
            Self::ConfigError(err) => write!(f, "{err}"),
            Self::Generic(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EntropySourceFailure(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::ConfigError(err) => Some(err),
            _ => None,
        }
    }
}

/// Convenience type for Results
pub type Result<T> = std::result::Result<T, Error>;
