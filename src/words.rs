use std::path::{Path, PathBuf};

use log::debug;
use tokio::io::AsyncBufReadExt;

use crate::error::{Error, Result};

static DEFAULT_WORDLIST: &str = include_str!("wordlists/default.wordlist");

/// The length of a word as used by the length constraints, counted in characters.
pub fn word_length(word: &str) -> usize {
    word.chars().count()
}

/// An ordered, non-empty list of words that passphrases are drawn from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    pub fn new(words: Vec<String>) -> Result<WordList> {
        if words.is_empty() {
            return Err(Error::InvalidWordList("the word list is empty"));
        }
        Ok(WordList { words })
    }

    /// Parses newline delimited words. Blank lines are kept as zero length words.
    pub fn parse(content: &str) -> Result<WordList> {
        WordList::new(content.lines().map(String::from).collect())
    }

    /// The word list that ships with the library.
    pub fn bundled() -> Result<WordList> {
        WordList::parse(DEFAULT_WORDLIST)
    }

    /// Reads a newline delimited word file line by line.
    pub async fn load(path: &Path) -> Result<WordList> {
        let load_error = |err: std::io::Error| Error::WordFileLoad {
            path: path.to_path_buf(),
            reason: err.to_string(),
        };

        let file = tokio::fs::File::open(path).await.map_err(load_error)?;
        let mut lines = tokio::io::BufReader::new(file).lines();

        let mut words = vec![];
        while let Some(line) = lines.next_line().await.map_err(load_error)? {
            words.push(line);
        }

        debug!("read {} words from {}", words.len(), path.display());
        if words.is_empty() {
            return Err(Error::InvalidWordList("the word file contains no words"));
        }
        Ok(WordList { words })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Number of words whose length is within `[min_length, max_length]`.
    pub fn count_in_range(&self, min_length: usize, max_length: usize) -> usize {
        self.words
            .iter()
            .filter(|w| (min_length..=max_length).contains(&word_length(w)))
            .count()
    }
}

/// Where a generator gets its words from when it wasn't handed a list directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WordSource {
    Bundled,
    File(PathBuf),
}

impl WordSource {
    pub async fn load(&self) -> Result<WordList> {
        match self {
            WordSource::Bundled => WordList::bundled(),
            WordSource::File(path) => WordList::load(path).await,
        }
    }
}

#[cfg(test)]
#[path = "tests/words.rs"]
mod words_tests;
