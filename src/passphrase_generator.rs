use std::{
    collections::{HashMap, HashSet},
    future::Future,
    path::{Path, PathBuf},
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    task::{Context, Poll},
};

use futures::future::{BoxFuture, FutureExt};
use log::debug;
use tokio::sync::oneshot;

use crate::{
    entropy::EntropyPool,
    error::{Error, Result},
    settings::GeneratorConfig,
    words::{word_length, WordList, WordSource},
};

pub const DEFAULT_NUM_WORDS: i64 = 4;
pub const DEFAULT_MIN_LENGTH: i64 = 5;
pub const DEFAULT_MAX_LENGTH: i64 = 8;

const RETRIES_PER_WORD: u64 = 10_000;
const MAX_RETRIES: u64 = 850_000;
/// Rejections between two yields back to the runtime.
const YIELD_INTERVAL: u64 = 1024;

/// The most rejected draws a single generation may make before giving up.
pub fn retry_budget(num_words: usize) -> u64 {
    (num_words as u64)
        .saturating_mul(RETRIES_PER_WORD)
        .min(MAX_RETRIES)
}

/// Parameters for one passphrase, unset fields take the defaults of 4 words between 5 and 8
/// characters long.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub num_words: Option<i64>,
    pub min_length: Option<i64>,
    pub max_length: Option<i64>,
}

impl GenerationRequest {
    pub fn new() -> GenerationRequest {
        GenerationRequest::default()
    }

    pub fn num_words(mut self, num_words: i64) -> Self {
        self.num_words = Some(num_words);
        self
    }

    pub fn min_length(mut self, min_length: i64) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn max_length(mut self, max_length: i64) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Checks the request against a word list of `available` words. All checks are made, the
    /// error of the last one that fails is returned.
    fn validate(&self, available: usize) -> Result<Params> {
        let num_words = self.num_words.unwrap_or(DEFAULT_NUM_WORDS);
        let min_length = self.min_length.unwrap_or(DEFAULT_MIN_LENGTH);
        let max_length = self.max_length.unwrap_or(DEFAULT_MAX_LENGTH);

        let mut failure = None;
        if num_words <= 0 || min_length < 0 || max_length < 2 {
            failure = Some(Error::InvalidParameters(format!(
                "numWords must be positive, minLength not negative and maxLength at least 2, got {num_words}, {min_length} and {max_length}"
            )));
        }
        if num_words > i64::try_from(available).unwrap_or(i64::MAX) {
            failure = Some(Error::TooManyWordsRequested {
                requested: num_words,
                available,
            });
        }
        if max_length < min_length {
            failure = Some(Error::InvalidRange {
                min_length,
                max_length,
            });
        }

        if let Some(err) = failure {
            debug!("rejecting generation request {:?}: {}", self, err);
            return Err(err);
        }

        // every value is known to be non-negative here, lengths past usize::MAX can't be reached
        Ok(Params {
            num_words: usize::try_from(num_words).unwrap_or(usize::MAX),
            min_length: usize::try_from(min_length).unwrap_or(usize::MAX),
            max_length: usize::try_from(max_length).unwrap_or(usize::MAX),
        })
    }
}

impl From<i64> for GenerationRequest {
    fn from(num_words: i64) -> Self {
        GenerationRequest::new().num_words(num_words)
    }
}

#[derive(Debug)]
struct Params {
    num_words: usize,
    min_length: usize,
    max_length: usize,
}

impl Params {
    fn accepts(&self, word: &str) -> bool {
        (self.min_length..=self.max_length).contains(&word_length(word))
    }
}

/// A passphrase that is being generated. Await it, or hand it a callback with `on_complete`.
#[must_use = "a generation does nothing unless awaited or given a callback"]
pub struct Generation {
    inner: BoxFuture<'static, Result<Vec<String>>>,
}

impl Generation {
    fn new(future: impl Future<Output = Result<Vec<String>>> + Send + 'static) -> Generation {
        Generation {
            inner: future.boxed(),
        }
    }

    /// Runs the generation on the current tokio runtime and calls `callback` with the outcome.
    ///
    /// # Panics
    /// If called outside of a tokio runtime.
    pub fn on_complete<F>(self, callback: F) -> tokio::task::JoinHandle<()>
    where
        F: FnOnce(Result<Vec<String>>) + Send + 'static,
    {
        tokio::spawn(async move { callback(self.await) })
    }
}

impl Future for Generation {
    type Output = Result<Vec<String>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

type Waiter = oneshot::Sender<Result<Arc<WordList>>>;

enum LoadState {
    Uninitialized(WordSource),
    Loading { epoch: u64, waiters: Vec<Waiter> },
    Ready(Arc<WordList>),
}

struct WordState {
    epoch: u64,
    load: LoadState,
    /// Waiters of loads whose source was replaced before they finished.
    superseded: HashMap<u64, Vec<Waiter>>,
}

impl WordState {
    fn replace(&mut self, load: LoadState) {
        self.epoch += 1;
        if let LoadState::Loading { epoch, waiters } = std::mem::replace(&mut self.load, load) {
            self.superseded.insert(epoch, waiters);
        }
    }

    /// Installs the outcome of load `epoch` if it is still the current one and returns the
    /// waiters queued behind it.
    fn complete(
        &mut self,
        epoch: u64,
        source: &WordSource,
        loaded: &Result<Arc<WordList>>,
    ) -> Vec<Waiter> {
        let current = matches!(self.load, LoadState::Loading { epoch: e, .. } if e == epoch);
        if !current {
            return self.superseded.remove(&epoch).unwrap_or_default();
        }

        let next = match loaded {
            Ok(list) => LoadState::Ready(list.clone()),
            Err(_) => LoadState::Uninitialized(source.clone()),
        };
        match std::mem::replace(&mut self.load, next) {
            LoadState::Loading { waiters, .. } => waiters,
            _ => vec![],
        }
    }
}

struct Inner {
    config: GeneratorConfig,
    entropy: Mutex<EntropyPool>,
    words: Mutex<WordState>,
}

/// Generates passphrases from a word list. Clones share the word list and the entropy pool.
#[derive(Clone)]
pub struct PassphraseGenerator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for PassphraseGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassphraseGenerator").finish_non_exhaustive()
    }
}

impl PassphraseGenerator {
    /// A generator with the default configuration that uses the bundled word list.
    pub fn new() -> Result<PassphraseGenerator> {
        PassphraseGenerator::with_config(GeneratorConfig::default())
    }

    pub fn with_config(config: GeneratorConfig) -> Result<PassphraseGenerator> {
        let entropy = EntropyPool::new(&config)?;
        Ok(PassphraseGenerator::with_entropy(config, entropy))
    }

    pub fn with_entropy(config: GeneratorConfig, entropy: EntropyPool) -> PassphraseGenerator {
        PassphraseGenerator {
            inner: Arc::new(Inner {
                config,
                entropy: Mutex::new(entropy),
                words: Mutex::new(WordState {
                    epoch: 0,
                    load: LoadState::Uninitialized(WordSource::Bundled),
                    superseded: HashMap::new(),
                }),
            }),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.inner.config
    }

    /// Use `words` for every following generation.
    pub fn init_with_word_list(&self, words: Vec<String>) -> Result<&Self> {
        let list = WordList::new(words)?;
        self.lock_words()?
            .replace(LoadState::Ready(Arc::new(list)));
        Ok(self)
    }

    /// Use the newline delimited word file at `path` for every following generation. The
    /// file is read when the next generation starts.
    pub fn init_with_word_file<P: AsRef<Path>>(&self, path: P) -> Result<&Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidWordFile("the path is empty".to_owned()));
        }

        self.lock_words()?
            .replace(LoadState::Uninitialized(WordSource::File(path.to_path_buf())));
        Ok(self)
    }

    pub fn generate<R: Into<GenerationRequest>>(&self, request: R) -> Generation {
        let generator = self.clone();
        let request = request.into();
        Generation::new(async move { generator.run(request).await })
    }

    /// Generates the words and joins them with `separator`.
    pub async fn generate_passphrase<R: Into<GenerationRequest>>(
        &self,
        request: R,
        separator: &str,
    ) -> Result<String> {
        Ok(self.generate(request).await?.join(separator))
    }

    /// The current word list, waiting for it to be loaded if needed.
    pub async fn word_list(&self) -> Result<Arc<WordList>> {
        let receiver = {
            let mut state = self.lock_words()?;
            let pending_source = match &state.load {
                LoadState::Ready(list) => return Ok(list.clone()),
                LoadState::Loading { .. } => None,
                LoadState::Uninitialized(source) => Some(source.clone()),
            };

            let (sender, receiver) = oneshot::channel();
            match pending_source {
                None => {
                    if let LoadState::Loading { waiters, .. } = &mut state.load {
                        waiters.push(sender);
                    }
                }
                Some(source) => {
                    state.epoch += 1;
                    let epoch = state.epoch;
                    state.load = LoadState::Loading {
                        epoch,
                        waiters: vec![sender],
                    };
                    self.spawn_load(epoch, source);
                }
            }
            receiver
        };

        receiver
            .await
            .map_err(|_| Error::Generic("the word list loader stopped before finishing"))?
    }

    fn spawn_load(&self, epoch: u64, source: WordSource) {
        let generator = self.clone();
        tokio::spawn(async move {
            debug!("loading word list from {:?}", source);
            let loaded = source.load().await.map(Arc::new);
            generator.finish_load(epoch, &source, loaded);
        });
    }

    fn finish_load(&self, epoch: u64, source: &WordSource, loaded: Result<Arc<WordList>>) {
        // the waiters are still answered when another holder of the lock panicked
        let waiters = self
            .inner
            .words
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .complete(epoch, source, &loaded);

        match &loaded {
            Ok(list) => debug!("word list ready with {} words", list.len()),
            Err(err) => debug!("failed to load word list: {}", err),
        }
        for waiter in waiters {
            let result = match &loaded {
                Ok(list) => Ok(list.clone()),
                Err(err) => Err(load_failure(err, source)),
            };
            // a waiter that went away no longer wants the list
            let _ = waiter.send(result);
        }
    }

    async fn run(&self, request: GenerationRequest) -> Result<Vec<String>> {
        let words = self.word_list().await?;
        let params = request.validate(words.len())?;
        let indexes = self.select(&words, &params).await?;

        Ok(indexes
            .into_iter()
            .filter_map(|i| words.get(i).map(String::from))
            .collect())
    }

    /// Picks `num_words` distinct indexes of words within the length range, in the order of
    /// the positions they were drawn for.
    async fn select(&self, words: &WordList, params: &Params) -> Result<Vec<usize>> {
        let max_index = words.len() - 1;
        let candidates = self.draw(|pool| pool.next_unique_ints(params.num_words, max_index))?;
        let budget = if self.inner.config.disable_retry_budget {
            None
        } else {
            Some(retry_budget(params.num_words))
        };

        let mut accepted = HashSet::with_capacity(params.num_words);
        let mut selection = Vec::with_capacity(params.num_words);
        let mut rejections = 0u64;

        for candidate in candidates {
            let mut index = candidate;
            while accepted.contains(&index) || !params.accepts(words.get(index).unwrap_or("")) {
                if budget.is_some_and(|b| rejections >= b) {
                    debug!(
                        "retry budget exhausted after {} rejections with {} of {} words found",
                        rejections,
                        selection.len(),
                        params.num_words
                    );
                    return Err(Error::GenerationExhausted {
                        num_words: params.num_words,
                        attempts: rejections,
                    });
                }
                rejections += 1;
                if rejections % YIELD_INTERVAL == 0 {
                    tokio::task::yield_now().await;
                }
                index = self.draw(|pool| pool.next_int(max_index))?;
            }
            accepted.insert(index);
            selection.push(index);
        }

        Ok(selection)
    }

    fn draw<T>(&self, f: impl FnOnce(&mut EntropyPool) -> Result<T>) -> Result<T> {
        let mut pool = self.inner.entropy.lock()?;
        f(&mut pool)
    }

    fn lock_words(&self) -> Result<MutexGuard<'_, WordState>> {
        self.inner
            .words
            .lock()
            .map_err(|_| Error::Generic("Error obtaining word list lock"))
    }
}

/// Every waiter gets its own copy of the error that ended a load.
fn load_failure(err: &Error, source: &WordSource) -> Error {
    match err {
        Error::InvalidWordList(msg) => Error::InvalidWordList(*msg),
        Error::WordFileLoad { path, reason } => Error::WordFileLoad {
            path: path.clone(),
            reason: reason.clone(),
        },
        other => Error::WordFileLoad {
            path: match source {
                WordSource::File(path) => path.clone(),
                WordSource::Bundled => PathBuf::from("<bundled>"),
            },
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
#[path = "tests/passphrase_generator.rs"]
mod passphrase_generator_tests;
