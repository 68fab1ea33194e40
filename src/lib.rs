/// The buffered source of secure random numbers that words are picked with.
pub mod entropy;
pub mod error;
/// This is the library that generates passphrases, it picks unique words within a length range
/// from a word list.
pub mod passphrase_generator;
pub mod settings;
/// Word lists, the bundled default list and newline delimited word files.
pub mod words;

pub use error::{Error, Result};
pub use passphrase_generator::{Generation, GenerationRequest, PassphraseGenerator};
pub use settings::GeneratorConfig;
