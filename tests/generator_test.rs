extern crate xkcd_password;

use std::collections::HashSet;

use xkcd_password::{words::word_length, Error, GenerationRequest, PassphraseGenerator, Result};

// Every generation has the requested number of distinct words within the length range
#[tokio::test]
async fn repeated_generations_hold_their_constraints() -> Result<()> {
    let generator = PassphraseGenerator::new()?;
    let request = GenerationRequest::new()
        .num_words(10)
        .min_length(6)
        .max_length(10);

    for _ in 0..100 {
        let words = generator.generate(request).await?;
        let distinct: HashSet<&String> = words.iter().collect();

        assert_eq!(10, words.len());
        assert_eq!(10, distinct.len());
        for word in &words {
            let len = word_length(word);
            assert!((6..=10).contains(&len), "{word} has length {len}");
        }
    }
    Ok(())
}

// Narrow bands on the bundled list end with an error instead of hanging, the list itself
// is long enough
#[tokio::test]
async fn too_many_short_words_fail() {
    let generator = PassphraseGenerator::new().unwrap();

    let err = generator
        .generate(GenerationRequest::new().num_words(1000).min_length(3).max_length(3))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::GenerationExhausted {
            num_words: 1000,
            attempts: 850_000
        }
    ));
}

// Clones share the word list and can generate at the same time
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn generations_on_many_tasks() -> Result<()> {
    let generator = PassphraseGenerator::new()?;

    let handles: Vec<_> = (0..16)
        .map(|_| tokio::spawn(generator.generate(GenerationRequest::default())))
        .collect();

    let mut results = vec![];
    for handle in handles {
        results.push(handle.await.unwrap()?);
    }

    assert!(results.iter().all(|words| words.len() == 4));
    let distinct: HashSet<&Vec<String>> = results.iter().collect();
    assert!(distinct.len() > 1);
    Ok(())
}

// The joined passphrase is ready to print
#[tokio::test]
async fn generate_passphrase_with_separator() -> Result<()> {
    let generator = PassphraseGenerator::new()?;

    let passphrase = generator
        .generate_passphrase(GenerationRequest::default(), " ")
        .await?;

    assert!(!passphrase.ends_with(' '));
    assert_eq!(4, passphrase.split(' ').count());
    assert!(passphrase.len() >= 4 * 5 + 3);
    Ok(())
}
