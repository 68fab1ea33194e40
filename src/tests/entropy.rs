use std::{
    collections::HashSet,
    io,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use super::*;

struct ConstantEntropy(u8);

impl EntropySource for ConstantEntropy {
    fn fill(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        dest.fill(self.0);
        Ok(())
    }
}

/// Succeeds for the first `working_fills` calls, then fails.
struct FailingEntropy {
    working_fills: usize,
    calls: Arc<AtomicUsize>,
}

impl EntropySource for FailingEntropy {
    fn fill(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.working_fills {
            dest.fill(0);
            Ok(())
        } else {
            Err(rand::Error::new(io::Error::new(
                io::ErrorKind::Other,
                "no entropy today",
            )))
        }
    }
}

fn failing(working_fills: usize) -> (Box<FailingEntropy>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    (
        Box::new(FailingEntropy {
            working_fills,
            calls: calls.clone(),
        }),
        calls,
    )
}

#[test]
fn zero_bytes_give_zero() -> Result<()> {
    let mut pool =
        EntropyPool::with_source(&GeneratorConfig::default(), Box::new(ConstantEntropy(0)))?;

    assert_eq!(0, pool.next_int(100)?);
    assert_eq!(0, pool.next_int(usize::MAX)?);
    Ok(())
}

#[test]
fn full_bytes_give_max() -> Result<()> {
    let mut pool =
        EntropyPool::with_source(&GeneratorConfig::default(), Box::new(ConstantEntropy(0xff)))?;

    assert_eq!(100, pool.next_int(100)?);
    assert_eq!(113808, pool.next_int(113808)?);
    assert_eq!(0, pool.next_int(0)?);
    Ok(())
}

#[test]
fn next_int_stays_in_range() -> Result<()> {
    let mut pool = EntropyPool::new(&GeneratorConfig::default())?;

    for max in [0, 1, 2, 7, 100, 5599] {
        for _ in 0..500 {
            assert!(pool.next_int(max)? <= max);
        }
    }
    Ok(())
}

#[test]
fn next_int_is_roughly_uniform() -> Result<()> {
    let mut pool = EntropyPool::new(&GeneratorConfig::default())?;
    let mut buckets = [0usize; 10];

    for _ in 0..20000 {
        buckets[pool.next_int(9)?] += 1;
    }

    for count in buckets {
        assert!(
            (1600..=2400).contains(&count),
            "bucket count {count} is far from 2000"
        );
    }
    Ok(())
}

#[test]
fn draws_consume_seven_bytes() -> Result<()> {
    let config = GeneratorConfig::default().with_buffer_size(256);
    let mut pool = EntropyPool::with_source(&config, Box::new(ConstantEntropy(3)))?;

    assert_eq!(256, pool.remaining());
    pool.next_int(10)?;
    assert_eq!(249, pool.remaining());
    Ok(())
}

#[test]
fn refills_when_buffer_runs_low() -> Result<()> {
    let config = GeneratorConfig::default().with_buffer_size(256);
    let mut pool = EntropyPool::with_source(&config, Box::new(ConstantEntropy(3)))?;

    // 256 / 7 = 36 draws fit in one buffer
    for _ in 0..36 {
        pool.next_int(10)?;
    }
    assert_eq!(1, pool.refills());
    assert_eq!(4, pool.remaining());

    pool.next_int(10)?;
    assert_eq!(2, pool.refills());
    assert_eq!(256 - BYTES_PER_DRAW, pool.remaining());
    Ok(())
}

#[test]
fn unique_ints_are_unique() -> Result<()> {
    let mut pool = EntropyPool::new(&GeneratorConfig::default())?;

    let numbers = pool.next_unique_ints(50, 99)?;
    let distinct: HashSet<usize> = numbers.iter().copied().collect();

    assert_eq!(50, numbers.len());
    assert_eq!(50, distinct.len());
    assert!(numbers.iter().all(|n| *n <= 99));
    Ok(())
}

#[test]
fn unique_ints_can_cover_whole_range() -> Result<()> {
    let mut pool = EntropyPool::new(&GeneratorConfig::default())?;

    let mut numbers = pool.next_unique_ints(20, 19)?;
    numbers.sort_unstable();

    assert_eq!((0..20).collect::<Vec<usize>>(), numbers);
    Ok(())
}

#[test]
fn unique_ints_more_than_range() {
    let mut pool = EntropyPool::new(&GeneratorConfig::default()).unwrap();

    let err = pool.next_unique_ints(11, 9).unwrap_err();

    assert!(matches!(err, Error::InvalidParameters(_)));
}

#[test]
fn failing_source_at_construction() {
    let (source, _) = failing(0);

    let res = EntropyPool::with_source(&GeneratorConfig::default(), source);

    assert!(matches!(res, Err(Error::EntropySourceFailure(_))));
}

#[test]
fn failing_source_on_refill() -> Result<()> {
    let config = GeneratorConfig::default().with_buffer_size(256);
    let (source, calls) = failing(1);
    let mut pool = EntropyPool::with_source(&config, source)?;

    for _ in 0..36 {
        pool.next_int(10)?;
    }
    let err = pool.next_int(10).unwrap_err();

    assert!(matches!(err, Error::EntropySourceFailure(_)));
    assert_eq!(2, calls.load(Ordering::SeqCst));
    Ok(())
}

#[test]
fn failing_source_with_fallback() -> Result<()> {
    let config = GeneratorConfig::default()
        .with_buffer_size(256)
        .with_prng_fallback(true);
    let (source, calls) = failing(0);
    let mut pool = EntropyPool::with_source(&config, source)?;

    for _ in 0..100 {
        assert!(pool.next_int(10)? <= 10);
    }
    assert!(calls.load(Ordering::SeqCst) >= 3);
    assert_eq!(pool.refills(), calls.load(Ordering::SeqCst) as u64);
    Ok(())
}
