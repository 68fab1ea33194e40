use std::{
    collections::HashSet,
    time::{SystemTime, UNIX_EPOCH},
};

use log::{debug, warn};
use rand::{
    rngs::{OsRng, StdRng},
    RngCore, SeedableRng,
};
use zeroize::Zeroizing;

use crate::{
    error::{Error, Result},
    settings::{effective_buffer_size, GeneratorConfig},
};

/// Bytes consumed from the buffer for every random number.
pub const BYTES_PER_DRAW: usize = 7;
/// 5 bits from the first byte of a draw and 8 bits from each of the other six.
const DRAW_BITS: u32 = 53;

/// A source of random bytes used to fill an `EntropyPool`.
pub trait EntropySource: Send {
    fn fill(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error>;
}

/// The operating system's cryptographically secure random number generator.
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        OsRng.try_fill_bytes(dest)
    }
}

/// A buffer of secure random bytes that hands out uniformly distributed integers,
/// refilling itself whenever there aren't enough unread bytes left for another draw.
pub struct EntropyPool {
    source: Box<dyn EntropySource>,
    fallback: Option<StdRng>,
    allow_prng_fallback: bool,
    buffer: Zeroizing<Vec<u8>>,
    position: usize,
    refills: u64,
}

impl EntropyPool {
    /// Creates a pool backed by the operating system and fills it.
    pub fn new(config: &GeneratorConfig) -> Result<EntropyPool> {
        EntropyPool::with_source(config, Box::new(OsEntropy))
    }

    pub fn with_source(
        config: &GeneratorConfig,
        source: Box<dyn EntropySource>,
    ) -> Result<EntropyPool> {
        let mut pool = EntropyPool {
            source,
            fallback: None,
            allow_prng_fallback: config.allow_prng_fallback,
            buffer: Zeroizing::new(vec![0; effective_buffer_size(config.buffer_size)]),
            position: 0,
            refills: 0,
        };
        pool.refill()?;

        Ok(pool)
    }

    /// Returns a random integer in `[0, max]`.
    pub fn next_int(&mut self, max: usize) -> Result<usize> {
        if self.remaining() < BYTES_PER_DRAW {
            self.refill()?;
        }

        let draw = &self.buffer[self.position..self.position + BYTES_PER_DRAW];
        self.position += BYTES_PER_DRAW;

        // the last byte is the most significant, only the low 5 bits of the first byte are used
        let mut bits = 0u64;
        for byte in draw[1..].iter().rev() {
            bits = (bits << 8) | u64::from(*byte);
        }
        bits = (bits << 5) | u64::from(draw[0] & 0x1f);

        let scaled = (u128::from(bits) * (max as u128 + 1)) >> DRAW_BITS;
        Ok(scaled as usize)
    }

    /// Returns `count` distinct random integers in `[0, max]`, in the order they were drawn.
    pub fn next_unique_ints(&mut self, count: usize, max: usize) -> Result<Vec<usize>> {
        if let Some(available) = max.checked_add(1) {
            if count > available {
                return Err(Error::InvalidParameters(format!(
                    "can't draw {count} unique numbers from a range of {available}"
                )));
            }
        }

        let mut seen = HashSet::with_capacity(count);
        let mut numbers = Vec::with_capacity(count);
        while numbers.len() < count {
            let number = self.next_int(max)?;
            if seen.insert(number) {
                numbers.push(number);
            }
        }

        Ok(numbers)
    }

    /// Unread bytes left in the buffer.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    /// How many times the buffer has been filled, including the initial fill.
    pub fn refills(&self) -> u64 {
        self.refills
    }

    fn refill(&mut self) -> Result<()> {
        debug!("filling entropy buffer with {} bytes", self.buffer.len());

        if let Err(err) = self.source.fill(&mut self.buffer) {
            if !self.allow_prng_fallback {
                return Err(Error::EntropySourceFailure(err));
            }
            warn!("secure entropy source failed ({err}), falling back to a pseudo random generator");
            self.fallback
                .get_or_insert_with(|| StdRng::seed_from_u64(fallback_seed()))
                .fill_bytes(&mut self.buffer);
        }

        self.position = 0;
        self.refills += 1;
        Ok(())
    }
}

fn fallback_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    nanos ^ (u64::from(std::process::id()) << 32)
}

#[cfg(test)]
#[path = "tests/entropy.rs"]
mod entropy_tests;
