//! Random / Pattern Source.
//!
//! Produces the byte streams every overwrite pass writes: OS CSPRNG output
//! via `ring::rand::SystemRandom` for a random pass, or a constant fill for
//! a zero/one pass.

use crate::error::{WipeError, WipeResult};
use ring::rand::{SecureRandom, SystemRandom};

/// A single overwrite pass's byte pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Pattern {
    Zero,
    One,
    Random,
}

impl Pattern {
    pub fn constant_byte(&self) -> Option<u8> {
        match self {
            Pattern::Zero => Some(0x00),
            Pattern::One => Some(0xFF),
            Pattern::Random => None,
        }
    }
}

/// Fills caller-provided buffers with a chosen pattern. Holds no
/// caller-observable state: each `fill` call for `Pattern::Random` draws
/// fresh bytes from the OS CSPRNG.
pub struct PatternSource {
    rng: SystemRandom,
}

impl Default for PatternSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternSource {
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }

    /// Fill `buf` according to `pattern`.
    pub fn fill(&self, buf: &mut [u8], pattern: Pattern) -> WipeResult<()> {
        match pattern.constant_byte() {
            Some(byte) => {
                buf.fill(byte);
                Ok(())
            }
            None => self.rng.fill(buf).map_err(|_| {
                WipeError::Io(std::io::Error::other("OS CSPRNG failed to produce random bytes"))
            }),
        }
    }
}
