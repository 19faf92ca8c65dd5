// Random number streams for particle history sampling.
//
// Every sampling routine in this crate draws uniform doubles through the
// `RandomStream` trait rather than a concrete generator, so a deterministic
// replay stream can be injected in tests without any global state.

use rand::{RngCore, SeedableRng};

/// LCG multiplier
const PRN_MULT: u64 = 6364136223846793005;
/// LCG additive constant
const PRN_ADD: u64 = 1442695040888963407;
/// Seed stride between particle histories
const PRN_STRIDE: u64 = 152917;

/// A source of uniform random doubles in [0, 1).
pub trait RandomStream {
    fn sample(&mut self) -> f64;
}

/// 53-bit mantissa conversion of a raw draw to [0, 1).
#[inline(always)]
fn u64_to_unit_f64(word: u64) -> f64 {
    (word >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

impl RandomStream for TransportRng {
    #[inline(always)]
    fn sample(&mut self) -> f64 {
        u64_to_unit_f64(self.next_u64())
    }
}

/// `StdRng` doubles as a stream in seeded stochastic tests.
impl RandomStream for rand::rngs::StdRng {
    #[inline]
    fn sample(&mut self) -> f64 {
        u64_to_unit_f64(self.next_u64())
    }
}

/// Per-history transport generator.
///
/// A PCG variant (RXS-M-XS output permutation over a 64-bit LCG) with only
/// 8 bytes of state, so one generator per history is cheap to construct.
/// Histories are decorrelated by seeding each at a fixed stride from the
/// base seed.
#[derive(Clone, Copy, Debug)]
pub struct TransportRng {
    state: u64,
}

impl TransportRng {
    #[inline]
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generator positioned at the start of the given history's substream.
    #[inline]
    pub fn for_history(base_seed: u64, history_number: u64) -> Self {
        Self {
            state: base_seed.wrapping_add(history_number.wrapping_mul(PRN_STRIDE)),
        }
    }

    /// Reseed in place (for reuse across histories).
    #[inline]
    pub fn reseed(&mut self, seed: u64) {
        self.state = seed;
    }
}

impl SeedableRng for TransportRng {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self {
            state: u64::from_le_bytes(seed),
        }
    }
}

impl RngCore for TransportRng {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        // Advance the LCG
        self.state = PRN_MULT.wrapping_mul(self.state).wrapping_add(PRN_ADD);

        // RXS-M-XS output permutation
        let word = ((self.state >> ((self.state >> 59) + 5)) ^ self.state)
            .wrapping_mul(12605985483714917081);
        (word >> 43) ^ word
    }

    #[inline]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut left = dest;
        while left.len() >= 8 {
            let bytes = self.next_u64().to_le_bytes();
            left[..8].copy_from_slice(&bytes);
            left = &mut left[8..];
        }
        if !left.is_empty() {
            let bytes = self.next_u64().to_le_bytes();
            left.copy_from_slice(&bytes[..left.len()]);
        }
    }

    #[inline]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Deterministic stream replaying a fixed sequence of doubles.
///
/// The sequence cycles when exhausted, so a test vector only needs to cover
/// the draws it constrains.
#[derive(Clone, Debug)]
pub struct FakeStream {
    values: Vec<f64>,
    index: usize,
}

impl FakeStream {
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "fake stream needs at least one value");
        debug_assert!(values.iter().all(|v| (0.0..1.0).contains(v)));

        Self { values, index: 0 }
    }

    /// Number of draws taken so far.
    pub fn draws(&self) -> usize {
        self.index
    }
}

impl RandomStream for FakeStream {
    #[inline]
    fn sample(&mut self) -> f64 {
        let value = self.values[self.index % self.values.len()];
        self.index += 1;
        value
    }
}
