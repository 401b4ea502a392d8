//! Deterministic stand-ins for the primitive, entropy and clock.

use std::cell::Cell;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::time::Duration;

use crate::error::{BCryptError, Result};
use crate::format::{self, BCRYPT_ALPHABET, DIGEST_LEN, SALT_PAYLOAD_LEN};
use crate::primitive::{Clock, HashPrimitive, RandomSource, BCRYPT_SALT_LEN};

#[derive(Debug, Default)]
pub struct FakeClock {
    now: Cell<Duration>,
}

impl FakeClock {
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for Rc<FakeClock> {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Cheap keyed digest. When given a clock, each call advances it by
/// `2^cost` milliseconds to mimic the real cost curve.
#[derive(Debug, Default)]
pub struct FakePrimitive {
    calls: Cell<usize>,
    clock: Option<Rc<FakeClock>>,
}

impl FakePrimitive {
    pub fn timed(clock: Rc<FakeClock>) -> Self {
        FakePrimitive {
            calls: Cell::new(0),
            clock: Some(clock),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl HashPrimitive for FakePrimitive {
    fn hash(&self, secret: &[u8], salt: &str) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        let parts = format::parse_salt(salt).map_err(BCryptError::InvalidSalt)?;
        let cost = parts.cost_value().map_err(BCryptError::InvalidSalt)?;
        if let Some(clock) = &self.clock {
            clock.advance(Duration::from_millis(1u64 << cost.min(40)));
        }

        let payload = &parts.payload[..SALT_PAYLOAD_LEN];
        let mut hasher = DefaultHasher::new();
        (secret, parts.version, cost, payload).hash(&mut hasher);
        let mut state = hasher.finish();
        let digest: String = (0..DIGEST_LEN)
            .map(|_| {
                let c = BCRYPT_ALPHABET[(state % 64) as usize] as char;
                state = state.rotate_right(6) ^ 0x9e37_79b9_7f4a_7c15;
                c
            })
            .collect();
        Ok(format!(
            "${}${:02}${}{}",
            parts.version, cost, payload, digest
        ))
    }

    fn encode_salt(&self, version: &str, cost: u32, entropy: &[u8; BCRYPT_SALT_LEN]) -> String {
        let payload: String = entropy
            .iter()
            .chain(entropy.iter())
            .take(SALT_PAYLOAD_LEN)
            .map(|b| BCRYPT_ALPHABET[(*b % 64) as usize] as char)
            .collect();
        format!("${}${:02}${}", version, cost, payload)
    }
}

/// Hands out an incrementing byte pattern and counts draws.
#[derive(Debug, Default)]
pub struct FixedRandom {
    draws: Cell<u8>,
}

impl FixedRandom {
    pub fn draws(&self) -> u8 {
        self.draws.get()
    }
}

impl RandomSource for FixedRandom {
    fn fill_bytes(&self, buf: &mut [u8]) {
        let seed = self.draws.get();
        for (i, b) in buf.iter_mut().enumerate() {
            *b = seed.wrapping_add(i as u8);
        }
        self.draws.set(seed.wrapping_add(1));
    }
}
