//! Collaborators the facade delegates to: the Blowfish-based transform, the
//! entropy source and the clock used for calibration.

use std::time::{Duration, Instant};

use base64::alphabet::BCRYPT;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use bcrypt::Version;
use rand::RngCore;

use crate::error::{BCryptError, Result};
use crate::format::{self, SALT_PAYLOAD_LEN};

/// Number of raw entropy bytes in a bcrypt salt.
pub const BCRYPT_SALT_LEN: usize = 16;

/// Version tags [`CryptBlowfish`] can emit.
pub const SUPPORTED_VERSIONS: [&str; 4] = ["2a", "2b", "2x", "2y"];

/// Only this many secret bytes reach the key schedule.
pub const MAX_SECRET_BYTES: usize = 72;

// The last salt character carries four unused bits; other implementations
// do not always zero them, so decoding ignores them.
const RADIX64: GeneralPurpose = GeneralPurpose::new(
    &BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// The cost-iterated Blowfish transform.
pub trait HashPrimitive {
    /// Hashes `secret` under a salt string and returns the canonical hash
    /// string. Deterministic for a fixed `(secret, salt)`.
    fn hash(&self, secret: &[u8], salt: &str) -> Result<String>;

    /// Encodes raw entropy into a salt string for `version` and `cost`.
    fn encode_salt(&self, version: &str, cost: u32, entropy: &[u8; BCRYPT_SALT_LEN]) -> String;
}

/// Source of cryptographically secure random bytes. Must be safe to share
/// between concurrent callers.
pub trait RandomSource {
    fn fill_bytes(&self, buf: &mut [u8]);
}

/// Monotonic time, measured from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Production primitive backed by the `bcrypt` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct CryptBlowfish;

fn version_for(tag: &str) -> Option<Version> {
    match tag {
        "2a" => Some(Version::TwoA),
        "2b" => Some(Version::TwoB),
        "2x" => Some(Version::TwoX),
        "2y" => Some(Version::TwoY),
        _ => None,
    }
}

fn decode_salt(payload: &str) -> Result<[u8; BCRYPT_SALT_LEN]> {
    let decoded = RADIX64
        .decode(&payload[..SALT_PAYLOAD_LEN])
        .map_err(|e| BCryptError::Primitive(format!("salt payload: {}", e)))?;
    decoded
        .try_into()
        .map_err(|_| BCryptError::Primitive("salt payload is not 16 bytes".to_string()))
}

impl HashPrimitive for CryptBlowfish {
    fn hash(&self, secret: &[u8], salt: &str) -> Result<String> {
        let parts = format::parse_salt(salt).map_err(BCryptError::InvalidSalt)?;
        let version = version_for(parts.version).ok_or_else(|| {
            BCryptError::Primitive(format!("unsupported version tag {:?}", parts.version))
        })?;
        let cost = parts.cost_value().map_err(BCryptError::InvalidSalt)?;
        let raw_salt = decode_salt(parts.payload)?;

        let hashed = bcrypt::hash_with_salt(secret, cost, raw_salt)
            .map_err(|e| BCryptError::Primitive(e.to_string()))?;
        Ok(hashed.format_for_version(version))
    }

    fn encode_salt(&self, version: &str, cost: u32, entropy: &[u8; BCRYPT_SALT_LEN]) -> String {
        format!("${}${:02}${}", version, cost, RADIX64.encode(entropy))
    }
}

/// Entropy from the thread-local CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn fill_bytes(&self, buf: &mut [u8]) {
        rand::thread_rng().fill_bytes(buf);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}
