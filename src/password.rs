//! Stored bcrypt hashes and secret verification against them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::engine::Engine;
use crate::error::{BCryptError, Result};
use crate::format;
use crate::primitive::{HashPrimitive, RandomSource};

/// A parsed, canonical bcrypt hash. Once constructed its fields are known to
/// be well formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PasswordHash {
    raw: String,
    version: String,
    cost: u32,
    salt: String,
    digest: String,
}

impl PasswordHash {
    /// Parses a stored hash string. Fails with `InvalidHash` unless it is in
    /// the canonical `$vv$cc$<53 radix-64 chars>` form.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let parts = format::parse_hash(&raw).map_err(BCryptError::InvalidHash)?;
        let (version, cost, salt, digest) = (
            parts.version.to_string(),
            parts.cost,
            parts.salt.to_string(),
            parts.digest.to_string(),
        );
        Ok(PasswordHash {
            raw,
            version,
            cost,
            salt,
            digest,
        })
    }

    /// Hashes `secret` under a fresh salt of the given cost.
    pub fn create<P, R>(engine: &Engine<P, R>, secret: impl AsRef<[u8]>, cost: i64) -> Result<Self>
    where
        P: HashPrimitive,
        R: RandomSource,
    {
        let salt = engine.generate_salt(cost)?;
        let hashed = engine.hash(Some(secret.as_ref()), &salt)?;
        Self::new(hashed)
    }

    /// [`create`](Self::create) at the engine's configured default cost.
    pub fn create_default<P, R>(engine: &Engine<P, R>, secret: impl AsRef<[u8]>) -> Result<Self>
    where
        P: HashPrimitive,
        R: RandomSource,
    {
        Self::create(engine, secret, i64::from(engine.config().default_cost))
    }

    /// Re-hashes `candidate` with the stored salt and compares the result
    /// against the stored string in constant time.
    pub fn verify<P, R>(&self, engine: &Engine<P, R>, candidate: impl AsRef<[u8]>) -> Result<bool>
    where
        P: HashPrimitive,
        R: RandomSource,
    {
        let recomputed = engine.hash(Some(candidate.as_ref()), &self.salt)?;
        Ok(recomputed.as_bytes().ct_eq(self.raw.as_bytes()).into())
    }

    /// Like [`verify`](Self::verify), but a primitive failure counts as a mismatch.
    pub fn equals<P, R>(&self, engine: &Engine<P, R>, candidate: impl AsRef<[u8]>) -> bool
    where
        P: HashPrimitive,
        R: RandomSource,
    {
        self.verify(engine, candidate).unwrap_or_else(|e| {
            debug!(error = %e, "verification failed, treating as mismatch");
            false
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// The `$vv$cc$` prefix and salt payload, as fed back to the primitive.
    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn into_string(self) -> String {
        self.raw
    }
}

impl FromStr for PasswordHash {
    type Err = BCryptError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for PasswordHash {
    type Error = BCryptError;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for PasswordHash {
    type Error = BCryptError;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<PasswordHash> for String {
    fn from(hash: PasswordHash) -> Self {
        hash.raw
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
