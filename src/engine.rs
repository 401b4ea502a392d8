use tracing::{debug, trace};

use crate::config::{HashConfig, MAX_COST, MIN_COST};
use crate::error::{BCryptError, Result};
use crate::format;
use crate::primitive::{
    CryptBlowfish, HashPrimitive, RandomSource, ThreadRandom, BCRYPT_SALT_LEN, MAX_SECRET_BYTES,
};

/// Validating front door to the hash primitive. Nothing else in the crate
/// calls [`HashPrimitive::hash`] or draws entropy.
#[derive(Debug, Clone)]
pub struct Engine<P = CryptBlowfish, R = ThreadRandom> {
    primitive: P,
    random: R,
    config: HashConfig,
}

impl Engine {
    /// Engine over the `bcrypt` crate and the thread-local CSPRNG.
    pub fn new() -> Self {
        Engine {
            primitive: CryptBlowfish,
            random: ThreadRandom,
            config: HashConfig::default(),
        }
    }

    /// Absent is the only invalid secret; empty and arbitrary bytes are fine.
    pub fn is_valid_secret(secret: Option<&[u8]>) -> bool {
        secret.is_some()
    }

    pub fn is_valid_salt(salt: &str) -> bool {
        format::is_valid_salt(salt)
    }

    /// Cost field of a salt or hash string.
    pub fn cost_of(salt: &str) -> Result<u32> {
        format::parse_salt(salt)
            .and_then(|parts| parts.cost_value())
            .map_err(BCryptError::InvalidSalt)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: HashPrimitive, R: RandomSource> Engine<P, R> {
    pub fn with_parts(primitive: P, random: R, config: HashConfig) -> Result<Self> {
        config.validate()?;
        Ok(Engine {
            primitive,
            random,
            config,
        })
    }

    pub fn config(&self) -> &HashConfig {
        &self.config
    }

    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    /// Hashes `secret` with `salt` and returns the primitive's output as is.
    pub fn hash(&self, secret: Option<&[u8]>, salt: &str) -> Result<String> {
        let secret = secret.ok_or(BCryptError::InvalidSecret)?;
        format::parse_salt(salt).map_err(BCryptError::InvalidSalt)?;

        if secret.len() > MAX_SECRET_BYTES {
            debug!(
                secret_len = secret.len(),
                used = MAX_SECRET_BYTES,
                "secret longer than the primitive reads; tail is ignored"
            );
        }
        trace!(salt_len = salt.len(), "invoking hash primitive");
        self.primitive.hash(secret, salt).map_err(|e| {
            debug!(error = %e, "hash primitive rejected validated input");
            e
        })
    }

    /// Fresh salt at `cost`, clamped into `[MIN_COST, MAX_COST]`.
    pub fn generate_salt(&self, cost: i64) -> Result<String> {
        if cost <= 0 {
            return Err(BCryptError::InvalidCost(format!(
                "cost must be a positive integer, got {}",
                cost
            )));
        }
        let clamped = u32::try_from(cost)
            .unwrap_or(MAX_COST)
            .clamp(MIN_COST, MAX_COST);
        if i64::from(clamped) != cost {
            debug!(requested = cost, clamped, "cost clamped to supported range");
        }

        let mut entropy = [0u8; BCRYPT_SALT_LEN];
        self.random.fill_bytes(&mut entropy);
        debug!(cost = clamped, version = %self.config.version, "generated salt");
        Ok(self
            .primitive
            .encode_salt(&self.config.version, clamped, &entropy))
    }

    /// Fresh salt at the configured default cost.
    pub fn generate_default_salt(&self) -> Result<String> {
        self.generate_salt(i64::from(self.config.default_cost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakePrimitive, FixedRandom};

    fn fake_engine() -> Result<Engine<FakePrimitive, FixedRandom>> {
        Engine::with_parts(
            FakePrimitive::default(),
            FixedRandom::default(),
            HashConfig::default(),
        )
    }

    #[test]
    fn test_generated_salt_is_valid() -> Result<()> {
        let engine = Engine::new();
        let salt = engine.generate_salt(10)?;
        assert!(Engine::is_valid_salt(&salt));
        assert!(salt.starts_with("$2a$10$"));
        assert_eq!(Engine::cost_of(&salt)?, 10);
        Ok(())
    }

    #[test]
    fn test_generated_salts_differ() -> Result<()> {
        let engine = Engine::new();
        assert_ne!(engine.generate_salt(10)?, engine.generate_salt(10)?);
        Ok(())
    }

    #[test]
    fn test_invalid_costs() {
        let engine = Engine::new();
        assert!(matches!(engine.generate_salt(0), Err(BCryptError::InvalidCost(_))));
        assert!(matches!(engine.generate_salt(-1), Err(BCryptError::InvalidCost(_))));
    }

    #[test]
    fn test_cost_is_clamped() -> Result<()> {
        let engine = Engine::new();
        assert_eq!(Engine::cost_of(&engine.generate_salt(1)?)?, MIN_COST);
        assert_eq!(Engine::cost_of(&engine.generate_salt(40)?)?, MAX_COST);
        assert_eq!(Engine::cost_of(&engine.generate_salt(i64::MAX)?)?, MAX_COST);
        Ok(())
    }

    #[test]
    fn test_default_salt_uses_config() -> Result<()> {
        let config = HashConfig::default().with_default_cost(6).with_version("2b");
        let engine = Engine::with_parts(CryptBlowfish, ThreadRandom, config)?;
        assert!(engine.generate_default_salt()?.starts_with("$2b$06$"));
        Ok(())
    }

    #[test]
    fn test_salt_consumes_entropy() -> Result<()> {
        let engine = fake_engine()?;
        engine.generate_salt(5)?;
        engine.generate_salt(5)?;
        assert_eq!(engine.random.draws(), 2);
        Ok(())
    }

    #[test]
    fn test_absent_secret_is_rejected() -> Result<()> {
        let engine = fake_engine()?;
        let salt = engine.generate_salt(5)?;
        assert!(matches!(engine.hash(None, &salt), Err(BCryptError::InvalidSecret)));
        assert_eq!(engine.primitive.calls(), 0);
        Ok(())
    }

    #[test]
    fn test_bad_salt_never_reaches_primitive() -> Result<()> {
        let engine = fake_engine()?;
        let result = engine.hash(Some(b"x"), "not-a-salt");
        assert!(matches!(result, Err(BCryptError::InvalidSalt(_))));
        assert_eq!(engine.primitive.calls(), 0);
        Ok(())
    }

    #[test]
    fn test_secret_predicate() {
        assert!(Engine::is_valid_secret(Some(b"")));
        assert!(Engine::is_valid_secret(Some(&[0, 255])));
        assert!(!Engine::is_valid_secret(None));
    }

    #[test]
    fn test_empty_secret_hashes() -> Result<()> {
        let engine = Engine::new();
        let salt = engine.generate_salt(4)?;
        let hash = engine.hash(Some(b""), &salt)?;
        assert!(format::is_valid_hash(&hash));
        assert!(hash.starts_with(&salt));
        Ok(())
    }

    #[test]
    fn test_hash_is_deterministic() -> Result<()> {
        let engine = Engine::new();
        let salt = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.";
        assert_eq!(
            engine.hash(Some(b"U*U"), salt)?,
            "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW"
        );
        assert_ne!(engine.hash(Some(b"U*U*"), salt)?, engine.hash(Some(b"U*U"), salt)?);
        Ok(())
    }

    #[test]
    fn test_cost_of_rejects_garbage() {
        assert!(matches!(Engine::cost_of("$2a$$abc"), Err(BCryptError::InvalidSalt(_))));
    }
}
