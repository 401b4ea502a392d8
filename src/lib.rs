//! Password hashing around the bcrypt / crypt_blowfish family.
//!
//! The Blowfish transform itself comes from the `bcrypt` crate; this crate
//! owns the string format, input validation, salt generation, verification
//! and cost calibration.

pub mod calibrate;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod password;
pub mod primitive;

#[cfg(test)]
pub(crate) mod testing;

pub use calibrate::Calibrator;
pub use config::{HashConfig, DEFAULT_COST, MAX_COST, MIN_COST};
pub use engine::Engine;
pub use error::{BCryptError, Result};
pub use format::{is_valid_hash, is_valid_salt, FormatError};
pub use password::PasswordHash;
pub use primitive::{Clock, CryptBlowfish, HashPrimitive, RandomSource, SystemClock, ThreadRandom};
