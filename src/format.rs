//! Structural grammar of bcrypt salt and hash strings.
//!
//! Salts are admitted with "at least" bounds because callers may hand them in
//! from other bcrypt-family implementations. Stored hashes are only accepted
//! in the canonical fixed-width form the primitive emits.

use std::fmt;

use thiserror::Error;

/// BCrypt's radix-64 alphabet, in encoding order.
pub const BCRYPT_ALPHABET: &[u8] =
    b"./ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Encoded length of the 16 salt bytes.
pub const SALT_PAYLOAD_LEN: usize = 22;
/// Encoded length of the 23 digest bytes.
pub const DIGEST_LEN: usize = 31;
pub const HASH_PAYLOAD_LEN: usize = SALT_PAYLOAD_LEN + DIGEST_LEN;
/// `$2a$10$` plus the salt payload.
pub const SALT_PREFIX_LEN: usize = 7 + SALT_PAYLOAD_LEN;
pub const HASH_LEN: usize = SALT_PREFIX_LEN + DIGEST_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Version,
    Cost,
    Payload,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Field::Version => "version",
            Field::Cost => "cost",
            Field::Payload => "payload",
        })
    }
}

/// Length constraint on a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    AtLeast(usize),
    Exactly(usize),
}

impl Bound {
    fn admits(self, len: usize) -> bool {
        match self {
            Bound::AtLeast(min) => len >= min,
            Bound::Exactly(n) => len == n,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Bound::AtLeast(n) => write!(f, "at least {}", n),
            Bound::Exactly(n) => write!(f, "exactly {}", n),
        }
    }
}

/// The specific way a string failed the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("missing `$` before the {0} field")]
    MissingDelimiter(Field),

    #[error("{field} field has {found} characters, expected {expected}")]
    Length {
        field: Field,
        expected: Bound,
        found: usize,
    },

    #[error("{field} field contains invalid character {found:?}")]
    Character { field: Field, found: char },

    #[error("cost field does not fit in 32 bits")]
    CostOverflow,

    /// Well formed, but not a tag the hash primitive can emit.
    #[error("version tag is not supported")]
    UnsupportedVersion,
}

/// Fields of a well-formed salt string, borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaltParts<'a> {
    pub version: &'a str,
    pub cost: &'a str,
    /// Radix-64 payload; only its first [`SALT_PAYLOAD_LEN`] characters carry entropy.
    pub payload: &'a str,
}

impl SaltParts<'_> {
    /// Numeric value of the cost field. The grammar admits any digit run, so
    /// this can still overflow.
    pub fn cost_value(&self) -> Result<u32, FormatError> {
        self.cost.parse().map_err(|_| FormatError::CostOverflow)
    }
}

/// Fields of a canonical hash string, borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParts<'a> {
    pub version: &'a str,
    pub cost: u32,
    /// `$ver$cost$` plus the salt payload: a valid salt string in its own right.
    pub salt: &'a str,
    pub digest: &'a str,
}

fn is_version_char(b: u8) -> bool {
    b.is_ascii_digit() || b.is_ascii_lowercase()
}

fn is_radix64(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'.' || b == b'/'
}

fn check_field(
    field: Field,
    value: &str,
    bound: Bound,
    allowed: fn(u8) -> bool,
) -> Result<(), FormatError> {
    if let Some(found) = value.chars().find(|c| !c.is_ascii() || !allowed(*c as u8)) {
        return Err(FormatError::Character { field, found });
    }
    if !bound.admits(value.len()) {
        return Err(FormatError::Length {
            field,
            expected: bound,
            found: value.len(),
        });
    }
    Ok(())
}

/// Splits `$version$cost$payload` on its three delimiters. A stray `$` inside
/// the payload is left for the payload check to reject.
fn delimited(s: &str) -> Result<(&str, &str, &str), FormatError> {
    let rest = s
        .strip_prefix('$')
        .ok_or(FormatError::MissingDelimiter(Field::Version))?;
    let (version, rest) = rest
        .split_once('$')
        .ok_or(FormatError::MissingDelimiter(Field::Cost))?;
    let (cost, payload) = rest
        .split_once('$')
        .ok_or(FormatError::MissingDelimiter(Field::Payload))?;
    Ok((version, cost, payload))
}

/// Parses a salt string: `$` version `$` cost `$` payload with a version of
/// one or more `[0-9a-z]`, a cost of two or more digits and a payload of at
/// least 22 radix-64 characters.
pub fn parse_salt(s: &str) -> Result<SaltParts<'_>, FormatError> {
    let (version, cost, payload) = delimited(s)?;
    check_field(Field::Version, version, Bound::AtLeast(1), is_version_char)?;
    check_field(Field::Cost, cost, Bound::AtLeast(2), |b| b.is_ascii_digit())?;
    check_field(
        Field::Payload,
        payload,
        Bound::AtLeast(SALT_PAYLOAD_LEN),
        is_radix64,
    )?;
    Ok(SaltParts {
        version,
        cost,
        payload,
    })
}

/// Parses a canonical hash string: a two character version, a two digit cost
/// and exactly 53 radix-64 characters of salt and digest.
///
/// Only the shape of the cost is checked, so `$2a$00$...` parses with cost 0.
/// Such a hash can be stored and read back, but no salt generated here has it.
pub fn parse_hash(s: &str) -> Result<HashParts<'_>, FormatError> {
    let (version, cost, payload) = delimited(s)?;
    check_field(Field::Version, version, Bound::Exactly(2), is_version_char)?;
    check_field(Field::Cost, cost, Bound::Exactly(2), |b| b.is_ascii_digit())?;
    check_field(
        Field::Payload,
        payload,
        Bound::Exactly(HASH_PAYLOAD_LEN),
        is_radix64,
    )?;

    let (version, cost, salt, digest) = split_hash(s);
    Ok(HashParts {
        version,
        cost,
        salt,
        digest,
    })
}

pub fn is_valid_salt(s: &str) -> bool {
    parse_salt(s).is_ok()
}

pub fn is_valid_hash(s: &str) -> bool {
    parse_hash(s).is_ok()
}

/// Cuts a hash string into `(version, cost, salt, digest)` by fixed offsets.
///
/// Does no checking of its own: `hash` must already have passed
/// [`is_valid_hash`]. Anything else may panic or yield garbage.
pub fn split_hash(hash: &str) -> (&str, u32, &str, &str) {
    let digits = hash.as_bytes();
    let cost = u32::from(digits[4] - b'0') * 10 + u32::from(digits[5] - b'0');
    (
        &hash[1..3],
        cost,
        &hash[..SALT_PREFIX_LEN],
        &hash[SALT_PREFIX_LEN..],
    )
}
