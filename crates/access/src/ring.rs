//! Token ring ranges
//!
//! Half-open token intervals over the ring with wrap-around aware
//! enclosure checks, plus the token bounds of the supported partitioners.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Ring range errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RingRangeError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Expected 2 range boundaries, got {0}")]
    InvalidBoundaries(usize),
}

/// A contiguous interval `[start, end)` on the token ring
///
/// `start > end` wraps past the ring maximum. `start == end` covers the
/// whole ring.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RingRange {
    /// Start token (inclusive)
    pub start: BigInt,
    /// End token (exclusive)
    pub end: BigInt,
}

impl RingRange {
    pub fn new(start: BigInt, end: BigInt) -> Self {
        Self { start, end }
    }

    /// Parse a range from two decimal token strings
    pub fn parse(start: &str, end: &str) -> Result<Self, RingRangeError> {
        Ok(Self::new(parse_token(start)?, parse_token(end)?))
    }

    /// Build a range from the boundary list used as key in range maps
    pub fn from_boundaries(bounds: &[String]) -> Result<Self, RingRangeError> {
        match bounds {
            [start, end] => Self::parse(start, end),
            _ => Err(RingRangeError::InvalidBoundaries(bounds.len())),
        }
    }

    pub fn is_wrapping(&self) -> bool {
        self.start > self.end
    }

    pub fn is_full_ring(&self) -> bool {
        self.start == self.end
    }

    /// Check if a token falls inside this range
    pub fn contains_token(&self, token: &BigInt) -> bool {
        if self.is_full_ring() {
            true
        } else if self.is_wrapping() {
            *token >= self.start || *token < self.end
        } else {
            *token >= self.start && *token < self.end
        }
    }

    /// Check if every token of `other` also belongs to this range
    pub fn encloses(&self, other: &RingRange) -> bool {
        if self == other || self.is_full_ring() {
            return true;
        }
        if other.is_full_ring() {
            return false;
        }

        match (self.is_wrapping(), other.is_wrapping()) {
            (false, false) => other.start >= self.start && other.end <= self.end,
            // A plain range can never hold one that crosses the ring end
            (false, true) => false,
            // Either entirely in the tail [start, max] or in the head [min, end)
            (true, false) => other.start >= self.start || other.end <= self.end,
            (true, true) => other.start >= self.start && other.end <= self.end,
        }
    }
}

impl fmt::Display for RingRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

fn parse_token(raw: &str) -> Result<BigInt, RingRangeError> {
    BigInt::from_str(raw.trim()).map_err(|_| RingRangeError::InvalidToken(raw.to_string()))
}

/// Partitioners with integer tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partitioner {
    /// Tokens in [-2^63, 2^63 - 1]
    Murmur3,
    /// Tokens in [0, 2^127]
    Random,
}

impl Partitioner {
    /// Resolve a partitioner from its (possibly fully qualified) class name
    pub fn from_class_name(name: &str) -> Option<Self> {
        match name.rsplit('.').next()? {
            "Murmur3Partitioner" => Some(Partitioner::Murmur3),
            "RandomPartitioner" => Some(Partitioner::Random),
            _ => None,
        }
    }

    pub fn min_token(&self) -> BigInt {
        match self {
            Partitioner::Murmur3 => BigInt::from(i64::MIN),
            Partitioner::Random => BigInt::from(0),
        }
    }

    pub fn max_token(&self) -> BigInt {
        match self {
            Partitioner::Murmur3 => BigInt::from(i64::MAX),
            Partitioner::Random => BigInt::from(1u8) << 127,
        }
    }

    pub fn is_valid_token(&self, token: &BigInt) -> bool {
        *token >= self.min_token() && *token <= self.max_token()
    }

    /// Both boundaries of `range` are tokens of this partitioner
    pub fn is_valid_range(&self, range: &RingRange) -> bool {
        self.is_valid_token(&range.start) && self.is_valid_token(&range.end)
    }
}
