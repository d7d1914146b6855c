//! Sequential human-readable codes (`M000005`, `E000012`).
//!
//! A code is a one-letter kind prefix followed by a zero-padded number.
//! Ordering is always numeric: `M100000` sorts after `M99999` even though
//! a lexical comparison says otherwise. This module only computes values;
//! reserving a code is the store's job (the unique constraint on the code
//! column is the final arbiter).

use std::fmt;

use crate::types::EntityKind;

/// Number of digits after the prefix.
pub const CODE_WIDTH: usize = 6;

/// Largest number that still fits in [`CODE_WIDTH`] digits.
pub const MAX_CODE_NUMBER: u32 = 999_999;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeError {
    #[error("code space for prefix {prefix} is exhausted")]
    CapacityExceeded { prefix: char },

    #[error("code number {number} is outside 1..={MAX_CODE_NUMBER}")]
    OutOfRange { number: u32 },
}

/// A validated sequential code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequentialCode {
    kind: EntityKind,
    number: u32,
}

impl SequentialCode {
    pub fn new(kind: EntityKind, number: u32) -> Result<Self, CodeError> {
        if number == 0 || number > MAX_CODE_NUMBER {
            return Err(CodeError::OutOfRange { number });
        }
        Ok(Self { kind, number })
    }

    /// Parse a stored code of the given kind.
    ///
    /// Returns `None` for anything that is not `<prefix><digits>` with a
    /// value in range, so legacy identifiers such as `EMP001` are skipped.
    pub fn parse(kind: EntityKind, raw: &str) -> Option<Self> {
        let digits = raw.strip_prefix(kind.code_prefix())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let number: u32 = digits.parse().ok()?;
        Self::new(kind, number).ok()
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn number(&self) -> u32 {
        self.number
    }
}

impl fmt::Display for SequentialCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:0width$}",
            self.kind.code_prefix(),
            self.number,
            width = CODE_WIDTH
        )
    }
}

/// Highest code among `codes` by numeric suffix. Unparseable entries are ignored.
pub fn max_code<'a, I>(kind: EntityKind, codes: I) -> Option<SequentialCode>
where
    I: IntoIterator<Item = &'a str>,
{
    codes
        .into_iter()
        .filter_map(|raw| SequentialCode::parse(kind, raw))
        .max_by_key(SequentialCode::number)
}

/// Compute the code that follows `current_max` (the highest number already
/// assigned for `kind`, if any).
pub fn next_code(kind: EntityKind, current_max: Option<u32>) -> Result<SequentialCode, CodeError> {
    let next = match current_max {
        None => 1,
        Some(n) => n
            .checked_add(1)
            .ok_or(CodeError::CapacityExceeded {
                prefix: kind.code_prefix(),
            })?,
    };
    if next > MAX_CODE_NUMBER {
        return Err(CodeError::CapacityExceeded {
            prefix: kind.code_prefix(),
        });
    }
    SequentialCode::new(kind, next)
}
