//! Human-readable reference codes.
//!
//! Codes follow `PREFIX-BUCKET-NNNN`: a scope prefix, the time bucket the
//! counter resets on, and a zero-padded ordinal of at least four digits.
//!
//! | Scope   | Example              | Bucket |
//! |---------|----------------------|--------|
//! | Journal | `JRN-20250116-0001`  | day    |
//! | Sale    | `POS-20250116-0001`  | day    |
//! | Deposit | `SMP-20250116-0001`  | day    |
//! | Member  | `KOOP-2025-0001`     | year   |
//!
//! This module only formats and parses. Locking the last issued code and
//! persisting the next one happens in the database layer.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Minimum number of digits in the ordinal.
pub const ORDINAL_WIDTH: usize = 4;

/// How often a counter restarts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketGranularity {
    /// Restarts every calendar day.
    Daily,
    /// Restarts every calendar year.
    Yearly,
}

/// An independent counter family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceScope {
    /// Journal entry numbers.
    Journal,
    /// Point-of-sale sale numbers.
    Sale,
    /// Deposit reference numbers.
    Deposit,
    /// Member numbers.
    Member,
}

impl SequenceScope {
    /// Code prefix for this scope.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Journal => "JRN",
            Self::Sale => "POS",
            Self::Deposit => "SMP",
            Self::Member => "KOOP",
        }
    }

    /// Reset granularity for this scope.
    #[must_use]
    pub const fn granularity(self) -> BucketGranularity {
        match self {
            Self::Journal | Self::Sale | Self::Deposit => BucketGranularity::Daily,
            Self::Member => BucketGranularity::Yearly,
        }
    }

    /// Bucket token embedded in codes issued on `date`.
    #[must_use]
    pub fn bucket_token(self, date: NaiveDate) -> String {
        match self.granularity() {
            BucketGranularity::Daily => date.format("%Y%m%d").to_string(),
            BucketGranularity::Yearly => format!("{:04}", date.year()),
        }
    }

    /// Everything before the ordinal, e.g. `JRN-20250116-`.
    #[must_use]
    pub fn code_prefix(self, date: NaiveDate) -> String {
        format!("{}-{}-", self.prefix(), self.bucket_token(date))
    }

    /// Formats the code for `ordinal` in the bucket containing `date`.
    #[must_use]
    pub fn format_code(self, date: NaiveDate, ordinal: u32) -> String {
        format!(
            "{}{ordinal:0width$}",
            self.code_prefix(date),
            width = ORDINAL_WIDTH
        )
    }

    /// Splits a code of this scope into its bucket token and ordinal.
    ///
    /// Returns `None` when the prefix, bucket shape, or ordinal is malformed.
    #[must_use]
    pub fn parse_code(self, code: &str) -> Option<(&str, u32)> {
        let rest = code.strip_prefix(self.prefix())?.strip_prefix('-')?;
        let (bucket, ordinal) = rest.rsplit_once('-')?;

        let bucket_len = match self.granularity() {
            BucketGranularity::Daily => 8,
            BucketGranularity::Yearly => 4,
        };
        if bucket.len() != bucket_len || !bucket.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if ordinal.len() < ORDINAL_WIDTH || !ordinal.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        Some((bucket, ordinal.parse().ok()?))
    }

    /// Ordinal to issue after `last` for the bucket containing `date`.
    ///
    /// A missing, unparseable, or other-bucket `last` restarts the counter at 1.
    #[must_use]
    pub fn next_ordinal(self, last: Option<&str>, date: NaiveDate) -> u32 {
        let token = self.bucket_token(date);
        match last.and_then(|code| self.parse_code(code)) {
            Some((bucket, ordinal)) if bucket == token => ordinal.saturating_add(1),
            _ => 1,
        }
    }

    /// Next code after `last` for the bucket containing `date`.
    #[must_use]
    pub fn next_code(self, last: Option<&str>, date: NaiveDate) -> String {
        self.format_code(date, self.next_ordinal(last, date))
    }

    /// Lowercase name used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Journal => "journal",
            Self::Sale => "sale",
            Self::Deposit => "deposit",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for SequenceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
