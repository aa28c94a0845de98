// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Memory ceilings for pooled tensor storage.
//!
//! A [`MemoryBudget`] caps how many bytes a [`MemoryPool`](crate::MemoryPool)
//! may hand out at once. Budgets parse from the short human-readable strings
//! used in config files and on the command line.

use crate::MemoryError;
use std::fmt;
use std::str::FromStr;

const KIB: usize = 1024;
const MIB: usize = 1024 * KIB;
const GIB: usize = 1024 * MIB;

/// Suffixes accepted by [`MemoryBudget::parse`], longest first so that
/// `"MB"` wins over `"B"`.
const SUFFIXES: [(&str, usize); 7] = [
    ("GB", GIB),
    ("MB", MIB),
    ("KB", KIB),
    ("G", GIB),
    ("M", MIB),
    ("K", KIB),
    ("B", 1),
];

/// A hard ceiling on live buffer bytes.
///
/// # Examples
/// ```
/// use ranked_alloc::MemoryBudget;
///
/// let b = MemoryBudget::parse("64M").unwrap();
/// assert_eq!(b.as_mb(), 64);
/// assert_eq!(b.max_elements(4), 16 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct MemoryBudget {
    bytes: usize,
}

impl MemoryBudget {
    /// Creates a budget from a byte count.
    pub fn from_bytes(bytes: usize) -> Self {
        Self { bytes }
    }

    /// Creates a budget from kibibytes.
    pub fn from_kb(kb: usize) -> Self {
        Self { bytes: kb * KIB }
    }

    /// Creates a budget from mebibytes.
    pub fn from_mb(mb: usize) -> Self {
        Self { bytes: mb * MIB }
    }

    /// Creates a budget from gibibytes.
    pub fn from_gb(gb: usize) -> Self {
        Self { bytes: gb * GIB }
    }

    pub fn as_bytes(&self) -> usize {
        self.bytes
    }

    /// Budget in mebibytes, truncated.
    pub fn as_mb(&self) -> usize {
        self.bytes / MIB
    }

    /// How many elements of `elem_size` bytes fit under this budget.
    pub fn max_elements(&self, elem_size: usize) -> usize {
        if elem_size == 0 {
            return usize::MAX;
        }
        self.bytes / elem_size
    }

    /// Returns `true` if `used + request` stays within the ceiling.
    pub fn admits(&self, used: usize, request: usize) -> bool {
        used.checked_add(request)
            .is_some_and(|total| total <= self.bytes)
    }

    /// Parses strings such as `"512M"`, `"1GB"`, `"2048k"` or `"1048576"`.
    ///
    /// Suffixes are case-insensitive. Zero budgets are rejected.
    pub fn parse(s: &str) -> Result<Self, MemoryError> {
        let trimmed = s.trim();
        let upper = trimmed.to_ascii_uppercase();

        let (digits, multiplier) = SUFFIXES
            .iter()
            .find_map(|(suffix, mult)| {
                upper
                    .strip_suffix(suffix)
                    .map(|rest| (rest.trim_end(), *mult))
            })
            .unwrap_or((upper.as_str(), 1));

        let value: usize = digits
            .parse()
            .map_err(|_| MemoryError::InvalidBudget(trimmed.to_string()))?;
        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| MemoryError::InvalidBudget(trimmed.to_string()))?;

        if bytes == 0 {
            return Err(MemoryError::InvalidBudget(trimmed.to_string()));
        }
        Ok(Self { bytes })
    }
}

impl FromStr for MemoryBudget {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MemoryBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = [(GIB, "GB"), (MIB, "MB"), (KIB, "KB")];
        for (unit, label) in units {
            if self.bytes >= unit && self.bytes % unit == 0 {
                return write!(f, "{} {label}", self.bytes / unit);
            }
        }
        write!(f, "{} B", self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_constructors() {
        assert_eq!(MemoryBudget::from_kb(2).as_bytes(), 2048);
        assert_eq!(MemoryBudget::from_mb(3).as_mb(), 3);
        assert_eq!(MemoryBudget::from_gb(1).as_mb(), 1024);
    }

    #[test]
    fn test_parse_suffixes() {
        assert_eq!(MemoryBudget::parse("64M").unwrap(), MemoryBudget::from_mb(64));
        assert_eq!(MemoryBudget::parse("64mb").unwrap(), MemoryBudget::from_mb(64));
        assert_eq!(MemoryBudget::parse("2G").unwrap(), MemoryBudget::from_gb(2));
        assert_eq!(MemoryBudget::parse("16k").unwrap(), MemoryBudget::from_kb(16));
        assert_eq!(MemoryBudget::parse("100B").unwrap().as_bytes(), 100);
        assert_eq!(MemoryBudget::parse("4096").unwrap().as_bytes(), 4096);
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        assert_eq!(MemoryBudget::parse("  8 M ").unwrap().as_mb(), 8);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            MemoryBudget::parse(""),
            Err(MemoryError::InvalidBudget(_))
        ));
        assert!(MemoryBudget::parse("lots").is_err());
        assert!(MemoryBudget::parse("0K").is_err());
        assert!(MemoryBudget::parse("-5M").is_err());
        assert!(MemoryBudget::parse("99999999999999999999G").is_err());
    }

    #[test]
    fn test_from_str() {
        let b: MemoryBudget = "1K".parse().unwrap();
        assert_eq!(b.as_bytes(), 1024);
    }

    #[test]
    fn test_max_elements_and_admits() {
        let b = MemoryBudget::from_bytes(100);
        assert_eq!(b.max_elements(8), 12);
        assert!(b.admits(60, 40));
        assert!(!b.admits(60, 41));
        assert!(!b.admits(usize::MAX, 1));
    }

    #[test]
    fn test_display() {
        assert_eq!(MemoryBudget::from_gb(2).to_string(), "2 GB");
        assert_eq!(MemoryBudget::from_mb(3).to_string(), "3 MB");
        assert_eq!(MemoryBudget::from_bytes(3072).to_string(), "3 KB");
        assert_eq!(MemoryBudget::from_bytes(1000).to_string(), "1000 B");
    }

    #[test]
    fn test_serde_roundtrip() {
        let b = MemoryBudget::from_kb(48);
        let json = serde_json::to_string(&b).unwrap();
        let back: MemoryBudget = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
    }
}
