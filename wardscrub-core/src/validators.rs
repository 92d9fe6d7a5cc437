// File: wardscrub-core/src/validators.rs
//! Programmatic validation functions for specific identifier formats.
//!
//! These run after a regex hit for rules that set `programmatic_validation`
//! and reject matches that have the right shape but cannot be real
//! identifiers. The built-in library leaves them switched off.
//!
//! License: MIT OR APACHE 2.0

use once_cell::sync::Lazy;
use std::collections::HashSet;

// Verhoeff dihedral group multiplication table.
const VERHOEFF_D: [[u8; 10]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [1, 2, 3, 4, 0, 6, 7, 8, 9, 5],
    [2, 3, 4, 0, 1, 7, 8, 9, 5, 6],
    [3, 4, 0, 1, 2, 8, 9, 5, 6, 7],
    [4, 0, 1, 2, 3, 9, 5, 6, 7, 8],
    [5, 9, 8, 7, 6, 0, 4, 3, 2, 1],
    [6, 5, 9, 8, 7, 1, 0, 4, 3, 2],
    [7, 6, 5, 9, 8, 2, 1, 0, 4, 3],
    [8, 7, 6, 5, 9, 3, 2, 1, 0, 4],
    [9, 8, 7, 6, 5, 4, 3, 2, 1, 0],
];

// Verhoeff permutation table.
const VERHOEFF_P: [[u8; 10]; 8] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [1, 5, 7, 6, 2, 8, 3, 0, 9, 4],
    [5, 8, 0, 3, 7, 9, 6, 1, 4, 2],
    [8, 9, 1, 6, 0, 4, 3, 5, 2, 7],
    [9, 4, 5, 3, 1, 2, 7, 8, 6, 0],
    [4, 2, 8, 6, 5, 7, 3, 9, 0, 1],
    [2, 7, 9, 3, 8, 0, 6, 4, 1, 5],
    [7, 0, 4, 6, 9, 1, 3, 2, 5, 8],
];

/// Fourth character of a PAN encodes the holder type.
static PAN_HOLDER_TYPES: Lazy<HashSet<char>> = Lazy::new(|| {
    let mut set = HashSet::new();
    set.extend(['A', 'B', 'C', 'F', 'G', 'H', 'L', 'J', 'P', 'T']);
    set
});

/// Validates a digit string against the Verhoeff checksum.
///
/// The last digit is the check digit. Returns `false` for empty input or any
/// non-digit character.
pub fn is_valid_verhoeff(num_str: &str) -> bool {
    if num_str.is_empty() {
        return false;
    }
    let mut c = 0u8;
    for (i, ch) in num_str.chars().rev().enumerate() {
        let Some(digit) = ch.to_digit(10) else { return false; };
        c = VERHOEFF_D[c as usize][VERHOEFF_P[i % 8][digit as usize] as usize];
    }
    c == 0
}

/// Checks a twelve-digit, space-grouped national identifier.
///
/// Whitespace is ignored. The number must have exactly twelve digits, must
/// not start with 0 or 1, and must pass the Verhoeff checksum.
pub fn is_valid_aadhaar_programmatically(value: &str) -> bool {
    let digits: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if digits.starts_with('0') || digits.starts_with('1') {
        return false;
    }
    is_valid_verhoeff(&digits)
}

/// Checks the structure of a ten-character tax code (`AAAAA9999A`).
pub fn is_valid_pan_programmatically(value: &str) -> bool {
    let chars: Vec<char> = value.trim().chars().collect();
    if chars.len() != 10 {
        return false;
    }
    let letters_ok = chars[..5].iter().all(|c| c.is_ascii_uppercase()) && chars[9].is_ascii_uppercase();
    let digits_ok = chars[5..9].iter().all(|c| c.is_ascii_digit());
    letters_ok && digits_ok && PAN_HOLDER_TYPES.contains(&chars[3])
}
