// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Formatting and parsing for the two sequential identifiers the register
//! issues: true copy numbers (`CC/007/2024`) and receipt numbers (`1042`).

use crate::CopyType;

pub const FIRST_SEQUENCE: u32 = 1;

pub fn format_true_copy_number(copy_type: CopyType, sequence: u32, year: i32) -> String {
    format!("{}/{sequence:03}/{year}", copy_type.prefix())
}

/// Returns the middle segment of a true copy number, or `None` when the value
/// was typed by hand in some other shape.
pub fn parse_true_copy_sequence(raw: &str) -> Option<u32> {
    let mut segments = raw.trim().split('/');
    let _prefix = segments.next()?;
    let sequence = segments.next()?.trim();
    if sequence.is_empty() || !sequence.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    sequence.parse().ok()
}

/// Next sequence after the largest parseable number in `existing`.
pub fn next_true_copy_sequence<'a, I>(existing: I) -> u32
where
    I: IntoIterator<Item = &'a str>,
{
    existing
        .into_iter()
        .filter_map(parse_true_copy_sequence)
        .max()
        .map_or(FIRST_SEQUENCE, |max| max.saturating_add(1))
}

/// Digits of a receipt number with everything else stripped (`R-0042` is 42).
pub fn receipt_number_value(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

pub fn next_receipt_number<'a, I>(existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    existing
        .into_iter()
        .filter_map(receipt_number_value)
        .max()
        .map_or(1, |max| max.saturating_add(1))
        .to_string()
}
