// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Display helpers for paise amounts. Parsing lives with the store, which
//! owns the rules for what the register accepts.

pub fn format_rupees(paise: i64) -> String {
    let (sign, paise) = normalize_sign(paise);
    format!("{sign}₹{}.{:02}", indian_group(paise / 100), paise % 100)
}

/// `₹2,500` for whole rupees, `₹2,500.50` otherwise.
pub fn format_rupees_compact(paise: i64) -> String {
    if paise % 100 == 0 {
        let (sign, paise) = normalize_sign(paise);
        return format!("{sign}₹{}", indian_group(paise / 100));
    }
    format_rupees(paise)
}

/// Amount as an operator would type it back in: `500`, `500.50`.
pub fn format_paise_plain(paise: i64) -> String {
    let (sign, paise) = normalize_sign(paise);
    if paise % 100 == 0 {
        return format!("{sign}{}", paise / 100);
    }
    format!("{sign}{}.{:02}", paise / 100, paise % 100)
}

/// Lakh/crore grouping: the last three digits, then pairs (`12,34,567`).
fn indian_group(value: i64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

fn normalize_sign(paise: i64) -> (&'static str, i64) {
    if paise >= 0 {
        return ("", paise);
    }
    ("-", paise.checked_neg().unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::{format_paise_plain, format_rupees, format_rupees_compact};

    #[test]
    fn format_rupees_uses_indian_grouping() {
        assert_eq!(format_rupees(0), "₹0.00");
        assert_eq!(format_rupees(50_050), "₹500.50");
        assert_eq!(format_rupees(150_000), "₹1,500.00");
        assert_eq!(format_rupees(12_345_600), "₹1,23,456.00");
        assert_eq!(format_rupees(1_234_567_00), "₹12,34,567.00");
        assert_eq!(format_rupees(-2_500), "-₹25.00");
    }

    #[test]
    fn format_rupees_compact_drops_zero_paise() {
        assert_eq!(format_rupees_compact(250_000), "₹2,500");
        assert_eq!(format_rupees_compact(250_050), "₹2,500.50");
        assert_eq!(format_rupees_compact(0), "₹0");
    }

    #[test]
    fn format_paise_plain_round_trips_typed_values() {
        assert_eq!(format_paise_plain(50_000), "500");
        assert_eq!(format_paise_plain(50_050), "500.50");
        assert_eq!(format_paise_plain(5), "0.05");
        assert_eq!(format_paise_plain(-150), "-1.50");
    }
}
