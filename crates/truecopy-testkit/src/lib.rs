// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::path::PathBuf;
use time::{Date, Duration, Month};
use truecopy_app::{
    ApplicationCategory, ApplicationForm, CopyType, PaymentType, format_paise_plain,
};

/// Fees the counter sees most often, in paise.
const ADVANCE_AMOUNTS: [i64; 7] = [2_000, 5_000, 10_000, 20_000, 50_000, 50_000, 100_000];

const REFERENCE_YEAR: i32 = 2024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoApplication {
    pub application_date: Date,
    pub copy_type: CopyType,
    pub category: Option<ApplicationCategory>,
    pub advance_paise: i64,
    pub payment_type: PaymentType,
}

impl DemoApplication {
    /// Form as the operator would submit it once both numbers are issued.
    pub fn into_form(self, true_copy_number: String, receipt_number: String) -> ApplicationForm {
        ApplicationForm {
            application_date: Some(self.application_date),
            copy_type: Some(self.copy_type),
            category: self.category,
            true_copy_number,
            advance: format_paise_plain(self.advance_paise),
            receipt_number,
            payment_type: Some(self.payment_type),
        }
    }
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn chance(&mut self, percent: u64) -> bool {
        self.next_u64() % 100 < percent
    }
}

#[derive(Debug, Clone)]
pub struct RegisterFaker {
    rng: DeterministicRng,
    seed: u64,
}

impl RegisterFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn application(&mut self) -> Result<DemoApplication> {
        self.application_in_year(REFERENCE_YEAR)
    }

    pub fn application_in_year(&mut self, year: i32) -> Result<DemoApplication> {
        let date = self.date_in_year(year)?;
        Ok(self.application_on(date))
    }

    /// Dated between 1 January of `until`'s year and `until` itself.
    pub fn application_until(&mut self, until: Date) -> Result<DemoApplication> {
        let date = self.date_until(until)?;
        Ok(self.application_on(date))
    }

    pub fn date_in_year(&mut self, year: i32) -> Result<Date> {
        let start = Date::from_calendar_date(year, Month::January, 1)
            .with_context(|| format!("first day of {year}"))?;
        let days = usize::from(time::util::days_in_year(year));
        self.date_from(start, days)
    }

    pub fn date_until(&mut self, until: Date) -> Result<Date> {
        let start = Date::from_calendar_date(until.year(), Month::January, 1)
            .with_context(|| format!("first day of {}", until.year()))?;
        self.date_from(start, usize::from(until.ordinal()))
    }

    fn date_from(&mut self, start: Date, days: usize) -> Result<Date> {
        let offset = self.rng.int_n(days) as i64;
        start
            .checked_add(Duration::days(offset))
            .with_context(|| format!("day {offset} after {start}"))
    }

    /// Certified copies outnumber simple ones roughly three to one; about a
    /// quarter of receipts are recoveries.
    fn application_on(&mut self, application_date: Date) -> DemoApplication {
        let copy_type = if self.rng.chance(75) {
            CopyType::CertifiedCopy
        } else {
            CopyType::SimpleCopy
        };
        let category = copy_type.requires_category().then(|| {
            if self.rng.chance(40) {
                ApplicationCategory::Urgent
            } else {
                ApplicationCategory::Ordinary
            }
        });
        let payment_type = if self.rng.chance(25) {
            PaymentType::Recovery
        } else {
            PaymentType::Advance
        };
        DemoApplication {
            application_date,
            copy_type,
            category,
            advance_paise: ADVANCE_AMOUNTS[self.rng.int_n(ADVANCE_AMOUNTS.len())],
            payment_type,
        }
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("truecopy.db");
    Ok((dir, db_path))
}

pub fn advance_amounts() -> &'static [i64] {
    &ADVANCE_AMOUNTS
}
