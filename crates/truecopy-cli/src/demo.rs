// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use time::Date;
use tracing::info;
use truecopy_db::Store;
use truecopy_testkit::{DemoApplication, RegisterFaker};

pub const DEMO_SEED: u64 = 20_240_401;

const CURRENT_YEAR_APPLICATIONS: usize = 24;
const PREVIOUS_YEAR_APPLICATIONS: usize = 8;

/// Fills an empty register with a year and a bit of counter traffic. Older
/// applications are mostly disposed; recent ones stay pending and are never
/// dated after `today`.
pub fn seed_demo_data(store: &Store, faker: &mut RegisterFaker, today: Date) -> Result<usize> {
    let mut seeded = 0;
    for _ in 0..PREVIOUS_YEAR_APPLICATIONS {
        let application = faker.application_in_year(today.year() - 1)?;
        seed_application(store, faker, application, 75)?;
        seeded += 1;
    }
    for _ in 0..CURRENT_YEAR_APPLICATIONS {
        let application = faker.application_until(today)?;
        seed_application(store, faker, application, 20)?;
        seeded += 1;
    }
    info!(seeded, seed = faker.seed(), "seeded demo register");
    Ok(seeded)
}

fn seed_application(
    store: &Store,
    faker: &mut RegisterFaker,
    application: DemoApplication,
    dispose_percent: usize,
) -> Result<()> {
    let receipt_date = application.application_date;
    let true_copy_number = store.next_true_copy_number(
        application.copy_type,
        application.category,
        receipt_date.year(),
    )?;
    let receipt_number = store.next_receipt_number()?;
    let form = application.into_form(true_copy_number, receipt_number);
    let id = store
        .save_application(&form, receipt_date)
        .with_context(|| format!("seed demo application {}", form.true_copy_number))?;
    if faker.int_n(100) < dispose_percent {
        store.dispose_application(id, receipt_date)?;
    }
    Ok(())
}
