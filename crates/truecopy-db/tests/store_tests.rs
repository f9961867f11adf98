// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use time::{Date, Month};
use truecopy_app::{
    ApplicationCategory, ApplicationForm, ApplicationId, ApplicationStatus, CopyType, PaymentType,
    parse_true_copy_sequence,
};
use truecopy_db::{Store, validate_db_path};
use truecopy_testkit::{RegisterFaker, temp_db_path};

fn date(year: i32, month: Month, day: u8) -> Date {
    Date::from_calendar_date(year, month, day).expect("valid date")
}

fn bootstrapped() -> Result<Store> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    Ok(store)
}

fn form(
    application_date: Date,
    copy_type: CopyType,
    category: Option<ApplicationCategory>,
    true_copy_number: &str,
    advance: &str,
    receipt_number: &str,
) -> ApplicationForm {
    ApplicationForm {
        application_date: Some(application_date),
        copy_type: Some(copy_type),
        category,
        true_copy_number: true_copy_number.to_owned(),
        advance: advance.to_owned(),
        receipt_number: receipt_number.to_owned(),
        payment_type: Some(PaymentType::Advance),
    }
}

/// Saves with freshly generated numbers, the way the entry screen does.
fn save_next(
    store: &Store,
    application_date: Date,
    copy_type: CopyType,
    category: Option<ApplicationCategory>,
    advance: &str,
) -> Result<ApplicationId> {
    let true_copy_number =
        store.next_true_copy_number(copy_type, category, application_date.year())?;
    let receipt_number = store.next_receipt_number()?;
    store.save_application(
        &form(
            application_date,
            copy_type,
            category,
            &true_copy_number,
            advance,
            &receipt_number,
        ),
        application_date,
    )
}

fn row_count(store: &Store, table: &str) -> Result<i64> {
    Ok(store
        .raw_connection()
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })?)
}

#[test]
fn validate_db_path_rejects_uri_forms() {
    assert!(validate_db_path("file:test.db").is_err());
    assert!(validate_db_path("https://example.com/db.sqlite").is_err());
    assert!(validate_db_path("db.sqlite?mode=ro").is_err());
    assert!(validate_db_path("").is_err());
    assert!(validate_db_path("/tmp/truecopy.db").is_ok());
    assert!(validate_db_path(":memory:").is_ok());
}

#[test]
fn bootstrap_rejects_schema_missing_required_column() -> Result<()> {
    let store = bootstrapped()?;

    store.raw_connection().execute_batch(
        "
            DROP TABLE receipt_register;
            CREATE TABLE receipt_register (
              id INTEGER PRIMARY KEY,
              receipt_date TEXT NOT NULL,
              receipt_number TEXT NOT NULL,
              amount INTEGER NOT NULL,
              true_copy_number TEXT NOT NULL
            );
            ",
    )?;

    let err = store
        .bootstrap()
        .expect_err("schema validation should fail");
    let message = err.to_string();
    assert!(message.contains("table `receipt_register` is missing required columns"));
    assert!(message.contains("payment_type"));
    Ok(())
}

#[test]
fn true_copy_number_starts_at_one_and_increments_after_save() -> Result<()> {
    let store = bootstrapped()?;
    let urgent = Some(ApplicationCategory::Urgent);

    assert_eq!(
        store.next_true_copy_number(CopyType::CertifiedCopy, urgent, 2024)?,
        "CC/001/2024"
    );
    save_next(
        &store,
        date(2024, Month::March, 4),
        CopyType::CertifiedCopy,
        urgent,
        "500",
    )?;
    assert_eq!(
        store.next_true_copy_number(CopyType::CertifiedCopy, urgent, 2024)?,
        "CC/002/2024"
    );
    Ok(())
}

#[test]
fn sequences_are_independent_per_partition_and_reset_each_year() -> Result<()> {
    let store = bootstrapped()?;
    let urgent = Some(ApplicationCategory::Urgent);
    let ordinary = Some(ApplicationCategory::Ordinary);

    for _ in 0..3 {
        save_next(
            &store,
            date(2024, Month::May, 1),
            CopyType::CertifiedCopy,
            urgent,
            "500",
        )?;
    }
    save_next(
        &store,
        date(2024, Month::May, 2),
        CopyType::SimpleCopy,
        None,
        "20",
    )?;

    assert_eq!(
        store.next_true_copy_number(CopyType::CertifiedCopy, urgent, 2024)?,
        "CC/004/2024"
    );
    assert_eq!(
        store.next_true_copy_number(CopyType::CertifiedCopy, ordinary, 2024)?,
        "CC/001/2024"
    );
    assert_eq!(
        store.next_true_copy_number(CopyType::SimpleCopy, None, 2024)?,
        "SC/002/2024"
    );
    assert_eq!(
        store.next_true_copy_number(CopyType::CertifiedCopy, urgent, 2025)?,
        "CC/001/2025"
    );
    Ok(())
}

#[test]
fn unparseable_true_copy_numbers_are_ignored() -> Result<()> {
    let store = bootstrapped()?;
    store.save_application(
        &form(
            date(2024, Month::January, 9),
            CopyType::SimpleCopy,
            None,
            "typed by hand",
            "50",
            "1",
        ),
        date(2024, Month::January, 9),
    )?;
    store.save_application(
        &form(
            date(2024, Month::January, 9),
            CopyType::SimpleCopy,
            None,
            "SC/007/2024",
            "50",
            "2",
        ),
        date(2024, Month::January, 9),
    )?;

    assert_eq!(
        store.next_true_copy_number(CopyType::SimpleCopy, None, 2024)?,
        "SC/008/2024"
    );
    Ok(())
}

#[test]
fn next_receipt_number_is_numeric_max_plus_one() -> Result<()> {
    let store = bootstrapped()?;
    assert_eq!(store.next_receipt_number()?, "1");

    for (index, receipt) in ["9", "10", "2"].into_iter().enumerate() {
        store.save_application(
            &form(
                date(2024, Month::February, 1),
                CopyType::SimpleCopy,
                None,
                &format!("SC/{:03}/2024", index + 1),
                "20",
                receipt,
            ),
            date(2024, Month::February, 1),
        )?;
    }

    assert_eq!(store.next_receipt_number()?, "11");
    Ok(())
}

#[test]
fn duplicate_receipt_number_changes_neither_table() -> Result<()> {
    let store = bootstrapped()?;
    let day = date(2024, Month::April, 10);
    store.save_application(
        &form(
            day,
            CopyType::CertifiedCopy,
            Some(ApplicationCategory::Urgent),
            "CC/001/2024",
            "500",
            "41",
        ),
        day,
    )?;

    let err = store
        .save_application(
            &form(
                day,
                CopyType::CertifiedCopy,
                Some(ApplicationCategory::Urgent),
                "CC/002/2024",
                "500",
                "41",
            ),
            day,
        )
        .expect_err("duplicate receipt should be rejected");
    assert!(err.to_string().contains("receipt number 41 already exists"));

    assert_eq!(row_count(&store, "true_copy_applications")?, 1);
    assert_eq!(row_count(&store, "receipt_register")?, 1);
    Ok(())
}

#[test]
fn receipt_numbers_with_the_same_value_are_duplicates() -> Result<()> {
    let store = bootstrapped()?;
    let day = date(2024, Month::April, 9);
    store.save_application(
        &form(day, CopyType::SimpleCopy, None, "SC/001/2024", "20", "42"),
        day,
    )?;

    for receipt in ["042", "R-42"] {
        let err = store
            .save_application(
                &form(day, CopyType::SimpleCopy, None, "SC/002/2024", "20", receipt),
                day,
            )
            .expect_err("same numeric receipt value should be rejected");
        assert!(
            err.to_string().contains("already exists"),
            "receipt={receipt}: {err}"
        );
    }
    assert_eq!(row_count(&store, "receipt_register")?, 1);

    store.save_application(
        &form(day, CopyType::SimpleCopy, None, "SC/002/2024", "20", "43"),
        day,
    )?;
    assert_eq!(row_count(&store, "receipt_register")?, 2);
    Ok(())
}

#[test]
fn failed_receipt_insert_rolls_back_the_application_row() -> Result<()> {
    let store = bootstrapped()?;
    store.raw_connection().execute_batch(
        "
        CREATE TRIGGER reject_receipts BEFORE INSERT ON receipt_register
        BEGIN
          SELECT RAISE(ABORT, 'receipt register is closed');
        END;
        ",
    )?;
    let day = date(2024, Month::April, 12);
    let save = form(day, CopyType::SimpleCopy, None, "SC/001/2024", "20", "1");

    let err = store
        .save_application(&save, day)
        .expect_err("receipt insert should fail");
    let message = format!("{err:#}");
    assert!(message.contains("insert receipt register entry"), "{message}");
    assert!(message.contains("receipt register is closed"), "{message}");
    assert_eq!(row_count(&store, "true_copy_applications")?, 0);
    assert_eq!(row_count(&store, "receipt_register")?, 0);

    store
        .raw_connection()
        .execute_batch("DROP TRIGGER reject_receipts;")?;
    store.save_application(&save, day)?;
    assert_eq!(row_count(&store, "true_copy_applications")?, 1);
    assert_eq!(row_count(&store, "receipt_register")?, 1);
    Ok(())
}

#[test]
fn duplicate_true_copy_number_is_rejected_before_any_write() -> Result<()> {
    let store = bootstrapped()?;
    let day = date(2024, Month::April, 10);
    store.save_application(
        &form(day, CopyType::SimpleCopy, None, "SC/001/2024", "20", "1"),
        day,
    )?;

    let err = store
        .save_application(
            &form(day, CopyType::SimpleCopy, None, "SC/001/2024", "20", "2"),
            day,
        )
        .expect_err("duplicate true copy number should be rejected");
    assert!(err.to_string().contains("already issued"));
    assert_eq!(row_count(&store, "receipt_register")?, 1);
    Ok(())
}

#[test]
fn urgent_and_ordinary_may_share_a_number() -> Result<()> {
    let store = bootstrapped()?;
    let day = date(2024, Month::April, 11);
    save_next(
        &store,
        day,
        CopyType::CertifiedCopy,
        Some(ApplicationCategory::Urgent),
        "500",
    )?;
    save_next(
        &store,
        day,
        CopyType::CertifiedCopy,
        Some(ApplicationCategory::Ordinary),
        "500",
    )?;

    let numbers = store
        .list_pending()?
        .into_iter()
        .map(|application| application.true_copy_number)
        .collect::<Vec<_>>();
    assert_eq!(numbers, vec!["CC/001/2024", "CC/001/2024"]);

    let err = store
        .save_application(
            &form(
                day,
                CopyType::CertifiedCopy,
                Some(ApplicationCategory::Ordinary),
                "CC/001/2024",
                "500",
                "3",
            ),
            day,
        )
        .expect_err("number already used by an ordinary copy");
    assert!(err.to_string().contains("already issued"));
    Ok(())
}

#[test]
fn certified_copy_requires_category_and_simple_copy_stores_null() -> Result<()> {
    let store = bootstrapped()?;
    let day = date(2024, Month::June, 1);

    let err = store
        .save_application(
            &form(day, CopyType::CertifiedCopy, None, "CC/001/2024", "100", "1"),
            day,
        )
        .expect_err("category is required");
    assert!(err.to_string().contains("category is required"));
    assert_eq!(row_count(&store, "true_copy_applications")?, 0);

    let id = store.save_application(
        &form(
            day,
            CopyType::SimpleCopy,
            Some(ApplicationCategory::Urgent),
            "SC/001/2024",
            "100",
            "1",
        ),
        day,
    )?;
    let stored: Option<String> = store.raw_connection().query_row(
        "SELECT application_category FROM true_copy_applications WHERE id = ?",
        [id.get()],
        |row| row.get(0),
    )?;
    assert_eq!(stored, None);
    Ok(())
}

#[test]
fn missing_fields_and_bad_advance_are_rejected() -> Result<()> {
    let store = bootstrapped()?;
    let day = date(2024, Month::June, 1);

    let err = store
        .save_application(
            &form(day, CopyType::SimpleCopy, None, "SC/001/2024", "", "1"),
            day,
        )
        .expect_err("advance is required");
    assert!(err.to_string().contains("all fields are required"));

    let err = store
        .save_application(
            &form(day, CopyType::SimpleCopy, None, "SC/001/2024", "five hundred", "1"),
            day,
        )
        .expect_err("advance must be numeric");
    assert!(err.to_string().contains("not a valid amount"));

    assert_eq!(row_count(&store, "true_copy_applications")?, 0);
    assert_eq!(row_count(&store, "receipt_register")?, 0);
    Ok(())
}

#[test]
fn save_writes_application_and_receipt_together() -> Result<()> {
    let store = bootstrapped()?;
    let applied = date(2024, Month::July, 15);
    let saved_on = date(2024, Month::July, 16);
    let mut entry = form(
        applied,
        CopyType::CertifiedCopy,
        Some(ApplicationCategory::Ordinary),
        "CC/001/2024",
        "₹1,500.50",
        " 12 ",
    );
    entry.payment_type = Some(PaymentType::Recovery);
    let id = store.save_application(&entry, saved_on)?;

    let detail = store.get_application(id)?;
    let application = &detail.application;
    assert_eq!(application.application_date, applied);
    assert_eq!(application.received_date, applied);
    assert_eq!(application.advance_paise, 150_050);
    assert_eq!(application.receipt_number, "12");
    assert_eq!(application.status, ApplicationStatus::Pending);
    assert_eq!(application.disposed_date, None);
    assert_eq!(detail.payment_type, Some(PaymentType::Recovery));

    let receipts = store.list_receipts()?;
    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].receipt_date, saved_on);
    assert_eq!(receipts[0].receipt_number, "12");
    assert_eq!(receipts[0].amount_paise, 150_050);
    assert_eq!(receipts[0].true_copy_number, "CC/001/2024");
    Ok(())
}

#[test]
fn get_application_payment_type_requires_matching_amount() -> Result<()> {
    let store = bootstrapped()?;
    let id = save_next(
        &store,
        date(2024, Month::August, 1),
        CopyType::SimpleCopy,
        None,
        "50",
    )?;
    store
        .raw_connection()
        .execute("UPDATE receipt_register SET amount = amount + 100", [])?;

    let detail = store.get_application(id)?;
    assert_eq!(detail.payment_type, None);
    Ok(())
}

#[test]
fn get_application_reports_missing_id() -> Result<()> {
    let store = bootstrapped()?;
    let err = store
        .get_application(ApplicationId::new(404))
        .expect_err("missing application");
    assert!(err.to_string().contains("application 404 not found"));
    Ok(())
}

#[test]
fn list_pending_orders_newest_first_with_id_tiebreak() -> Result<()> {
    let store = bootstrapped()?;
    let older = save_next(
        &store,
        date(2024, Month::January, 5),
        CopyType::SimpleCopy,
        None,
        "20",
    )?;
    let same_day_first = save_next(
        &store,
        date(2024, Month::March, 1),
        CopyType::SimpleCopy,
        None,
        "20",
    )?;
    let same_day_second = save_next(
        &store,
        date(2024, Month::March, 1),
        CopyType::SimpleCopy,
        None,
        "20",
    )?;

    let ids = store
        .list_pending()?
        .into_iter()
        .map(|application| application.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![same_day_second, same_day_first, older]);
    Ok(())
}

#[test]
fn pending_summary_groups_by_amount_descending() -> Result<()> {
    let store = bootstrapped()?;
    let day = date(2024, Month::September, 9);
    for _ in 0..3 {
        save_next(&store, day, CopyType::CertifiedCopy, Some(ApplicationCategory::Urgent), "500")?;
    }
    save_next(&store, day, CopyType::SimpleCopy, None, "1000")?;

    let summary = store.pending_summary()?;
    let rows = summary
        .rows
        .iter()
        .map(|row| (row.amount_paise, row.application_count, row.total_paise))
        .collect::<Vec<_>>();
    assert_eq!(rows, vec![(100_000, 1, 100_000), (50_000, 3, 150_000)]);
    assert_eq!(summary.total_applications, 4);
    assert_eq!(summary.total_paise, 250_000);
    Ok(())
}

#[test]
fn empty_register_has_empty_summary() -> Result<()> {
    let store = bootstrapped()?;
    let summary = store.pending_summary()?;
    assert!(summary.rows.is_empty());
    assert_eq!(summary.total_applications, 0);
    assert_eq!(summary.total_paise, 0);
    Ok(())
}

#[test]
fn disposed_applications_leave_pending_views() -> Result<()> {
    let store = bootstrapped()?;
    let day = date(2024, Month::October, 2);
    let kept = save_next(&store, day, CopyType::SimpleCopy, None, "20")?;
    let disposed = save_next(&store, day, CopyType::SimpleCopy, None, "500")?;

    let disposed_on = date(2024, Month::October, 20);
    store.dispose_application(disposed, disposed_on)?;

    let pending = store.list_pending()?;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, kept);

    let summary = store.pending_summary()?;
    assert_eq!(summary.total_applications, 1);
    assert_eq!(summary.total_paise, 2_000);

    let detail = store.get_application(disposed)?;
    assert_eq!(detail.application.status, ApplicationStatus::Disposed);
    assert_eq!(detail.application.disposed_date, Some(disposed_on));

    let err = store
        .dispose_application(disposed, disposed_on)
        .expect_err("second disposal should fail");
    assert!(err.to_string().contains("already disposed"));

    let err = store
        .dispose_application(ApplicationId::new(999), disposed_on)
        .expect_err("missing application");
    assert!(err.to_string().contains("not found"));
    Ok(())
}

#[test]
fn disposed_numbers_still_count_toward_sequences() -> Result<()> {
    let store = bootstrapped()?;
    let day = date(2024, Month::November, 11);
    let id = save_next(&store, day, CopyType::SimpleCopy, None, "20")?;
    store.dispose_application(id, day)?;

    assert_eq!(
        store.next_true_copy_number(CopyType::SimpleCopy, None, 2024)?,
        "SC/002/2024"
    );
    assert_eq!(store.next_receipt_number()?, "2");
    Ok(())
}

#[test]
fn file_backed_store_persists_across_reopen() -> Result<()> {
    let (_dir, path) = temp_db_path()?;
    {
        let store = Store::open(&path)?;
        store.bootstrap()?;
        save_next(
            &store,
            date(2024, Month::December, 1),
            CopyType::SimpleCopy,
            None,
            "20",
        )?;
    }

    let store = Store::open(&path)?;
    store.bootstrap()?;
    assert_eq!(store.list_pending()?.len(), 1);
    assert_eq!(store.next_receipt_number()?, "2");
    Ok(())
}

#[test]
fn generated_sequences_increase_strictly_within_each_partition() -> Result<()> {
    let store = bootstrapped()?;
    let mut faker = RegisterFaker::new(2024);
    for year in [2023, 2024] {
        for _ in 0..40 {
            let demo = faker.application_in_year(year)?;
            let true_copy_number = store.next_true_copy_number(
                demo.copy_type,
                demo.category,
                demo.application_date.year(),
            )?;
            let receipt_number = store.next_receipt_number()?;
            let receipt_date = demo.application_date;
            store.save_application(
                &demo.into_form(true_copy_number, receipt_number),
                receipt_date,
            )?;
        }
    }

    let mut applications = store.list_pending()?;
    applications.sort_by_key(|application| application.id);
    let mut last_seen = std::collections::HashMap::new();
    for application in applications {
        let key = (
            application.application_date.year(),
            application.copy_type,
            application.category,
        );
        let sequence =
            parse_true_copy_sequence(&application.true_copy_number).expect("generated number");
        let previous = last_seen.insert(key, sequence).unwrap_or(0);
        assert_eq!(sequence, previous + 1, "{}", application.true_copy_number);
    }
    assert_eq!(store.next_receipt_number()?, "81");
    Ok(())
}
