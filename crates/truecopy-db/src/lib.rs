// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod validation;

use anyhow::{Context, Result, anyhow, bail};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::Date;
use tracing::{debug, info, warn};
use truecopy_app::{
    ApplicationCategory, ApplicationDetail, ApplicationForm, ApplicationId, ApplicationStatus,
    CopyType, PaymentType, PendingSummary, ReceiptId, ReceiptRegisterEntry, SummaryRow,
    TrueCopyApplication, format_true_copy_number, next_receipt_number, next_true_copy_sequence,
    receipt_number_value,
};

pub use validation::{
    ValidationError, ValidationResult, format_date, parse_required_date, parse_required_paise,
};

pub const APP_NAME: &str = "truecopy";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    (
        "true_copy_applications",
        &[
            "id",
            "application_date",
            "copy_type",
            "application_category",
            "true_copy_number",
            "received_date",
            "advance_amount",
            "receipt_number",
            "status",
            "disposed_date",
        ],
    ),
    (
        "receipt_register",
        &[
            "id",
            "receipt_date",
            "receipt_number",
            "payment_type",
            "amount",
            "true_copy_number",
        ],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequiredIndex {
    name: &'static str,
    create_sql: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[
    RequiredIndex {
        name: "idx_receipt_register_receipt_number",
        create_sql: "CREATE UNIQUE INDEX IF NOT EXISTS idx_receipt_register_receipt_number ON receipt_register (receipt_number);",
    },
    RequiredIndex {
        name: "idx_true_copy_applications_partition_number",
        create_sql: "CREATE UNIQUE INDEX IF NOT EXISTS idx_true_copy_applications_partition_number ON true_copy_applications (copy_type, IFNULL(application_category, ''), true_copy_number);",
    },
    RequiredIndex {
        name: "idx_true_copy_applications_status",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_true_copy_applications_status ON true_copy_applications (status);",
    },
    RequiredIndex {
        name: "idx_true_copy_applications_partition",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_true_copy_applications_partition ON true_copy_applications (copy_type, application_category, application_date);",
    },
];

const APPLICATION_COLUMNS: &str = "
    id, application_date, copy_type, application_category, true_copy_number,
    received_date, advance_amount, receipt_number, status, disposed_date
";

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        debug!(path = %path.display(), "opened register database");
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
            info!("created register schema");
        }

        ensure_required_indexes(&self.conn)?;
        Ok(())
    }

    /// Next free true copy number in the (year, copy type, category)
    /// partition. Simple copies always use the NULL category.
    pub fn next_true_copy_number(
        &self,
        copy_type: CopyType,
        category: Option<ApplicationCategory>,
        year: i32,
    ) -> Result<String> {
        let category = if copy_type.requires_category() {
            category
        } else {
            None
        };
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT true_copy_number
                FROM true_copy_applications
                WHERE substr(application_date, 1, 4) = ?
                  AND copy_type = ?
                  AND application_category IS ?
                ",
            )
            .context("prepare true copy number query")?;
        let rows = stmt
            .query_map(
                params![
                    format!("{year:04}"),
                    copy_type.as_str(),
                    category.map(ApplicationCategory::as_str),
                ],
                |row| row.get::<_, String>(0),
            )
            .context("query true copy numbers")?;
        let existing = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("collect true copy numbers")?;

        let sequence = next_true_copy_sequence(existing.iter().map(String::as_str));
        let number = format_true_copy_number(copy_type, sequence, year);
        debug!(
            copy_type = copy_type.as_str(),
            category = ?category,
            year,
            number = %number,
            "generated true copy number"
        );
        Ok(number)
    }

    pub fn next_receipt_number(&self) -> Result<String> {
        next_receipt_number_in(&self.conn)
    }

    /// Validates the form and writes the application and its receipt in one
    /// immediate transaction. Neither table changes when any check fails.
    pub fn save_application(
        &self,
        form: &ApplicationForm,
        receipt_date: Date,
    ) -> Result<ApplicationId> {
        form.validate()?;
        let (Some(application_date), Some(copy_type), Some(payment_type)) =
            (form.application_date, form.copy_type, form.payment_type)
        else {
            bail!("all fields are required -- fill in the form and retry");
        };
        let advance_paise = parse_required_paise(&form.advance).map_err(|error| {
            anyhow!(
                "advance {:?} is not a valid amount ({error}) -- enter a number like 500 or 500.50 and retry",
                form.advance.trim()
            )
        })?;
        let category = form.effective_category();
        let true_copy_number = form.true_copy_number.trim();
        let receipt_number = form.receipt_number.trim();

        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)
            .context("begin save transaction")?;

        if receipt_number_exists(&tx, receipt_number)? {
            warn!(receipt_number, "rejected duplicate receipt number");
            bail!(
                "receipt number {receipt_number} already exists -- use the next receipt number and retry"
            );
        }
        if true_copy_number_exists(&tx, copy_type, category, true_copy_number)? {
            warn!(true_copy_number, "rejected duplicate true copy number");
            bail!(
                "true copy number {true_copy_number} is already issued -- regenerate the number and retry"
            );
        }

        tx.execute(
            "
            INSERT INTO true_copy_applications (
              application_date, copy_type, application_category, true_copy_number,
              received_date, advance_amount, receipt_number, status
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                format_date(application_date),
                copy_type.as_str(),
                category.map(ApplicationCategory::as_str),
                true_copy_number,
                format_date(application_date),
                advance_paise,
                receipt_number,
                ApplicationStatus::Pending.as_str(),
            ],
        )
        .context("insert true copy application")?;
        let application_id = ApplicationId::new(tx.last_insert_rowid());

        tx.execute(
            "
            INSERT INTO receipt_register (
              receipt_date, receipt_number, payment_type, amount, true_copy_number
            ) VALUES (?, ?, ?, ?, ?)
            ",
            params![
                format_date(receipt_date),
                receipt_number,
                payment_type.as_str(),
                advance_paise,
                true_copy_number,
            ],
        )
        .context("insert receipt register entry")?;

        tx.commit().context("commit save transaction")?;
        info!(
            id = application_id.get(),
            true_copy_number,
            receipt_number,
            advance_paise,
            payment_type = payment_type.as_str(),
            "saved true copy application"
        );
        Ok(application_id)
    }

    pub fn list_pending(&self) -> Result<Vec<TrueCopyApplication>> {
        let sql = format!(
            "
            SELECT {APPLICATION_COLUMNS}
            FROM true_copy_applications
            WHERE status = ?
            ORDER BY application_date DESC, id DESC
            "
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .context("prepare pending applications query")?;
        let rows = stmt
            .query_map(
                params![ApplicationStatus::Pending.as_str()],
                application_from_row,
            )
            .context("query pending applications")?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect pending applications")
    }

    pub fn get_application(&self, application_id: ApplicationId) -> Result<ApplicationDetail> {
        let sql = format!(
            "
            SELECT {APPLICATION_COLUMNS}
            FROM true_copy_applications
            WHERE id = ?
            "
        );
        let application = self
            .conn
            .query_row(&sql, params![application_id.get()], application_from_row)
            .optional()
            .with_context(|| format!("load application {application_id}"))?
            .ok_or_else(|| {
                anyhow!("application {application_id} not found -- choose an entry from the list and retry")
            })?;

        let payment_raw: Option<String> = self
            .conn
            .query_row(
                "
                SELECT payment_type
                FROM receipt_register
                WHERE receipt_number = ? AND amount = ?
                ORDER BY id DESC
                LIMIT 1
                ",
                params![application.receipt_number, application.advance_paise],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("load receipt for application {application_id}"))?;

        Ok(ApplicationDetail {
            payment_type: payment_raw.as_deref().and_then(PaymentType::parse),
            application,
        })
    }

    pub fn dispose_application(
        &self,
        application_id: ApplicationId,
        disposed_date: Date,
    ) -> Result<()> {
        let rows_affected = self
            .conn
            .execute(
                "
                UPDATE true_copy_applications
                SET status = ?, disposed_date = ?
                WHERE id = ? AND status = ?
                ",
                params![
                    ApplicationStatus::Disposed.as_str(),
                    format_date(disposed_date),
                    application_id.get(),
                    ApplicationStatus::Pending.as_str(),
                ],
            )
            .with_context(|| format!("dispose application {application_id}"))?;
        if rows_affected == 0 {
            let status: Option<String> = self
                .conn
                .query_row(
                    "SELECT status FROM true_copy_applications WHERE id = ?",
                    params![application_id.get()],
                    |row| row.get(0),
                )
                .optional()
                .with_context(|| format!("check status of application {application_id}"))?;
            match status {
                Some(_) => bail!(
                    "application {application_id} is already disposed -- choose a pending application and retry"
                ),
                None => bail!(
                    "application {application_id} not found -- choose a pending application and retry"
                ),
            }
        }
        info!(id = application_id.get(), "disposed true copy application");
        Ok(())
    }

    pub fn list_receipts(&self) -> Result<Vec<ReceiptRegisterEntry>> {
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT id, receipt_date, receipt_number, payment_type, amount, true_copy_number
                FROM receipt_register
                ORDER BY receipt_date DESC, id DESC
                ",
            )
            .context("prepare receipt register query")?;
        let rows = stmt
            .query_map([], |row| {
                let date_raw: String = row.get(1)?;
                let payment_raw: String = row.get(3)?;
                let payment_type = PaymentType::parse(&payment_raw)
                    .ok_or_else(|| invalid_label(3, "payment type", &payment_raw))?;
                Ok(ReceiptRegisterEntry {
                    id: ReceiptId::new(row.get(0)?),
                    receipt_date: parse_date(&date_raw).map_err(to_sql_error)?,
                    receipt_number: row.get(2)?,
                    payment_type,
                    amount_paise: row.get(4)?,
                    true_copy_number: row.get(5)?,
                })
            })
            .context("query receipt register")?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect receipt register")
    }

    /// Pending applications grouped by advance amount, largest first.
    pub fn pending_summary(&self) -> Result<PendingSummary> {
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT advance_amount, COUNT(*), SUM(advance_amount)
                FROM true_copy_applications
                WHERE status = ?
                GROUP BY advance_amount
                ORDER BY advance_amount DESC
                ",
            )
            .context("prepare pending summary query")?;
        let rows = stmt
            .query_map(params![ApplicationStatus::Pending.as_str()], |row| {
                Ok(SummaryRow {
                    amount_paise: row.get(0)?,
                    application_count: row.get(1)?,
                    total_paise: row.get(2)?,
                })
            })
            .context("query pending summary")?;
        let rows = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("collect pending summary")?;
        Ok(PendingSummary::from_rows(rows))
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("TRUECOPY_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set TRUECOPY_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("truecopy.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn next_receipt_number_in(conn: &Connection) -> Result<String> {
    let mut stmt = conn
        .prepare("SELECT receipt_number FROM receipt_register")
        .context("prepare receipt number query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query receipt numbers")?;
    let existing = rows
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("collect receipt numbers")?;
    let number = next_receipt_number(existing.iter().map(String::as_str));
    debug!(number = %number, "generated receipt number");
    Ok(number)
}

/// A receipt number is taken when the same text or the same numeric value
/// (`042` and `42`) is already registered.
fn receipt_number_exists(conn: &Connection, receipt_number: &str) -> Result<bool> {
    let mut stmt = conn
        .prepare("SELECT receipt_number FROM receipt_register")
        .context("prepare receipt number check")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .with_context(|| format!("check receipt number {receipt_number}"))?;
    let existing = rows
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("collect receipt numbers")?;

    let value = receipt_number_value(receipt_number);
    Ok(existing.iter().any(|number| {
        number == receipt_number
            || (value.is_some() && receipt_number_value(number) == value)
    }))
}

/// Urgent and ordinary certified copies share the `CC` prefix, so a number
/// is only taken within its own partition.
fn true_copy_number_exists(
    conn: &Connection,
    copy_type: CopyType,
    category: Option<ApplicationCategory>,
    true_copy_number: &str,
) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1 FROM true_copy_applications
              WHERE true_copy_number = ? AND copy_type = ? AND application_category IS ?
            )
            ",
            params![
                true_copy_number,
                copy_type.as_str(),
                category.map(ApplicationCategory::as_str),
            ],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check true copy number {true_copy_number}"))?;
    Ok(exists == 1)
}

fn application_from_row(row: &Row<'_>) -> rusqlite::Result<TrueCopyApplication> {
    let copy_type_raw: String = row.get(2)?;
    let copy_type = CopyType::parse(&copy_type_raw)
        .ok_or_else(|| invalid_label(2, "copy type", &copy_type_raw))?;
    let category_raw: Option<String> = row.get(3)?;
    let category = match category_raw {
        Some(raw) => Some(
            ApplicationCategory::parse(&raw).ok_or_else(|| invalid_label(3, "category", &raw))?,
        ),
        None => None,
    };
    let status_raw: String = row.get(8)?;
    let status = ApplicationStatus::parse(&status_raw)
        .ok_or_else(|| invalid_label(8, "status", &status_raw))?;

    let application_date_raw: String = row.get(1)?;
    let received_date_raw: String = row.get(5)?;
    let disposed_date_raw: Option<String> = row.get(9)?;

    Ok(TrueCopyApplication {
        id: ApplicationId::new(row.get(0)?),
        application_date: parse_date(&application_date_raw).map_err(to_sql_error)?,
        copy_type,
        category,
        true_copy_number: row.get(4)?,
        received_date: parse_date(&received_date_raw).map_err(to_sql_error)?,
        advance_paise: row.get(6)?,
        receipt_number: row.get(7)?,
        status,
        disposed_date: parse_opt_date(disposed_date_raw).map_err(to_sql_error)?,
    })
}

fn invalid_label(column: usize, kind: &str, raw: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("unknown {kind} {raw}"),
        )),
    )
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!(
                "database is missing required table `{table}`; use a truecopy register database or migrate first"
            );
        }
        let columns = table_columns(conn, table)?;
        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();
        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; run migration before launching",
                missing.join(", ")
            );
        }
    }
    Ok(())
}

fn ensure_required_indexes(conn: &Connection) -> Result<()> {
    for index in REQUIRED_INDEXES {
        conn.execute_batch(index.create_sql)
            .with_context(|| format!("ensure required index `{}`", index.name))?;
    }
    let existing_indexes = index_names(conn)?;
    let missing = REQUIRED_INDEXES
        .iter()
        .filter(|index| !existing_indexes.contains(index.name))
        .map(|index| index.name)
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        bail!(
            "database is missing required indexes: {}; run migration before launching",
            missing.join(", ")
        );
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))
}

fn index_names(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(
            "
            SELECT name
            FROM sqlite_master
            WHERE type = 'index'
              AND name NOT LIKE 'sqlite_%'
            ORDER BY name ASC
            ",
        )
        .context("prepare index names query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query index names")?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .context("collect index names")
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn parse_date(raw: &str) -> Result<Date> {
    parse_required_date(raw).with_context(|| format!("unsupported date format {raw:?}"))
}

fn parse_opt_date(raw: Option<String>) -> Result<Option<Date>> {
    raw.as_deref().map(parse_date).transpose()
}

fn to_sql_error(error: anyhow::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            error.to_string(),
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::Store;
    use anyhow::Result;
    use truecopy_app::{ApplicationCategory, CopyType};

    #[test]
    fn bootstrap_is_idempotent() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        store.bootstrap()?;
        assert_eq!(store.next_receipt_number()?, "1");
        Ok(())
    }

    #[test]
    fn simple_copy_ignores_requested_category() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        let number = store.next_true_copy_number(
            CopyType::SimpleCopy,
            Some(ApplicationCategory::Urgent),
            2025,
        )?;
        assert_eq!(number, "SC/001/2025");
        Ok(())
    }
}
