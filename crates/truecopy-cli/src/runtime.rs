// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use time::{Date, OffsetDateTime};
use tracing::warn;
use truecopy_app::{
    ApplicationCategory, ApplicationDetail, ApplicationForm, ApplicationId, CopyType,
    PendingSummary, ReceiptRegisterEntry, TrueCopyApplication,
};
use truecopy_db::Store;

pub struct DbRuntime<'a> {
    store: &'a Store,
    today: Option<Date>,
}

impl<'a> DbRuntime<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store, today: None }
    }

    #[cfg(test)]
    pub fn with_today(store: &'a Store, today: Date) -> Self {
        Self {
            store,
            today: Some(today),
        }
    }
}

impl truecopy_tui::AppRuntime for DbRuntime<'_> {
    fn today(&self) -> Date {
        self.today.unwrap_or_else(local_today)
    }

    fn load_pending(&mut self) -> Result<Vec<TrueCopyApplication>> {
        self.store.list_pending()
    }

    fn load_summary(&mut self) -> Result<PendingSummary> {
        self.store.pending_summary()
    }

    fn load_receipts(&mut self) -> Result<Vec<ReceiptRegisterEntry>> {
        self.store.list_receipts()
    }

    fn next_true_copy_number(
        &mut self,
        copy_type: CopyType,
        category: Option<ApplicationCategory>,
        year: i32,
    ) -> Result<String> {
        self.store.next_true_copy_number(copy_type, category, year)
    }

    fn next_receipt_number(&mut self) -> Result<String> {
        self.store.next_receipt_number()
    }

    fn load_application(&mut self, application_id: ApplicationId) -> Result<ApplicationDetail> {
        self.store.get_application(application_id)
    }

    fn save_application(&mut self, form: &ApplicationForm) -> Result<ApplicationId> {
        let receipt_date = self.today();
        self.store.save_application(form, receipt_date)
    }

    fn dispose_application(&mut self, application_id: ApplicationId) -> Result<()> {
        let disposed_date = self.today();
        self.store.dispose_application(application_id, disposed_date)
    }
}

pub fn local_today() -> Date {
    match OffsetDateTime::now_local() {
        Ok(now) => now.date(),
        Err(error) => {
            warn!(%error, "local offset unavailable, using UTC date");
            OffsetDateTime::now_utc().date()
        }
    }
}
