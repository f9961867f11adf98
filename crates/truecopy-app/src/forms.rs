// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use time::Date;

use crate::{ApplicationCategory, CopyType, PaymentType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    ApplicationDate,
    CopyType,
    Category,
    TrueCopyNumber,
    Advance,
    ReceiptNumber,
    PaymentType,
}

impl FormField {
    pub const ALL: [Self; 7] = [
        Self::ApplicationDate,
        Self::CopyType,
        Self::Category,
        Self::TrueCopyNumber,
        Self::Advance,
        Self::ReceiptNumber,
        Self::PaymentType,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::ApplicationDate => "App Date",
            Self::CopyType => "Copy Type",
            Self::Category => "Category",
            Self::TrueCopyNumber => "True Copy #",
            Self::Advance => "Advance",
            Self::ReceiptNumber => "Receipt #",
            Self::PaymentType => "Receipt Category",
        }
    }

    pub const fn is_text(self) -> bool {
        matches!(
            self,
            Self::TrueCopyNumber | Self::Advance | Self::ReceiptNumber
        )
    }

    pub const fn is_choice(self) -> bool {
        matches!(self, Self::CopyType | Self::Category | Self::PaymentType)
    }
}

/// Field values of the entry form, as the operator has them on screen.
/// Free-text fields stay raw so validation can report what was typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationForm {
    pub application_date: Option<Date>,
    pub copy_type: Option<CopyType>,
    pub category: Option<ApplicationCategory>,
    pub true_copy_number: String,
    pub advance: String,
    pub receipt_number: String,
    pub payment_type: Option<PaymentType>,
}

impl ApplicationForm {
    pub fn blank(today: Date) -> Self {
        Self {
            application_date: Some(today),
            copy_type: Some(CopyType::CertifiedCopy),
            category: Some(ApplicationCategory::Urgent),
            true_copy_number: String::new(),
            advance: String::new(),
            receipt_number: String::new(),
            payment_type: Some(PaymentType::Advance),
        }
    }

    /// Category as persisted: simple copies never carry one.
    pub fn effective_category(&self) -> Option<ApplicationCategory> {
        match self.copy_type {
            Some(CopyType::CertifiedCopy) => self.category,
            _ => None,
        }
    }

    pub fn category_enabled(&self) -> bool {
        self.copy_type.is_some_and(CopyType::requires_category)
    }

    pub fn validate(&self) -> Result<()> {
        let missing = self.application_date.is_none()
            || self.copy_type.is_none()
            || self.true_copy_number.trim().is_empty()
            || self.advance.trim().is_empty()
            || self.receipt_number.trim().is_empty()
            || self.payment_type.is_none();
        if missing {
            bail!(
                "all fields are required -- fill in {} and retry",
                self.missing_labels().join(", ")
            );
        }
        if self.category_enabled() && self.category.is_none() {
            bail!(
                "category is required for certified copies -- choose Urgent or Ordinary and retry"
            );
        }
        Ok(())
    }

    fn missing_labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if self.application_date.is_none() {
            labels.push(FormField::ApplicationDate.label());
        }
        if self.copy_type.is_none() {
            labels.push(FormField::CopyType.label());
        }
        if self.true_copy_number.trim().is_empty() {
            labels.push(FormField::TrueCopyNumber.label());
        }
        if self.advance.trim().is_empty() {
            labels.push(FormField::Advance.label());
        }
        if self.receipt_number.trim().is_empty() {
            labels.push(FormField::ReceiptNumber.label());
        }
        if self.payment_type.is_none() {
            labels.push(FormField::PaymentType.label());
        }
        labels
    }
}
