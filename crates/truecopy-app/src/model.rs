// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::Date;

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CopyType {
    CertifiedCopy,
    SimpleCopy,
}

impl CopyType {
    pub const ALL: [Self; 2] = [Self::CertifiedCopy, Self::SimpleCopy];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CertifiedCopy => "Certified Copy",
            Self::SimpleCopy => "Simple Copy",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Certified Copy" => Some(Self::CertifiedCopy),
            "Simple Copy" => Some(Self::SimpleCopy),
            _ => None,
        }
    }

    /// Leading segment of the true copy number.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::CertifiedCopy => "CC",
            Self::SimpleCopy => "SC",
        }
    }

    pub const fn requires_category(self) -> bool {
        matches!(self, Self::CertifiedCopy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationCategory {
    Urgent,
    Ordinary,
}

impl ApplicationCategory {
    pub const ALL: [Self; 2] = [Self::Urgent, Self::Ordinary];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "Urgent",
            Self::Ordinary => "Ordinary",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Urgent" => Some(Self::Urgent),
            "Ordinary" => Some(Self::Ordinary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Disposed,
}

impl ApplicationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Disposed => "Disposed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Pending" => Some(Self::Pending),
            "Disposed" => Some(Self::Disposed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentType {
    Advance,
    Recovery,
}

impl PaymentType {
    pub const ALL: [Self; 2] = [Self::Advance, Self::Recovery];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Advance => "advance",
            Self::Recovery => "recovery",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "advance" => Some(Self::Advance),
            "recovery" => Some(Self::Recovery),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrueCopyApplication {
    pub id: ApplicationId,
    pub application_date: Date,
    pub copy_type: CopyType,
    pub category: Option<ApplicationCategory>,
    pub true_copy_number: String,
    pub received_date: Date,
    pub advance_paise: i64,
    pub receipt_number: String,
    pub status: ApplicationStatus,
    pub disposed_date: Option<Date>,
}

/// An application together with the payment type of its receipt, when the
/// receipt register has a matching row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDetail {
    pub application: TrueCopyApplication,
    pub payment_type: Option<PaymentType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptRegisterEntry {
    pub id: ReceiptId,
    pub receipt_date: Date,
    pub receipt_number: String,
    pub payment_type: PaymentType,
    pub amount_paise: i64,
    pub true_copy_number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub amount_paise: i64,
    pub application_count: usize,
    pub total_paise: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PendingSummary {
    pub rows: Vec<SummaryRow>,
    pub total_applications: usize,
    pub total_paise: i64,
}

impl PendingSummary {
    pub fn from_rows(rows: Vec<SummaryRow>) -> Self {
        let total_applications = rows.iter().map(|row| row.application_count).sum();
        let total_paise = rows.iter().map(|row| row.total_paise).sum();
        Self {
            rows,
            total_applications,
            total_paise,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewKind {
    Entry,
    Dispose,
    Receipts,
}

impl ViewKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Entry => "true copy applications",
            Self::Dispose => "dispose entry",
            Self::Receipts => "receipt register",
        }
    }
}
