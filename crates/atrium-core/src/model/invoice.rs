//! Invoices: monetary totals, line items, embedded party snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::activity::ActivityLog;
use crate::error::ParseEnumError;
use crate::id::RecordId;

/// Invoice lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::Pending,
        Self::Paid,
        Self::Overdue,
        Self::Cancelled,
    ];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Overdue => "Overdue",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseEnumError {
                expected: "invoice status",
                got: s.to_string(),
            }),
        }
    }
}

/// One billed line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl LineItem {
    #[must_use]
    pub fn amount(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// Point-in-time snapshot of a billing party (client or issuing firm),
/// embedded rather than referenced so the invoice stays self-contained
/// when the source record later changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartySnapshot {
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl PartySnapshot {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            address: None,
        }
    }
}

/// An invoice record. Totals are derived from the line items plus tax and
/// maintained by the store on every mutation that touches them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: RecordId,
    pub number: String,
    pub status: InvoiceStatus,
    pub items: Vec<LineItem>,
    pub tax: f64,
    pub sub_total: f64,
    pub total: f64,
    pub amount_paid: f64,
    pub due_amount: f64,
    pub client: PartySnapshot,
    pub firm: PartySnapshot,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
    pub activities: ActivityLog,
}

impl Invoice {
    /// Recompute `sub_total`/`total`/`due_amount` from items, tax, and
    /// payments received so far.
    pub(crate) fn recompute_totals(&mut self) {
        self.sub_total = self.items.iter().map(LineItem::amount).sum();
        self.total = self.sub_total + self.tax;
        self.due_amount = self.total - self.amount_paid;
    }
}

/// Invoice fields minus system fields, for `InvoiceStore::add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvoice {
    pub number: String,
    pub items: Vec<LineItem>,
    pub tax: f64,
    pub client: PartySnapshot,
    pub firm: PartySnapshot,
}

/// Partial update for an invoice. Status moves through the dedicated
/// `record_payment`/`cancel` operations, not through the patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoicePatch {
    pub number: Option<String>,
    pub items: Option<Vec<LineItem>>,
    pub tax: Option<f64>,
}

impl InvoicePatch {
    #[must_use]
    pub fn touched_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.number.is_some() {
            fields.push("number");
        }
        if self.items.is_some() {
            fields.push("items");
        }
        if self.tax.is_some() {
            fields.push("tax");
        }
        fields
    }
}
