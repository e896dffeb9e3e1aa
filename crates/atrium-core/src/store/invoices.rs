//! Invoice store: CRUD plus payment recording and cancellation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::{Activity, ActivityKind, ActivityLog};
use crate::clock::ClockHandle;
use crate::error::{StoreError, StoreResult};
use crate::id::RecordId;
use crate::model::invoice::{Invoice, InvoicePatch, InvoiceStatus, NewInvoice};
use crate::store::{Applied, Collection, Record, StoreMode};

impl Record for Invoice {
    const ENTITY: &'static str = "invoice";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    fn log_mut(&mut self) -> &mut ActivityLog {
        &mut self.activities
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceStore {
    inner: Collection<Invoice>,
}

impl InvoiceStore {
    #[must_use]
    pub(crate) fn new(mode: StoreMode, clock: ClockHandle) -> Self {
        Self {
            inner: Collection::new(mode, clock),
        }
    }

    pub(crate) fn configure(&mut self, mode: StoreMode, clock: ClockHandle) {
        self.inner.configure(mode, clock);
    }

    /// Create a draft invoice. Totals are computed from the line items
    /// plus tax; `due_amount` starts at the full total.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] on an empty number or no line items.
    pub fn add(&mut self, new: NewInvoice, actor: &str) -> StoreResult<&Invoice> {
        if new.number.trim().is_empty() {
            return Err(StoreError::Validation {
                field: "invoice number",
                reason: "must not be empty".to_string(),
            });
        }
        if new.items.is_empty() {
            return Err(StoreError::Validation {
                field: "invoice items",
                reason: "at least one line item is required".to_string(),
            });
        }
        Ok(self.inner.admit(actor, |id, now| {
            let mut invoice = Invoice {
                id,
                number: new.number,
                status: InvoiceStatus::Draft,
                items: new.items,
                tax: new.tax,
                sub_total: 0.0,
                total: 0.0,
                amount_paid: 0.0,
                due_amount: 0.0,
                client: new.client,
                firm: new.firm,
                cancelled_at: None,
                created_at: now,
                updated_at: now,
                deleted: false,
                activities: ActivityLog::default(),
            };
            invoice.recompute_totals();
            invoice
        }))
    }

    /// Merge a partial patch; totals are recomputed when items or tax
    /// change.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn update(
        &mut self,
        id: &RecordId,
        patch: InvoicePatch,
        actor: &str,
    ) -> StoreResult<Applied> {
        let touched = patch.touched_fields();
        let description = if touched.is_empty() {
            "invoice updated".to_string()
        } else {
            format!("invoice updated: {}", touched.join(", "))
        };
        self.inner
            .mutate(id, actor, ActivityKind::Updated, description, |invoice| {
                if let Some(number) = patch.number {
                    invoice.number = number;
                }
                let retotal = patch.items.is_some() || patch.tax.is_some();
                if let Some(items) = patch.items {
                    invoice.items = items;
                }
                if let Some(tax) = patch.tax {
                    invoice.tax = tax;
                }
                if retotal {
                    invoice.recompute_totals();
                }
            })
    }

    /// Record a payment. Marks the invoice paid once nothing remains due.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] on a non-positive amount or a cancelled
    /// invoice.
    pub fn record_payment(
        &mut self,
        id: &RecordId,
        amount: f64,
        actor: &str,
    ) -> StoreResult<Applied> {
        if amount <= 0.0 {
            return Err(StoreError::Validation {
                field: "payment amount",
                reason: "must be positive".to_string(),
            });
        }
        let Some(idx) = self.inner.locate(id)? else {
            return Ok(Applied::Skipped);
        };
        if self.inner.at(idx).status == InvoiceStatus::Cancelled {
            return Err(StoreError::Validation {
                field: "invoice status",
                reason: "cannot record a payment on a cancelled invoice".to_string(),
            });
        }
        self.inner.mutate(
            id,
            actor,
            ActivityKind::Updated,
            format!("payment of {amount:.2} recorded"),
            |invoice| {
                invoice.amount_paid += amount;
                invoice.recompute_totals();
                if invoice.due_amount <= 0.0 {
                    invoice.status = InvoiceStatus::Paid;
                }
            },
        )
    }

    /// Cancel the invoice, stamping `cancelled_at`. Cancelling an already
    /// cancelled invoice is a skip.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn cancel(&mut self, id: &RecordId, actor: &str) -> StoreResult<Applied> {
        let Some(idx) = self.inner.locate(id)? else {
            return Ok(Applied::Skipped);
        };
        let invoice = self.inner.at(idx);
        if invoice.status == InvoiceStatus::Cancelled {
            return Ok(Applied::Skipped);
        }
        let from = invoice.status;
        let now = self.inner.tick();
        let invoice = self.inner.at_mut(idx);
        invoice.status = InvoiceStatus::Cancelled;
        invoice.cancelled_at = Some(now);
        invoice.touch(now);
        invoice.activities.push(Activity {
            kind: ActivityKind::StatusChange,
            actor: actor.to_string(),
            description: format!(
                "Status changed from {} to {}",
                from.label(),
                InvoiceStatus::Cancelled.label()
            ),
            at: now,
        });
        Ok(Applied::Changed)
    }

    /// Move a draft out the door or flag it overdue; plain status changes
    /// that need no dedicated bookkeeping.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn set_status(
        &mut self,
        id: &RecordId,
        to: InvoiceStatus,
        actor: &str,
    ) -> StoreResult<Applied> {
        if to == InvoiceStatus::Cancelled {
            return self.cancel(id, actor);
        }
        let Some(idx) = self.inner.locate(id)? else {
            return Ok(Applied::Skipped);
        };
        let from = self.inner.at(idx).status;
        if from == to {
            return Ok(Applied::Skipped);
        }
        self.inner.mutate(
            id,
            actor,
            ActivityKind::StatusChange,
            format!("Status changed from {} to {}", from.label(), to.label()),
            |invoice| invoice.status = to,
        )
    }

    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn delete(&mut self, id: &RecordId, actor: &str) -> StoreResult<Applied> {
        self.inner.soft_delete(id, actor)
    }

    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn restore(&mut self, id: &RecordId, actor: &str) -> StoreResult<Applied> {
        self.inner.restore(id, actor)
    }

    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown in strict mode.
    pub fn add_activity(
        &mut self,
        id: &RecordId,
        kind: ActivityKind,
        actor: &str,
        description: impl Into<String>,
    ) -> StoreResult<Applied> {
        self.inner.add_activity(id, kind, actor, description.into())
    }

    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<&Invoice> {
        self.inner.get(id)
    }

    #[must_use]
    pub fn list(&self) -> &[Invoice] {
        self.inner.records()
    }

    pub fn list_active(&self) -> impl Iterator<Item = &Invoice> {
        self.inner.iter_active()
    }
}
