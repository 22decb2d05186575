//! # Draft State
//!
//! The invoice draft open in the editor.
//!
//! ## Thread Safety
//! The draft is wrapped in `Mutex<Option<InvoiceDraft>>`: `None` until a
//! draft is started or loaded. Every line operation fails with
//! `NoDraft` while it is `None`.

use std::sync::Mutex;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::error::AppResult;
use crate::state::config::ConfigState;
use quill_core::draft::LinePatch;
use quill_core::types::{Client, InvoiceDraft, NewLine};
use quill_core::{calculate_totals, CoreError, InvoiceTotals};

/// Editor draft container.
#[derive(Debug, Default)]
pub struct DraftState {
    draft: Mutex<Option<InvoiceDraft>>,
}

impl DraftState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to the draft, if any.
    pub fn with_draft<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&InvoiceDraft) -> R,
    {
        let draft = self.draft.lock().unwrap_or_else(|p| p.into_inner());
        draft.as_ref().map(f)
    }

    /// Executes a function with write access to the draft.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// draft_state.with_draft_mut(|d| d.note = "Thanks!".into())?;
    /// ```
    pub fn with_draft_mut<F, R>(&self, f: F) -> AppResult<R>
    where
        F: FnOnce(&mut InvoiceDraft) -> R,
    {
        let mut draft = self.draft.lock().unwrap_or_else(|p| p.into_inner());
        match draft.as_mut() {
            Some(draft) => Ok(f(draft)),
            None => Err(CoreError::NoDraft.into()),
        }
    }

    /// Replaces the current draft.
    pub fn set_draft(&self, draft: InvoiceDraft) {
        debug!(client_id = draft.client_id, lines = draft.lines.len(), "Draft set");
        *self.draft.lock().unwrap_or_else(|p| p.into_inner()) = Some(draft);
    }

    /// Drops the current draft.
    pub fn clear(&self) {
        *self.draft.lock().unwrap_or_else(|p| p.into_inner()) = None;
        debug!("Draft cleared");
    }

    /// Starts a fresh draft for `client`, issued today.
    pub fn start_for_client(&self, client: &Client, config: &ConfigState) -> InvoiceDraft {
        self.start_for_client_on(client, config, Local::now().date_naive())
    }

    /// Starts a fresh draft for `client` issued on `issue_date`, due after
    /// the configured payment terms.
    pub fn start_for_client_on(
        &self,
        client: &Client,
        config: &ConfigState,
        issue_date: NaiveDate,
    ) -> InvoiceDraft {
        let draft = InvoiceDraft::for_client(
            client,
            issue_date,
            config.due_date(issue_date),
            config.default_vat_rate,
        );
        info!(client_id = client.id, %issue_date, "Draft started");
        self.set_draft(draft.clone());
        draft
    }

    /// Appends a line and returns its sort order.
    pub fn add_line(&self, line: NewLine) -> AppResult<u32> {
        self.with_draft_mut(|draft| draft.add_line(line))
    }

    /// Patches the line at `sort_order`; `false` when there is none.
    pub fn update_line(&self, sort_order: u32, patch: &LinePatch) -> AppResult<bool> {
        self.with_draft_mut(|draft| draft.update_line(sort_order, patch))
    }

    /// Removes the line at `sort_order` and renumbers the rest.
    pub fn remove_line(&self, sort_order: u32) -> AppResult<bool> {
        self.with_draft_mut(|draft| draft.remove_line(sort_order))
    }

    pub fn totals(&self) -> Option<InvoiceTotals> {
        self.with_draft(calculate_totals)
    }

    /// What is still owed after payments and deposit.
    pub fn balance_due_minor(&self) -> Option<i64> {
        self.with_draft(|draft| {
            calculate_totals(draft).balance_due_minor(draft.paid_minor, draft.deposit_minor)
        })
    }

    /// A copy of the current draft.
    pub fn snapshot(&self) -> Option<InvoiceDraft> {
        self.with_draft(InvoiceDraft::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::Utc;
    use quill_core::types::{DiscountType, InvoiceStatus};

    fn client() -> Client {
        Client {
            id: 4,
            name: "Ada".to_string(),
            company_name: "Lovelace Ltd".to_string(),
            address: "1 Analytical Way".to_string(),
            email: "ada@example.com".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn issue_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn test_line_ops_require_draft() {
        let state = DraftState::new();
        let err = state.add_line(NewLine::custom("Hem", 1.0, 100)).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(state.totals().is_none());
        assert!(state.snapshot().is_none());
    }

    #[test]
    fn test_start_for_client() {
        let state = DraftState::new();
        let config = ConfigState::default();
        let draft = state.start_for_client_on(&client(), &config, issue_date());

        assert_eq!(draft.client_id, 4);
        assert_eq!(draft.client_snapshot.company_name, "Lovelace Ltd");
        assert_eq!(draft.due_by_date, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
        assert_eq!(draft.vat_rate.bps(), 2000);
        assert_eq!(draft.discount_type, DiscountType::None);
        assert_eq!(draft.status, Some(InvoiceStatus::Draft));
        assert_eq!(state.snapshot(), Some(draft));
    }

    #[test]
    fn test_lines_and_totals() {
        let state = DraftState::new();
        state.start_for_client_on(&client(), &ConfigState::default(), issue_date());

        assert_eq!(state.add_line(NewLine::custom("Pattern", 3.0, 1050)).unwrap(), 1);
        assert_eq!(state.add_line(NewLine::custom("Alteration", 1.0, 4850)).unwrap(), 2);

        let totals = state.totals().unwrap();
        assert_eq!(totals.subtotal_minor, 8000);
        assert_eq!(totals.vat_minor, 1600);
        assert_eq!(totals.total_minor, 9600);

        state
            .with_draft_mut(|d| {
                d.paid_minor = 5000;
                d.deposit_minor = 600;
            })
            .unwrap();
        assert_eq!(state.balance_due_minor(), Some(4000));

        let patch = LinePatch {
            quantity: Some(1.0),
            ..Default::default()
        };
        assert!(state.update_line(1, &patch).unwrap());
        assert!(!state.update_line(9, &patch).unwrap());

        assert!(state.remove_line(1).unwrap());
        let draft = state.snapshot().unwrap();
        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.lines[0].sort_order, 1);
        assert_eq!(draft.lines[0].name, "Alteration");
    }

    #[test]
    fn test_clear() {
        let state = DraftState::new();
        state.start_for_client_on(&client(), &ConfigState::default(), issue_date());
        state.clear();
        assert!(state.snapshot().is_none());
        assert!(state.remove_line(1).is_err());
    }
}
