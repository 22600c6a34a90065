//! Interactive state for building a quote.
//!
//! This holds the draft together with everything a front end tracks while
//! the user works on it: which sections are expanded, the product picked
//! for the next line, the line being edited and the line waiting for a
//! delete confirmation. Nothing here is persisted; [`DraftSession::submit`]
//! produces the [`NewQuote`] that is.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};

use crate::calculations::{DraftProgress, QuoteTotals, SubmissionError};
use crate::models::{
    DraftError, ItemConfig, LineItemId, LineItemPatch, NewQuote, Product, QuoteDraft,
    UnitOfMeasure, default_catalog, find_product,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Customer,
    Etc,
    JobDetails,
    ProjectDetails,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Please select a product")]
    NoProductSelected,

    #[error("unknown product '{0}'")]
    UnknownProduct(String),

    #[error("no line item is being edited")]
    NotEditing,

    #[error("no delete is waiting for confirmation")]
    NoPendingDelete,

    #[error(transparent)]
    Draft(#[from] DraftError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ExpandedSections {
    customer: bool,
    etc: bool,
    job_details: bool,
    project_details: bool,
}

impl ExpandedSections {
    fn get(
        &self,
        section: Section,
    ) -> bool {
        match section {
            Section::Customer => self.customer,
            Section::Etc => self.etc,
            Section::JobDetails => self.job_details,
            Section::ProjectDetails => self.project_details,
        }
    }

    fn slot(
        &mut self,
        section: Section,
    ) -> &mut bool {
        match section {
            Section::Customer => &mut self.customer,
            Section::Etc => &mut self.etc,
            Section::JobDetails => &mut self.job_details,
            Section::ProjectDetails => &mut self.project_details,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DraftSession {
    draft: QuoteDraft,
    catalog: Vec<Product>,
    expanded: ExpandedSections,
    selected_product: Option<String>,
    item_config: ItemConfig,
    configuring_item: bool,
    editing_item: Option<LineItemId>,
    pending_delete: Option<LineItemId>,
    apply_tax_all: bool,
    preview_open: bool,
}

impl Default for DraftSession {
    fn default() -> Self {
        Self::new(default_catalog())
    }
}

impl DraftSession {
    pub fn new(catalog: Vec<Product>) -> Self {
        Self::with_draft(QuoteDraft::new(), catalog)
    }

    pub fn with_draft(
        draft: QuoteDraft,
        catalog: Vec<Product>,
    ) -> Self {
        Self {
            draft,
            catalog,
            expanded: ExpandedSections::default(),
            selected_product: None,
            item_config: ItemConfig::default(),
            configuring_item: false,
            editing_item: None,
            pending_delete: None,
            apply_tax_all: false,
            preview_open: false,
        }
    }

    pub fn draft(&self) -> &QuoteDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut QuoteDraft {
        &mut self.draft
    }

    pub fn catalog(&self) -> &[Product] {
        &self.catalog
    }

    // ── sections ─────────────────────────────────────────────────────────

    /// Flip a section between expanded and collapsed; returns the new state.
    pub fn toggle_section(
        &mut self,
        section: Section,
    ) -> bool {
        let slot = self.expanded.slot(section);
        *slot = !*slot;
        *slot
    }

    pub fn is_expanded(
        &self,
        section: Section,
    ) -> bool {
        self.expanded.get(section)
    }

    pub fn set_preview_open(
        &mut self,
        open: bool,
    ) {
        self.preview_open = open;
    }

    pub fn is_preview_open(&self) -> bool {
        self.preview_open
    }

    // ── adding items ─────────────────────────────────────────────────────

    pub fn select_product(
        &mut self,
        product_id: &str,
    ) -> Result<(), SessionError> {
        if find_product(&self.catalog, product_id).is_none() {
            return Err(SessionError::UnknownProduct(product_id.to_string()));
        }
        self.selected_product = Some(product_id.to_string());
        Ok(())
    }

    pub fn selected_product(&self) -> Option<&Product> {
        self.selected_product
            .as_deref()
            .and_then(|id| find_product(&self.catalog, id))
    }

    /// Open the item configuration step for the selected product.
    pub fn begin_add_item(&mut self) -> Result<(), SessionError> {
        if self.selected_product.is_none() {
            return Err(SessionError::NoProductSelected);
        }
        self.configuring_item = true;
        Ok(())
    }

    pub fn is_configuring_item(&self) -> bool {
        self.configuring_item
    }

    pub fn item_config(&self) -> &ItemConfig {
        &self.item_config
    }

    pub fn increment_quantity(&mut self) {
        self.item_config.quantity += 1;
    }

    /// Lower the configured quantity, never below 1.
    pub fn decrement_quantity(&mut self) {
        self.item_config.quantity = self.item_config.quantity.saturating_sub(1).max(1);
    }

    pub fn set_item_unit(
        &mut self,
        unit: UnitOfMeasure,
    ) {
        self.item_config.unit_of_measure = unit;
    }

    pub fn set_item_apply_tax(
        &mut self,
        apply_tax: bool,
    ) {
        self.item_config.apply_tax = apply_tax;
    }

    /// Add the selected product with the current configuration.
    ///
    /// The product selection is cleared afterwards; the configuration is
    /// kept for the next item.
    pub fn confirm_add_item(&mut self) -> Result<LineItemId, SessionError> {
        let product_id = self
            .selected_product
            .clone()
            .ok_or(SessionError::NoProductSelected)?;
        let product = find_product(&self.catalog, &product_id)
            .cloned()
            .ok_or(SessionError::UnknownProduct(product_id))?;

        let mut config = self.item_config;
        config.apply_tax |= self.apply_tax_all;

        let id = self.draft.add_product(&product, &config)?;
        self.selected_product = None;
        self.configuring_item = false;
        Ok(id)
    }

    pub fn cancel_add_item(&mut self) {
        self.configuring_item = false;
    }

    // ── editing items ────────────────────────────────────────────────────

    pub fn begin_edit(
        &mut self,
        id: LineItemId,
    ) -> Result<(), SessionError> {
        if self.draft.item(id).is_none() {
            return Err(DraftError::UnknownItem(id).into());
        }
        self.editing_item = Some(id);
        Ok(())
    }

    pub fn editing_item(&self) -> Option<LineItemId> {
        self.editing_item
    }

    pub fn edit_item(
        &mut self,
        patch: &LineItemPatch,
    ) -> Result<(), SessionError> {
        let id = self.editing_item.ok_or(SessionError::NotEditing)?;
        self.draft.update_item(id, patch)?;
        Ok(())
    }

    pub fn finish_edit(&mut self) {
        self.editing_item = None;
    }

    // ── deleting items ───────────────────────────────────────────────────

    pub fn begin_delete(
        &mut self,
        id: LineItemId,
    ) {
        self.pending_delete = Some(id);
    }

    pub fn pending_delete(&self) -> Option<LineItemId> {
        self.pending_delete
    }

    /// Remove the item waiting for confirmation. Returns whether an item
    /// was actually removed.
    pub fn confirm_delete(&mut self) -> Result<bool, SessionError> {
        let id = self
            .pending_delete
            .take()
            .ok_or(SessionError::NoPendingDelete)?;
        if self.editing_item == Some(id) {
            self.editing_item = None;
        }
        let removed = self.draft.remove_item(id);
        debug!(%id, removed, "line item delete confirmed");
        Ok(removed)
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    // ── tax ──────────────────────────────────────────────────────────────

    pub fn set_tax_rate(
        &mut self,
        tax_rate_percent: Decimal,
    ) {
        self.draft.tax_rate_percent = tax_rate_percent;
    }

    /// Turn tax on or off for every current item and for items added later.
    pub fn set_apply_tax_all(
        &mut self,
        apply_tax: bool,
    ) {
        self.apply_tax_all = apply_tax;
        self.draft.set_apply_tax_all(apply_tax);
    }

    pub fn apply_tax_all(&self) -> bool {
        self.apply_tax_all
    }

    // ── derived values ───────────────────────────────────────────────────

    pub fn totals(&self) -> QuoteTotals {
        self.draft.totals()
    }

    pub fn progress(&self) -> DraftProgress {
        self.draft.progress()
    }

    pub fn submit(&self) -> Result<NewQuote, SubmissionError> {
        let quote = self.draft.to_new_quote()?;
        info!(
            customer = %quote.customer_name,
            items = quote.items.len(),
            total = %quote.totals.total,
            "quote draft accepted"
        );
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn session_with_item() -> (DraftSession, LineItemId) {
        let mut session = DraftSession::default();
        session.select_product("1").unwrap();
        session.begin_add_item().unwrap();
        let id = session.confirm_add_item().unwrap();
        (session, id)
    }

    #[test]
    fn sections_start_collapsed_and_toggle() {
        let mut session = DraftSession::default();

        assert!(!session.is_expanded(Section::Etc));
        assert!(session.toggle_section(Section::Etc));
        assert!(session.is_expanded(Section::Etc));
        assert!(!session.is_expanded(Section::Customer));
        assert!(!session.toggle_section(Section::Etc));
    }

    #[test]
    fn adding_without_selection_is_rejected() {
        let mut session = DraftSession::default();

        assert_eq!(session.begin_add_item(), Err(SessionError::NoProductSelected));
        assert_eq!(session.confirm_add_item(), Err(SessionError::NoProductSelected));
        assert_eq!(
            SessionError::NoProductSelected.to_string(),
            "Please select a product"
        );
    }

    #[test]
    fn unknown_product_cannot_be_selected() {
        let mut session = DraftSession::default();

        assert_eq!(
            session.select_product("99"),
            Err(SessionError::UnknownProduct("99".to_string()))
        );
        assert!(session.selected_product().is_none());
    }

    #[test]
    fn quantity_never_drops_below_one() {
        let mut session = DraftSession::default();
        session.decrement_quantity();
        assert_eq!(session.item_config().quantity, 1);

        session.increment_quantity();
        session.increment_quantity();
        session.decrement_quantity();
        assert_eq!(session.item_config().quantity, 2);
    }

    #[test]
    fn confirm_add_uses_config_and_clears_selection() {
        let mut session = DraftSession::default();
        session.select_product("2").unwrap();
        session.begin_add_item().unwrap();
        session.increment_quantity();
        session.set_item_unit(UnitOfMeasure::Ft);

        let id = session.confirm_add_item().unwrap();
        let item = session.draft().item(id).unwrap();

        assert_eq!(item.quantity, 2);
        assert_eq!(item.unit_of_measure, UnitOfMeasure::Ft);
        assert_eq!(item.unit_price, dec!(250));
        assert!(!session.is_configuring_item());
        assert!(session.selected_product().is_none());
    }

    #[test]
    fn apply_tax_all_covers_existing_and_new_items() {
        let (mut session, first) = session_with_item();
        session.set_apply_tax_all(true);
        session.select_product("3").unwrap();
        let second = session.confirm_add_item().unwrap();

        assert!(session.draft().item(first).unwrap().apply_tax);
        assert!(session.draft().item(second).unwrap().apply_tax);
        assert_eq!(session.totals().tax_amount, dec!(36));
    }

    #[test]
    fn delete_needs_confirmation() {
        let (mut session, id) = session_with_item();

        session.begin_delete(id);
        session.cancel_delete();
        assert_eq!(session.draft().items().len(), 1);
        assert_eq!(session.confirm_delete(), Err(SessionError::NoPendingDelete));

        session.begin_delete(id);
        assert_eq!(session.confirm_delete(), Ok(true));
        assert!(session.draft().items().is_empty());
        assert_eq!(session.totals(), QuoteTotals::default());
    }

    #[test]
    fn deleting_the_edited_item_ends_the_edit() {
        let (mut session, id) = session_with_item();
        session.begin_edit(id).unwrap();
        session.begin_delete(id);

        session.confirm_delete().unwrap();

        assert_eq!(session.editing_item(), None);
    }

    #[test]
    fn edit_requires_an_item_being_edited() {
        let (mut session, id) = session_with_item();
        let patch = LineItemPatch {
            unit_price: Some(dec!(80)),
            ..Default::default()
        };

        assert_eq!(session.edit_item(&patch), Err(SessionError::NotEditing));

        session.begin_edit(id).unwrap();
        session.edit_item(&patch).unwrap();
        session.finish_edit();

        assert_eq!(session.draft().item(id).unwrap().unit_price, dec!(80));
        assert_eq!(session.editing_item(), None);
    }

    #[test]
    fn submit_runs_the_gate() {
        let (mut session, _) = session_with_item();

        assert_eq!(
            session.submit().unwrap_err(),
            SubmissionError::MissingCustomerName
        );

        let draft = session.draft_mut();
        draft.customer.name = "Acme Corp".to_string();
        draft.etc.poc = "Dana".to_string();
        draft.etc.email = "dana@example.com".to_string();
        draft.etc.phone = "555-0100".to_string();

        let quote = session.submit().unwrap();
        assert_eq!(quote.totals.total, dec!(100));
    }
}
