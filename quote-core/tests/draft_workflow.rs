//! End-to-end checks of the draft workflow against the in-memory backend.

use pretty_assertions::assert_eq;
use quote_core::calculations::{compute_totals, extended_price};
use quote_core::db::{DbConfig, InMemoryRepositoryFactory, RepositoryRegistry};
use quote_core::{
    DraftSession, LineItemPatch, QuoteDraft, QuoteFilter, QuoteStatus, QuoteType,
    SubmissionError,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn filled_session() -> DraftSession {
    let mut session = DraftSession::default();
    let draft = session.draft_mut();
    draft.quote_type = QuoteType::ToProject;
    draft.customer.name = "Keystone Paving".to_string();
    draft.etc.poc = "Dana Whitfield".to_string();
    draft.etc.email = "dana@example.com".to_string();
    draft.etc.phone = "555-0100".to_string();
    session
}

#[test]
fn worked_example_through_the_session() {
    let mut session = filled_session();

    session.select_product("1").unwrap();
    session.increment_quantity();
    session.set_item_apply_tax(true);
    let first = session.confirm_add_item().unwrap();

    session.decrement_quantity();
    session.set_item_apply_tax(false);
    session.select_product("2").unwrap();
    let second = session.confirm_add_item().unwrap();
    session.begin_edit(second).unwrap();
    session
        .edit_item(&LineItemPatch {
            discount: Some(dec!(50)),
            ..Default::default()
        })
        .unwrap();
    session.finish_edit();

    let items = session.draft().items();
    assert_eq!(extended_price(&items[0]), dec!(200));
    assert_eq!(extended_price(&items[1]), dec!(200));
    assert_eq!(items[0].id, first);

    let totals = session.totals();
    assert_eq!(totals.subtotal, dec!(400));
    assert_eq!(totals.tax_amount, dec!(12));
    assert_eq!(totals.total, dec!(412));
}

#[test]
fn add_then_remove_equals_never_added() {
    let mut session = filled_session();
    session.select_product("3").unwrap();
    session.set_item_apply_tax(true);
    session.confirm_add_item().unwrap();
    let baseline = session.totals();

    session.select_product("4").unwrap();
    let extra = session.confirm_add_item().unwrap();
    assert_ne!(session.totals(), baseline);

    session.begin_delete(extra);
    session.confirm_delete().unwrap();

    assert_eq!(session.totals(), baseline);
    assert_eq!(
        session.totals(),
        compute_totals(session.draft().items(), session.draft().tax_rate_percent)
    );
}

#[test]
fn empty_customer_name_blocks_an_otherwise_valid_draft() {
    let mut session = filled_session();
    session.select_product("5").unwrap();
    session.confirm_add_item().unwrap();
    session.draft_mut().customer.name = String::new();

    assert_eq!(
        session.submit().unwrap_err(),
        SubmissionError::MissingCustomerName
    );
}

#[test]
fn draft_reads_from_toml() {
    let draft: QuoteDraft = toml::from_str(
        r#"
        quote_type = "estimate_bid"
        tax_rate_percent = "7.5"

        [customer]
        name = "BuildPro Ltd"

        [job_details]
        county = "Chester"
        "#,
    )
    .unwrap();

    assert_eq!(draft.quote_type, QuoteType::EstimateBid);
    assert_eq!(draft.tax_rate_percent, dec!(7.5));
    assert_eq!(draft.customer.name, "BuildPro Ltd");
    assert!(draft.progress().job_details);
    assert!(draft.items().is_empty());
}

#[tokio::test]
async fn submitted_quote_shows_up_as_editable() {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(InMemoryRepositoryFactory));
    let repo = registry
        .create(&DbConfig {
            backend: "memory".to_string(),
            connection_string: "empty".to_string(),
        })
        .await
        .unwrap();

    let mut session = filled_session();
    session.select_product("1").unwrap();
    session.confirm_add_item().unwrap();
    let new_quote = session.submit().unwrap();

    let created = repo.create(new_quote).await.unwrap();
    let editable = repo.list(&QuoteFilter::editable()).await.unwrap();
    let items = repo.list_items(created.id).await.unwrap();

    assert_eq!(editable, vec![created.clone()]);
    assert_eq!(created.status, QuoteStatus::Draft);
    assert_eq!(created.total, dec!(100));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].unit_price, Decimal::from(100));
}
