//! Plain-text renderings of drafts and quote lists for the terminal.

use std::fmt;

use quote_core::calculations::common::format_currency;
use quote_core::calculations::extended_price;
use quote_core::{Product, Quote, QuoteDraft};

/// Read-only preview of a draft: header blocks, line items and totals.
///
/// Empty fields are left out, and the project block only appears for quote
/// types that carry project information.
pub struct QuotePreview<'a>(pub &'a QuoteDraft);

fn labelled(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    value: &str,
) -> fmt::Result {
    if value.is_empty() {
        return Ok(());
    }
    writeln!(f, "  {label}: {value}")
}

impl fmt::Display for QuotePreview<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let draft = self.0;
        let c = &draft.customer;

        writeln!(f, "Quote Preview ({})", draft.quote_type.label())?;
        writeln!(f)?;
        writeln!(f, "Customer Information")?;
        labelled(f, "Name", &c.name)?;
        labelled(f, "Email", &c.email)?;
        labelled(f, "Phone", &c.phone)?;
        labelled(f, "Address", &c.address)?;
        labelled(f, "PO", &c.purchase_order)?;

        let job = &draft.job_details;
        let project = &draft.project_details;
        let project_blank = job.job_address.is_empty()
            && job.township.is_empty()
            && job.county.is_empty()
            && job.sr_route.is_empty()
            && project.date_fields().iter().all(|d| d.is_empty());
        if draft.quote_type.has_project_info() && !project_blank {
            writeln!(f)?;
            writeln!(f, "Project Information")?;
            labelled(f, "Job Address", &job.job_address)?;
            labelled(f, "Township", &job.township)?;
            labelled(f, "County", &job.county)?;
            labelled(f, "State Route", &job.sr_route)?;
            labelled(f, "Bid Date", &project.bid_date)?;
            labelled(f, "Start Date", &project.start_date)?;
            labelled(f, "End Date", &project.end_date)?;
        }

        writeln!(f)?;
        writeln!(f, "Line Items")?;
        if draft.items().is_empty() {
            writeln!(f, "  (none)")?;
        }
        for item in draft.items() {
            writeln!(
                f,
                "  {:<28} {:>12}",
                item.description,
                format_currency(extended_price(item))
            )?;
            let discount = if item.discount.is_zero() {
                String::new()
            } else {
                format!(" - {}", format_currency(item.discount))
            };
            let tax = if item.apply_tax { " (taxed)" } else { "" };
            writeln!(
                f,
                "    {} | {} {} x {}{}{}",
                item.sku,
                item.quantity,
                item.unit_of_measure.as_str(),
                format_currency(item.unit_price),
                discount,
                tax
            )?;
        }

        let totals = draft.totals();
        writeln!(f)?;
        writeln!(f, "  {:<28} {:>12}", "Subtotal:", format_currency(totals.subtotal))?;
        writeln!(
            f,
            "  {:<28} {:>12}",
            format!("Tax ({}%):", draft.tax_rate_percent.normalize()),
            format_currency(totals.tax_amount)
        )?;
        writeln!(f, "  {:<28} {:>12}", "Total:", format_currency(totals.total))?;

        if !project.notes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Notes")?;
            writeln!(f, "  {}", project.notes)?;
        }

        let progress = draft.progress();
        writeln!(f)?;
        write!(
            f,
            "Sections complete: {}/4 (customer {}/{}, ETC {}/{})",
            progress.completed_sections(),
            progress.customer.filled,
            progress.customer.total,
            progress.etc.filled,
            progress.etc.total
        )
    }
}

/// Quote list as a fixed-width table, in the order given.
pub struct QuoteTable<'a>(pub &'a [Quote]);

impl fmt::Display for QuoteTable<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "No quotes found.");
        }

        writeln!(
            f,
            "{:<8} {:<22} {:<14} {:<9} {:<10} {:>12}",
            "Number", "Customer", "Type", "Status", "Created", "Total"
        )?;
        for (i, q) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{:<8} {:<22} {:<14} {:<9} {:<10} {:>12}",
                q.quote_number,
                q.customer_name,
                q.quote_type.label(),
                q.status.as_str(),
                q.created_at.format("%Y-%m-%d"),
                format_currency(q.total)
            )?;
        }
        Ok(())
    }
}

/// Catalog listing: id, name and unit price per line.
pub struct CatalogTable<'a>(pub &'a [Product]);

impl fmt::Display for CatalogTable<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:<6} {:<32} {:>12}", p.id, p.name, format_currency(p.price))?;
        }
        Ok(())
    }
}
