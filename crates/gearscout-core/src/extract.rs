use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::adapter::SiteAdapter;
use crate::models::{Listing, Price};
use crate::normalize::{QueryTerms, normalize_name, parse_price};
use crate::parser::Document;
use crate::reporter::{ScrapeEvent, ScrapeReporter};

/// Turns the containers of one parsed page into listings.
pub struct ListingExtractor<'a> {
    adapter: &'a SiteAdapter,
    terms: &'a QueryTerms,
    reporter: &'a dyn ScrapeReporter,
}

impl<'a> ListingExtractor<'a> {
    pub fn new(
        adapter: &'a SiteAdapter,
        terms: &'a QueryTerms,
        reporter: &'a dyn ScrapeReporter,
    ) -> Self {
        Self {
            adapter,
            terms,
            reporter,
        }
    }

    /// Extract every in-stock, query-matching listing on the page, in
    /// document order.
    ///
    /// A container the rule cannot read (returns `None` or panics) is
    /// skipped on its own; the rest of the page is still processed.
    pub fn extract(&self, document: &Document, page: u32) -> Vec<Listing> {
        let site = self.adapter.name();
        let mut listings = Vec::new();

        for container in document.containers(self.adapter.container_selector()) {
            let raw = match catch_unwind(AssertUnwindSafe(|| self.adapter.extract(container))) {
                Ok(Some(raw)) => raw,
                Ok(None) | Err(_) => {
                    self.reporter
                        .report(ScrapeEvent::ContainerSkipped { site, page });
                    continue;
                }
            };

            if !raw.in_stock {
                continue;
            }

            let name = normalize_name(&raw.name);
            if !self.terms.matches(&name) {
                continue;
            }

            let price = parse_price(&raw.price_text);
            if let Price::Raw(text) = &price {
                self.reporter.report(ScrapeEvent::PriceUnparsed {
                    site,
                    price_text: text,
                });
            }

            if let Some(listing) = Listing::new(name, price) {
                listings.push(listing);
            }
        }

        listings
    }
}
