use std::fmt::Write;

use crate::models::{AggregateReport, Price, SiteResult};

/// Renders an [`AggregateReport`] as chat-safe text: bold site names,
/// clickable search links, and nothing else from the HTML vocabulary.
///
/// Pure rendering: sites and listings appear in the order the report
/// already has.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReportFormatter {
    include_details: bool,
}

impl ReportFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also list every product under its site.
    pub fn with_details(mut self, include_details: bool) -> Self {
        self.include_details = include_details;
        self
    }

    pub fn format(&self, report: &AggregateReport, query: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "<b>{}</b>", escape_html(query));
        let _ = writeln!(out, "Знайдено товарів: {}", report.total_products());
        out.push('\n');

        for site in report.sites() {
            self.format_site(&mut out, site);
        }
        out
    }

    fn format_site(&self, out: &mut String, site: &SiteResult) {
        let _ = writeln!(out, "<b>{}</b>", escape_html(site.site()));
        let _ = writeln!(out, "◽ К-сть: {} шт.", site.product_count());
        let _ = writeln!(out, "◽ Ціна: {}", price_span(site.min_price(), site.max_price()));

        if self.include_details {
            for listing in site.listings() {
                let _ = writeln!(
                    out,
                    "▫ {}: {}",
                    escape_html(listing.name()),
                    format_price(listing.price())
                );
            }
        }

        let _ = writeln!(
            out,
            "<a href='{}'>перейти→</a>",
            escape_attr(site.search_query_url())
        );
        out.push('\n');
    }
}

/// `1250` → `1,250`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// A single price as shown to users; unreadable prices pass through as-is.
pub fn format_price(price: &Price) -> String {
    match price {
        Price::Amount(value) => format!("{} грн.", group_thousands(*value)),
        Price::Raw(text) => escape_html(text),
    }
}

fn price_span(min: &Price, max: &Price) -> String {
    if min == max {
        return format_price(min);
    }
    match (min, max) {
        (Price::Amount(lo), Price::Amount(hi)) => {
            format!("{} -- {} грн.", group_thousands(*lo), group_thousands(*hi))
        }
        _ => format!("{} -- {}", format_price(min), format_price(max)),
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape_html(text).replace('\'', "%27")
}
