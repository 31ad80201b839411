use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Price of one listing, in whole UAH.
///
/// Sites occasionally render prices we cannot read as a number ("ask a
/// manager", "від 1 200"); those survive as `Raw` instead of failing the
/// page. Every `Amount` orders before every `Raw`, so sorting is total.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Amount(u64),
    Raw(String),
}

impl Price {
    pub fn amount(&self) -> Option<u64> {
        match self {
            Price::Amount(value) => Some(*value),
            Price::Raw(_) => None,
        }
    }
}

impl Ord for Price {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Price::Amount(a), Price::Amount(b)) => a.cmp(b),
            (Price::Amount(_), Price::Raw(_)) => Ordering::Less,
            (Price::Raw(_), Price::Amount(_)) => Ordering::Greater,
            (Price::Raw(a), Price::Raw(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Amount(value) => write!(f, "{value}"),
            Price::Raw(text) => f.write_str(text),
        }
    }
}

/// What a site adapter's extraction rule pulls out of one container,
/// before any normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawListing {
    pub name: String,
    pub price_text: String,
    pub in_stock: bool,
}

impl RawListing {
    pub fn new(name: impl Into<String>, price_text: impl Into<String>, in_stock: bool) -> Self {
        Self {
            name: name.into(),
            price_text: price_text.into(),
            in_stock,
        }
    }
}

/// One in-stock product occurrence on one site.
///
/// Only in-stock candidates ever become a `Listing`, and the name is never
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    name: String,
    price: Price,
}

impl Listing {
    /// Returns `None` when the name is blank.
    pub fn new(name: impl Into<String>, price: Price) -> Option<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return None;
        }
        Some(Self { name, price })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> &Price {
        &self.price
    }
}

/// Contact and social metadata shown next to a site in exports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteContacts {
    pub social_network: String,
    pub tel_vodafone: String,
    pub tel_kyivstar: String,
}

/// Outcome of one site across all of its pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteResult {
    site: String,
    search_query_url: String,
    contacts: SiteContacts,
    min_price: Price,
    max_price: Price,
    listings: Vec<Listing>,
}

impl SiteResult {
    /// Build a site result from listings in discovery order.
    ///
    /// Returns `None` for an empty listing set: a site that found nothing
    /// contributes nothing to the report.
    pub fn new(
        site: impl Into<String>,
        search_query_url: impl Into<String>,
        contacts: SiteContacts,
        listings: Vec<Listing>,
    ) -> Option<Self> {
        let (min_price, max_price) = price_range(&listings)?;
        Some(Self {
            site: site.into(),
            search_query_url: search_query_url.into(),
            contacts,
            min_price,
            max_price,
            listings,
        })
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn search_query_url(&self) -> &str {
        &self.search_query_url
    }

    pub fn contacts(&self) -> &SiteContacts {
        &self.contacts
    }

    pub fn min_price(&self) -> &Price {
        &self.min_price
    }

    pub fn max_price(&self) -> &Price {
        &self.max_price
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn product_count(&self) -> usize {
        self.listings.len()
    }

    fn sort_listings_by_price(&mut self) {
        // Stable: equal prices keep discovery order.
        self.listings.sort_by(|a, b| a.price().cmp(b.price()));
    }
}

/// Min and max price over a listing set.
///
/// Numeric prices win: unparseable entries are ignored as long as at least
/// one listing has an amount. Only a site with no amount at all falls back
/// to the lexical min/max of the raw strings.
pub fn price_range(listings: &[Listing]) -> Option<(Price, Price)> {
    let mut amounts = listings.iter().filter_map(|l| l.price().amount()).peekable();
    if amounts.peek().is_some() {
        let (min, max) = amounts.fold((u64::MAX, u64::MIN), |(lo, hi), value| {
            (lo.min(value), hi.max(value))
        });
        return Some((Price::Amount(min), Price::Amount(max)));
    }

    let min = listings.iter().map(Listing::price).min()?.clone();
    let max = listings.iter().map(Listing::price).max()?.clone();
    Some((min, max))
}

/// Final cross-site result set for one search.
///
/// Sites are ordered ascending by minimum price and each site's listings
/// ascending by price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateReport {
    query: String,
    sites: Vec<SiteResult>,
}

impl AggregateReport {
    pub fn new(query: impl Into<String>, mut sites: Vec<SiteResult>) -> Self {
        for site in &mut sites {
            site.sort_listings_by_price();
        }
        // Stable, so sites with equal minimums keep their completion order.
        sites.sort_by(|a, b| a.min_price().cmp(b.min_price()));
        Self {
            query: query.into(),
            sites,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sites(&self) -> &[SiteResult] {
        &self.sites
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn total_products(&self) -> usize {
        self.sites.iter().map(SiteResult::product_count).sum()
    }
}
