use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{AggregateReport, Listing, Price, SiteContacts, SiteResult};

/// One site in the exported result array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub website: String,
    pub search_query_url: String,
    pub price_uah_min: Price,
    pub price_uah_max: Price,
    pub products_qty: usize,
    pub social_network: String,
    pub tel_vodafone: String,
    pub tel_kyivstar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<DetailRecord>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub product: String,
    pub price_uah: Price,
}

impl SiteRecord {
    pub fn from_site(site: &SiteResult, include_details: bool) -> Self {
        let contacts = site.contacts();
        let details = include_details.then(|| {
            site.listings()
                .iter()
                .map(|listing| DetailRecord {
                    product: listing.name().to_string(),
                    price_uah: listing.price().clone(),
                })
                .collect()
        });

        Self {
            website: site.site().to_string(),
            search_query_url: site.search_query_url().to_string(),
            price_uah_min: site.min_price().clone(),
            price_uah_max: site.max_price().clone(),
            products_qty: site.product_count(),
            social_network: contacts.social_network.clone(),
            tel_vodafone: contacts.tel_vodafone.clone(),
            tel_kyivstar: contacts.tel_kyivstar.clone(),
            details,
        }
    }

    /// Rebuild the site result. Needs `details`: counts and prices are
    /// recomputed from the listings rather than trusted from the record.
    pub fn into_site(self) -> Result<SiteResult, AppError> {
        let details = self.details.ok_or_else(|| {
            AppError::Generic(format!("record for {} has no details", self.website))
        })?;
        let listings = details
            .into_iter()
            .filter_map(|d| Listing::new(d.product, d.price_uah))
            .collect();
        let contacts = SiteContacts {
            social_network: self.social_network,
            tel_vodafone: self.tel_vodafone,
            tel_kyivstar: self.tel_kyivstar,
        };

        SiteResult::new(self.website.clone(), self.search_query_url, contacts, listings)
            .ok_or_else(|| {
                AppError::Generic(format!("record for {} has no products", self.website))
            })
    }
}

pub fn to_records(report: &AggregateReport, include_details: bool) -> Vec<SiteRecord> {
    report
        .sites()
        .iter()
        .map(|site| SiteRecord::from_site(site, include_details))
        .collect()
}

/// Serialize the report as a pretty-printed array of site records.
pub fn to_json(report: &AggregateReport, include_details: bool) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(&to_records(report, include_details))?)
}

/// Parse records written by [`to_json`] with details back into a report.
pub fn from_json(query: &str, json: &str) -> Result<AggregateReport, AppError> {
    let records: Vec<SiteRecord> = serde_json::from_str(json)?;
    let sites = records
        .into_iter()
        .map(SiteRecord::into_site)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(AggregateReport::new(query, sites))
}
