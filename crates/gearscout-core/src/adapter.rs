use std::fmt;
use std::sync::Arc;

use scraper::{ElementRef, Selector};

use crate::error::AppError;
use crate::models::{RawListing, SiteContacts};

/// Placeholder for the 1-based page number in a page URL template.
pub const PAGE_PLACEHOLDER: &str = "{page}";
/// Placeholder for the encoded query in URL templates.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Per-site extraction rule: pull name, price text and stock status out of
/// one container, or `None` when the container is not a product.
pub type ExtractRule = Arc<dyn Fn(ElementRef<'_>) -> Option<RawListing> + Send + Sync>;

/// Static configuration of one shop.
///
/// Everything site-specific lives here as data plus one extraction
/// function; the scraper itself is the same for every shop.
#[derive(Clone)]
pub struct SiteAdapter {
    name: String,
    page_url_template: String,
    search_url_template: String,
    separator: String,
    container_css: String,
    container_selector: Selector,
    extract: ExtractRule,
    contacts: SiteContacts,
}

impl SiteAdapter {
    /// Validates both URL templates and the container selector.
    pub fn new<R>(
        name: impl Into<String>,
        page_url_template: impl Into<String>,
        search_url_template: impl Into<String>,
        separator: impl Into<String>,
        container_css: impl Into<String>,
        extract: R,
    ) -> Result<Self, AppError>
    where
        R: Fn(ElementRef<'_>) -> Option<RawListing> + Send + Sync + 'static,
    {
        let page_url_template = page_url_template.into();
        let search_url_template = search_url_template.into();
        let container_css = container_css.into();

        require_placeholder(&page_url_template, PAGE_PLACEHOLDER)?;
        require_placeholder(&page_url_template, QUERY_PLACEHOLDER)?;
        require_placeholder(&search_url_template, QUERY_PLACEHOLDER)?;

        let container_selector =
            Selector::parse(&container_css).map_err(|e| AppError::SelectorError {
                selector: container_css.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            name: name.into(),
            page_url_template,
            search_url_template,
            separator: separator.into(),
            container_css,
            container_selector,
            extract: Arc::new(extract),
            contacts: SiteContacts::default(),
        })
    }

    pub fn with_contacts(mut self, contacts: SiteContacts) -> Self {
        self.contacts = contacts;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn container_selector(&self) -> &Selector {
        &self.container_selector
    }

    pub fn contacts(&self) -> &SiteContacts {
        &self.contacts
    }

    /// Join the query words with this site's separator.
    pub fn encode_query(&self, query: &str) -> String {
        query.replace(' ', &self.separator)
    }

    /// URL of result page `page` (1-based) for `query`.
    pub fn page_url(&self, page: u32, query: &str) -> String {
        self.page_url_template
            .replace(PAGE_PLACEHOLDER, &page.to_string())
            .replace(QUERY_PLACEHOLDER, &self.encode_query(query))
    }

    /// Canonical search link for `query`, shown in reports.
    pub fn search_url(&self, query: &str) -> String {
        self.search_url_template
            .replace(QUERY_PLACEHOLDER, &self.encode_query(query))
    }

    /// Run the extraction rule on one container.
    pub fn extract(&self, container: ElementRef<'_>) -> Option<RawListing> {
        (self.extract)(container)
    }
}

impl fmt::Debug for SiteAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteAdapter")
            .field("name", &self.name)
            .field("page_url_template", &self.page_url_template)
            .field("search_url_template", &self.search_url_template)
            .field("separator", &self.separator)
            .field("container_css", &self.container_css)
            .finish_non_exhaustive()
    }
}

fn require_placeholder(template: &str, placeholder: &'static str) -> Result<(), AppError> {
    if template.contains(placeholder) {
        Ok(())
    } else {
        Err(AppError::InvalidTemplate {
            template: template.to_string(),
            placeholder,
        })
    }
}
