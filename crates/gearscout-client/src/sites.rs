//! Built-in catalog of supported shops.
//!
//! Each entry is data (URL templates, separator, container selector,
//! contacts) plus a small extraction rule over the shop's product card.

use std::sync::LazyLock;

use gearscout_core::error::AppError;
use gearscout_core::models::{RawListing, SiteContacts};
use gearscout_core::parser::element_text;
use gearscout_core::SiteAdapter;
use regex::Regex;
use scraper::{ElementRef, Selector};

/// First digit run of a price, plus any space-grouped thousands after it
/// (`1 250 грн`, `1250 грн`).
static GROUPED_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\s\d{3})*").expect("valid regex"));

/// All shops, in catalog order.
pub fn default_sites() -> Result<Vec<SiteAdapter>, AppError> {
    Ok(vec![
        ataka()?,
        abrams()?,
        kamber()?,
        militarist()?,
        molli()?,
        punisher()?,
        velmet()?,
        ukr_armor()?,
        grad_gear()?,
        killa()?,
    ])
}

fn ataka() -> Result<SiteAdapter, AppError> {
    let name = selector("h4 a")?;
    let price = selector(".price")?;
    let disabled = selector("button[disabled]")?;

    Ok(SiteAdapter::new(
        "Ataka",
        "https://attack.kiev.ua/search/page-{page}?search={query}",
        "https://attack.kiev.ua/search?search={query}",
        "%20",
        ".product-layout",
        move |card| {
            Some(RawListing::new(
                text_of(card, &name)?,
                grouped_price(&text_of(card, &price)?),
                !has(card, &disabled),
            ))
        },
    )?
    .with_contacts(contacts(
        "https://www.facebook.com/ATAKA.kiev.ua/",
        "+380955587673",
        "+380679305772",
    )))
}

fn abrams() -> Result<SiteAdapter, AppError> {
    let name = selector("h4 a")?;
    let price = selector(".price")?;
    let caption = selector(".caption")?;

    Ok(SiteAdapter::new(
        "Abrams",
        "https://abrams.com.ua/ua/search/?search={query}&page={page}",
        "https://abrams.com.ua/ua/search/?search={query}",
        "%20",
        ".product-layout",
        move |card| {
            let caption = text_of(card, &caption).unwrap_or_default();
            let in_stock = ["Є в наявності", "Закінчується"]
                .iter()
                .any(|phrase| caption.contains(phrase));
            Some(RawListing::new(
                text_of(card, &name)?,
                text_of(card, &price)?,
                in_stock,
            ))
        },
    )?
    .with_contacts(contacts(
        "https://www.instagram.com/abrams_reserve/",
        "+380955216148",
        "+380688736587",
    )))
}

fn kamber() -> Result<SiteAdapter, AppError> {
    let name = selector(".catalogCard-title a")?;
    let price = selector(".catalogCard-price")?;
    let sold_out = selector(".catalogCard-price.__light")?;

    Ok(SiteAdapter::new(
        "Kamber",
        "https://kamber.com.ua/katalog/search/filter/page={page}/?q={query}",
        "https://kamber.com.ua/katalog/search/filter/?q={query}",
        "+",
        ".catalog-grid__item",
        move |card| {
            Some(RawListing::new(
                text_of(card, &name)?,
                grouped_price(&text_of(card, &price)?),
                !has(card, &sold_out),
            ))
        },
    )?
    .with_contacts(contacts(
        "https://www.instagram.com/kamber_tactical/",
        "",
        "+380684262823",
    )))
}

fn militarist() -> Result<SiteAdapter, AppError> {
    let name = selector(".card_item-name")?;
    let price = selector("p.price_new")?;
    let no_stock = selector("div.status.no_stock")?;

    Ok(SiteAdapter::new(
        "Militarist",
        "https://militarist.ua/ua/search/?q={query}&s=&PAGEN_2={page}",
        "https://militarist.ua/ua/search/?q={query}",
        "+",
        ".card_product",
        move |card| {
            Some(RawListing::new(
                text_of(card, &name)?,
                grouped_price(&text_of(card, &price)?),
                !has(card, &no_stock),
            ))
        },
    )?
    .with_contacts(contacts(
        "http://instagram.com/tm_militarist",
        "",
        "+380678296207",
    )))
}

fn molli() -> Result<SiteAdapter, AppError> {
    let name = selector(".catalogCard-title")?;
    let price = selector(".catalogCard-price")?;
    let out_of_stock = selector(".catalogCard-availability.__out-of-stock")?;

    Ok(SiteAdapter::new(
        "Molli",
        "https://molliua.com/katalog/search/filter/page={page}/?q={query}",
        "https://molliua.com/katalog/search/filter/?q={query}",
        "+",
        ".catalog-grid__item",
        move |card| {
            Some(RawListing::new(
                text_of(card, &name)?,
                grouped_price(&text_of(card, &price)?),
                !has(card, &out_of_stock),
            ))
        },
    )?
    .with_contacts(contacts(
        "https://www.instagram.com/molli.u.a",
        "+380994603556",
        "+380962019665",
    )))
}

fn punisher() -> Result<SiteAdapter, AppError> {
    let name = selector(".catalogCard-title")?;
    let price = selector(".catalogCard-price")?;
    let buy = selector(".btn.__special.j-buy-button-add")?;

    Ok(SiteAdapter::new(
        "Punisher",
        "https://punisher.com.ua/magazin/search/filter/page={page}/?q={query}",
        "https://punisher.com.ua/magazin/search/filter/?q={query}",
        "+",
        ".catalog-grid__item",
        move |card| {
            Some(RawListing::new(
                text_of(card, &name)?,
                grouped_price(&text_of(card, &price)?),
                has(card, &buy),
            ))
        },
    )?
    .with_contacts(contacts(
        "https://www.instagram.com/punisher.com.ua/",
        "+380500587070",
        "+380970587000",
    )))
}

fn velmet() -> Result<SiteAdapter, AppError> {
    let name = selector(".caption .name")?;
    let price = selector(".price")?;
    let in_stock = selector(".status.in_stock")?;

    Ok(SiteAdapter::new(
        "Velmet",
        "https://velmet.ua/index.php?route=product/search&search={query}&page={page}",
        "https://velmet.ua/index.php?route=product/search&search={query}",
        "",
        ".product-layout",
        move |card| {
            Some(RawListing::new(
                text_of(card, &name)?,
                grouped_price(&text_of(card, &price)?),
                has(card, &in_stock),
            ))
        },
    )?
    .with_contacts(contacts(
        "https://www.instagram.com/velmet.ua/",
        "+380993738778",
        "+380673738778",
    )))
}

fn ukr_armor() -> Result<SiteAdapter, AppError> {
    let name = selector(".product-card__title")?;
    let price = selector(".product-card__price--current")?;
    let out = selector(".product-card__in-stock.product-card__in-stock--out")?;

    Ok(SiteAdapter::new(
        "Ukr Armor",
        "https://ukrarmor.com.ua/search?page={page}&search={query}",
        "https://ukrarmor.com.ua/search?search={query}",
        "+",
        ".product-card.product-card--default",
        move |card| {
            Some(RawListing::new(
                text_of(card, &name)?,
                grouped_price(&text_of(card, &price)?),
                !has(card, &out),
            ))
        },
    )?
    .with_contacts(contacts("https://www.instagram.com/ukrarmor/", "", "")))
}

fn grad_gear() -> Result<SiteAdapter, AppError> {
    let name = selector(".catalogCard-title")?;
    let price = selector(".catalogCard-price")?;

    Ok(SiteAdapter::new(
        "Grad Gear",
        "https://gradgear.com.ua/katalog/search/filter/page={page}/?q={query}",
        "https://gradgear.com.ua/katalog/search/filter/?q={query}",
        "+",
        ".catalog-grid__item",
        move |card| {
            // Sold-out cards drop the price block entirely.
            let price = text_of(card, &price)?;
            Some(RawListing::new(text_of(card, &name)?, grouped_price(&price), true))
        },
    )?
    .with_contacts(contacts(
        "https://www.instagram.com/grad.gear/",
        "",
        "+380681437535",
    )))
}

fn killa() -> Result<SiteAdapter, AppError> {
    let name = selector("h4 a")?;
    let price = selector(".price")?;
    let status = selector(".status")?;

    Ok(SiteAdapter::new(
        "Killa",
        "https://killa.com.ua/uk/index.php?route=product/isearch&search={query}&page={page}",
        "https://killa.com.ua/uk/index.php?route=product/isearch&search={query}",
        " ",
        ".product-layout",
        move |card| {
            let status = text_of(card, &status).unwrap_or_default();
            Some(RawListing::new(
                text_of(card, &name)?,
                grouped_price(&text_of(card, &price)?),
                !status.to_lowercase().contains("немає в наявності"),
            ))
        },
    )?
    .with_contacts(contacts(
        "https://www.instagram.com/killa_voentorg",
        "+380990604126",
        "+380967980043",
    )))
}

fn selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css).map_err(|e| AppError::SelectorError {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

fn contacts(social_network: &str, tel_vodafone: &str, tel_kyivstar: &str) -> SiteContacts {
    SiteContacts {
        social_network: social_network.to_string(),
        tel_vodafone: tel_vodafone.to_string(),
        tel_kyivstar: tel_kyivstar.to_string(),
    }
}

fn text_of(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector).next().map(element_text)
}

fn has(card: ElementRef<'_>, selector: &Selector) -> bool {
    card.select(selector).next().is_some()
}

/// Join space-grouped thousands of the first number (`1 250 грн.` → `1250`).
/// Text without digits is returned trimmed for the engine to keep as-is.
fn grouped_price(text: &str) -> String {
    match GROUPED_PRICE.find(text) {
        Some(m) => m.as_str().chars().filter(|c| !c.is_whitespace()).collect(),
        None => text.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use gearscout_core::models::Price;
    use gearscout_core::normalize::{QueryTerms, parse_price};
    use gearscout_core::parser::Document;
    use gearscout_core::reporter::NullReporter;
    use gearscout_core::extract::ListingExtractor;

    use super::*;

    fn site(name: &str) -> SiteAdapter {
        default_sites()
            .unwrap()
            .into_iter()
            .find(|s| s.name() == name)
            .unwrap()
    }

    fn extract(adapter: &SiteAdapter, html: &str, query: &str) -> Vec<(String, Price)> {
        let terms = QueryTerms::new(query);
        ListingExtractor::new(adapter, &terms, &NullReporter)
            .extract(&Document::parse(html.as_bytes()), 1)
            .into_iter()
            .map(|l| (l.name().to_string(), l.price().clone()))
            .collect()
    }

    #[test]
    fn catalog_has_unique_names() {
        let sites = default_sites().unwrap();
        assert_eq!(sites.len(), 10);
        let mut names: Vec<_> = sites.iter().map(SiteAdapter::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn urls_use_each_shop_separator() {
        assert_eq!(
            site("Ataka").page_url(2, "сумка скидання"),
            "https://attack.kiev.ua/search/page-2?search=сумка%20скидання"
        );
        assert_eq!(
            site("Kamber").search_url("tactical belt"),
            "https://kamber.com.ua/katalog/search/filter/?q=tactical+belt"
        );
        assert_eq!(
            site("Velmet").search_url("tactical belt"),
            "https://velmet.ua/index.php?route=product/search&search=tacticalbelt"
        );
    }

    #[test]
    fn grouped_prices_are_joined() {
        assert_eq!(grouped_price("1 250 грн."), "1250");
        assert_eq!(grouped_price("12 345 678 грн"), "12345678");
        assert_eq!(grouped_price("450 грн"), "450");
        assert_eq!(grouped_price("  Ціну уточнюйте "), "Ціну уточнюйте");
        assert_eq!(parse_price(&grouped_price("1 250 грн.")), Price::Amount(1250));
    }

    #[test]
    fn grouped_price_keeps_the_first_number() {
        assert_eq!(grouped_price("1250 грн / 3 шт"), "1250");
        assert_eq!(grouped_price("12500 грн. 9 999 грн."), "12500");
        assert_eq!(grouped_price("від 1 250 до 2 000 грн"), "1250");
        // Non-breaking space as the thousands separator.
        assert_eq!(grouped_price("3\u{a0}400 грн"), "3400");
        assert_eq!(parse_price(&grouped_price("1250 грн / 3 шт")), Price::Amount(1250));
    }

    #[test]
    fn ataka_skips_disabled_buy_buttons() {
        let html = r#"
            <div class="product-layout">
                <h4><a href="/p1">Сумка скидання олива</a></h4>
                <p class="price">1 250 грн.</p>
                <button>Купити</button>
            </div>
            <div class="product-layout">
                <h4><a href="/p2">Сумка скидання койот</a></h4>
                <p class="price">1 100 грн.</p>
                <button disabled="disabled">Немає</button>
            </div>"#;
        let found = extract(&site("Ataka"), html, "сумка скидання");
        assert_eq!(found, [("Сумка скидання олива".to_string(), Price::Amount(1250))]);
    }

    #[test]
    fn abrams_reads_stock_from_caption() {
        let html = r#"
            <div class="product-layout">
                <div class="caption"><h4><a>Belt tactical</a></h4><span>Закінчується</span></div>
                <p class="price">780 грн</p>
            </div>
            <div class="product-layout">
                <div class="caption"><h4><a>Belt duty</a></h4><span>Немає в наявності</span></div>
                <p class="price">900 грн</p>
            </div>"#;
        let found = extract(&site("Abrams"), html, "belt");
        assert_eq!(found, [("Belt tactical".to_string(), Price::Amount(780))]);
    }

    #[test]
    fn catalog_card_shops_share_markup() {
        let html = r#"
            <div class="catalog-grid__item">
                <div class="catalogCard-title"><a href="/x">Ремінь тактичний</a></div>
                <div class="catalogCard-price">2 300 грн</div>
                <div class="catalogCard-availability">В наявності</div>
                <button class="btn __special j-buy-button-add">Купити</button>
            </div>
            <div class="catalog-grid__item">
                <div class="catalogCard-title"><a href="/y">Ремінь "Кобра"</a></div>
                <div class="catalogCard-price __light">2 900 грн</div>
                <div class="catalogCard-availability __out-of-stock">Немає</div>
            </div>"#;

        for shop in ["Kamber", "Molli", "Punisher"] {
            let found = extract(&site(shop), html, "ремінь");
            assert_eq!(
                found,
                [("Ремінь тактичний".to_string(), Price::Amount(2300))],
                "{shop}"
            );
        }

        // Grad Gear keeps every card that still shows a price.
        let found = extract(&site("Grad Gear"), html, "ремінь");
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].0, "Ремінь 'Кобра'");
    }

    #[test]
    fn killa_checks_status_text() {
        let html = r#"
            <div class="product-layout">
                <h4><a>Підсумок під магазин</a></h4>
                <span class="price">650 грн</span>
                <span class="status">Немає в наявності</span>
            </div>
            <div class="product-layout">
                <h4><a>Підсумок скидання</a></h4>
                <span class="price">1 020 грн</span>
                <span class="status">В наявності</span>
            </div>"#;
        let found = extract(&site("Killa"), html, "підсумок");
        assert_eq!(found, [("Підсумок скидання".to_string(), Price::Amount(1020))]);
    }

    #[test]
    fn card_without_price_is_skipped() {
        let html = r#"
            <div class="product-card product-card--default">
                <div class="product-card__title">Плитоноска</div>
            </div>"#;
        assert!(extract(&site("Ukr Armor"), html, "плитоноска").is_empty());
    }
}
