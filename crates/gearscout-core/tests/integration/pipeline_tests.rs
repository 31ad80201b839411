use gearscout_core::export::{from_json, to_json};
use gearscout_core::testutil::{MockFetcher, fixture_adapter};
use gearscout_core::{AppError, Price, RawResponse, ReportFormatter, SearchService};

use crate::common::{engine, page};

fn three_shops() -> (Vec<gearscout_core::SiteAdapter>, MockFetcher) {
    let a = fixture_adapter("A");
    let b = fixture_adapter("B");
    let c = fixture_adapter("C");

    let repeated = page(&[("belt b1", "300"), ("belt b2", "250")]);
    let mock = MockFetcher::new()
        .with_page(
            a.page_url(1, "belt"),
            page(&[("belt a1", "100"), ("belt a2", "150"), ("belt a3", "200")]),
        )
        .with_page(
            a.page_url(2, "belt"),
            page(&[("belt a4", "120"), ("belt a5", "90"), ("belt a6", "80")]),
        )
        .with_page(a.page_url(3, "belt"), page(&[]))
        .with_page(b.page_url(1, "belt"), repeated.clone())
        .with_page(b.page_url(2, "belt"), repeated)
        .with_page(c.page_url(1, "belt"), RawResponse::status(503));

    (vec![a, b, c], mock)
}

#[tokio::test]
async fn aggregates_paginated_and_repeating_sites() {
    let (adapters, mock) = three_shops();
    let (engine, reporter) = engine(mock.clone());

    let report = engine.aggregate(&adapters, "belt").await;

    let names: Vec<_> = report.sites().iter().map(|s| s.site()).collect();
    assert_eq!(names, ["A", "B"]);

    let a = &report.sites()[0];
    assert_eq!(a.product_count(), 6);
    assert_eq!(a.min_price(), &Price::Amount(80));
    assert_eq!(a.max_price(), &Price::Amount(200));
    let prices: Vec<_> = a.listings().iter().filter_map(|l| l.price().amount()).collect();
    assert_eq!(prices, [80, 90, 100, 120, 150, 200]);

    // The repeated page is not counted twice, and nothing past it is asked for.
    let b = &report.sites()[1];
    assert_eq!(b.product_count(), 2);
    assert_eq!(mock.calls_to(&adapters[1].page_url(3, "belt")), 0);
    assert_eq!(reporter.sites_for("duplicate_page"), ["B"]);

    assert_eq!(reporter.sites_for("site_failed"), ["C"]);
    assert_eq!(mock.calls_to(&adapters[2].page_url(1, "belt")), 2);
    assert_eq!(report.total_products(), 8);
}

#[tokio::test]
async fn formatted_report_survives_json_round_trip() {
    let (adapters, mock) = three_shops();
    let (engine, _) = engine(mock);
    let report = engine.aggregate(&adapters, "belt").await;

    let json = to_json(&report, true).unwrap();
    let restored = from_json("belt", &json).unwrap();

    let formatter = ReportFormatter::new().with_details(true);
    assert_eq!(formatter.format(&restored, "belt"), formatter.format(&report, "belt"));

    let text = formatter.format(&report, "belt");
    assert!(text.starts_with("<b>belt</b>\nЗнайдено товарів: 8\n\n<b>A</b>\n"));
    assert!(text.contains("◽ Ціна: 80 -- 200 грн.\n"));
    assert!(text.contains("<a href='https://b.example/search?q=belt'>перейти→</a>\n"));
}

#[tokio::test]
async fn search_reports_no_results_when_every_site_fails() {
    let adapters = vec![fixture_adapter("A"), fixture_adapter("B")];
    let mock = MockFetcher::new()
        .with_page(adapters[0].page_url(1, "belt"), RawResponse::status(404))
        .with_page(adapters[1].page_url(1, "belt"), RawResponse::status(500));
    let (engine, _) = engine(mock);

    let err = SearchService::new(engine, adapters)
        .search("Belt")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NoResults { ref query } if query == "belt"));
}
