//! End-to-end crawls against a wiremock stand-in for the auction site.

use auction_scout::scrapers::{HttpFetcher, SearchParams};
use auction_scout::{Crawler, ListingStatus, ResultStore, UpdateStatus};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/search/motor-vehicles";

fn params(origin: &str) -> SearchParams {
    SearchParams {
        origin: origin.to_string(),
        search_path: SEARCH_PATH.to_string(),
        ..SearchParams::default()
    }
    .without_delays()
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><head><title>Grays</title></head><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

async fn mount_index(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn mount_lot(server: &MockServer, lot_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(lot_path))
        .respond_with(html(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_over_http() {
    let server = MockServer::start().await;

    mount_index(
        &server,
        "1",
        r#"
        <a href="/lot/0001-1/motor-vehicles/corolla"><h2>2019 Toyota Corolla Ascent</h2></a>
        <a href="/lot/0001-2/motor-cycles/crf"><h2>2018 Honda CRF450 Motorcycle</h2></a>
        <a href="/lot/0001-3/motor-vehicles/ranger"><h2>2015 Ford Ranger XL</h2></a>
        "#,
    )
    .await;
    mount_index(
        &server,
        "2",
        r#"<a href="/lot/0001-3/motor-vehicles/ranger"><h2>2015 Ford Ranger XL</h2></a>"#,
    )
    .await;
    // page 3 is not mounted and answers 404

    mount_lot(
        &server,
        "/lot/0001-1/motor-vehicles/corolla",
        r#"<h1>2019 Toyota Corolla Ascent</h1>
        <span itemprop="price">$12,345</span><a href="bids">4 bids</a>
        <span id="lot-closing-countdown">1d 2h</span>
        <p>Odometer: 45,000 km</p><p>Location: 1 Depot Rd, Yatala, QLD, 4207</p>"#,
    )
    .await;
    mount_lot(
        &server,
        "/lot/0001-3/motor-vehicles/ranger",
        r#"<h1>2015 Ford Ranger XL</h1><p>Auction Ended</p><p>No bids</p>"#,
    )
    .await;

    let store = ResultStore::new();
    let crawler = Crawler::new(
        Arc::new(HttpFetcher::new().expect("client")),
        params(&server.uri()),
        store.clone(),
    )
    .expect("crawler");

    let report = crawler.run(Some(3)).await.expect("crawl succeeds");

    assert_eq!(report.found, 2);
    assert_eq!(report.processed, 2);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.pages_failed, 1);

    let vehicles = store.snapshot().await;
    let corolla = vehicles
        .iter()
        .find(|v| v.url.ends_with("/corolla"))
        .expect("corolla stored");
    assert_eq!(corolla.url, format!("{}/lot/0001-1/motor-vehicles/corolla", server.uri()));
    assert_eq!(corolla.year, Some(2019));
    assert_eq!(corolla.price, Some(12345.0));
    assert_eq!(corolla.bids, 4);
    assert_eq!(corolla.odometer, Some(45000));
    assert_eq!(corolla.location.as_deref(), Some("QLD"));
    assert_eq!(corolla.status, ListingStatus::Active);

    let ranger = vehicles
        .iter()
        .find(|v| v.url.ends_with("/ranger"))
        .expect("ranger stored");
    assert_eq!(ranger.time_remaining_or_date_sold, "Auction Ended");
    assert_eq!(ranger.status, ListingStatus::Referred);
}

#[tokio::test]
async fn test_update_listings_over_http() {
    let server = MockServer::start().await;
    mount_lot(
        &server,
        "/lot/1",
        r#"<h1>2012 Mazda 3 Neo</h1><span itemprop="price">$5,000</span><p>3 bids</p><p>Auction Ended</p>"#,
    )
    .await;
    mount_lot(
        &server,
        "/lot/3",
        r#"<h1>2016 Kia Rio S</h1><span itemprop="price">$8,100</span><p>2 bids</p><span id="lot-closing-countdown">5h 1m 0s</span>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/lot/2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let crawler = Crawler::new(
        Arc::new(HttpFetcher::new().expect("client")),
        params(&server.uri()),
        ResultStore::new(),
    )
    .expect("crawler");

    let urls: Vec<String> = ["/lot/1", "/lot/2", "/lot/3"]
        .iter()
        .map(|p| format!("{}{}", server.uri(), p))
        .collect();
    let updates = crawler.update_listings(&urls).await;

    assert_eq!(updates.len(), 3);
    assert_eq!(
        updates.iter().map(|u| u.url.clone()).collect::<Vec<_>>(),
        urls
    );
    assert_eq!(updates[0].status, UpdateStatus::Sold);
    assert_eq!(updates[1].status, UpdateStatus::Error);
    assert_eq!(updates[1].time_remaining, "Error");
    assert_eq!(updates[2].status, UpdateStatus::Active);
    assert_eq!(updates[2].price, Some(8100.0));
}
