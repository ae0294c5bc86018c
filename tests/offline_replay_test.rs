//! Saved results page replayed through the capture pipeline.

use std::path::PathBuf;

use rs_farewatch::driver::{DomDriver, Driver};
use rs_farewatch::extractor::{card_price, extract_times};
use rs_farewatch::patterns::{FLIGHT_CARD_SELECTORS, TIME_SELECTORS};
use rs_farewatch::{capture, capture_and_record, Options, Phase, SearchConfig, Status};

fn fixture() -> DomDriver {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/flight_cards.html");
    DomDriver::from_file(path).expect("fixture readable")
}

fn search() -> SearchConfig {
    SearchConfig::new("STN", "BGY", "2024-08-22", "2024-09-04", 1, "GBP").expect("valid search")
}

fn options() -> Options {
    Options { debug_dir: None, ..Options::default() }
}

#[test]
fn extract_flight_cards_from_offline_html() {
    let driver = fixture();
    let cards = driver.find_all(&FLIGHT_CARD_SELECTORS[0]).expect("lookup");
    assert_eq!(cards.len(), 2);

    assert_eq!(card_price(&cards[0]).expect("price"), "£123.45");
    assert_eq!(extract_times(&cards[0], TIME_SELECTORS).expect("times"), ["06:30", "08:45"]);
    assert_eq!(card_price(&cards[1]).expect("price"), "£156.00");
    assert_eq!(extract_times(&cards[1], TIME_SELECTORS).expect("times"), ["12:10", "14:25"]);
}

#[test]
fn capture_accepts_cookies_and_splits_outbound_return() {
    let driver = fixture();
    let outcome = capture(&driver, &search(), &options());

    assert!(outcome.is_success());
    assert_eq!(outcome.phase, Phase::Assembled);
    assert_eq!(outcome.card_selector.as_deref(), Some("css=flight-card"));
    assert_eq!(driver.clicks(), ["Yes, I agree"]);

    let visited = driver.visited();
    assert_eq!(visited.len(), 1);
    assert!(visited[0].contains("originIata=STN"));

    let summary: Vec<(&str, Option<&str>, &str, &str)> = outcome
        .options
        .iter()
        .map(|o| (o.flight_date.as_str(), o.price.as_deref(), o.depart_time.as_str(), o.return_time.as_str()))
        .collect();
    assert_eq!(
        summary,
        [
            ("2024-08-22", Some("£123.45"), "06:30", "08:45"),
            ("2024-09-04", Some("£156.00"), "12:10", "14:25"),
        ]
    );
    assert!(outcome.options.iter().all(|o| o.status == Status::Ok && o.currency == "GBP"));
}

#[test]
fn capture_and_record_appends_one_row_per_card() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv = dir.path().join("data").join("flight_prices.csv");

    capture_and_record(&fixture(), &search(), &options(), &csv).expect("first run");
    capture_and_record(&fixture(), &search(), &options(), &csv).expect("second run");

    let content = std::fs::read_to_string(&csv).expect("csv written");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(
        lines[0],
        "timestamp_utc,origin,destination,departure_date,arrival_date,price,currency,status"
    );
    assert!(lines[1].ends_with(",STN,BGY,2024-08-22T06:30,2024-08-22T08:45,£123.45,GBP,ok"));
    assert!(lines[2].ends_with(",STN,BGY,2024-09-04T12:10,2024-09-04T14:25,£156.00,GBP,ok"));
}

#[test]
fn hidden_cookie_banner_is_not_clicked() {
    let driver = DomDriver::from_html(
        r#"<div hidden><button data-ref="cookie.accept-all">Accept</button></div>
           <div class="flight-card"><span class="price">£9.99</span></div>"#,
    );
    let outcome = capture(&driver, &search(), &options());

    assert!(driver.clicks().is_empty());
    assert_eq!(outcome.card_selector.as_deref(), Some("css=.flight-card"));
    assert_eq!(outcome.options[0].price.as_deref(), Some("£9.99"));
}

#[test]
fn table_row_cards_keep_their_cells() {
    let driver = DomDriver::from_html(
        r#"<table>
             <tr class="flight-card">
               <td class="flight-time">07:15</td><td class="flight-time">09:30</td>
               <td class="price">£42.00</td>
             </tr>
           </table>"#,
    );
    let outcome = capture(&driver, &search(), &options());

    assert_eq!(outcome.phase, Phase::Assembled);
    assert_eq!(outcome.card_selector.as_deref(), Some("css=.flight-card"));
    assert_eq!(outcome.options.len(), 1);
    assert_eq!(outcome.options[0].price.as_deref(), Some("£42.00"));
    assert_eq!(outcome.options[0].status, Status::Ok);
    assert_eq!(outcome.options[0].depart_time, "07:15");
    assert_eq!(outcome.options[0].return_time, "09:30");
}
