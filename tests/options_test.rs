use std::path::Path;
use std::time::Duration;

use rs_farewatch::{Error, Options, SearchConfig, SEARCH_BASE_URL};

#[test]
fn options_default_values_are_sensible() {
    let options = Options::default();
    assert_eq!(options.page_load_timeout, Duration::from_secs(40));
    assert_eq!(options.card_wait, Duration::from_secs(10));
    assert_eq!(options.selector_wait, Duration::from_secs(5));
    assert_eq!(options.poll_interval, Duration::from_millis(250));
    assert_eq!(options.debug_dir.as_deref(), Some(Path::new("debug_artifacts")));
    assert!(!options.headless);
    assert_eq!(options.window_size, (1400, 900));
}

#[test]
fn options_struct_update_syntax_overrides_selected_fields_only() {
    let options = Options { headless: true, debug_dir: None, ..Options::default() };

    assert!(options.headless);
    assert!(options.debug_dir.is_none());
    assert_eq!(options.page_load_timeout, Duration::from_secs(40));
}

#[test]
fn search_fields_are_trimmed() {
    let search = SearchConfig::new(" STN ", "BGY\n", "2024-08-22", "2024-09-04", 1, " GBP")
        .expect("valid search");

    assert_eq!(search.origin(), "STN");
    assert_eq!(search.destination(), "BGY");
    assert_eq!(search.currency(), "GBP");
    assert_eq!(search.adults(), 1);
}

#[test]
fn invalid_searches_are_rejected() {
    let cases = [
        SearchConfig::new("", "BGY", "2024-08-22", "2024-09-04", 1, "GBP"),
        SearchConfig::new("STN", "BGY", " ", "2024-09-04", 1, "GBP"),
        SearchConfig::new("STN", "BGY", "2024-08-22", "", 1, "GBP"),
        SearchConfig::new("STN", "BGY", "2024-08-22", "2024-09-04", 1, ""),
        SearchConfig::new("STN", "BGY", "2024-08-22", "2024-09-04", 0, "GBP"),
    ];
    for case in cases {
        assert!(matches!(case, Err(Error::InvalidConfig(_))));
    }
}

#[test]
fn search_url_pins_a_round_trip_without_flex_days() {
    let search = SearchConfig::new("STN", "BGY", "2024-08-22", "2024-09-04", 2, "EUR")
        .expect("valid search");
    let url = search.search_url().expect("url");

    assert!(url.as_str().starts_with(SEARCH_BASE_URL));
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let value = |key: &str| {
        pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    };

    assert_eq!(value("originIata"), Some("STN"));
    assert_eq!(value("destinationIata"), Some("BGY"));
    assert_eq!(value("dateOut"), Some("2024-08-22"));
    assert_eq!(value("dateIn"), Some("2024-09-04"));
    assert_eq!(value("adults"), Some("2"));
    assert_eq!(value("teens"), Some("0"));
    assert_eq!(value("roundTrip"), Some("true"));
    assert_eq!(value("flexdaysOut"), Some("0"));
    assert_eq!(value("promoCode"), Some(""));
    assert_eq!(value("currency"), Some("EUR"));
}
