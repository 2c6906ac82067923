use rank_collector::core::extractor::{ListingExtractor, Strategy};
use rank_collector::core::identifier::DEFAULT_MARKETPLACE_DOMAIN;
use rank_collector::core::matcher::{count_hits, find_rank};
use rank_collector::Listing;
use std::path::Path;

fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(path).unwrap()
}

fn extract_fixture(name: &str) -> Vec<Listing> {
    let extractor = ListingExtractor::new(DEFAULT_MARKETPLACE_DOMAIN).unwrap();
    extractor.extract(&load_fixture(name))
}

/// __INITIAL_STATE__ 主策略
#[test]
fn test_initial_state_parse() {
    let listings = extract_fixture("search_initial_state.html");

    assert_eq!(listings.len(), 5);
    assert_eq!(listings[0].position, 1);
    assert_eq!(listings[0].shop_code, "aikanhonpo");
    assert_eq!(listings[0].product_code, "1355740");
    assert_eq!(listings[0].display_name, "ノニジュース 900ml オーガニック");
}

#[test]
fn test_initial_state_positions_follow_document_order() {
    let listings = extract_fixture("search_initial_state.html");

    let positions: Vec<u32> = listings.iter().map(|l| l.position).collect();
    assert_eq!(positions, vec![1, 2, 3, 4, 5]);

    let shops: Vec<&str> = listings.iter().map(|l| l.shop_code.as_str()).collect();
    assert_eq!(
        shops,
        vec!["aikanhonpo", "hyperlink", "ichiban-okinawa", "hands-web", "supplement-shop"]
    );
}

#[test]
fn test_initial_state_wins_over_json_ld() {
    let listings = extract_fixture("search_initial_state.html");
    assert!(listings.iter().all(|l| l.shop_code != "ld-only-shop"));
}

#[test]
fn test_identifiers_from_varied_url_shapes() {
    let listings = extract_fixture("search_initial_state.html");

    // 無 shop.urlCode 且 URL 帶 query
    assert_eq!(listings[1].product_code, "noni-1000");
    // url 為空時改用 originalItemUrl
    assert_eq!(listings[2].product_code, "noni-jyuce3");
    // 無結尾斜線
    assert_eq!(listings[3].product_code, "4901234567890");
}

/// JSON-LD 備援
#[test]
fn test_json_ld_fallback() {
    let html = load_fixture("search_json_ld.html");
    let extractor = ListingExtractor::new(DEFAULT_MARKETPLACE_DOMAIN).unwrap();
    assert_eq!(extractor.run(Strategy::InitialState, &html), None);

    let listings = extractor.extract(&html);
    let got: Vec<(u32, &str)> = listings
        .iter()
        .map(|l| (l.position, l.shop_code.as_str()))
        .collect();
    assert_eq!(
        got,
        vec![(1, "aikanhonpo"), (2, "ichiban-okinawa"), (3, "hyperlink")]
    );
}

#[test]
fn test_malformed_state_falls_back_without_panicking() {
    let listings = extract_fixture("search_malformed_state.html");

    let got: Vec<(u32, &str)> = listings
        .iter()
        .map(|l| (l.position, l.shop_code.as_str()))
        .collect();
    assert_eq!(got, vec![(1, "hyperlink"), (3, "aikanhonpo")]);
}

#[test]
fn test_empty_html() {
    let extractor = ListingExtractor::new(DEFAULT_MARKETPLACE_DOMAIN).unwrap();
    assert!(extractor.extract("<html><body></body></html>").is_empty());
}

#[test]
fn test_find_product_rank() {
    let listings = extract_fixture("search_initial_state.html");

    assert_eq!(find_rank(&listings, "ichiban-okinawa", "noni-jyuce3"), Some(3));
    assert_eq!(find_rank(&listings, "aikanhonpo", "1355740"), Some(1));
    assert_eq!(find_rank(&listings, "nonexistent-shop", "no-product"), None);
}

#[test]
fn test_rank_points_at_matching_listing() {
    let listings = extract_fixture("search_initial_state.html");

    for listing in &listings {
        let rank = find_rank(&listings, &listing.shop_code, &listing.product_code).unwrap();
        let hit = listings.iter().find(|l| l.position == rank).unwrap();
        assert_eq!(hit.shop_code, listing.shop_code);
        assert_eq!(hit.product_code, listing.product_code);
    }
}

#[test]
fn test_count_shop_hits() {
    let listings = extract_fixture("search_initial_state.html");

    assert_eq!(count_hits(&listings, "ichiban-okinawa"), 1);
    assert_eq!(count_hits(&listings, "nonexistent-shop"), 0);
}

#[test]
fn test_no_listings_means_unranked_everywhere() {
    let listings = extract_fixture("search_malformed_state.html");
    let empty: Vec<Listing> = Vec::new();

    assert_eq!(find_rank(&empty, "hyperlink", "noni-1000"), None);
    assert_eq!(count_hits(&empty, "hyperlink"), 0);
    assert_eq!(find_rank(&listings, "hyperlink", "noni-1000"), Some(1));
}
