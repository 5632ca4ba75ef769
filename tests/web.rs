// Browser-only checks, run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use portfolio_arcade::KeyValueStore;
use portfolio_arcade::storage::BrowserStorage;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn browser_storage_round_trip() {
    let mut store = BrowserStorage::open().expect("local storage");
    store.set("pa-test", "[]").unwrap();
    assert_eq!(store.get("pa-test").unwrap().as_deref(), Some("[]"));
    store.remove("pa-test").unwrap();
    assert_eq!(store.get("pa-test").unwrap(), None);
}

#[wasm_bindgen_test]
fn rankings_json_is_an_array() {
    let json = portfolio_arcade::arcade::weekly_rankings_json().unwrap();
    assert!(json.starts_with('['));
}
