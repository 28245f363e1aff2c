#![cfg(target_arch = "wasm32")]

use summit_web::dom;
use summit_web::engine::{EngagementStorage, Snapshot};
use summit_web::{WebStorage, open_web_context};
use wasm_bindgen_test::*;

wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

const KEY: &str = "summit.engagement";

fn clear_storage() {
    dom::local_storage()
        .expect("localStorage")
        .remove_item(KEY)
        .expect("remove key");
}

#[wasm_bindgen_test]
fn web_storage_round_trips_snapshots() {
    clear_storage();
    let storage = WebStorage;
    assert_eq!(storage.load_snapshot(KEY).unwrap(), None);

    let snapshot = Snapshot {
        total_points: 5,
        ..Snapshot::default()
    };
    storage.save_snapshot(KEY, &snapshot).unwrap();
    let raw = storage.load_snapshot(KEY).unwrap().expect("stored value");
    assert_eq!(Snapshot::parse_or_default(Some(&raw)), snapshot);

    storage.delete_snapshot(KEY).unwrap();
    assert_eq!(storage.load_snapshot(KEY).unwrap(), None);
}

#[wasm_bindgen_test]
fn malformed_local_storage_starts_fresh() {
    dom::local_storage()
        .expect("localStorage")
        .set_item(KEY, "{not json")
        .expect("seed garbage");
    let ctx = open_web_context();
    assert_eq!(ctx.progress().total_points, 0);
    assert_eq!(ctx.progress().level, 1);
    clear_storage();
}

#[wasm_bindgen_test]
fn awards_reach_local_storage() {
    clear_storage();
    let ctx = open_web_context();
    ctx.award("page_load", Some(5));
    ctx.award("weather_check", Some(20));
    assert_eq!(ctx.progress().total_points, 25 + 5 + 10);

    let reopened = open_web_context();
    assert_eq!(reopened.progress(), ctx.progress());
    clear_storage();
}
