//! Integration tests: viewport scale → placement store → submission, and the
//! signature cache's validation on load.

use pretty_assertions::assert_eq;
use sigpad_core::{
    ImageRef, KeyValueStorage, MemoryStorage, PlacementStore, SignError, SignatureCache,
    SigningConfig, Size, ViewportTracker, build_submission,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ─── Viewport ───────────────────────────────────────────────────────────

#[test]
fn scale_tracks_container_and_page() {
    init_logging();
    let mut viewport = ViewportTracker::new();
    viewport.set_container_width(800.0);
    viewport.set_page_natural_size(Size::new(400.0, 500.0));

    let m = viewport.require().unwrap();
    assert_eq!(m.scale, 2.0);
    assert_eq!(m.render_size.width / m.page_natural_size.width, m.scale);

    viewport.reset_page();
    assert_eq!(viewport.require(), Err(SignError::ViewportNotReady));
}

#[test]
fn placement_added_at_page_center_is_submitted_unflipped() {
    init_logging();
    let config = SigningConfig::default();
    let mut viewport = ViewportTracker::new();
    viewport.set_page_natural_size(Size::new(612.0, 792.0));
    viewport.set_container_width(918.0);
    let m = viewport.require().unwrap();

    let mut store = PlacementStore::new(config.default_width);
    store
        .add(ImageRef::new("data:sig"), 600.0, 200.0, m.page_natural_size)
        .unwrap();

    let records = build_submission(&store).unwrap();
    assert_eq!(records.len(), 1);
    let r = &records[0];
    assert_eq!(r.page_number, 1);
    assert_eq!((r.width, r.height), (150.0, 50.0));
    assert_eq!((r.x, r.y), (231.0, 371.0));
}

// ─── Signature cache ────────────────────────────────────────────────────

#[test]
fn cache_with_zero_width_is_unusable_and_cleared() {
    init_logging();
    let config = SigningConfig::default();
    let mut storage = MemoryStorage::new();
    storage
        .set(
            &config.cache_key,
            r#"{"image":"data:image/png;base64,AAAA","width":0,"height":80}"#,
        )
        .unwrap();

    let mut cache = SignatureCache::new(storage, config.cache_key.clone());
    assert!(cache.load().is_none());
    assert_eq!(cache.storage().get(&config.cache_key), None);
}

#[test]
fn cache_with_negative_height_is_cleared() {
    init_logging();
    let mut cache = SignatureCache::new(MemoryStorage::new(), "k");
    cache.save(&ImageRef::new("data:a"), 120.0, -4.0);
    assert!(cache.load().is_none());
    assert!(cache.load().is_none());
}

#[test]
fn cache_round_trip_feeds_store() {
    init_logging();
    let mut cache = SignatureCache::new(MemoryStorage::new(), "k");
    cache.save(&ImageRef::new("data:a"), 480.0, 160.0);
    let cached = cache.load().unwrap();

    let mut store = PlacementStore::default();
    let p = store
        .add(cached.image, cached.width, cached.height, Size::new(612.0, 792.0))
        .unwrap();
    assert!((p.aspect() - 3.0).abs() < 1e-12);
}
