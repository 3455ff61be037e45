use driftfield::headless::{run_headless, HeadlessConfig};
use driftfield::{FieldConfig, Viewport};

#[test]
fn wide_viewport_links_more_than_narrow() {
    // Thresholds far apart so the outcome does not depend on the seed.
    let field = FieldConfig {
        particle_count: 120,
        link_threshold: 0.5,
        wide_link_threshold: 8.0,
        ..Default::default()
    };

    let narrow = run_headless(
        &field,
        &HeadlessConfig {
            frames: 30,
            viewport: Viewport::new(1280, 800, 1.0),
            progress_interval: 1_000,
        },
    )
    .unwrap();
    let wide = run_headless(
        &field,
        &HeadlessConfig {
            frames: 30,
            viewport: Viewport::new(2560, 1440, 1.0),
            progress_interval: 1_000,
        },
    )
    .unwrap();

    assert_eq!(narrow.frames, 30);
    assert_eq!(wide.frames, 30);
    assert!(wide.mean_edges > narrow.mean_edges);
}

#[test]
fn invalid_field_is_rejected() {
    let field = FieldConfig {
        particle_count: 0,
        ..Default::default()
    };
    assert!(run_headless(&field, &HeadlessConfig::default()).is_err());
}
