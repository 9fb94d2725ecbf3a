#![allow(dead_code)]

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

use voc2yolo::geometry::{ImageSize, VocBox};
use voc2yolo::vocab::VOC_CLASSES;

/// Slack for "normalized value lies in [0, 1]" checks.
pub const EPS_UNIT: f64 = 1e-12;

/// Pixel tolerance when scaling a normalized box back to the image.
pub fn eps_pixels(size: ImageSize) -> f64 {
    size.width.max(size.height) as f64 * 1e-9
}

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_image_size() -> impl Strategy<Value = ImageSize> {
    (1u32..=4096, 1u32..=4096).prop_map(|(w, h)| ImageSize::new(w, h))
}

/// A well-formed box lying inside `size`.
pub fn arb_box_within(size: ImageSize) -> impl Strategy<Value = VocBox> {
    let w = size.width as f64;
    let h = size.height as f64;
    (0.0..=w, 0.0..=w, 0.0..=h, 0.0..=h).prop_map(|(x1, x2, y1, y2)| {
        VocBox::new(x1.min(x2), x1.max(x2), y1.min(y2), y1.max(y2))
    })
}

pub fn arb_sized_box() -> impl Strategy<Value = (ImageSize, VocBox)> {
    arb_image_size().prop_flat_map(|size| (Just(size), arb_box_within(size)))
}

/// A generated VOC object: label, difficult flag, pixel box.
#[derive(Clone, Debug)]
pub struct GenObject {
    pub name: String,
    pub difficult: Option<u8>,
    pub bbox: VocBox,
}

fn arb_label() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::sample::select(VOC_CLASSES.to_vec()).prop_map(str::to_owned),
        1 => prop::sample::select(vec!["unicorn", "lamp", "Person", "tv"]).prop_map(str::to_owned),
    ]
}

pub fn arb_objects(size: ImageSize, max: usize) -> impl Strategy<Value = Vec<GenObject>> {
    prop::collection::vec(
        (
            arb_label(),
            prop_oneof![Just(None), Just(Some(0u8)), Just(Some(1u8))],
            arb_box_within(size),
        )
            .prop_map(|(name, difficult, bbox)| GenObject {
                name,
                difficult,
                bbox,
            }),
        0..=max,
    )
}

pub fn arb_annotation(max_objects: usize) -> impl Strategy<Value = (ImageSize, Vec<GenObject>)> {
    arb_image_size().prop_flat_map(move |size| (Just(size), arb_objects(size, max_objects)))
}
