// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use depth_capture::constants::{COLOR_IMAGE_SUFFIX, DEPTH_IMAGE_SUFFIX, METADATA_SUFFIX};
use depth_capture::pipelines::capture::ArtifactKind;

#[test]
fn test_artifact_suffixes() {
    // The file naming contract export tooling depends on
    assert_eq!(COLOR_IMAGE_SUFFIX, "_colorImage.jpg");
    assert_eq!(DEPTH_IMAGE_SUFFIX, "_depthImage.png");
    assert_eq!(METADATA_SUFFIX, "_metadata.json");
}

#[test]
fn test_artifact_kinds_use_suffixes_in_write_order() {
    let suffixes: Vec<&str> = ArtifactKind::ALL.iter().map(|k| k.suffix()).collect();
    assert_eq!(
        suffixes,
        vec![COLOR_IMAGE_SUFFIX, DEPTH_IMAGE_SUFFIX, METADATA_SUFFIX]
    );
}

#[test]
fn test_suffixes_are_distinct() {
    for (i, a) in ArtifactKind::ALL.iter().enumerate() {
        for b in &ArtifactKind::ALL[i + 1..] {
            let (a, b) = (a.suffix(), b.suffix());
            assert!(!a.ends_with(b) && !b.ends_with(a), "{} overlaps {}", a, b);
        }
    }
}
