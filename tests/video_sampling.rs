// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video transport through the dataset and frame sampling.

use image::{Rgb, RgbImage};
use loids::{Config, Dataset, Error, FrameDecoder, Result, SampleOutcome};
use tempfile::TempDir;

/// Synthetic decoder: frame n is a solid image with red channel n.
struct FakeDecoder {
    frames: i64,
}

impl FrameDecoder for FakeDecoder {
    fn frame_count(&self) -> i64 {
        self.frames
    }

    fn fps(&self) -> f64 {
        30.0
    }

    fn decode(&mut self, index: i64) -> Result<RgbImage> {
        if index < 0 || index >= self.frames {
            return Err(Error::Video(format!("frame {index} out of range")));
        }
        Ok(RgbImage::from_pixel(16, 16, Rgb([index as u8, 40, 80])))
    }
}

/// Dataset layout with one image, one key, and one (placeholder) video
/// file; decoding goes through the injected fake decoder.
fn scratch_dataset() -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for sub in ["imgs", "annotations", "masks", "keys", "videos"] {
        std::fs::create_dir(dir.path().join(sub)).unwrap();
    }
    RgbImage::from_pixel(16, 16, Rgb([90, 90, 90]))
        .save(dir.path().join("imgs/still.png"))
        .unwrap();
    RgbImage::from_pixel(8, 8, Rgb([200, 10, 10]))
        .save(dir.path().join("keys/cat.png"))
        .unwrap();
    std::fs::write(dir.path().join("videos/clip.mp4"), b"").unwrap();
    dir
}

fn open_clip(dataset: &mut Dataset, frames: i64) {
    dataset
        .open_video_with("clip", Box::new(FakeDecoder { frames }))
        .unwrap();
}

#[test]
fn test_videos_are_enumerated_from_optional_folder() {
    let dir = scratch_dataset();
    let dataset = Dataset::load(dir.path(), Config::default()).unwrap();
    assert_eq!(dataset.video_names(), ["clip"]);
    assert!(!dataset.is_video_open("clip").unwrap());
    assert_eq!(dataset.video_length("clip").unwrap(), -1);
}

#[test]
fn test_unknown_video_name_is_an_error() {
    let dir = scratch_dataset();
    let mut dataset = Dataset::load(dir.path(), Config::default()).unwrap();
    assert!(matches!(
        dataset.open_video("nope"),
        Err(Error::NotFound { .. })
    ));
    assert!(matches!(
        dataset.video_goto("nope", 0),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn test_transport_moves_and_bounds_check() {
    let dir = scratch_dataset();
    let mut dataset = Dataset::load(dir.path(), Config::default()).unwrap();
    open_clip(&mut dataset, 10);

    assert!(dataset.is_video_open("clip").unwrap());
    assert_eq!(dataset.video_length("clip").unwrap(), 10);
    assert_eq!(dataset.current_video_frame("clip").unwrap(), 0);

    let frame = dataset.video_goto("clip", 4).unwrap().unwrap();
    assert_eq!(frame.get_pixel(0, 0).0[0], 4);
    assert_eq!(dataset.current_video_frame("clip").unwrap(), 4);

    assert!(dataset.video_next("clip", 2).unwrap().is_some());
    assert!(dataset.video_prev("clip", 6).unwrap().is_some());
    assert_eq!(dataset.current_video_frame("clip").unwrap(), 0);

    // Out-of-range seeks are not-ok results and leave the counter alone.
    assert!(dataset.video_goto("clip", 10).unwrap().is_none());
    assert!(dataset.video_goto("clip", -1).unwrap().is_none());
    assert!(dataset.video_prev("clip", 1).unwrap().is_none());
    assert_eq!(dataset.current_video_frame("clip").unwrap(), 0);

    dataset.close_video("clip").unwrap();
    assert!(!dataset.is_video_open("clip").unwrap());
    assert!(dataset.video_current("clip").unwrap().is_none());
}

#[test]
fn test_sample_frame_registers_a_new_item() {
    let dir = scratch_dataset();
    let mut dataset = Dataset::load(dir.path(), Config::default()).unwrap();
    open_clip(&mut dataset, 10);
    dataset.video_goto("clip", 3).unwrap();

    let outcome = dataset.sample_frame("clip", false).unwrap();
    assert_eq!(
        outcome,
        SampleOutcome::Sampled {
            name: "clip_3".to_string(),
            item_id: 1,
        }
    );

    // Sampling does not advance the cursor.
    assert_eq!(dataset.current_video_frame("clip").unwrap(), 3);

    // The frame landed in imgs/ and is a real, openable item.
    assert!(dir.path().join("imgs/clip_3.jpg").exists());
    assert_eq!(dataset.item_names(), ["still", "clip_3"]);
    dataset.change_item("clip_3", false).unwrap();
    assert!(dataset.current_image().is_ok());
}

#[test]
fn test_sample_frame_conflict_needs_confirmation() {
    let dir = scratch_dataset();
    let mut dataset = Dataset::load(dir.path(), Config::default()).unwrap();
    open_clip(&mut dataset, 10);

    let first = dataset.sample_frame("clip", false).unwrap();
    let SampleOutcome::Sampled { item_id, .. } = first else {
        panic!("expected a sampled outcome");
    };

    // Same frame again: not performed, existing identity reported.
    let second = dataset.sample_frame("clip", false).unwrap();
    assert_eq!(
        second,
        SampleOutcome::AlreadyExists {
            name: "clip_0".to_string(),
            item_id,
        }
    );

    // The caller confirmed: overwrite in place, id is kept.
    let third = dataset.sample_frame("clip", true).unwrap();
    assert_eq!(
        third,
        SampleOutcome::Sampled {
            name: "clip_0".to_string(),
            item_id,
        }
    );
    assert_eq!(dataset.item_names().len(), 2);
}

#[test]
fn test_sample_frame_requires_an_open_video() {
    let dir = scratch_dataset();
    let mut dataset = Dataset::load(dir.path(), Config::default()).unwrap();
    assert!(matches!(
        dataset.sample_frame("clip", false),
        Err(Error::Video(_))
    ));
}

#[test]
fn test_open_without_decode_backend_reports_not_ok() {
    #[cfg(not(feature = "video-opencv"))]
    {
        let dir = scratch_dataset();
        let mut dataset = Dataset::load(dir.path(), Config::default()).unwrap();
        assert!(!dataset.open_video("clip").unwrap());
        assert!(!dataset.is_video_open("clip").unwrap());
    }
}
