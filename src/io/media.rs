// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading (images and videos).
//!
//! This module handles image decode/encode, media directory enumeration,
//! and the frame decoder backend behind the video cursor. Video decoding is
//! optional: the OpenCV-backed decoder only exists under the
//! `video-opencv` feature, and without it `open_decoder` reports a video
//! error instead.

use crate::error::{Error, Result};
use crate::models::video::FrameDecoder;
use image::RgbImage;
use std::path::Path;

/// Raster formats the dataset enumerates (case-insensitive extension match).
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "BMP", "GIF", "JPG", "JPEG", "PNG", "PBM", "PGM", "PPM", "TIFF", "XBM",
];

/// Video container formats the dataset enumerates.
pub const VIDEO_EXTENSIONS: &[&str] = &["MP4", "MOV"];

/// Case-insensitive extension match against one of the format lists.
pub fn has_extension(file_name: &str, extensions: &[&str]) -> bool {
    let upper = file_name.to_uppercase();
    extensions.iter().any(|ext| upper.ends_with(&format!(".{ext}")))
}

/// File names in `dir` matching `extensions`, sorted by name.
pub fn list_media_files(dir: &Path, extensions: &[&str]) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if has_extension(&name, extensions) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Load an image file into an RGB pixel buffer.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    Ok(image::open(path)?.to_rgb8())
}

/// Write a decoded frame out as an image file (format from the extension).
pub fn write_frame(path: &Path, frame: &RgbImage) -> Result<()> {
    frame.save(path)?;
    Ok(())
}

/// Open the configured decoder backend for a video file.
#[cfg(feature = "video-opencv")]
pub fn open_decoder(path: &Path) -> Result<Box<dyn FrameDecoder>> {
    Ok(Box::new(opencv_backend::OpencvDecoder::open(path)?))
}

/// Open the configured decoder backend for a video file.
///
/// Built without a video feature, this always fails; the video cursor
/// stays closed and reports the error to the caller.
#[cfg(not(feature = "video-opencv"))]
pub fn open_decoder(path: &Path) -> Result<Box<dyn FrameDecoder>> {
    Err(Error::Video(format!(
        "built without video decode support, cannot open {}",
        path.display()
    )))
}

#[cfg(feature = "video-opencv")]
mod opencv_backend {
    use super::*;
    use opencv::prelude::*;
    use opencv::{core, imgproc, videoio};

    /// OpenCV `VideoCapture` wrapper decoding frames to RGB.
    pub struct OpencvDecoder {
        capture: videoio::VideoCapture,
        frame_count: i64,
        fps: f64,
    }

    impl OpencvDecoder {
        pub fn open(path: &Path) -> Result<Self> {
            let path_str = path.to_string_lossy();
            let capture = videoio::VideoCapture::from_file(&path_str, videoio::CAP_ANY)
                .map_err(video_error)?;
            if !capture.is_opened().map_err(video_error)? {
                return Err(Error::Video(format!(
                    "cannot open video stream or file: {}",
                    path.display()
                )));
            }

            let frame_count = capture
                .get(videoio::CAP_PROP_FRAME_COUNT)
                .map_err(video_error)? as i64;
            let fps = capture.get(videoio::CAP_PROP_FPS).map_err(video_error)?;

            Ok(Self {
                capture,
                frame_count,
                fps,
            })
        }
    }

    impl FrameDecoder for OpencvDecoder {
        fn frame_count(&self) -> i64 {
            self.frame_count
        }

        fn fps(&self) -> f64 {
            self.fps
        }

        fn decode(&mut self, index: i64) -> Result<RgbImage> {
            self.capture
                .set(videoio::CAP_PROP_POS_FRAMES, index as f64)
                .map_err(video_error)?;

            let mut bgr = core::Mat::default();
            if !self.capture.read(&mut bgr).map_err(video_error)? {
                return Err(Error::Video(format!("failed to decode frame {index}")));
            }

            let mut rgb = core::Mat::default();
            imgproc::cvt_color(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0).map_err(video_error)?;

            let width = rgb.cols() as u32;
            let height = rgb.rows() as u32;
            let data = rgb.data_bytes().map_err(video_error)?.to_vec();
            RgbImage::from_raw(width, height, data)
                .ok_or_else(|| Error::Video(format!("frame {index} has unexpected layout")))
        }
    }

    fn video_error(e: opencv::Error) -> Error {
        Error::Video(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_match_is_case_insensitive() {
        assert!(has_extension("frame.png", IMAGE_EXTENSIONS));
        assert!(has_extension("FRAME.JPG", IMAGE_EXTENSIONS));
        assert!(has_extension("clip.mp4", VIDEO_EXTENSIONS));
        assert!(!has_extension("notes.txt", IMAGE_EXTENSIONS));
        assert!(!has_extension("png", IMAGE_EXTENSIONS));
    }

    #[test]
    fn test_list_media_files_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.jpg", "skip.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let names = list_media_files(dir.path(), IMAGE_EXTENSIONS).unwrap();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
    }
}
