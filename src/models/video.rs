// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video frame cursor.
//!
//! A `Video` owns a decode handle and a frame counter and moves through a
//! container file by absolute or relative seeks. Transport operations
//! return `None` instead of erroring when a seek would leave
//! `[0, num_frames)` or when the cursor is closed; the counter never moves
//! on a failed seek.

use crate::error::Result;
use crate::io::media;
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Decode backend behind the cursor.
///
/// The production implementation wraps OpenCV (feature `video-opencv`);
/// tests inject synthetic decoders.
pub trait FrameDecoder {
    /// Total number of frames in the container.
    fn frame_count(&self) -> i64;

    /// Container frame rate.
    fn fps(&self) -> f64;

    /// Decode exactly the frame at `index` as RGB.
    fn decode(&mut self, index: i64) -> Result<RgbImage>;
}

/// Sentinel for the closed state.
const CLOSED: i64 = -1;

/// A decode cursor over one video file.
pub struct Video {
    path: PathBuf,
    counter: i64,
    num_frames: i64,
    fps: f64,
    decoder: Option<Box<dyn FrameDecoder>>,
}

impl std::fmt::Debug for Video {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Video")
            .field("path", &self.path)
            .field("counter", &self.counter)
            .field("num_frames", &self.num_frames)
            .field("fps", &self.fps)
            .field("decoder", &self.decoder.as_ref().map(|_| "<decoder>"))
            .finish()
    }
}

impl Video {
    /// Create a closed cursor; no decode handle is acquired until `open`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            counter: CLOSED,
            num_frames: CLOSED,
            fps: -1.0,
            decoder: None,
        }
    }

    /// Open the default decoder backend. Returns `false` (and stays
    /// closed) when the media cannot be decoded.
    pub fn open(&mut self) -> bool {
        match media::open_decoder(&self.path) {
            Ok(decoder) => {
                self.attach(decoder);
                true
            }
            Err(e) => {
                log::error!("Error opening video stream or file: {e}");
                false
            }
        }
    }

    /// Open with an explicit decoder backend.
    pub fn open_with(&mut self, decoder: Box<dyn FrameDecoder>) {
        self.attach(decoder);
    }

    fn attach(&mut self, decoder: Box<dyn FrameDecoder>) {
        self.num_frames = decoder.frame_count();
        self.fps = decoder.fps();
        self.counter = 0;
        self.decoder = Some(decoder);
        log::info!(
            "Opened video {} ({} frames @ {} fps)",
            self.path.display(),
            self.num_frames,
            self.fps
        );
    }

    /// Release the decode handle and restore the closed sentinels.
    pub fn close(&mut self) {
        self.decoder = None;
        self.counter = CLOSED;
        self.num_frames = CLOSED;
        self.fps = -1.0;
    }

    pub fn is_open(&self) -> bool {
        self.decoder.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total frame count; `-1` while closed.
    pub fn num_frames(&self) -> i64 {
        self.num_frames
    }

    /// Container frame rate; `-1` while closed.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Current frame index; `-1` while closed.
    pub fn current_frame(&self) -> i64 {
        self.counter
    }

    /// Decode the frame at the current counter without moving it.
    pub fn read_current(&mut self) -> Option<RgbImage> {
        let counter = self.counter;
        let decoder = self.decoder.as_mut()?;
        match decoder.decode(counter) {
            Ok(frame) => Some(frame),
            Err(e) => {
                log::error!("Failed to decode frame {counter}: {e}");
                None
            }
        }
    }

    /// Seek to an absolute frame index and decode it.
    pub fn goto(&mut self, frame: i64) -> Option<RgbImage> {
        if !self.is_open() || frame < 0 || frame >= self.num_frames {
            log::error!(
                "Frame number should be greater than 0 and less than {}",
                self.num_frames
            );
            return None;
        }
        self.counter = frame;
        self.read_current()
    }

    /// Advance the counter by `jump` frames and decode.
    pub fn read_next(&mut self, jump: i64) -> Option<RgbImage> {
        if !self.is_open() || self.counter + jump >= self.num_frames {
            log::error!("No more frames with current jump {jump}");
            return None;
        }
        self.counter += jump;
        self.read_current()
    }

    /// Step the counter back by `jump` frames and decode.
    pub fn read_prev(&mut self, jump: i64) -> Option<RgbImage> {
        if !self.is_open() || self.counter - jump < 0 {
            log::error!("No more frames with current jump {jump}");
            return None;
        }
        self.counter -= jump;
        self.read_current()
    }
}
