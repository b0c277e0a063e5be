// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Dataset lifecycle and orchestration.
//!
//! A `Dataset` owns the items, keys, and videos enumerated from a dataset
//! folder, plus the single current-item focus. Switching items is a
//! save-then-close-then-open transaction, so at most one item holds live
//! buffers at any instant. Most operations forward to the current item or
//! to a named video.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::io::media;
use crate::models::annotation::{Point, ShapeType};
use crate::models::item::DatasetItem;
use crate::models::key::Key;
use crate::models::video::{FrameDecoder, Video};
use image::RgbImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Outcome of an item switch, reporting what happened to the previous
/// current item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchReport {
    pub previous: Option<String>,
    pub saved_previous: bool,
}

/// Outcome of sampling a video frame into the dataset.
///
/// `AlreadyExists` is the not-performed signal: an item of that name is
/// already registered and the caller did not allow overwriting. Confirming
/// with the user and retrying with `overwrite` set is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleOutcome {
    Sampled { name: String, item_id: usize },
    AlreadyExists { name: String, item_id: usize },
}

#[derive(Debug)]
pub struct Dataset {
    path: PathBuf,
    items: HashMap<String, DatasetItem>,
    item_names: Vec<String>,
    keys: HashMap<String, Key>,
    key_names: Vec<String>,
    videos: HashMap<String, Video>,
    video_names: Vec<String>,
    current: Option<String>,
    config: Config,
}

impl Dataset {
    /// Validate the dataset folder layout and enumerate its contents.
    ///
    /// `imgs/`, `annotations/`, `masks/`, and `keys/` must exist and at
    /// least one key image must be present. An image-less dataset is fine
    /// (video-only workflows start empty). `videos/` is optional. Nothing
    /// is opened here; items load lazily on first switch.
    pub fn load(path: &Path, config: Config) -> Result<Self> {
        let imgs_path = path.join("imgs");
        let annotations_path = path.join("annotations");
        let masks_path = path.join("masks");
        let keys_path = path.join("keys");
        let videos_path = path.join("videos");

        if !imgs_path.is_dir()
            || !annotations_path.is_dir()
            || !masks_path.is_dir()
            || !keys_path.is_dir()
        {
            return Err(Error::Validation(
                "Dataset folder must contain four folders: imgs, annotations, masks, and keys"
                    .to_string(),
            ));
        }

        let img_files = media::list_media_files(&imgs_path, media::IMAGE_EXTENSIONS)?;
        let key_files = media::list_media_files(&keys_path, media::IMAGE_EXTENSIONS)?;
        if key_files.is_empty() {
            return Err(Error::Validation(
                "The dataset doesn't contain any key".to_string(),
            ));
        }
        let video_files = if videos_path.is_dir() {
            media::list_media_files(&videos_path, media::VIDEO_EXTENSIONS)?
        } else {
            Vec::new()
        };

        let mut items = HashMap::new();
        let mut item_names = Vec::new();
        for (id, file) in img_files.iter().enumerate() {
            let name = base_name(file);
            items.insert(name.clone(), DatasetItem::create(path, &name, file, id));
            item_names.push(name);
        }

        let mut keys = HashMap::new();
        let mut key_names = Vec::new();
        for file in &key_files {
            let name = base_name(file);
            keys.insert(name.clone(), Key::create(path, &name, file));
            key_names.push(name);
        }

        let mut videos = HashMap::new();
        let mut video_names = Vec::new();
        for file in &video_files {
            let name = base_name(file);
            videos.insert(name.clone(), Video::new(videos_path.join(file)));
            video_names.push(name);
        }

        log::info!(
            "Loaded dataset {} ({} items, {} keys, {} videos)",
            path.display(),
            item_names.len(),
            key_names.len(),
            video_names.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            items,
            item_names,
            keys,
            key_names,
            videos,
            video_names,
            current: None,
            config,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn item_names(&self) -> &[String] {
        &self.item_names
    }

    pub fn key_names(&self) -> &[String] {
        &self.key_names
    }

    pub fn video_names(&self) -> &[String] {
        &self.video_names
    }

    pub fn current_item_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Switch the current-item focus: save the previous item (when asked),
    /// close it, open the new one. The returned report names the previous
    /// item and whether it was saved.
    pub fn change_item(&mut self, name: &str, save: bool) -> Result<SwitchReport> {
        if !self.items.contains_key(name) {
            return Err(Error::not_found("item", name));
        }

        let previous = self.current.take();
        let mut saved_previous = false;
        if let Some(prev_name) = &previous {
            if let Some(prev) = self.items.get_mut(prev_name) {
                if save {
                    prev.save(self.config.bounding_box_on_save)?;
                    saved_previous = true;
                }
                prev.close();
            }
        }

        self.items
            .get_mut(name)
            .ok_or_else(|| Error::not_found("item", name))?
            .open(&self.config)?;
        self.current = Some(name.to_string());

        Ok(SwitchReport {
            previous,
            saved_previous,
        })
    }

    /// Read the named video's current frame (without advancing) and
    /// register it as a brand-new dataset item `{video}_{frame}`.
    pub fn sample_frame(&mut self, video_id: &str, overwrite: bool) -> Result<SampleOutcome> {
        let video = self
            .videos
            .get_mut(video_id)
            .ok_or_else(|| Error::not_found("video", video_id))?;
        if !video.is_open() {
            return Err(Error::Video(format!("video {video_id} is not open")));
        }

        let name = format!("{video_id}_{}", video.current_frame());
        if let Some(existing) = self.items.get(&name) {
            if !overwrite {
                return Ok(SampleOutcome::AlreadyExists {
                    item_id: existing.id(),
                    name,
                });
            }
        }

        let frame = video
            .read_current()
            .ok_or_else(|| Error::Video(format!("failed to decode frame of {video_id}")))?;

        let file_name = format!("{name}.jpg");
        media::write_frame(&self.path.join("imgs").join(&file_name), &frame)?;

        let item_id = match self.items.get(&name) {
            Some(existing) => existing.id(),
            None => {
                self.item_names.push(name.clone());
                self.item_names.len() - 1
            }
        };
        self.items.insert(
            name.clone(),
            DatasetItem::create(&self.path, &name, &file_name, item_id),
        );
        log::info!("Sampled frame into new item {name}");

        Ok(SampleOutcome::Sampled { name, item_id })
    }

    // --- forwarding to the current item ---

    pub fn current_image(&self) -> Result<RgbImage> {
        self.current_item()?.composite_image()
    }

    pub fn current_mask_image(&self) -> Result<RgbImage> {
        self.current_item()?.mask_image()
    }

    pub fn current_bounding_box_image(&self) -> Result<RgbImage> {
        self.current_item()?.bounding_box_image()
    }

    pub fn add_shape(
        &mut self,
        label: &str,
        shape_type: ShapeType,
        points: Vec<Point>,
        object_id: &str,
    ) -> Result<()> {
        self.current_item_mut()?
            .add_shape(label, shape_type, points, object_id)
    }

    pub fn create_object(&mut self, label: &str) -> Result<String> {
        self.current_item_mut()?.create_object(label)
    }

    pub fn delete_contour(&mut self, object_id: &str, position: usize) -> Result<()> {
        self.current_item_mut()?.delete_contour(object_id, position)
    }

    pub fn highlight_contour(&mut self, object_id: &str, position: usize) -> Result<()> {
        self.current_item_mut()?
            .highlight_contour(object_id, position)
    }

    pub fn contour_bounding_box(
        &self,
        object_id: &str,
        position: usize,
    ) -> Result<(i32, i32, i32, i32)> {
        self.current_item()?.contour_bounding_box(object_id, position)
    }

    pub fn shapes_for_object(&self, object_id: &str, filter: Option<ShapeType>) -> Result<usize> {
        self.current_item()?.shapes_for_object(object_id, filter)
    }

    pub fn object_names(&self) -> Result<Vec<String>> {
        self.current_item()?.object_names()
    }

    pub fn save(&self, bbox_summary: bool) -> Result<()> {
        self.current_item()?.save(bbox_summary)
    }

    pub fn did_change(&self) -> Result<bool> {
        Ok(self.current_item()?.did_change())
    }

    // --- keys ---

    pub fn key_count(&self, name: &str) -> Result<i64> {
        Ok(self.key(name)?.count())
    }

    pub fn key_image(&self, name: &str) -> Result<PathBuf> {
        Ok(self.key(name)?.image_path().to_path_buf())
    }

    pub fn key_incr(&mut self, name: &str) -> Result<()> {
        self.key_mut(name)?.incr();
        Ok(())
    }

    pub fn key_decr(&mut self, name: &str) -> Result<()> {
        self.key_mut(name)?.decr();
        Ok(())
    }

    // --- video transport ---

    pub fn open_video(&mut self, video_id: &str) -> Result<bool> {
        Ok(self.video_mut(video_id)?.open())
    }

    /// Open a video with an explicit decoder backend.
    pub fn open_video_with(
        &mut self,
        video_id: &str,
        decoder: Box<dyn FrameDecoder>,
    ) -> Result<()> {
        self.video_mut(video_id)?.open_with(decoder);
        Ok(())
    }

    pub fn close_video(&mut self, video_id: &str) -> Result<()> {
        self.video_mut(video_id)?.close();
        Ok(())
    }

    pub fn is_video_open(&self, video_id: &str) -> Result<bool> {
        Ok(self.video(video_id)?.is_open())
    }

    pub fn video_length(&self, video_id: &str) -> Result<i64> {
        Ok(self.video(video_id)?.num_frames())
    }

    pub fn current_video_frame(&self, video_id: &str) -> Result<i64> {
        Ok(self.video(video_id)?.current_frame())
    }

    pub fn video_current(&mut self, video_id: &str) -> Result<Option<RgbImage>> {
        Ok(self.video_mut(video_id)?.read_current())
    }

    pub fn video_goto(&mut self, video_id: &str, frame: i64) -> Result<Option<RgbImage>> {
        Ok(self.video_mut(video_id)?.goto(frame))
    }

    pub fn video_next(&mut self, video_id: &str, jump: i64) -> Result<Option<RgbImage>> {
        Ok(self.video_mut(video_id)?.read_next(jump))
    }

    pub fn video_prev(&mut self, video_id: &str, jump: i64) -> Result<Option<RgbImage>> {
        Ok(self.video_mut(video_id)?.read_prev(jump))
    }

    // --- lookup helpers ---

    fn current_item(&self) -> Result<&DatasetItem> {
        self.current
            .as_ref()
            .and_then(|name| self.items.get(name))
            .ok_or(Error::NoCurrentItem)
    }

    fn current_item_mut(&mut self) -> Result<&mut DatasetItem> {
        match &self.current {
            Some(name) => self
                .items
                .get_mut(name)
                .ok_or(Error::NoCurrentItem),
            None => Err(Error::NoCurrentItem),
        }
    }

    fn key(&self, name: &str) -> Result<&Key> {
        self.keys
            .get(name)
            .ok_or_else(|| Error::not_found("key", name))
    }

    fn key_mut(&mut self, name: &str) -> Result<&mut Key> {
        self.keys
            .get_mut(name)
            .ok_or_else(|| Error::not_found("key", name))
    }

    fn video(&self, video_id: &str) -> Result<&Video> {
        self.videos
            .get(video_id)
            .ok_or_else(|| Error::not_found("video", video_id))
    }

    fn video_mut(&mut self, video_id: &str) -> Result<&mut Video> {
        self.videos
            .get_mut(video_id)
            .ok_or_else(|| Error::not_found("video", video_id))
    }
}

/// Item/key/video name: the file name truncated at the first dot.
fn base_name(file_name: &str) -> String {
    file_name
        .split('.')
        .next()
        .unwrap_or(file_name)
        .to_string()
}
