//! Local test set browsing: id listing and path resolution.

use std::{
    ffi::OsStr,
    fs::read_dir,
    path::PathBuf,
};

use image::DynamicImage;

use crate::error::Error;

/// A directory pair holding `{id}.png` reference images and `{id}_mask.png`
/// ground-truth masks.
#[derive(Debug, Clone)]
pub struct Dataset {
    image_dir: PathBuf,
    mask_dir: PathBuf,
}

impl Dataset {
    pub fn new(image_dir: impl Into<PathBuf>, mask_dir: impl Into<PathBuf>) -> Self {
        Self {
            image_dir: image_dir.into(),
            mask_dir: mask_dir.into(),
        }
    }

    /// Ids of all `.png` files in the image directory, sorted. A listed id
    /// is not guaranteed to have a mask; `load_pair` checks that.
    pub fn list_ids(&self) -> Result<Vec<String>, Error> {
        let mut ids = Vec::new();
        for entry in read_dir(&self.image_dir)? {
            let path = entry?.path();
            if path.extension().and_then(OsStr::to_str) != Some("png") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(OsStr::to_str) {
                ids.push(stem.to_owned());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Paths for an id following the naming convention. Existence is the
    /// caller's concern.
    pub fn resolve(&self, id: &str) -> (PathBuf, PathBuf) {
        (
            self.image_dir.join(format!("{id}.png")),
            self.mask_dir.join(format!("{id}_mask.png")),
        )
    }

    /// Verify both files for an id exist, without loading them.
    pub fn check_pair(&self, id: &str) -> Result<(), Error> {
        let (image_path, mask_path) = self.resolve(id);
        if !image_path.exists() {
            return Err(Error::MissingImage {
                id: id.to_owned(),
                path: image_path,
            });
        }
        if !mask_path.exists() {
            return Err(Error::MissingMask {
                id: id.to_owned(),
                path: mask_path,
            });
        }
        Ok(())
    }

    /// Load the reference image and mask for an id, failing with a typed
    /// error when either file is missing.
    pub fn load_pair(&self, id: &str) -> Result<(DynamicImage, DynamicImage), Error> {
        self.check_pair(id)?;
        let (image_path, mask_path) = self.resolve(id);
        Ok((image::open(&image_path)?, image::open(&mask_path)?))
    }
}
