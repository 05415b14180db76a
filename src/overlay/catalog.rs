//! Garment assets and the ordered catalog
//!
//! The catalog is supplied by a collaborator (shop backend, asset
//! directory); the core only needs ordered indexed access. Selection
//! wraps modulo the catalog length and is owned by the session.

use std::path::Path;

use image::RgbaImage;

/// A garment image with intrinsic dimensions.
///
/// Dimensions are known as soon as the asset is cataloged; pixel data
/// may lag behind (network fetch, lazy decode). Composing an unloaded
/// garment is a no-op by contract.
#[derive(Debug, Clone)]
pub struct GarmentAsset {
    /// Display name (usually the source file stem)
    pub name: String,
    /// Intrinsic width in pixels
    pub width: u32,
    /// Intrinsic height in pixels
    pub height: u32,
    /// RGBA pixel data, present once the image has loaded
    pixels: Option<Vec<u8>>,
}

impl GarmentAsset {
    /// Asset from a decoded image.
    pub fn from_image(name: impl Into<String>, image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            name: name.into(),
            width,
            height,
            pixels: Some(image.into_raw()),
        }
    }

    /// Asset whose dimensions are known but whose pixels have not
    /// arrived yet.
    pub fn placeholder(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            pixels: None,
        }
    }

    /// Procedural swatch for demo runs without asset files: a solid
    /// torso block with transparent margins so the overlay shape reads
    /// as a garment.
    pub fn swatch(name: impl Into<String>, width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let margin_x = width / 8;
        let margin_y = height / 10;
        let mut data = vec![0u8; (width as usize) * (height as usize) * 4];
        for y in margin_y..height.saturating_sub(margin_y) {
            for x in margin_x..width.saturating_sub(margin_x) {
                let idx = ((y * width + x) * 4) as usize;
                data[idx..idx + 4].copy_from_slice(&rgba);
            }
        }
        Self {
            name: name.into(),
            width,
            height,
            pixels: Some(data),
        }
    }

    /// Whether pixel data is available for compositing.
    pub fn is_loaded(&self) -> bool {
        self.pixels.is_some()
    }

    /// Raw RGBA pixels, if loaded.
    pub fn pixels(&self) -> Option<&[u8]> {
        self.pixels.as_deref()
    }

    /// Intrinsic height-over-width ratio.
    pub fn aspect_ratio(&self) -> f32 {
        self.height as f32 / self.width as f32
    }
}

/// Ordered garment collection.
#[derive(Debug, Clone, Default)]
pub struct GarmentCatalog {
    garments: Vec<GarmentAsset>,
}

impl GarmentCatalog {
    /// Catalog from pre-built assets, preserving order.
    pub fn new(garments: Vec<GarmentAsset>) -> Self {
        Self { garments }
    }

    /// Load all PNG/JPEG images in a directory, ordered by filename.
    /// Entries that fail to decode are logged and skipped.
    pub fn from_dir(dir: &Path) -> std::io::Result<Self> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()),
                    Some(ref ext) if ext == "png" || ext == "jpg" || ext == "jpeg"
                )
            })
            .collect();
        paths.sort();

        let mut garments = Vec::with_capacity(paths.len());
        for path in paths {
            match image::open(&path) {
                Ok(img) => {
                    let name = path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("garment")
                        .to_string();
                    garments.push(GarmentAsset::from_image(name, img.to_rgba8()));
                }
                Err(e) => {
                    log::warn!("skipping garment {:?}: {}", path, e);
                }
            }
        }

        log::info!("loaded {} garments from {:?}", garments.len(), dir);
        Ok(Self { garments })
    }

    /// Garment at the given index.
    pub fn get(&self, index: usize) -> Option<&GarmentAsset> {
        self.garments.get(index)
    }

    /// Number of garments.
    pub fn count(&self) -> usize {
        self.garments.len()
    }

    /// Whether the catalog holds no garments.
    pub fn is_empty(&self) -> bool {
        self.garments.is_empty()
    }
}
