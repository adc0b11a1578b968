//! Raster ingestion boundary
//!
//! Anything that can report its size and a per-pixel alpha can become a mask.

use image::{DynamicImage, GenericImageView, RgbaImage};

/// A raster with an alpha channel
pub trait AlphaSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Alpha at (x, y); only called for in-bounds coordinates
    fn alpha(&self, x: u32, y: u32) -> u8;
}

impl AlphaSource for RgbaImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn alpha(&self, x: u32, y: u32) -> u8 {
        self.get_pixel(x, y).0[3]
    }
}

impl AlphaSource for DynamicImage {
    fn width(&self) -> u32 {
        GenericImageView::dimensions(self).0
    }

    fn height(&self) -> u32 {
        GenericImageView::dimensions(self).1
    }

    fn alpha(&self, x: u32, y: u32) -> u8 {
        GenericImageView::get_pixel(self, x, y).0[3]
    }
}

/// Alpha source backed by a closure, for procedural sprites
pub struct FnSource<F> {
    width: u32,
    height: u32,
    alpha: F,
}

impl<F: Fn(u32, u32) -> u8> FnSource<F> {
    pub fn new(width: u32, height: u32, alpha: F) -> Self {
        Self {
            width,
            height,
            alpha,
        }
    }
}

impl<F: Fn(u32, u32) -> u8> AlphaSource for FnSource<F> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn alpha(&self, x: u32, y: u32) -> u8 {
        (self.alpha)(x, y)
    }
}
