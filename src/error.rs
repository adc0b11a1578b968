//! Collision error taxonomy
//!
//! Only mask construction, contact queries and level loading can fail.
//! Point tests, overlap scans and grid queries are total.

use std::error::Error;
use std::fmt::Display;

pub type Result<T> = std::result::Result<T, CollisionError>;

#[derive(Debug)]
pub enum CollisionError {
    /// Source raster had zero width or height
    InvalidImage { width: u32, height: u32 },
    /// Dynamic collider mask has no set bits
    EmptyMask,
    /// Broad-phase cell size must be positive
    InvalidCellSize(u32),
    /// Level referenced a mask name it never defined
    UnknownMask(String),
    /// Layout grid cannot be placed in world space
    InvalidLayout(String),
    IoError(std::io::Error),
    ImageError(image::ImageError),
    JsonError(serde_json::Error),
}

impl Error for CollisionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::IoError(e) => Some(e),
            Self::ImageError(e) => Some(e),
            Self::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for CollisionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidImage { width, height } => {
                write!(f, "invalid image: {}x{} has no area", width, height)
            }
            Self::EmptyMask => write!(f, "dynamic collider mask has no set bits"),
            Self::InvalidCellSize(size) => write!(f, "invalid cell size: {}", size),
            Self::UnknownMask(name) => write!(f, "unknown mask '{}'", name),
            Self::InvalidLayout(reason) => write!(f, "invalid layout: {}", reason),
            Self::IoError(e) => write!(f, "{}", e),
            Self::ImageError(e) => write!(f, "{}", e),
            Self::JsonError(e) => write!(f, "{}", e),
        }
    }
}

impl From<std::io::Error> for CollisionError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl From<image::ImageError> for CollisionError {
    fn from(e: image::ImageError) -> Self {
        Self::ImageError(e)
    }
}

impl From<serde_json::Error> for CollisionError {
    fn from(e: serde_json::Error) -> Self {
        Self::JsonError(e)
    }
}
