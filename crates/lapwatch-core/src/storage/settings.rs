//! Cosmetic settings carried alongside the timer state.
//!
//! These never influence timing; they ride in the same persisted record so
//! the presentation layer gets its title, color and background image back.

use std::path::Path;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_MESSAGE: &str = "MY STOPWATCH";
pub const DEFAULT_BG_COLOR: &str = "#121212";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CosmeticSettings {
    #[serde(default = "default_message")]
    pub custom_message: String,
    /// Background image as a `data:` URI.
    #[serde(default)]
    pub bg_image: Option<String>,
    #[serde(default = "default_bg_color")]
    pub bg_color: String,
}

fn default_message() -> String {
    DEFAULT_MESSAGE.into()
}

fn default_bg_color() -> String {
    DEFAULT_BG_COLOR.into()
}

impl Default for CosmeticSettings {
    fn default() -> Self {
        Self {
            custom_message: default_message(),
            bg_image: None,
            bg_color: default_bg_color(),
        }
    }
}

impl CosmeticSettings {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Load an image file into `bg_image`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn set_bg_image_from_file(&mut self, path: &Path) -> Result<()> {
        self.bg_image = Some(bg_image_data_uri(path)?);
        Ok(())
    }
}

/// Read an image file and encode it as a base64 `data:` URI.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn bg_image_data_uri(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{};base64,{encoded}", mime_for(path)))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}
