//! Static presentation assets: the header logo and the injected style file.

use std::io::ErrorKind;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::config::AssetsConfig;
use crate::error::AppError;

fn read_asset(path: &Path) -> Result<Vec<u8>, AppError> {
    std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AppError::AssetNotFound {
            path: path.display().to_string(),
        },
        _ => AppError::Io(e),
    })
}

/// Read an image and return its base64 encoding.
pub fn img_to_bytes(path: impl AsRef<Path>) -> Result<String, AppError> {
    let bytes = read_asset(path.as_ref())?;
    Ok(STANDARD.encode(bytes))
}

/// Read an image and wrap it in an inline `<img>` tag.
///
/// The data URI is always labelled `image/png`, whatever the file holds.
pub fn img_to_html(path: impl AsRef<Path>) -> Result<String, AppError> {
    Ok(format!(
        "<img src='data:image/png;base64,{}' class='img-fluid'>",
        img_to_bytes(path)?
    ))
}

/// Read the style/markup file verbatim.
pub fn load_styles(path: impl AsRef<Path>) -> Result<String, AppError> {
    let bytes = read_asset(path.as_ref())?;
    String::from_utf8(bytes).map_err(|e| AppError::Io(std::io::Error::new(ErrorKind::InvalidData, e)))
}

/// A loaded asset, or the notice shown in its place.
#[derive(Debug, Clone)]
pub enum AssetSlot {
    Ready(String),
    Unavailable { notice: String },
}

impl AssetSlot {
    fn from_result(name: &str, result: Result<String, AppError>) -> Self {
        match result {
            Ok(html) => Self::Ready(html),
            Err(e) => {
                tracing::warn!(asset = name, error = %e, "Static asset unavailable");
                Self::Unavailable {
                    notice: e.notice_html(),
                }
            }
        }
    }

    /// Markup to place in the page.
    #[must_use]
    pub fn html(&self) -> &str {
        match self {
            Self::Ready(html) => html,
            Self::Unavailable { notice } => notice,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Assets read once at startup.
#[derive(Debug, Clone)]
pub struct StaticAssets {
    pub logo: AssetSlot,
    pub styles: AssetSlot,
}

impl StaticAssets {
    /// Load the logo and style file. Missing files become inline notices.
    #[must_use]
    pub fn load(config: &AssetsConfig) -> Self {
        let assets = Self {
            logo: AssetSlot::from_result("logo", img_to_html(&config.logo_path)),
            styles: AssetSlot::from_result("styles", load_styles(&config.styles_path)),
        };
        tracing::info!(
            logo = assets.logo.is_ready(),
            styles = assets.styles.is_ready(),
            "Static assets loaded"
        );
        assets
    }
}
