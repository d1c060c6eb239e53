use crate::batch;
use crate::notice::Notice;
use crate::render::compose::{self, ItemVisual};
use crate::render::{Bitmap, ChipStyle, ExportFormat, RenderError, chip, crop, encode};
use crate::state::WheelState;
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::task::{self, JoinError};
use wheelcore::geometry::clamp_scale;
use wheelcore::{ImageSource, ViewportClass, WheelLayout};

pub const EXPORT_BASE_NAME: &str = "character-shipping-wheel";
pub const DEFAULT_EXPORT_SCALE: u32 = 4;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("There are no images to export")]
    Empty,
    #[error("An export is already running")]
    Busy,
    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),
    #[error("Rendering was interrupted: {0}")]
    Interrupted(#[from] JoinError),
    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    pub fn notice(&self) -> Notice {
        match self {
            Self::Empty => Notice::info("Add some images before exporting."),
            Self::Busy => {
                Notice::info("An export is already in progress. Please wait for it to finish.")
            }
            Self::Render(_) | Self::Interrupted(_) | Self::Io(_) => {
                Notice::error("Failed to export the wheel. Please try again.")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub scale: u32,
    pub format: ExportFormat,
    pub quality: f64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_EXPORT_SCALE,
            format: ExportFormat::default(),
            quality: encode::DEFAULT_QUALITY,
        }
    }
}

impl ExportConfig {
    /// Scale forced into `1..=10`, quality into `0..=1`.
    pub fn clamped(self) -> Self {
        Self {
            scale: clamp_scale(self.scale),
            quality: if self.quality.is_nan() {
                encode::DEFAULT_QUALITY
            } else {
                self.quality.clamp(0.0, 1.0)
            },
            ..self
        }
    }

    pub fn file_name(&self) -> String {
        format!("{EXPORT_BASE_NAME}.{}", self.format.extension())
    }
}

/// Clears the busy flag however the export ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, ExportError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Renders wheels at export resolution, one at a time.
#[derive(Debug, Default)]
pub struct Exporter {
    busy: AtomicBool,
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces the encoded image for `state`.
    ///
    /// The state is copied up front; edits made while the export runs do not
    /// show up in its output. Every image is cropped and every label rendered
    /// before composition starts, and a failing item comes out blank rather
    /// than failing the export.
    pub async fn render(
        &self,
        state: &WheelState,
        viewport: ViewportClass,
        config: ExportConfig,
    ) -> Result<Vec<u8>, ExportError> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        let snapshot = state.clone();
        let config = config.clamped();
        if snapshot.collection.is_empty() {
            return Err(ExportError::Empty);
        }

        let layout = WheelLayout::export(snapshot.collection.items(), viewport, config.scale);
        let Some(params) = layout.params().copied() else {
            return Err(ExportError::Empty);
        };
        let side = params.item_diameter.round().max(1.0) as i32;

        let images: Vec<(ImageSource, i32)> = snapshot
            .collection
            .iter()
            .map(|item| (item.image.clone(), side))
            .collect();
        let crops = batch::fan_out(
            images,
            |(image, side)| crop::crop_source(&image, side),
            |(_, side)| Bitmap::blank(*side),
        )
        .await;

        let chip_style = ChipStyle::new(&params, &snapshot.style);
        let labels: Vec<Option<String>> = layout
            .placements()
            .iter()
            .map(|p| p.label.as_ref().map(|anchor| anchor.text.to_string()))
            .collect();
        let chips = batch::fan_out(
            labels,
            move |label| {
                let text = label?;
                chip::render_chip(&text, &chip_style)
                    .inspect_err(|e| log::warn!("Skipping label {text:?}: {}", e))
                    .ok()
            },
            |_| None,
        )
        .await;

        let style = snapshot.style;
        let bytes = task::spawn_blocking(move || -> Result<Vec<u8>, RenderError> {
            let visuals = crops
                .into_iter()
                .zip(chips)
                .map(|(image, label)| ItemVisual::from_bitmaps(image, label))
                .collect::<Result<Vec<_>, _>>()?;
            let mut surface = compose::flatten(&layout, &style, &visuals)?;
            encode::encode(&mut surface, config.format, config.quality)
        })
        .await??;

        log::info!(
            "Rendered {} item(s) at {}x as {} ({} bytes)",
            snapshot.collection.len(),
            config.scale,
            config.format,
            bytes.len()
        );
        Ok(bytes)
    }

    /// Renders and writes `character-shipping-wheel.<ext>` into `directory`. Nothing
    /// is left behind on failure.
    pub async fn export_to(
        &self,
        state: &WheelState,
        viewport: ViewportClass,
        config: ExportConfig,
        directory: &Path,
    ) -> Result<PathBuf, ExportError> {
        let bytes = self.render(state, viewport, config).await?;
        let path = directory.join(config.file_name());
        let partial = path.with_extension("part");
        fs::create_dir_all(directory)?;
        if let Err(e) = fs::write(&partial, &bytes).and_then(|_| fs::rename(&partial, &path)) {
            let _ = fs::remove_file(&partial);
            return Err(e.into());
        }
        log::info!("Exported wheel to {}", path.display());
        Ok(path)
    }
}

pub fn success_notice(path: &Path) -> Notice {
    Notice::success(format!("Wheel exported to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::codec;
    use crate::style::HexColor;
    use gdk_pixbuf::{Colorspace, Pixbuf};
    use wheelcore::Label;

    fn png(rgba: u32) -> ImageSource {
        let pixbuf = Pixbuf::new(Colorspace::Rgb, true, 8, 30, 20).unwrap();
        pixbuf.fill(rgba);
        codec::encode_data_url("image/png", &pixbuf.save_to_bufferv("png", &[]).unwrap())
    }

    fn state(count: usize) -> WheelState {
        let mut state = WheelState::default();
        for i in 0..count {
            let id = state.collection.add(png(0xff0000ff));
            if i % 2 == 0 {
                state.collection.relabel(&id, Label::new(format!("#{i}"))).unwrap();
            }
        }
        state
    }

    fn decode(bytes: &[u8]) -> Pixbuf {
        codec::decode_bytes(bytes).unwrap().pixbuf
    }

    #[test]
    fn config_is_clamped_and_named() {
        let config = ExportConfig {
            scale: 40,
            format: ExportFormat::Jpeg,
            quality: 3.0,
        }
        .clamped();
        assert_eq!(config.scale, 10);
        assert_eq!(config.quality, 1.0);
        assert_eq!(config.file_name(), "character-shipping-wheel.jpeg");
        assert_eq!(ExportConfig::default().file_name(), "character-shipping-wheel.png");
        assert_eq!(ExportConfig { scale: 0, ..ExportConfig::default() }.clamped().scale, 1);
    }

    #[tokio::test]
    async fn canvas_matches_the_scaled_layout() {
        let state = state(3);
        let exporter = Exporter::new();
        for scale in [1, 2] {
            let config = ExportConfig {
                scale,
                ..ExportConfig::default()
            };
            let bytes = exporter
                .render(&state, ViewportClass::Normal, config)
                .await
                .unwrap();
            let expected =
                WheelLayout::export(state.collection.items(), ViewportClass::Normal, scale)
                    .size()
                    .ceil() as i32;
            let image = decode(&bytes);
            assert_eq!((image.width(), image.height()), (expected, expected));
        }
    }

    #[tokio::test]
    async fn broken_images_render_blank_instead_of_failing() {
        let mut state = state(2);
        state
            .collection
            .add(ImageSource::from("data:image/png;base64,AAAA"));
        state.style.wheel_background = HexColor::rgb(0, 0, 0);
        let bytes = Exporter::new()
            .render(&state, ViewportClass::Normal, ExportConfig::default())
            .await
            .unwrap();
        assert!(decode(&bytes).width() > 0);
    }

    #[tokio::test]
    async fn empty_wheels_are_not_exported() {
        let err = Exporter::new()
            .render(&WheelState::default(), ViewportClass::Normal, ExportConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Empty));
        assert!(!err.notice().is_error());
    }

    #[tokio::test]
    async fn a_second_export_is_rejected_while_one_runs() {
        let exporter = Exporter::new();
        let _running = BusyGuard::acquire(&exporter.busy).unwrap();
        let err = exporter
            .render(&state(1), ViewportClass::Normal, ExportConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Busy));
    }

    #[tokio::test]
    async fn writes_the_named_file() {
        let dir = std::env::temp_dir().join(format!("wheelhouse-export-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let config = ExportConfig {
            scale: 1,
            format: ExportFormat::Jpeg,
            quality: 0.8,
        };
        let path = Exporter::new()
            .export_to(&state(2), ViewportClass::Narrow, config, &dir)
            .await
            .unwrap();
        assert_eq!(path, dir.join("character-shipping-wheel.jpeg"));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(codec::decode_bytes(&bytes).unwrap().mime.as_deref(), Some("image/jpeg"));
        assert!(!dir.join("character-shipping-wheel.part").exists());
    }
}
