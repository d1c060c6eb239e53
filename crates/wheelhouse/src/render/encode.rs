use super::{RenderError, bitmap};
use cairo::ImageSurface;
use gdk_pixbuf::{Colorspace, Pixbuf};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum::{Display, EnumString};

/// Lossy quality in `0.0..=1.0`.
pub const DEFAULT_QUALITY: f64 = 1.0;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumString,
    SerializeDisplay,
    DeserializeFromStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    #[default]
    Png,
    #[strum(to_string = "jpeg", serialize = "jpg")]
    Jpeg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }
}

/// Encodes a finished canvas. JPEG drops alpha, so transparent areas come
/// out black.
pub fn encode(
    surface: &mut ImageSurface,
    format: ExportFormat,
    quality: f64,
) -> Result<Vec<u8>, RenderError> {
    match format {
        ExportFormat::Png => {
            let mut bytes = Vec::new();
            surface.write_to_png(&mut bytes)?;
            Ok(bytes)
        }
        ExportFormat::Jpeg => {
            let (width, height) = (surface.width(), surface.height());
            let rows = bitmap::unpremultiplied_rows(surface, false)?;
            let pixbuf =
                Pixbuf::from_mut_slice(rows, Colorspace::Rgb, false, 8, width, height, width * 3);
            let quality = jpeg_quality(quality).to_string();
            pixbuf
                .save_to_bufferv("jpeg", &[("quality", quality.as_str())])
                .map_err(|e| RenderError::Encode(e.to_string()))
        }
    }
}

/// Maps a `0.0..=1.0` quality onto the encoder's `1..=100` scale.
pub fn jpeg_quality(quality: f64) -> u8 {
    if quality.is_nan() {
        return 100;
    }
    (quality.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::codec;
    use cairo::{Context, Format};

    fn canvas() -> ImageSurface {
        let surface = ImageSurface::create(Format::ARgb32, 6, 4).unwrap();
        {
            let cr = Context::new(&surface).unwrap();
            cr.set_source_rgb(0.2, 0.4, 0.8);
            cr.paint().unwrap();
        }
        surface
    }

    #[test]
    fn format_names() {
        assert_eq!("PNG".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert_eq!("jpg".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert_eq!(ExportFormat::Jpeg.to_string(), "jpeg");
        assert_eq!(ExportFormat::Jpeg.extension(), "jpeg");
        assert!("gif".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn quality_maps_onto_encoder_range() {
        assert_eq!(jpeg_quality(1.0), 100);
        assert_eq!(jpeg_quality(0.8), 80);
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(7.0), 100);
        assert_eq!(jpeg_quality(f64::NAN), 100);
    }

    #[test]
    fn encodes_both_formats_at_canvas_size() {
        for format in [ExportFormat::Png, ExportFormat::Jpeg] {
            let bytes = encode(&mut canvas(), format, DEFAULT_QUALITY).unwrap();
            let decoded = codec::decode_bytes(&bytes).unwrap();
            assert_eq!((decoded.pixbuf.width(), decoded.pixbuf.height()), (6, 4));
            let mime = format!("image/{}", format.extension());
            assert_eq!(decoded.mime.as_deref(), Some(mime.as_str()));
        }
    }
}
