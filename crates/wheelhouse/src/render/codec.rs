use super::RenderError;
use fs_err as fs;
use gdk_pixbuf::prelude::*;
use gdk_pixbuf::{InterpType, Pixbuf, PixbufLoader};
use wheelcore::ImageSource;

/// Re-encode quality for images shrunk before storage.
pub const STORAGE_JPEG_QUALITY: u8 = 80;

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> ImageSource {
    ImageSource::new(format!(
        "{DATA_PREFIX}{mime}{BASE64_MARKER}{}",
        glib::base64_encode(bytes)
    ))
}

/// Raw bytes behind an image handle: a base64 `data:` URL or a file path.
pub fn source_bytes(source: &ImageSource) -> Result<Vec<u8>, RenderError> {
    match source.as_str().strip_prefix(DATA_PREFIX) {
        Some(rest) => {
            let (_, payload) = rest
                .split_once(BASE64_MARKER)
                .ok_or_else(|| RenderError::Decode("data URL is not base64".to_string()))?;
            let bytes = glib::base64_decode(payload);
            if bytes.is_empty() {
                return Err(RenderError::Decode("data URL has no payload".to_string()));
            }
            Ok(bytes)
        }
        None => {
            let path = source.as_str().strip_prefix("file://").unwrap_or(source.as_str());
            fs::read(path).map_err(|e| RenderError::Decode(e.to_string()))
        }
    }
}

pub struct Decoded {
    pub pixbuf: Pixbuf,
    pub mime: Option<String>,
}

pub fn decode_bytes(bytes: &[u8]) -> Result<Decoded, RenderError> {
    let loader = PixbufLoader::new();
    if let Err(e) = loader.write(bytes) {
        let _ = loader.close();
        return Err(e.into());
    }
    loader.close()?;
    let pixbuf = loader
        .pixbuf()
        .ok_or_else(|| RenderError::Decode("no image data".to_string()))?;
    let mime = loader
        .format()
        .and_then(|format| format.mime_types().first().map(|m| m.to_string()));
    Ok(Decoded { pixbuf, mime })
}

pub fn load_pixbuf(source: &ImageSource) -> Result<Pixbuf, RenderError> {
    decode_bytes(&source_bytes(source)?).map(|decoded| decoded.pixbuf)
}

/// Target size keeping aspect ratio so the longer side is `max`, or `None`
/// when the image already fits.
pub fn fit_within(width: i32, height: i32, max: i32) -> Option<(i32, i32)> {
    if width <= max && height <= max {
        return None;
    }
    let scaled = |side: i32, long: i32| ((side as f64 * max as f64 / long as f64).round() as i32).max(1);
    if width > height {
        Some((max, scaled(height, width)))
    } else {
        Some((scaled(width, height), max))
    }
}

/// Downscales an oversized image to fit `max_dimension` and re-encodes it as
/// JPEG. Returns `None` when no change is needed.
pub fn shrink_for_storage(
    source: &ImageSource,
    max_dimension: u32,
) -> Result<Option<ImageSource>, RenderError> {
    let pixbuf = load_pixbuf(source)?;
    let max = i32::try_from(max_dimension).unwrap_or(i32::MAX);
    let Some((width, height)) = fit_within(pixbuf.width(), pixbuf.height(), max) else {
        return Ok(None);
    };
    let resized = pixbuf
        .scale_simple(width, height, InterpType::Bilinear)
        .ok_or(RenderError::Dimensions {
            width: width.into(),
            height: height.into(),
        })?;
    let quality = STORAGE_JPEG_QUALITY.to_string();
    let bytes = flatten_alpha(&resized)
        .save_to_bufferv("jpeg", &[("quality", quality.as_str())])
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    log::debug!(
        "Shrunk image from {}x{} to {width}x{height}",
        pixbuf.width(),
        pixbuf.height()
    );
    Ok(Some(encode_data_url("image/jpeg", &bytes)))
}

/// JPEG has no alpha channel; transparent pixels end up black.
fn flatten_alpha(pixbuf: &Pixbuf) -> Pixbuf {
    if !pixbuf.has_alpha() {
        return pixbuf.clone();
    }
    let (width, height) = (pixbuf.width(), pixbuf.height());
    match Pixbuf::new(gdk_pixbuf::Colorspace::Rgb, false, 8, width, height) {
        Some(opaque) => {
            opaque.fill(0x000000ff);
            pixbuf.composite(
                &opaque,
                0,
                0,
                width,
                height,
                0.0,
                0.0,
                1.0,
                1.0,
                InterpType::Nearest,
                255,
            );
            opaque
        }
        None => pixbuf.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: i32, height: i32) -> Vec<u8> {
        let pixbuf = Pixbuf::new(gdk_pixbuf::Colorspace::Rgb, true, 8, width, height).unwrap();
        pixbuf.fill(0x3366ccff);
        pixbuf.save_to_bufferv("png", &[]).unwrap()
    }

    #[test]
    fn fit_within_keeps_aspect_ratio() {
        assert_eq!(fit_within(800, 600, 1000), None);
        assert_eq!(fit_within(1000, 1000, 1000), None);
        assert_eq!(fit_within(2000, 1000, 1000), Some((1000, 500)));
        assert_eq!(fit_within(1000, 3000, 1000), Some((333, 1000)));
        assert_eq!(fit_within(1500, 1500, 1000), Some((1000, 1000)));
        assert_eq!(fit_within(5000, 1, 1000), Some((1000, 1)));
    }

    #[test]
    fn data_urls_round_trip() {
        let bytes = png_bytes(3, 2);
        let source = encode_data_url("image/png", &bytes);
        assert!(source.starts_with("data:image/png;base64,"));
        assert_eq!(source_bytes(&source).unwrap(), bytes);
    }

    #[test]
    fn decodes_and_reports_mime() {
        let decoded = decode_bytes(&png_bytes(5, 7)).unwrap();
        assert_eq!((decoded.pixbuf.width(), decoded.pixbuf.height()), (5, 7));
        assert_eq!(decoded.mime.as_deref(), Some("image/png"));
    }

    #[test]
    fn rejects_non_images() {
        assert!(decode_bytes(b"definitely not an image").is_err());
        assert!(source_bytes(&ImageSource::from("data:text/plain,hello")).is_err());
    }

    #[test]
    fn shrinks_only_oversized_images() {
        let small = encode_data_url("image/png", &png_bytes(40, 20));
        assert_eq!(shrink_for_storage(&small, 1000).unwrap(), None);

        let large = encode_data_url("image/png", &png_bytes(120, 60));
        let shrunk = shrink_for_storage(&large, 50).unwrap().unwrap();
        assert!(shrunk.starts_with("data:image/jpeg;base64,"));
        let pixbuf = load_pixbuf(&shrunk).unwrap();
        assert_eq!((pixbuf.width(), pixbuf.height()), (50, 25));
    }
}
