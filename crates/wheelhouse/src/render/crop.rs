use super::{Bitmap, RenderError, codec};
use cairo::{Context, Format, ImageSurface};
use gdk_pixbuf::{InterpType, Pixbuf};
use gdk4::prelude::*;
use std::f64::consts::PI;
use wheelcore::ImageSource;

/// Largest centered square inside a `width × height` image, as
/// `(x, y, side)`.
pub fn square_crop(width: i32, height: i32) -> (i32, i32, i32) {
    if width > height {
        ((width - height) / 2, 0, height)
    } else {
        (0, (height - width) / 2, width)
    }
}

/// Center-crops `pixbuf` to a square, scales it to `side` and masks it to a
/// circle; everything outside the circle is transparent.
pub fn crop_circle(pixbuf: &Pixbuf, side: i32) -> Result<Bitmap, RenderError> {
    let (width, height) = (pixbuf.width(), pixbuf.height());
    if width < 1 || height < 1 || side < 1 {
        return Err(RenderError::Dimensions {
            width: width.into(),
            height: height.into(),
        });
    }

    let (x, y, square) = square_crop(width, height);
    let scaled = pixbuf
        .new_subpixbuf(x, y, square, square)
        .scale_simple(side, side, InterpType::Bilinear)
        .ok_or(RenderError::Dimensions {
            width: side.into(),
            height: side.into(),
        })?;

    let surface = ImageSurface::create(Format::ARgb32, side, side)?;
    {
        let cr = Context::new(&surface)?;
        let half = side as f64 / 2.0;
        cr.arc(half, half, half, 0.0, 2.0 * PI);
        cr.clip();
        cr.set_source_pixbuf(&scaled, 0.0, 0.0);
        cr.paint()?;
    }
    Bitmap::from_surface(surface)
}

/// Per-item crop that never fails: anything unreadable becomes a blank
/// square of the requested size.
pub fn crop_source(source: &ImageSource, side: i32) -> Bitmap {
    match codec::load_pixbuf(source).and_then(|pixbuf| crop_circle(&pixbuf, side)) {
        Ok(bitmap) => bitmap,
        Err(e) => {
            log::warn!("Failed to crop image, using a blank placeholder: {}", e);
            Bitmap::blank(side)
        }
    }
}
