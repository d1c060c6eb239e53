use super::RenderError;
use cairo::{Format, ImageSurface};

/// Owned ARGB32 (premultiplied, native-endian) pixels.
///
/// Cairo surfaces cannot leave the thread that made them, so per-item work
/// hands its result back as a `Bitmap` and the compositor turns it into a
/// surface again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: i32,
    height: i32,
    stride: i32,
    data: Vec<u8>,
}

impl Bitmap {
    /// Fully transparent square, the fallback for anything that fails to load.
    pub fn blank(side: i32) -> Self {
        let side = side.max(1);
        let stride = side * 4;
        Self {
            width: side,
            height: side,
            stride,
            data: vec![0; (stride * side) as usize],
        }
    }

    pub fn from_surface(mut surface: ImageSurface) -> Result<Self, RenderError> {
        surface.flush();
        let (width, height, stride) = (surface.width(), surface.height(), surface.stride());
        let data = surface.data()?.to_vec();
        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    pub fn into_surface(self) -> Result<ImageSurface, RenderError> {
        Ok(ImageSurface::create_for_data(
            self.data,
            Format::ARgb32,
            self.width,
            self.height,
            self.stride,
        )?)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Pixel as `0xAARRGGBB`, premultiplied.
    pub fn argb(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y * self.stride + x * 4) as usize;
        let bytes = self.data.get(offset..offset + 4)?;
        Some(u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn alpha(&self, x: i32, y: i32) -> Option<u8> {
        self.argb(x, y).map(|p| (p >> 24) as u8)
    }

    pub fn is_transparent(&self) -> bool {
        (0..self.height).all(|y| (0..self.width).all(|x| self.alpha(x, y) == Some(0)))
    }
}

/// Straight-alpha RGB(A) rows for encoders that do not take cairo's layout.
pub(crate) fn unpremultiplied_rows(surface: &mut ImageSurface, alpha: bool) -> Result<Vec<u8>, RenderError> {
    surface.flush();
    let (width, height, stride) = (surface.width(), surface.height(), surface.stride());
    let channels = if alpha { 4 } else { 3 };
    let data = surface.data()?;
    let mut out = Vec::with_capacity((width * height * channels) as usize);
    for y in 0..height {
        for x in 0..width {
            let offset = (y * stride + x * 4) as usize;
            let p = u32::from_ne_bytes([
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
            ]);
            let a = p >> 24;
            let unpremultiply = |c: u32| -> u8 {
                if a == 0 { 0 } else { ((c * 255 + a / 2) / a).min(255) as u8 }
            };
            out.push(unpremultiply((p >> 16) & 0xff));
            out.push(unpremultiply((p >> 8) & 0xff));
            out.push(unpremultiply(p & 0xff));
            if alpha {
                out.push(a as u8);
            }
        }
    }
    Ok(out)
}
