use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use strum::{Display, EnumString};

pub const NARROW_VIEWPORT_MAX_WIDTH: f64 = 768.0;
pub const NARROW_ITEM_DIAMETER: f64 = 60.0;
pub const NORMAL_ITEM_DIAMETER: f64 = 80.0;
pub const ITEM_PADDING_RATIO: f64 = 0.25;
pub const MIN_RADIUS: f64 = 100.0;
pub const MIN_RADIUS_BELOW_COUNT: usize = 5; // floor only applies to sparse wheels
pub const START_ANGLE: f64 = -90.0; // item 0 at 12 o'clock
pub const EMPTY_CONTAINER_SIZE: f64 = 600.0;

pub const PREVIEW_LABEL_HEIGHT: f64 = 20.0;
pub const LABEL_CLEARANCE: f64 = 15.0;
pub const LABEL_FONT_SIZE: f64 = 12.0;
pub const LABEL_PADDING_X: f64 = 5.0;
pub const LABEL_PADDING_Y: f64 = 2.0;
pub const LABEL_CORNER_RADIUS: f64 = 4.0;

pub const OUTLINE_WIDTH: f64 = 3.0;
pub const SHADOW_OFFSET: f64 = 4.0;

pub const MIN_LENGTH: f64 = 1.0;
pub const MIN_SCALE_FACTOR: u32 = 1;
pub const MAX_SCALE_FACTOR: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    pub fn centered(center: Point, width: f64, height: f64) -> Self {
        Self::new(
            Point::new(center.x - width / 2.0, center.y - height / 2.0),
            width,
            height,
        )
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.width / 2.0,
            self.origin.y + self.height / 2.0,
        )
    }

    /// True when the rectangle lies inside the square `[0, size] × [0, size]`.
    pub fn fits_within(&self, size: f64) -> bool {
        self.origin.x >= 0.0
            && self.origin.y >= 0.0
            && self.origin.x + self.width <= size
            && self.origin.y + self.height <= size
    }
}

/// Two-tier breakpoint selecting the on-screen item size.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString, Display,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ViewportClass {
    Narrow,
    #[default]
    Normal,
}

impl ViewportClass {
    pub fn from_width(width: f64) -> Self {
        if width <= NARROW_VIEWPORT_MAX_WIDTH {
            Self::Narrow
        } else {
            Self::Normal
        }
    }
}

fn positive(length: f64) -> f64 {
    if length.is_finite() && length >= MIN_LENGTH {
        length
    } else {
        MIN_LENGTH
    }
}

fn non_negative(length: f64) -> f64 {
    if length.is_finite() && length > 0.0 {
        length
    } else {
        0.0
    }
}

pub fn clamp_scale(scale: u32) -> u32 {
    scale.clamp(MIN_SCALE_FACTOR, MAX_SCALE_FACTOR)
}

pub fn item_size(viewport: ViewportClass) -> f64 {
    match viewport {
        ViewportClass::Narrow => NARROW_ITEM_DIAMETER,
        ViewportClass::Normal => NORMAL_ITEM_DIAMETER,
    }
}

pub fn item_padding(diameter: f64) -> f64 {
    positive(diameter) * ITEM_PADDING_RATIO
}

/// Orbit radius: the circumference holds every item plus its padding, with a
/// floor for wheels of fewer than five items.
pub fn radius(count: usize, diameter: f64, padding: f64) -> f64 {
    let circumference = count as f64 * (positive(diameter) + positive(padding));
    let radius = circumference / (2.0 * PI);
    if count < MIN_RADIUS_BELOW_COUNT {
        radius.max(MIN_RADIUS)
    } else {
        radius
    }
}

/// Side of the square container holding the wheel, its labels and `padding`
/// on every edge.
pub fn container_size(
    radius: f64,
    diameter: f64,
    label_clearance: f64,
    label_height: f64,
    padding: f64,
) -> f64 {
    2.0 * label_distance(radius, diameter, label_clearance, label_height)
        + 2.0 * non_negative(padding)
}

/// Distance from the wheel center to a label's center point.
pub fn label_distance(radius: f64, diameter: f64, label_clearance: f64, label_height: f64) -> f64 {
    non_negative(radius)
        + positive(diameter) / 2.0
        + non_negative(label_clearance)
        + non_negative(label_height) / 2.0
}

/// Angle of item `index` in degrees, clockwise from 3 o'clock.
pub fn angle_degrees(index: usize, count: usize) -> f64 {
    if count == 0 {
        return START_ANGLE;
    }
    index as f64 * (360.0 / count as f64) + START_ANGLE
}

fn polar(center: Point, distance: f64, angle_degrees: f64) -> Point {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    Point::new(center.x + distance * cos, center.y + distance * sin)
}

/// Top-left corner of the item's `diameter × diameter` bounding box.
pub fn item_position(
    index: usize,
    count: usize,
    radius: f64,
    diameter: f64,
    center: Point,
) -> Point {
    let diameter = positive(diameter);
    let c = polar(center, non_negative(radius), angle_degrees(index, count));
    Point::new(c.x - diameter / 2.0, c.y - diameter / 2.0)
}

/// Center point of the item's label; consumers center the label on it.
pub fn label_position(
    index: usize,
    count: usize,
    radius: f64,
    diameter: f64,
    label_clearance: f64,
    label_height: f64,
    center: Point,
) -> Point {
    polar(
        center,
        label_distance(radius, diameter, label_clearance, label_height),
        angle_degrees(index, count),
    )
}

/// Every length the wheel needs, derived from the item count and viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutParams {
    pub item_diameter: f64,
    pub item_padding: f64,
    pub radius: f64,
    pub label_height: f64,
    pub label_clearance: f64,
    pub margin: f64,
    pub font_size: f64,
    pub label_padding_x: f64,
    pub label_padding_y: f64,
    pub corner_radius: f64,
    pub outline_width: f64,
    pub shadow_offset: f64,
    pub scale: f64,
}

impl LayoutParams {
    pub fn preview(count: usize, viewport: ViewportClass) -> Self {
        let item_diameter = item_size(viewport);
        let item_padding = item_padding(item_diameter);
        Self {
            item_diameter,
            item_padding,
            radius: radius(count, item_diameter, item_padding),
            label_height: PREVIEW_LABEL_HEIGHT,
            label_clearance: LABEL_CLEARANCE,
            margin: item_padding,
            font_size: LABEL_FONT_SIZE,
            label_padding_x: LABEL_PADDING_X,
            label_padding_y: LABEL_PADDING_Y,
            corner_radius: LABEL_CORNER_RADIUS,
            outline_width: OUTLINE_WIDTH,
            shadow_offset: SHADOW_OFFSET,
            scale: 1.0,
        }
    }

    /// Export geometry: sized for label chips rather than preview labels, a
    /// margin of one item diameter per side, then scaled as a whole so the
    /// proportions match the preview exactly.
    pub fn export(count: usize, viewport: ViewportClass, scale: u32) -> Self {
        let base = Self::preview(count, viewport);
        Self {
            label_height: base.font_size + 2.0 * base.label_padding_y,
            margin: base.item_diameter,
            ..base
        }
        .scaled(clamp_scale(scale) as f64)
    }

    pub fn scaled(&self, factor: f64) -> Self {
        let factor = if factor.is_finite() && factor > 0.0 {
            factor
        } else {
            1.0
        };
        Self {
            item_diameter: self.item_diameter * factor,
            item_padding: self.item_padding * factor,
            radius: self.radius * factor,
            label_height: self.label_height * factor,
            label_clearance: self.label_clearance * factor,
            margin: self.margin * factor,
            font_size: self.font_size * factor,
            label_padding_x: self.label_padding_x * factor,
            label_padding_y: self.label_padding_y * factor,
            corner_radius: self.corner_radius * factor,
            outline_width: self.outline_width * factor,
            shadow_offset: self.shadow_offset * factor,
            scale: self.scale * factor,
        }
    }

    pub fn container_size(&self) -> f64 {
        container_size(
            self.radius,
            self.item_diameter,
            self.label_clearance,
            self.label_height,
            self.margin,
        )
    }

    pub fn item_position(&self, index: usize, count: usize, center: Point) -> Point {
        item_position(index, count, self.radius, self.item_diameter, center)
    }

    pub fn label_position(&self, index: usize, count: usize, center: Point) -> Point {
        label_position(
            index,
            count,
            self.radius,
            self.item_diameter,
            self.label_clearance,
            self.label_height,
            center,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn angles_are_evenly_spaced_from_the_top() {
        for count in 1..=24 {
            assert!((angle_degrees(0, count) - START_ANGLE).abs() < EPS);
            for index in 1..count {
                let step = angle_degrees(index, count) - angle_degrees(index - 1, count);
                assert!((step - 360.0 / count as f64).abs() < EPS, "count {count}");
            }
        }
    }

    #[test]
    fn first_item_sits_at_twelve_o_clock() {
        let center = Point::new(300.0, 300.0);
        let pos = item_position(0, 7, 120.0, 80.0, center);
        assert!((pos.x + 40.0 - 300.0).abs() < EPS);
        assert!((pos.y + 40.0 - 180.0).abs() < EPS);
    }

    #[test]
    fn sparse_wheels_use_the_radius_floor() {
        for count in 0..MIN_RADIUS_BELOW_COUNT {
            assert_eq!(radius(count, 80.0, 20.0), MIN_RADIUS);
        }
        let five = radius(5, 80.0, 20.0);
        assert!((five - 500.0 / (2.0 * PI)).abs() < EPS);
    }

    #[test]
    fn radius_has_no_jump_larger_than_the_floor() {
        for viewport in [ViewportClass::Narrow, ViewportClass::Normal] {
            let d = item_size(viewport);
            let p = item_padding(d);
            let jump = (radius(5, d, p) - radius(4, d, p)).abs();
            assert!(jump <= MIN_RADIUS);
        }
    }

    #[test]
    fn radius_grows_with_count_once_dense() {
        let mut previous = radius(MIN_RADIUS_BELOW_COUNT, 60.0, 15.0);
        for count in MIN_RADIUS_BELOW_COUNT + 1..200 {
            let current = radius(count, 60.0, 15.0);
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn degenerate_lengths_never_produce_nan() {
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let r = radius(8, bad, bad);
            assert!(r.is_finite() && r > 0.0);
            let pos = item_position(3, 8, r, bad, Point::default());
            assert!(pos.x.is_finite() && pos.y.is_finite());
            let size = container_size(r, bad, bad, bad, bad);
            assert!(size.is_finite() && size > 0.0);
        }
        let pos = item_position(0, 0, 100.0, 80.0, Point::default());
        assert!(pos.x.is_finite() && pos.y.is_finite());
    }

    #[test]
    fn viewport_breakpoint() {
        assert_eq!(ViewportClass::from_width(768.0), ViewportClass::Narrow);
        assert_eq!(ViewportClass::from_width(769.0), ViewportClass::Normal);
        assert_eq!(item_size(ViewportClass::Narrow), 60.0);
        assert_eq!(item_size(ViewportClass::Normal), 80.0);
        assert_eq!("NARROW".parse::<ViewportClass>().ok(), Some(ViewportClass::Narrow));
    }

    #[test]
    fn container_holds_every_item_and_label() {
        for viewport in [ViewportClass::Narrow, ViewportClass::Normal] {
            for count in [0usize, 1, 2, 5, 20, 100] {
                let preview = LayoutParams::preview(count, viewport);
                let exports = [1, 4, 10].map(|s| LayoutParams::export(count, viewport, s));
                for params in std::iter::once(preview).chain(exports) {
                    let size = params.container_size();
                    let center = Point::new(size / 2.0, size / 2.0);
                    for index in 0..count {
                        let item = Rect::new(
                            params.item_position(index, count, center),
                            params.item_diameter,
                            params.item_diameter,
                        );
                        assert!(item.fits_within(size), "item {index}/{count}");
                        let label = Rect::centered(
                            params.label_position(index, count, center),
                            params.label_height,
                            params.label_height,
                        );
                        assert!(label.fits_within(size), "label {index}/{count}");
                    }
                }
            }
        }
    }

    #[test]
    fn export_is_a_similar_copy_of_scale_one() {
        let count = 9;
        let base = LayoutParams::export(count, ViewportClass::Normal, 1);
        let base_center = Point::new(base.container_size() / 2.0, base.container_size() / 2.0);
        for scale in [2u32, 4, 10] {
            let params = LayoutParams::export(count, ViewportClass::Normal, scale);
            let size = params.container_size();
            assert!((size - base.container_size() * scale as f64).abs() < 1e-6);
            let center = Point::new(size / 2.0, size / 2.0);
            for index in 0..count {
                let expected = base
                    .item_position(index, count, base_center)
                    .scaled(scale as f64);
                let actual = params.item_position(index, count, center);
                assert!(actual.distance(expected) < 1e-6);
            }
        }
    }

    #[test]
    fn export_scale_is_clamped() {
        let low = LayoutParams::export(3, ViewportClass::Normal, 0);
        let high = LayoutParams::export(3, ViewportClass::Normal, 99);
        assert_eq!(low.scale, 1.0);
        assert_eq!(high.scale, MAX_SCALE_FACTOR as f64);
    }

    #[test]
    fn export_margin_is_one_item_diameter() {
        let params = LayoutParams::export(6, ViewportClass::Normal, 4);
        assert_eq!(params.margin, params.item_diameter);
        assert_eq!(params.label_height, 16.0 * 4.0);
        let expected = 2.0
            * (params.radius
                + params.item_diameter / 2.0
                + params.label_clearance
                + params.label_height / 2.0)
            + 2.0 * params.item_diameter;
        assert!((params.container_size() - expected).abs() < EPS);
    }
}
