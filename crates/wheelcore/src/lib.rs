//! Item model and circular layout math for image wheels.
//!
//! Nothing in this crate touches pixels or files: it turns an ordered list of
//! items into angles, radii and container sizes, for the live preview and for
//! scaled exports alike.

pub mod macros;

pub mod collection;
pub mod geometry;
pub mod layout;

pub use collection::{Collection, CollectionError, ImageSource, Item, ItemId, Label};
pub use geometry::{LayoutParams, Point, Rect, ViewportClass};
pub use layout::{LabelAnchor, Placement, WheelLayout};
