use crate::collection::{Item, ItemId, Label};
use crate::geometry::{self, EMPTY_CONTAINER_SIZE, LayoutParams, Point, Rect, ViewportClass};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelAnchor {
    pub text: Label,
    pub center: Point,
}

/// Where one item lands on the wheel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub id: ItemId,
    pub index: usize,
    pub angle: f64,
    pub bounds: Rect,
    pub label: Option<LabelAnchor>,
}

/// The wheel as a renderer sees it: either the empty placeholder state or a
/// square container with one placement per item, in collection order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum WheelLayout {
    Empty {
        size: f64,
    },
    Wheel {
        size: f64,
        center: Point,
        params: LayoutParams,
        placements: Vec<Placement>,
    },
}

impl WheelLayout {
    pub fn preview(items: &[Item], viewport: ViewportClass) -> Self {
        Self::plan(items, LayoutParams::preview(items.len(), viewport))
    }

    pub fn export(items: &[Item], viewport: ViewportClass, scale: u32) -> Self {
        Self::plan(items, LayoutParams::export(items.len(), viewport, scale))
    }

    pub fn plan(items: &[Item], params: LayoutParams) -> Self {
        if items.is_empty() {
            return Self::Empty {
                size: EMPTY_CONTAINER_SIZE,
            };
        }

        let count = items.len();
        let size = params.container_size();
        let center = Point::new(size / 2.0, size / 2.0);

        let placements = items
            .iter()
            .enumerate()
            .map(|(index, item)| Placement {
                id: item.id.clone(),
                index,
                angle: geometry::angle_degrees(index, count),
                bounds: Rect::new(
                    params.item_position(index, count, center),
                    params.item_diameter,
                    params.item_diameter,
                ),
                label: item.label.is_visible().then(|| LabelAnchor {
                    text: item.label.clone(),
                    center: params.label_position(index, count, center),
                }),
            })
            .collect();

        log::debug!("Planned wheel of {count} item(s), container {size:.1}");

        Self::Wheel {
            size,
            center,
            params,
            placements,
        }
    }

    pub fn size(&self) -> f64 {
        match self {
            Self::Empty { size } | Self::Wheel { size, .. } => *size,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    pub fn params(&self) -> Option<&LayoutParams> {
        match self {
            Self::Empty { .. } => None,
            Self::Wheel { params, .. } => Some(params),
        }
    }

    pub fn placements(&self) -> &[Placement] {
        match self {
            Self::Empty { .. } => &[],
            Self::Wheel { placements, .. } => placements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{Collection, ImageSource};

    fn collection(labels: &[&str]) -> Collection {
        let mut collection = Collection::new();
        for label in labels {
            let id = collection.add(ImageSource::from("data:image/png;base64,AA=="));
            collection.relabel(&id, Label::from(*label)).unwrap();
        }
        collection
    }

    #[test]
    fn empty_collection_collapses_to_placeholder() {
        let layout = WheelLayout::preview(&[], ViewportClass::Normal);
        assert!(layout.is_empty());
        assert_eq!(layout.size(), EMPTY_CONTAINER_SIZE);
        assert!(layout.placements().is_empty());
        assert!(layout.params().is_none());
    }

    #[test]
    fn removing_the_last_item_returns_to_empty() {
        let mut collection = collection(&["only"]);
        assert!(!WheelLayout::preview(collection.items(), ViewportClass::Normal).is_empty());
        let id = collection.items()[0].id.clone();
        collection.remove(&id).unwrap();
        let layout = WheelLayout::preview(collection.items(), ViewportClass::Normal);
        assert_eq!(layout, WheelLayout::Empty { size: 600.0 });
    }

    #[test]
    fn blank_labels_get_no_anchor() {
        let collection = collection(&["Ada", "", "   ", "Lin"]);
        let layout = WheelLayout::preview(collection.items(), ViewportClass::Normal);
        let anchored: Vec<_> = layout
            .placements()
            .iter()
            .map(|p| p.label.is_some())
            .collect();
        assert_eq!(anchored, vec![true, false, false, true]);
    }

    #[test]
    fn reorder_moves_angular_assignment_with_the_item() {
        let mut collection = collection(&["a", "b", "c", "d", "e", "f"]);
        let moved = collection.items()[1].id.clone();
        collection.move_item(1, 4).unwrap();
        let layout = WheelLayout::preview(collection.items(), ViewportClass::Normal);
        let placement = layout
            .placements()
            .iter()
            .find(|p| p.id == moved)
            .unwrap();
        assert_eq!(placement.index, 4);
        assert!((placement.angle - (4.0 * 60.0 - 90.0)).abs() < 1e-9);
        let order: Vec<_> = layout
            .placements()
            .iter()
            .map(|p| p.label.as_ref().unwrap().text.to_string())
            .collect();
        assert_eq!(order, vec!["a", "c", "d", "e", "b", "f"]);
    }

    #[test]
    fn preview_sizes_match_the_live_view() {
        let collection = collection(&["", "", ""]);
        let layout = WheelLayout::preview(collection.items(), ViewportClass::Normal);
        // radius floor 100, item 80, clearance 15, label 20, padding 20
        assert!((layout.size() - 2.0 * (100.0 + 40.0 + 15.0 + 10.0) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn layout_serializes_with_state_tag() {
        let value = serde_json::to_value(WheelLayout::preview(&[], ViewportClass::Normal)).unwrap();
        assert_eq!(value["state"], "empty");
        assert_eq!(value["size"], 600.0);
    }
}
