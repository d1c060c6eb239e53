use derive_more::{AsRef, Deref, Display, From, Into};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ItemId(String);

crate::impl_string_newtype!(ItemId);

impl ItemId {
    /// Random version-4 UUID in its canonical hyphenated form.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// Handle to an item's image, usually a `data:` URL.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ImageSource(String);

crate::impl_string_newtype!(ImageSource);

#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    Deref,
    From,
    Into,
    AsRef,
)]
#[serde(transparent)]
pub struct Label(String);

crate::impl_string_newtype!(Label);

impl Label {
    /// Blank labels get no chip, in the preview or the export.
    pub fn is_visible(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(rename = "url")]
    pub image: ImageSource,
    #[serde(default)]
    pub label: Label,
}

impl Item {
    pub fn new(image: ImageSource) -> Self {
        Self {
            id: ItemId::generate(),
            image,
            label: Label::default(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CollectionError {
    #[error("No item with id {0}")]
    UnknownItem(ItemId),
    #[error("Index {index} is out of range for {len} item(s)")]
    OutOfRange { index: usize, len: usize },
    #[error("An item with id {0} already exists")]
    DuplicateId(ItemId),
}

/// Ordered items; the order is the single source of truth for angular position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Item>", into = "Vec<Item>")]
pub struct Collection {
    items: Vec<Item>,
}

impl TryFrom<Vec<Item>> for Collection {
    type Error = CollectionError;

    fn try_from(items: Vec<Item>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::new();
        if let Some(dup) = items.iter().find(|item| !seen.insert(&item.id)) {
            return Err(CollectionError::DuplicateId(dup.id.clone()));
        }
        Ok(Self { items })
    }
}

impl From<Collection> for Vec<Item> {
    fn from(collection: Collection) -> Self {
        collection.items
    }
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    /// Looks an item up by id, falling back to its 1-based display index.
    pub fn find(&self, key: &str) -> Option<&Item> {
        self.items
            .iter()
            .find(|item| item.id.as_str() == key)
            .or_else(|| {
                key.parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|index| self.items.get(index))
            })
    }

    pub fn add(&mut self, image: ImageSource) -> ItemId {
        let mut item = Item::new(image);
        while self.get(&item.id).is_some() {
            item.id = ItemId::generate();
        }
        let id = item.id.clone();
        self.items.push(item);
        id
    }

    pub fn extend(&mut self, images: impl IntoIterator<Item = ImageSource>) -> Vec<ItemId> {
        images.into_iter().map(|image| self.add(image)).collect()
    }

    pub fn remove(&mut self, id: &ItemId) -> Result<Item, CollectionError> {
        let index = self
            .position(id)
            .ok_or_else(|| CollectionError::UnknownItem(id.clone()))?;
        Ok(self.items.remove(index))
    }

    /// Takes the item out at `from` and reinserts it at `to`; everything else
    /// keeps its relative order.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<(), CollectionError> {
        let len = self.items.len();
        for index in [from, to] {
            if index >= len {
                return Err(CollectionError::OutOfRange { index, len });
            }
        }
        if from != to {
            let item = self.items.remove(from);
            self.items.insert(to, item);
        }
        Ok(())
    }

    pub fn relabel(&mut self, id: &ItemId, label: Label) -> Result<(), CollectionError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| CollectionError::UnknownItem(id.clone()))?;
        item.label = label;
        Ok(())
    }

    pub fn replace_image(&mut self, id: &ItemId, image: ImageSource) -> Result<(), CollectionError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| CollectionError::UnknownItem(id.clone()))?;
        item.image = image;
        Ok(())
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.items.shuffle(rng);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
