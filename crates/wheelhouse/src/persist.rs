use crate::batch;
use crate::notice::Notice;
use crate::render::codec;
use crate::state::{RECORD_KEY, WheelState};
use crate::store::{KeyValueStore, StoreError};
use thiserror::Error;
use wheelcore::ImageSource;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Failed to serialize wheel: {0}")]
    Serialize(serde_json::Error),
    #[error("Saved wheel is corrupt: {0}")]
    Corrupt(serde_json::Error),
}

impl PersistError {
    pub fn notice(&self) -> Notice {
        match self {
            Self::Store(e) if e.is_quota() => Notice::error(
                "Storage is full. Try reducing the number or size of images before saving.",
            ),
            Self::Corrupt(e) => Notice::error(format!("Error loading saved wheel: {e}")),
            other => Notice::error(format!("Failed to save wheel: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    pub items: usize,
    pub resized: usize,
}

impl SaveReport {
    pub fn notice(&self) -> Notice {
        if self.resized == 0 {
            Notice::success("Wheel saved.")
        } else {
            Notice::success(format!(
                "Wheel saved. {} large image(s) were resized to fit in storage.",
                self.resized
            ))
        }
    }
}

/// Writes `state` under the single record key, downscaling any image whose
/// longer side exceeds `max_dimension` first. The caller's state is left
/// untouched; only the stored copy carries the smaller images.
pub async fn save(
    store: &dyn KeyValueStore,
    state: &WheelState,
    max_dimension: u32,
) -> Result<SaveReport, PersistError> {
    let images: Vec<ImageSource> = state.collection.iter().map(|i| i.image.clone()).collect();
    let shrunk = batch::fan_out(
        images,
        move |image| match codec::shrink_for_storage(&image, max_dimension) {
            Ok(shrunk) => shrunk,
            Err(e) => {
                log::warn!("Keeping image at its original size: {}", e);
                None
            }
        },
        |_| None,
    )
    .await;

    let mut stored = state.clone();
    let mut resized = 0;
    for (item, replacement) in state.collection.iter().zip(shrunk) {
        if let Some(image) = replacement {
            // ids come from the same collection, so the lookup cannot miss
            if stored.collection.replace_image(&item.id, image).is_ok() {
                resized += 1;
            }
        }
    }

    let json = stored.to_json().map_err(PersistError::Serialize)?;
    store.set(RECORD_KEY, &json)?;
    let report = SaveReport {
        items: state.collection.len(),
        resized,
    };
    log::info!(
        "Saved {} item(s), {} resized ({} bytes)",
        report.items,
        report.resized,
        json.len()
    );
    Ok(report)
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Nothing has been saved yet.
    Missing,
    Loaded {
        state: WheelState,
        /// Images that no longer decode; they render blank.
        unreadable: usize,
    },
}

impl LoadOutcome {
    pub fn notice(&self) -> Notice {
        match self {
            Self::Missing => Notice::info("No saved wheel found. Starting with a new wheel."),
            Self::Loaded { state, .. } if state.collection.is_empty() => {
                Notice::info("Loaded saved settings. The saved wheel has no images.")
            }
            Self::Loaded { unreadable: 0, .. } => Notice::success("Wheel loaded."),
            Self::Loaded { unreadable, .. } => Notice::info(format!(
                "Wheel loaded, but {unreadable} image(s) could not be read."
            )),
        }
    }
}

/// Reads the record back and decodes every image up front so a broken one is
/// reported now rather than at render time.
pub async fn load(store: &dyn KeyValueStore) -> Result<LoadOutcome, PersistError> {
    let record = match store.get(RECORD_KEY) {
        Err(StoreError::Corrupt(e)) => return Err(PersistError::Corrupt(e)),
        other => other?,
    };
    let Some(json) = record else {
        log::info!("No saved wheel under {RECORD_KEY}");
        return Ok(LoadOutcome::Missing);
    };
    let state = WheelState::from_json(&json).map_err(PersistError::Corrupt)?;

    let images: Vec<ImageSource> = state.collection.iter().map(|i| i.image.clone()).collect();
    let readable = batch::fan_out(
        images,
        |image| match codec::load_pixbuf(&image) {
            Ok(_) => true,
            Err(e) => {
                log::warn!("Saved image does not decode: {}", e);
                false
            }
        },
        |_| false,
    )
    .await;
    let unreadable = readable.iter().filter(|ok| !**ok).count();

    log::info!(
        "Loaded {} item(s), {} unreadable",
        state.collection.len(),
        unreadable
    );
    Ok(LoadOutcome::Loaded { state, unreadable })
}
