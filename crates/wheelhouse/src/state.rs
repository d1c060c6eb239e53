use crate::style::{HexColor, StyleConfig};
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, NoneAsEmptyString, serde_as};
use wheelcore::Collection;

/// Key of the single record kept in the key-value store.
pub const RECORD_KEY: &str = "characterWheelConfig";

/// The persisted shape of a wheel. Missing, null or empty fields fall back to
/// the defaults of [`StyleConfig`].
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WheelRecord {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub characters: Collection,
    #[serde_as(as = "DefaultOnNull<NoneAsEmptyString>")]
    #[serde(default)]
    pub outline_color: Option<HexColor>,
    #[serde_as(as = "DefaultOnNull<NoneAsEmptyString>")]
    #[serde(default)]
    pub wheel_bg_color: Option<HexColor>,
    #[serde_as(as = "DefaultOnNull<NoneAsEmptyString>")]
    #[serde(default)]
    pub label_text_color: Option<HexColor>,
    #[serde_as(as = "DefaultOnNull<NoneAsEmptyString>")]
    #[serde(default)]
    pub label_bg_color: Option<HexColor>,
    #[serde(default)]
    pub outline_toggle_checked: Option<bool>,
}

/// Collection plus style: everything a render or a save needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WheelState {
    pub collection: Collection,
    pub style: StyleConfig,
}

impl From<WheelRecord> for WheelState {
    fn from(record: WheelRecord) -> Self {
        let defaults = StyleConfig::default();
        Self {
            collection: record.characters,
            style: StyleConfig {
                outline_enabled: record
                    .outline_toggle_checked
                    .unwrap_or(defaults.outline_enabled),
                outline_color: record.outline_color.unwrap_or(defaults.outline_color),
                wheel_background: record.wheel_bg_color.unwrap_or(defaults.wheel_background),
                label_text: record.label_text_color.unwrap_or(defaults.label_text),
                label_background: record.label_bg_color.unwrap_or(defaults.label_background),
            },
        }
    }
}

impl From<&WheelState> for WheelRecord {
    fn from(state: &WheelState) -> Self {
        Self {
            characters: state.collection.clone(),
            outline_color: Some(state.style.outline_color),
            wheel_bg_color: Some(state.style.wheel_background),
            label_text_color: Some(state.style.label_text),
            label_bg_color: Some(state.style.label_background),
            outline_toggle_checked: Some(state.style.outline_enabled),
        }
    }
}

impl WheelState {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<WheelRecord>(json).map(Self::from)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&WheelRecord::from(self))
    }

    pub fn controls(&self) -> Controls {
        Controls::for_count(self.collection.len())
    }
}

/// Which actions make sense for the current state. Loading is always offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub export: bool,
    pub clear: bool,
    pub shuffle: bool,
    pub save: bool,
    pub load: bool,
}

impl Controls {
    pub fn for_count(count: usize) -> Self {
        let populated = count > 0;
        Self {
            export: populated,
            clear: populated,
            shuffle: populated,
            save: populated,
            load: true,
        }
    }
}
