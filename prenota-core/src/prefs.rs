use std::collections::HashMap;

use log::warn;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TypeFilter;

pub const SOUND_KEY: &str = "galax_admin_sound";
pub const VIEW_MODE_KEY: &str = "galax_admin_view_mode";
pub const TYPE_FILTER_KEY: &str = "galax_admin_type_filter";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not access preference store: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not encode preferences: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// A small key-value store for client preferences.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ViewMode {
    /// Cards on narrow screens, table otherwise
    #[default]
    Auto,
    Tabella,
    Card,
}

impl ViewMode {
    pub fn cycle(self) -> Self {
        match self {
            Self::Auto => Self::Tabella,
            Self::Tabella => Self::Card,
            Self::Card => Self::Auto,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "AUTO",
            Self::Tabella => "TABELLA",
            Self::Card => "CARD",
        }
    }

    fn parse(input: &str) -> Option<Self> {
        match input {
            "AUTO" => Some(Self::Auto),
            "TABELLA" => Some(Self::Tabella),
            "CARD" => Some(Self::Card),
            _ => None,
        }
    }
}

impl TypeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tutti => "TUTTI",
            Self::Consegna => "CONSEGNA",
            Self::Ritiro => "RITIRO",
        }
    }

    fn parse(input: &str) -> Option<Self> {
        match input {
            "TUTTI" => Some(Self::Tutti),
            "CONSEGNA" => Some(Self::Consegna),
            "RITIRO" => Some(Self::Ritiro),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelPreferences {
    pub sound_on: bool,
    pub view_mode: ViewMode,
    pub type_filter: TypeFilter,
}

impl Default for PanelPreferences {
    fn default() -> Self {
        Self {
            sound_on: true,
            view_mode: Default::default(),
            type_filter: Default::default(),
        }
    }
}

impl PanelPreferences {
    /// Reads stored preferences. Unknown stored values keep the default.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let defaults = Self::default();

        Self {
            sound_on: store
                .get(SOUND_KEY)
                .map(|v| v == "1")
                .unwrap_or(defaults.sound_on),
            view_mode: store
                .get(VIEW_MODE_KEY)
                .and_then(|v| ViewMode::parse(&v))
                .unwrap_or(defaults.view_mode),
            type_filter: store
                .get(TYPE_FILTER_KEY)
                .and_then(|v| TypeFilter::parse(&v))
                .unwrap_or(defaults.type_filter),
        }
    }

    pub fn save(&self, store: &dyn PreferenceStore) -> Result<(), StoreError> {
        store.set(SOUND_KEY, if self.sound_on { "1" } else { "0" })?;
        store.set(VIEW_MODE_KEY, self.view_mode.as_str())?;
        store.set(TYPE_FILTER_KEY, self.type_filter.as_str())?;

        Ok(())
    }

    /// Saves and logs failures, preferences are never worth interrupting the user for.
    pub fn persist(&self, store: &dyn PreferenceStore) {
        if let Err(e) = self.save(store) {
            warn!("{e}");
        }
    }

    pub fn toggle_sound(&mut self) {
        self.sound_on = !self.sound_on;
    }

    pub fn cycle_view_mode(&mut self) {
        self.view_mode = self.view_mode.cycle();
    }

    pub fn cycle_type_filter(&mut self) {
        self.type_filter = self.type_filter.cycle();
    }
}
