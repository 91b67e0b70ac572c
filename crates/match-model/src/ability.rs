//! Tactical-ability vocabulary.
//!
//! Maps the classifier's ability labels to a coarse category used for
//! focal-point attribution and overlay captions. The table is validated at
//! construction so an unknown category name fails loudly instead of
//! silently mis-categorizing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Coarse tactical category for an ability label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityCategory {
    AreaControl,
    Ultimate,
    Recon,
}

impl AbilityCategory {
    /// Human-readable caption used by the overlay compositor.
    pub fn caption(&self) -> &'static str {
        match self {
            AbilityCategory::AreaControl => "AREA CONTROL",
            AbilityCategory::Ultimate => "ULTIMATE",
            AbilityCategory::Recon => "RECON",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "area_control" => Some(AbilityCategory::AreaControl),
            "ultimate" => Some(AbilityCategory::Ultimate),
            "recon" => Some(AbilityCategory::Recon),
            _ => None,
        }
    }
}

/// Error raised for an unknown category name in a catalog override.
#[derive(Debug, thiserror::Error)]
#[error("unknown ability category {category:?} for label {label:?}")]
pub struct UnknownCategory {
    pub label: String,
    pub category: String,
}

/// Static ability-label -> category table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityCatalog {
    entries: BTreeMap<String, AbilityCategory>,
}

impl Default for AbilityCatalog {
    fn default() -> Self {
        use AbilityCategory::*;
        let entries = [
            ("smoke", AreaControl),
            ("smoke_friend", AreaControl),
            ("smoke_enemy", AreaControl),
            ("astra_ult_enemy", Ultimate),
            ("astra_ult_friend", Ultimate),
            ("viper_pit_enemy", Ultimate),
            ("viper_pit_friend", Ultimate),
            ("fade_haunt_f", Recon),
            ("fade_prowler_f", Recon),
            ("sova_drone_e", Recon),
            ("sova_recon_e", Recon),
            ("skye_dog_e", Recon),
            ("skye_bird_e", Recon),
        ]
        .into_iter()
        .map(|(label, category)| (label.to_string(), category))
        .collect();
        Self { entries }
    }
}

impl AbilityCatalog {
    /// Build a catalog from `(label, category_name)` pairs, failing fast on
    /// an unknown category name.
    pub fn from_named_pairs<I, S>(pairs: I) -> Result<Self, UnknownCategory>
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut entries = BTreeMap::new();
        for (label, category) in pairs {
            let parsed =
                AbilityCategory::parse(category.as_ref()).ok_or_else(|| UnknownCategory {
                    label: label.as_ref().to_string(),
                    category: category.as_ref().to_string(),
                })?;
            entries.insert(label.as_ref().to_string(), parsed);
        }
        Ok(Self { entries })
    }

    /// Category of a tactical label, `None` for non-tactical labels.
    pub fn category(&self, label: &str) -> Option<AbilityCategory> {
        self.entries.get(label).copied()
    }

    /// Whether the label is a tactical ability at all.
    pub fn is_tactical(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
