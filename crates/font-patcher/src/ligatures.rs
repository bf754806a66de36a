//! Ligature removal driven by a JSON configuration file.
//!
//! Monospaced fonts sometimes ship programming ligatures that do not survive patching well.
//! The configuration names GSUB features whose lookups are dropped entirely and single
//! lookups that are dropped from every feature:
//!
//! ```json
//! {
//!   "ligatures": {
//!     "features": ["liga", "calt"],
//!     "lookups": [12, 13]
//!   }
//! }
//! ```
//!
//! Lookups stay in the lookup list, so contextual lookups that reference them by index
//! remain valid. They are only disconnected from the features.

use std::{collections::BTreeSet, fs, path::Path};

use font_types::Tag;
use log::{debug, info};
use serde::Deserialize;
use write_fonts::tables::gsub::Gsub;

use crate::{Result, error::Error};

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    ligatures: Option<LigatureSection>,
}

#[derive(Debug, Default, Deserialize)]
struct LigatureSection {
    #[serde(default)]
    features: Vec<String>,
    #[serde(default)]
    lookups: Vec<u16>,
}

/// GSUB features and lookups to remove before patching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LigatureConfig {
    /// Features that lose all of their lookups.
    pub features: BTreeSet<Tag>,
    /// Lookup indices removed from every feature.
    pub lookups: BTreeSet<u16>,
}

impl LigatureConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(text)?;
        let Some(section) = file.ligatures else {
            info!("Configuration has no ligatures section, no ligatures removed");
            return Ok(Self::default());
        };
        let features = section
            .features
            .iter()
            .map(|name| name.parse::<Tag>().map_err(|_| Error::InvalidTag(name.clone())))
            .collect::<Result<_>>()?;
        Ok(Self { features, lookups: section.lookups.into_iter().collect() })
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty() && self.lookups.is_empty()
    }

    /// Disconnect the configured lookups from the features of `gsub`.
    ///
    /// Returns the number of removed feature to lookup references.
    pub fn apply(&self, gsub: &mut Gsub) -> usize {
        let mut removed = 0;
        for record in &mut gsub.feature_list.feature_records {
            let tag = record.feature_tag;
            let indices = &mut record.feature.lookup_list_indices;
            let before = indices.len();
            if self.features.contains(&tag) {
                indices.clear();
            } else {
                indices.retain(|index| !self.lookups.contains(index));
            }
            let count = before - indices.len();
            if count > 0 {
                debug!("Removed {count} lookups from feature '{tag}'");
            }
            removed += count;
        }
        removed
    }
}
