// src/weights.rs
//! # Station Weights
//!
//! Mapping from station display names to relative audience share, plus the
//! weighted distribution stage that reallocates article counts per station
//! proportional to those weights.
//!
//! - Derived from the station directory by default; a JSON override file
//!   can replace it wholesale.
//! - Stations absent from the mapping contribute nothing to a weighted
//!   batch (the mapping is the roster).
//! - Exposed as an independent stage: configuration chooses between this
//!   and the window-based diversity limiter, never both.

use std::collections::BTreeMap;
use std::{fs, path::Path};

use serde::Deserialize;

use crate::model::Article;
use crate::sources::config::StationDirectory;

/// Default cap on the size of a weighted batch.
pub const DEFAULT_WEIGHTED_CAP: usize = 50;

/// Relative audience weights per station, loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct StationWeights {
    /// Station display name → relative audience share. Values are relative,
    /// not normalized; only their ratios matter.
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
}

impl StationWeights {
    /// Collect the weights declared in the station directory.
    pub fn from_directory(dir: &StationDirectory) -> Self {
        let weights = dir
            .stations
            .iter()
            .filter_map(|s| s.weight.map(|w| (s.name.clone(), w)))
            .collect();
        Self { weights }
    }

    /// Load weights from a JSON override file, falling back to the station
    /// directory's declared weights on any read or parse error.
    pub fn load_from_file<P: AsRef<Path>>(path: P, fallback: &StationDirectory) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|_| Self::from_directory(fallback)),
            Err(_) => Self::from_directory(fallback),
        }
    }

    pub fn weight_for(&self, source: &str) -> Option<f64> {
        self.weights.get(source).copied()
    }

    fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }
}

/// Reallocate a date-sorted batch so each station's share of the output is
/// proportional to its configured weight.
///
/// Groups by source, keeps the newest `floor(weight/total * min(len, cap))`
/// items per configured station, then re-sorts the concatenation by publish
/// time descending. Stations with no configured weight are excluded.
pub fn apply_weights(articles: Vec<Article>, weights: &StationWeights, cap: usize) -> Vec<Article> {
    let total = weights.total_weight();
    if total <= 0.0 {
        tracing::warn!("no station weights configured; weighted batch is empty");
        return Vec::new();
    }

    let before = articles.len();
    let batch_size = before.min(cap);

    // Group by source, preserving each group's (date-desc) input order.
    let mut groups: BTreeMap<String, Vec<Article>> = BTreeMap::new();
    for article in articles {
        groups
            .entry(article.source.clone())
            .or_default()
            .push(article);
    }

    let mut kept: Vec<Article> = Vec::with_capacity(batch_size);
    for (source, mut group) in groups {
        let Some(weight) = weights.weight_for(&source) else {
            continue;
        };
        let target = ((weight / total) * batch_size as f64).floor() as usize;
        group.truncate(target);
        kept.extend(group);
    }

    kept.sort_by(|a, b| b.published.cmp(&a.published));

    tracing::info!(before, after = kept.len(), "weighted distribution");
    kept
}
