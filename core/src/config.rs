use crate::cache::DEFAULT_CACHE_SIZE;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tag weights used by the offline indexer when building term frequencies.
/// The query engine carries them but does not rank with them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagWeights {
    pub header: f64,
    pub bold: f64,
    pub title: f64,
    pub cosine_similarity: f64,
}

impl Default for TagWeights {
    fn default() -> Self {
        Self { header: 1.0, bold: 1.0, title: 1.0, cosine_similarity: 1.0 }
    }
}

impl TagWeights {
    /// Scale the weights so they sum to 1.0.
    pub fn normalized(self) -> Result<Self> {
        let total = self.header + self.bold + self.title + self.cosine_similarity;
        if !(total.is_finite() && total > 0.0) {
            return Err(Error::Config(format!("tag weights must sum to a positive number, got {total}")));
        }
        Ok(Self {
            header: self.header / total,
            bold: self.bold / total,
            title: self.title / total,
            cosine_similarity: self.cosine_similarity / total,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSection {
    /// SimHash similarity at or above which two documents are duplicates.
    pub sim_thresh: f64,
    /// Number of results to return.
    pub k_results: usize,
    /// Fields to read per postings line, header fields included. Negative: no limit.
    pub r_docs: i64,
    pub cache_size: usize,
}

impl Default for GeneralSection {
    fn default() -> Self {
        Self { sim_thresh: 0.9, k_results: 10, r_docs: -1, cache_size: DEFAULT_CACHE_SIZE }
    }
}

/// On-disk shape of the configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    general: GeneralSection,
    weights: TagWeights,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub sim_thresh: f64,
    pub k_results: usize,
    pub r_docs: i64,
    pub cache_size: usize,
    /// Always normalized to sum to 1.0.
    pub weights: TagWeights,
}

impl Default for Config {
    fn default() -> Self {
        let general = GeneralSection::default();
        Self {
            sim_thresh: general.sim_thresh,
            k_results: general.k_results,
            r_docs: general.r_docs,
            cache_size: general.cache_size,
            weights: TagWeights { header: 0.25, bold: 0.25, title: 0.25, cosine_similarity: 0.25 },
        }
    }
}

impl Config {
    /// Load a JSON config file of the form `{"general": {..}, "weights": {..}}`.
    /// A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let buf = match std::fs::read_to_string(path) {
            Ok(buf) => buf,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_json(&buf)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        let general = file.general;
        if !(0.0..=1.0).contains(&general.sim_thresh) {
            return Err(Error::Config(format!("sim_thresh must be within [0, 1], got {}", general.sim_thresh)));
        }
        Ok(Self {
            sim_thresh: general.sim_thresh,
            k_results: general.k_results,
            r_docs: general.r_docs,
            cache_size: general.cache_size,
            weights: file.weights.normalized()?,
        })
    }

    /// Cap on fields per postings line; `None` when `r_docs` is negative.
    pub fn field_cap(&self) -> Option<usize> {
        usize::try_from(self.r_docs).ok()
    }
}
