use std::collections::HashSet;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Assets the offline page shell depends on.
const DEFAULT_RESOURCES: &[&str] = &[
    "./",
    "./index.html",
    "./style.css",
    "./script.js",
    "./manifest.json",
    "./assets/logo-wr-consultoria_app.png",
    "./assets/pagina_de_login_academia_mb.png",
];

/// Fixed list of resource identifiers pre-cached on install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub resource_ids: Vec<String>,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self::new(DEFAULT_RESOURCES.iter().map(|s| s.to_string()))
    }
}

impl AssetManifest {
    pub fn new(resource_ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            resource_ids: resource_ids.into_iter().collect(),
        }
    }

    /// Identifiers in manifest order with repeats dropped.
    pub fn ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.resource_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.resource_ids.is_empty()
    }
}

/// Resolve a resource identifier against the page's base URL.
pub fn resolve(base: &Url, id: &str) -> Result<Url, FetchError> {
    base.join(id).map_err(|e| FetchError::InvalidResource {
        id: id.to_string(),
        reason: e.to_string(),
    })
}
