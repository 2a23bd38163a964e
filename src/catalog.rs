use crate::error::{ArtworkMatchError, Result};
use artwork_match_common::Catalog;
use std::path::Path;

/// カタログを読み込む（パス省略時は組み込みカタログ）
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let Some(path) = path else {
        return Ok(Catalog::builtin());
    };

    if !path.is_file() {
        return Err(ArtworkMatchError::NotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let catalog = Catalog::from_json(&content)
        .map_err(|e| ArtworkMatchError::Catalog(format!("{}: {}", path.display(), e)))?;

    tracing::debug!(path = %path.display(), entries = catalog.len(), "カタログを読み込み");
    Ok(catalog)
}
