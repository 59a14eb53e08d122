//! Category query configuration for the retailer's search API.
//!
//! The retailer indexes products by a localized category facet; the set of
//! facets the pipeline cares about lives in a YAML file so operators can
//! extend it without a deploy. Each entry carries the facet token and
//! whether it hangs under the alcohol-free main category (which needs a
//! different query shape).

use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CategoryQuery {
    /// Facet token as it appears in the retailer's query string.
    pub token: String,
    /// Sub-categories of the alcohol-free tree query by main + sub facet.
    #[serde(default)]
    pub alcohol_free: bool,
}

#[derive(Debug, Deserialize)]
struct CategoryFile {
    categories: Vec<CategoryQuery>,
}

/// Load the category list from a YAML file.
///
/// # Errors
///
/// Returns [`ConfigError::CategoryFile`] if the file cannot be read or
/// parsed, or contains no categories.
pub fn load_categories(path: &Path) -> Result<Vec<CategoryQuery>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoryFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let file: CategoryFile =
        serde_yaml::from_str(&raw).map_err(|e| ConfigError::CategoryFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    if file.categories.is_empty() {
        return Err(ConfigError::CategoryFile {
            path: path.display().to_string(),
            reason: "no categories defined".to_string(),
        });
    }

    Ok(file.categories)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_category_yaml() {
        let yaml = "categories:\n  - token: øl\n  - token: sider\n  - token: alkoholfritt_alkoholfritt_øl\n    alcohol_free: true\n";
        let file: CategoryFile = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(file.categories.len(), 3);
        assert!(!file.categories[0].alcohol_free);
        assert!(file.categories[2].alcohol_free);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = load_categories(Path::new("/nonexistent/categories.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::CategoryFile { .. }));
    }
}
