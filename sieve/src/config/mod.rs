//! Configuration
//!
//! ```toml
//! [compiler]
//! strict = true
//! default_sort = [["SORT", "asc"], ["ID", "desc"]]
//!
//! [hierarchy]
//! flag = "INCLUDE_SUBSECTIONS"
//!
//! [elastic]
//! url = "http://localhost:9200"
//! timeout_ms = 30000
//!
//! [sync]
//! min_total_fields_limit = 0
//! ```

use crate::query::{FilterCompiler, HierarchyFields, SortCompiler, SortDirective};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SieveConfig {
    #[serde(default)]
    pub compiler: CompilerConfig,
    #[serde(default)]
    pub hierarchy: HierarchyFields,
    #[serde(default)]
    pub elastic: ElasticConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CompilerConfig {
    /// Fail on the first bad filter or sort entry instead of dropping it
    #[serde(default = "default_strict")]
    pub strict: bool,
    /// Sort applied when the caller gives none, as `[field, directive]` pairs
    #[serde(default = "default_sort")]
    pub default_sort: Vec<(String, String)>,
}

fn default_strict() -> bool {
    true
}

fn default_sort() -> Vec<(String, String)> {
    vec![
        ("SORT".to_string(), "asc".to_string()),
        ("ID".to_string(), "desc".to_string()),
    ]
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            strict: default_strict(),
            default_sort: default_sort(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ElasticConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_ms: default_timeout_ms(),
            username: None,
            password: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Lowest value the total field limit is raised to (0 = exactly what is needed)
    #[serde(default)]
    pub min_total_fields_limit: u64,
}

impl SieveConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SieveConfig = toml::from_str(content).context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from `path`, or the defaults if the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (field, directive) in &self.compiler.default_sort {
            SortDirective::parse(field.as_str(), directive)
                .map_err(|e| anyhow!("compiler.default_sort: {e}"))?;
        }
        if self.hierarchy.flag.is_empty() {
            return Err(anyhow!("hierarchy.flag must not be empty"));
        }
        if self.elastic.url.is_empty() {
            return Err(anyhow!("elastic.url must not be empty"));
        }
        Ok(())
    }

    /// Filter compiler configured with this mode and hierarchy fields
    pub fn filter_compiler(&self) -> FilterCompiler {
        FilterCompiler::new(self.compiler.strict).with_hierarchy(self.hierarchy.clone())
    }

    pub fn sort_compiler(&self) -> SortCompiler {
        SortCompiler::new(self.compiler.strict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SieveConfig::default();
        assert!(config.compiler.strict);
        assert_eq!(config.compiler.default_sort[0], ("SORT".to_string(), "asc".to_string()));
        assert_eq!(config.hierarchy.flag, "INCLUDE_SUBSECTIONS");
        assert_eq!(config.elastic.url, "http://localhost:9200");
        assert_eq!(config.sync.min_total_fields_limit, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = SieveConfig::from_toml_str(
            r#"
            [compiler]
            strict = false

            [hierarchy]
            direct_ids = "SECTION_IDS"
            "#,
        )
        .unwrap();
        assert!(!config.compiler.strict);
        assert_eq!(config.compiler.default_sort.len(), 2);
        assert_eq!(config.hierarchy.direct_ids, "SECTION_IDS");
        assert_eq!(config.hierarchy.transitive_ids, "NAV_CHAIN_IDS");
        assert!(!config.filter_compiler().is_strict());
    }

    #[test]
    fn test_invalid_default_sort() {
        let err = SieveConfig::from_toml_str(
            r#"
            [compiler]
            default_sort = [["ID", "upwards"]]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("default_sort"));
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("conf").join("sieve.toml");

        let mut config = SieveConfig::default();
        config.elastic.url = "http://search:9200".to_string();
        config.sync.min_total_fields_limit = 2000;
        config.save(&path)?;

        let loaded = SieveConfig::load_or_default(&path)?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_missing_file_gives_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let loaded = SieveConfig::load_or_default(&dir.path().join("absent.toml"))?;
        assert_eq!(loaded, SieveConfig::default());
        Ok(())
    }
}
