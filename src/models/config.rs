use quanthuff_codec::{Codec, MatchMode, OctreeOptions, Strategy};
use serde::{Deserialize, Deserializer};
use std::path::Path;

use crate::error::AppError;

/// Compression settings loaded from a YAML file.
///
/// Every field is optional in the file; missing ones take the library
/// defaults.
///
/// ```yaml
/// strategy: octree        # rounded-block | plain-block | octree
/// max_colors: 64
/// match_mode: exact       # quick | exact
/// max_nodes: 266817
/// ```
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Quantization strategy
    #[serde(deserialize_with = "deserialize_strategy")]
    pub strategy: Strategy,

    /// Octree palette size
    pub max_colors: usize,

    /// How pixels are matched to octree palette entries
    pub match_mode: MatchModeConfig,

    /// Live-node ceiling during octree classification
    pub max_nodes: usize,
}

/// YAML spelling of [`MatchMode`].
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchModeConfig {
    #[default]
    Quick,
    Exact,
}

impl From<MatchModeConfig> for MatchMode {
    fn from(mode: MatchModeConfig) -> Self {
        match mode {
            MatchModeConfig::Quick => MatchMode::Quick,
            MatchModeConfig::Exact => MatchMode::Exact,
        }
    }
}

fn deserialize_strategy<'de, D>(deserializer: D) -> Result<Strategy, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(serde::de::Error::custom)
}

impl Default for CodecConfig {
    fn default() -> Self {
        let octree = OctreeOptions::default();
        Self {
            strategy: Strategy::default(),
            max_colors: octree.max_colors,
            match_mode: MatchModeConfig::default(),
            max_nodes: octree.max_nodes,
        }
    }
}

impl CodecConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self, AppError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            strategy = %config.strategy,
            max_colors = config.max_colors,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line overrides on top of file values.
    pub fn with_overrides(
        mut self,
        strategy: Option<Strategy>,
        max_colors: Option<usize>,
        exact: bool,
    ) -> Self {
        if let Some(strategy) = strategy {
            self.strategy = strategy;
        }
        if let Some(max_colors) = max_colors {
            self.max_colors = max_colors;
        }
        if exact {
            self.match_mode = MatchModeConfig::Exact;
        }
        self
    }

    /// Build the codec these settings describe.
    pub fn codec(&self) -> Codec {
        Codec::new(self.strategy)
            .max_colors(self.max_colors)
            .match_mode(self.match_mode.into())
            .max_nodes(self.max_nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.strategy, Strategy::OctreePalette);
        assert_eq!(config.max_colors, 126);
        assert_eq!(config.match_mode, MatchModeConfig::Quick);
        assert_eq!(config.max_nodes, 266_817);
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
strategy: plain-block
max_colors: 32
match_mode: exact
max_nodes: 5000
"#;
        let config = CodecConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(
            config,
            CodecConfig {
                strategy: Strategy::PlainBlockAverage,
                max_colors: 32,
                match_mode: MatchModeConfig::Exact,
                max_nodes: 5000,
            }
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = CodecConfig::from_yaml_str("max_colors: 8\n").unwrap();
        assert_eq!(config.strategy, Strategy::OctreePalette);
        assert_eq!(config.max_colors, 8);
        assert_eq!(config.max_nodes, 266_817);
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let err = CodecConfig::from_yaml_str("strategy: median-cut\n").unwrap_err();
        assert!(err.to_string().contains("median-cut"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(CodecConfig::from_yaml_str("colours: 8\n").is_err());
    }

    #[test]
    fn test_overrides_win() {
        let config = CodecConfig::default().with_overrides(
            Some(Strategy::RoundedBlockAverage),
            Some(12),
            true,
        );
        assert_eq!(config.strategy, Strategy::RoundedBlockAverage);
        assert_eq!(config.max_colors, 12);
        assert_eq!(config.match_mode, MatchModeConfig::Exact);
    }

    #[test]
    fn test_absent_overrides_keep_file_values() {
        let config = CodecConfig::from_yaml_str("match_mode: exact\nmax_colors: 7\n")
            .unwrap()
            .with_overrides(None, None, false);
        assert_eq!(config.max_colors, 7);
        assert_eq!(config.match_mode, MatchModeConfig::Exact);
    }

    #[test]
    fn test_codec_from_config() {
        let codec = CodecConfig::from_yaml_str("max_colors: 9\nmatch_mode: exact\n")
            .unwrap()
            .codec();
        assert_eq!(codec.strategy(), Strategy::OctreePalette);
        assert_eq!(codec.options().max_colors, 9);
        assert_eq!(codec.options().match_mode, MatchMode::Exact);
    }

    #[test]
    fn test_load_missing_file() {
        let result = CodecConfig::load(Path::new("/nonexistent/quanthuff.yaml"));
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
