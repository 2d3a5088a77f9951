//! Configuration file support for docmeta CLI
//!
//! Loads settings from `_docmeta.toml` configuration file.

use anyhow::{Context, Result};
use docmeta_core::{Conventions, TypeMappingCache};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "_docmeta.toml";

/// Schema URL for the configuration file
pub const SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/docmeta/docmeta/main/crates/docmeta-cli/schema/docmeta.schema.json";

/// Root configuration structure
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Output configuration
    #[serde(skip_serializing_if = "OutputConfig::is_empty")]
    pub output: OutputConfig,
    /// Which types and members are emitted
    #[serde(skip_serializing_if = "FilterConfig::is_empty")]
    pub filter: FilterConfig,
    /// Type mapping configuration
    #[serde(skip_serializing_if = "TypesConfig::is_empty")]
    pub types: TypesConfig,
    /// Naming and annotation conventions of the documented code base
    #[serde(skip_serializing_if = "ConventionsConfig::is_empty")]
    pub conventions: ConventionsConfig,
}

/// Output configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "xml" or "json" (default: "xml")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Name of the XML root element (default: "apidoc")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    /// Spaces per XML indentation level (default: 2)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent: Option<usize>,
    /// File receiving the warnings report (default: standard error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<PathBuf>,
}

impl OutputConfig {
    fn is_empty(&self) -> bool {
        self.format.is_none() && self.root.is_none() && self.indent.is_none() && self.warnings.is_none()
    }
}

/// Filter configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct FilterConfig {
    /// Categories to emit, in this order (default: every category present)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    /// Emit deprecated types and members (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_deprecated: Option<bool>,
    /// Members to hide, as "Type#officialName"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_members: Option<Vec<String>>,
}

impl FilterConfig {
    fn is_empty(&self) -> bool {
        self.categories.is_none() && self.include_deprecated.is_none() && self.hidden_members.is_none()
    }
}

/// Type mapping configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct TypesConfig {
    /// Map types by short name or public name (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_match: Option<bool>,
    /// Map undocumented types onto documented subtypes (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infer: Option<bool>,
    /// Additional fixed mappings: qualified implementation type -> qualified public type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mappings: Option<BTreeMap<String, String>>,
}

impl TypesConfig {
    fn is_empty(&self) -> bool {
        self.partial_match.is_none() && self.infer.is_none() && self.mappings.is_none()
    }

    /// A seeded mapping cache extended with the configured mappings
    pub fn mapping_cache(&self) -> TypeMappingCache {
        self.mappings
            .iter()
            .flatten()
            .fold(TypeMappingCache::new(), |cache, (from, to)| cache.with_seed(from, to))
    }
}

/// Conventions configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct ConventionsConfig {
    /// Constructor method prefix (default: "jsConstructor_")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constructor_prefix: Option<String>,
    /// Function method prefix (default: "jsFunction_")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_prefix: Option<String>,
    /// Property getter prefix (default: "jsGet_")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub getter_prefix: Option<String>,
    /// Property setter prefix (default: "jsSet_")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setter_prefix: Option<String>,
    /// Generic member prefix (default: "js_")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_prefix: Option<String>,
    /// Annotation that documents a type (default: "Documented")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documented_annotation: Option<String>,
    /// Annotation that deprecates a type or member (default: "Deprecated")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated_annotation: Option<String>,
    /// Category of documented types that name none (default: "default")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_category: Option<String>,
}

impl ConventionsConfig {
    fn is_empty(&self) -> bool {
        self.constructor_prefix.is_none()
            && self.function_prefix.is_none()
            && self.getter_prefix.is_none()
            && self.setter_prefix.is_none()
            && self.member_prefix.is_none()
            && self.documented_annotation.is_none()
            && self.deprecated_annotation.is_none()
            && self.default_category.is_none()
    }

    /// Built-in conventions with the configured values applied
    pub fn to_conventions(&self) -> Conventions {
        let mut conventions = Conventions::default();
        let overrides = [
            (&self.constructor_prefix, &mut conventions.constructor_prefix),
            (&self.function_prefix, &mut conventions.function_prefix),
            (&self.getter_prefix, &mut conventions.getter_prefix),
            (&self.setter_prefix, &mut conventions.setter_prefix),
            (&self.member_prefix, &mut conventions.member_prefix),
            (&self.documented_annotation, &mut conventions.documented_annotation),
            (&self.deprecated_annotation, &mut conventions.deprecated_annotation),
            (&self.default_category, &mut conventions.default_category),
        ];
        for (value, slot) in overrides {
            if let Some(value) = value {
                slot.clone_from(value);
            }
        }
        conventions
    }
}

impl Config {
    /// Load configuration from a specific file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Try to load configuration from a directory (looks for `_docmeta.toml`)
    ///
    /// Returns `Ok(None)` if the config file doesn't exist.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Generate JSON schema for the configuration
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Generate JSON schema as a string
    pub fn json_schema_string() -> Result<String> {
        let schema = Self::json_schema();
        serde_json::to_string_pretty(&schema).context("Failed to serialize JSON schema")
    }

    /// Serialize configuration to TOML string with schema directive
    pub fn to_toml_with_schema(&self) -> Result<String> {
        let toml_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        Ok(format!("#:schema {}\n\n{}", SCHEMA_URL, toml_content))
    }

    /// Create a sample configuration with common defaults for init command
    pub fn sample() -> Self {
        Config {
            output: OutputConfig {
                format: Some("xml".to_string()),
                root: Some("apidoc".to_string()),
                indent: Some(2),
                warnings: None, // standard error
            },
            filter: FilterConfig {
                categories: None, // every category
                include_deprecated: Some(true),
                hidden_members: None,
            },
            types: TypesConfig {
                partial_match: Some(true),
                infer: Some(true),
                mappings: None,
            },
            conventions: ConventionsConfig {
                documented_annotation: Some("Documented".to_string()),
                default_category: Some("default".to_string()),
                ..Default::default()
            },
        }
    }
}
