use serde::Deserialize;
use std::path::{Path, PathBuf};

use authzgen_core::schema::SchemaLimits;
use authzgen_core::{CompileOptions, DEFAULT_PACKAGE};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub codegen: CodegenConfig,
    pub schema_limits: SchemaLimitsConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    pub default_package: String,
    pub output_dir: PathBuf,
    pub file_extension: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchemaLimitsConfig {
    pub max_definitions: usize,
    pub max_relations_per_definition: usize,
    pub max_permissions_per_definition: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            default_package: DEFAULT_PACKAGE.to_string(),
            output_dir: PathBuf::from("."),
            file_extension: "rs".to_string(),
        }
    }
}

impl Default for SchemaLimitsConfig {
    fn default() -> Self {
        let limits = SchemaLimits::default();
        Self {
            max_definitions: limits.max_definitions,
            max_relations_per_definition: limits.max_relations_per_definition,
            max_permissions_per_definition: limits.max_permissions_per_definition,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e.to_string()))?;
            toml::from_str::<AppConfig>(&contents)
                .map_err(|e| ConfigError::ParseToml(e.to_string()))?
        } else {
            AppConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("AUTHZGEN_DEFAULT_PACKAGE") {
            self.codegen.default_package = v;
        }
        if let Ok(v) = std::env::var("AUTHZGEN_OUTPUT_DIR") {
            self.codegen.output_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("AUTHZGEN_FILE_EXTENSION") {
            self.codegen.file_extension = v;
        }
        if let Ok(v) = std::env::var("AUTHZGEN_MAX_DEFINITIONS")
            && let Ok(n) = v.parse()
        {
            self.schema_limits.max_definitions = n;
        }
        if let Ok(v) = std::env::var("AUTHZGEN_LOG_LEVEL") {
            self.log.level = v;
        }
        if let Ok(v) = std::env::var("AUTHZGEN_LOG_FORMAT") {
            match v.as_str() {
                "json" => self.log.format = LogFormat::Json,
                "pretty" => self.log.format = LogFormat::Pretty,
                _ => {}
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_identifier(&self.codegen.default_package) {
            return Err(ConfigError::Validation(format!(
                "codegen.default_package must be an identifier, got '{}'",
                self.codegen.default_package
            )));
        }
        if self.codegen.file_extension.is_empty() {
            return Err(ConfigError::Validation(
                "codegen.file_extension must not be empty".to_string(),
            ));
        }
        if self.schema_limits.max_definitions == 0 {
            return Err(ConfigError::Validation(
                "schema_limits.max_definitions must be non-zero".to_string(),
            ));
        }
        if self.schema_limits.max_relations_per_definition == 0 {
            return Err(ConfigError::Validation(
                "schema_limits.max_relations_per_definition must be non-zero".to_string(),
            ));
        }
        if self.schema_limits.max_permissions_per_definition == 0 {
            return Err(ConfigError::Validation(
                "schema_limits.max_permissions_per_definition must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_schema_limits(&self) -> SchemaLimits {
        SchemaLimits {
            max_definitions: self.schema_limits.max_definitions,
            max_relations_per_definition: self.schema_limits.max_relations_per_definition,
            max_permissions_per_definition: self.schema_limits.max_permissions_per_definition,
        }
    }

    pub fn to_compile_options(&self) -> CompileOptions {
        CompileOptions {
            default_package: self.codegen.default_package.clone(),
            limits: self.to_schema_limits(),
            file_extension: self.codegen.file_extension.clone(),
        }
    }
}

/// Same shape the lexer accepts for an identifier.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{0}': {1}")]
    ReadFile(String, String),

    #[error("failed to parse TOML config: {0}")]
    ParseToml(String),

    #[error("config validation failed: {0}")]
    Validation(String),
}
