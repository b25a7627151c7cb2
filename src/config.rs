//! Output naming. Loaded from an optional JSON file; CLI flags win over it.

use std::path::Path;

use serde::Deserialize;

use crate::error::{CodegenError, Result};
use crate::model::is_identifier;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmitConfig {
    /// Namespace wrapping everything that is generated.
    pub root_namespace: String,
    /// File name of the header; the source `#include`s it.
    pub header_name: String,
    pub source_name: String,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            root_namespace: "THPrac".into(),
            header_name: "thprac_locale_def.h".into(),
            source_name: "thprac_locale_def.cpp".into(),
        }
    }
}

impl EmitConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CodegenError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EmitConfig =
            serde_json::from_str(&text).map_err(|e| CodegenError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        config.validate(path)?;
        Ok(config)
    }

    pub fn validate(&self, origin: &Path) -> Result<()> {
        let invalid = |message: String| CodegenError::Config {
            path: origin.to_path_buf(),
            message,
        };
        if !is_identifier(&self.root_namespace) {
            return Err(invalid(format!(
                "root namespace \"{}\" is not a valid identifier",
                self.root_namespace
            )));
        }
        for name in [&self.header_name, &self.source_name] {
            if name.is_empty() || name.contains(['/', '\\', '"']) {
                return Err(invalid(format!("\"{name}\" is not a plain file name")));
            }
        }
        if self.header_name == self.source_name {
            return Err(invalid("header and source share a file name".into()));
        }
        Ok(())
    }
}
