//! Operator-supplied rule tables in TOML
//!
//! ```toml
//! [[standards]]
//! form_type = "asc842"
//! title = "ASC 842 Leases"
//!
//! [[standards.steps]]
//! name = "Identify Lease"
//! label = "Lease Identification"   # optional, defaults to name
//! patterns = ["lease.*?term", "right.of.use asset"]
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::ConfigurationError;
use crate::rules::{RuleBook, Standard, StepRule};

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    standards: Vec<StandardDef>,
}

#[derive(Debug, Deserialize)]
struct StandardDef {
    form_type: String,
    #[serde(default)]
    title: Option<String>,
    steps: Vec<StepDef>,
}

#[derive(Debug, Deserialize)]
struct StepDef {
    name: String,
    #[serde(default)]
    label: Option<String>,
    patterns: Vec<String>,
}

/// Parse and compile rule tables from a TOML string
pub fn load_rules_str(s: &str) -> Result<RuleBook, ConfigurationError> {
    let file: RuleFile =
        toml::from_str(s).map_err(|e| ConfigurationError::RuleFile(e.to_string()))?;

    let mut book = RuleBook::new();
    for def in file.standards {
        let steps = def
            .steps
            .iter()
            .map(|step| {
                if step.patterns.is_empty() {
                    return Err(ConfigurationError::InvalidPattern {
                        step: step.name.clone(),
                        pattern: String::new(),
                        reason: "step has no patterns".to_string(),
                    });
                }
                let label = step.label.as_deref().unwrap_or(&step.name);
                StepRule::compile(&step.name, label, &step.patterns)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let title = def.title.as_deref().unwrap_or(&def.form_type);
        book.insert(Standard::new(&def.form_type, title, steps)?)?;
    }
    Ok(book)
}

/// Parse and compile rule tables from a TOML file
pub fn load_rules_file<P: AsRef<Path>>(path: P) -> Result<RuleBook, ConfigurationError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        ConfigurationError::RuleFile(format!("{}: {}", path.display(), e))
    })?;
    let book = load_rules_str(&content)?;
    info!(
        "Loaded {} standard(s) from {}: {:?}",
        book.len(),
        path.display(),
        book.form_types()
    );
    Ok(book)
}
