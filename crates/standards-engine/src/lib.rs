pub mod classifier;
pub mod error;
pub mod loader;
pub mod rules;
pub mod standards;
pub mod summary;

use std::path::Path;
use std::sync::Arc;

pub use error::ConfigurationError;
pub use rules::{RuleBook, Standard, StepRule};
use shared_types::ExtractionSummary;

/// StandardsEngine entry point
///
/// Cheap to clone; the compiled rule book is shared.
#[derive(Debug, Clone)]
pub struct StandardsEngine {
    rules: Arc<RuleBook>,
}

impl StandardsEngine {
    /// Engine over the built-in standards
    pub fn new() -> Self {
        Self {
            rules: Arc::new(RuleBook::builtin().clone()),
        }
    }

    pub fn with_rules(rules: RuleBook) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    /// Built-in standards plus those defined in a TOML rule file
    pub fn with_extra_rules<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let mut rules = RuleBook::builtin().clone();
        rules.extend(loader::load_rules_file(path)?)?;
        Ok(Self::with_rules(rules))
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    pub fn standard(&self, form_type: &str) -> Result<Arc<Standard>, ConfigurationError> {
        self.rules.get(form_type)
    }

    pub fn supported_form_types(&self) -> Vec<&str> {
        self.rules.form_types()
    }

    pub fn classify(
        &self,
        form_type: &str,
        text: &str,
    ) -> Result<ExtractionSummary, ConfigurationError> {
        classifier::classify(&self.rules, form_type, text)
    }

    pub fn render(&self, summary: &ExtractionSummary) -> Result<String, ConfigurationError> {
        let standard = self.rules.get(&summary.form_type)?;
        Ok(summary::render_summary(&standard, summary))
    }
}

impl Default for StandardsEngine {
    fn default() -> Self {
        Self::new()
    }
}
