//! Compiled rule tables
//!
//! A [`RuleBook`] maps a `form_type` to a [`Standard`]: an ordered list of
//! [`StepRule`]s, each holding the case-insensitive patterns that detect it.
//! Rule books are built once and shared read-only.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

use crate::error::ConfigurationError;
use crate::standards::{StandardSpec, BUILTIN_STANDARDS};

lazy_static! {
    static ref BUILTIN_RULES: RuleBook =
        RuleBook::from_specs(BUILTIN_STANDARDS).expect("built-in rule tables compile");
}

/// One named classification target within a standard
#[derive(Debug, Clone)]
pub struct StepRule {
    /// Heading used when the step is found (e.g. "Identify Contract")
    pub name: String,
    /// Heading used on the "Not Found" line (e.g. "Contract Identification")
    pub label: String,
    pub patterns: Vec<Regex>,
}

impl StepRule {
    pub fn compile<S: AsRef<str>>(
        name: &str,
        label: &str,
        patterns: &[S],
    ) -> Result<Self, ConfigurationError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(p.as_ref())
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| ConfigurationError::InvalidPattern {
                        step: name.to_string(),
                        pattern: p.as_ref().to_string(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.to_string(),
            label: label.to_string(),
            patterns,
        })
    }
}

/// The ordered step rules of one accounting standard
#[derive(Debug, Clone)]
pub struct Standard {
    pub form_type: String,
    pub title: String,
    pub steps: Vec<StepRule>,
}

impl Standard {
    pub fn new(
        form_type: &str,
        title: &str,
        steps: Vec<StepRule>,
    ) -> Result<Self, ConfigurationError> {
        let normalized = normalize_form_type(form_type);
        let valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !valid {
            return Err(ConfigurationError::InvalidFormType(form_type.to_string()));
        }
        if steps.is_empty() {
            return Err(ConfigurationError::EmptyStandard(form_type.to_string()));
        }
        Ok(Self {
            form_type: normalized,
            title: title.to_string(),
            steps,
        })
    }

    fn from_spec(spec: &StandardSpec) -> Result<Self, ConfigurationError> {
        let steps = spec
            .steps
            .iter()
            .map(|step| StepRule::compile(step.name, step.label, step.patterns))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(spec.form_type, spec.title, steps)
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }
}

/// All standards known to the process, in registration order
#[derive(Debug, Clone, Default)]
pub struct RuleBook {
    standards: Vec<Arc<Standard>>,
}

impl RuleBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tables shipped with the crate (ASC 606, IFRS 15, ASC 450)
    pub fn builtin() -> &'static RuleBook {
        &BUILTIN_RULES
    }

    pub fn from_specs(specs: &[&StandardSpec]) -> Result<Self, ConfigurationError> {
        let mut book = Self::new();
        for spec in specs {
            book.insert(Standard::from_spec(spec)?)?;
        }
        Ok(book)
    }

    pub fn insert(&mut self, standard: Standard) -> Result<(), ConfigurationError> {
        if self.contains(&standard.form_type) {
            return Err(ConfigurationError::DuplicateFormType(standard.form_type));
        }
        self.standards.push(Arc::new(standard));
        Ok(())
    }

    /// Add every standard from `other`, refusing to shadow an existing form type
    pub fn extend(&mut self, other: RuleBook) -> Result<(), ConfigurationError> {
        for standard in other.standards {
            if self.contains(&standard.form_type) {
                return Err(ConfigurationError::DuplicateFormType(
                    standard.form_type.clone(),
                ));
            }
            self.standards.push(standard);
        }
        Ok(())
    }

    pub fn get(&self, form_type: &str) -> Result<Arc<Standard>, ConfigurationError> {
        let key = normalize_form_type(form_type);
        self.standards
            .iter()
            .find(|s| s.form_type == key)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownFormType(form_type.to_string()))
    }

    pub fn contains(&self, form_type: &str) -> bool {
        let key = normalize_form_type(form_type);
        self.standards.iter().any(|s| s.form_type == key)
    }

    pub fn form_types(&self) -> Vec<&str> {
        self.standards.iter().map(|s| s.form_type.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Standard> {
        self.standards.iter().map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.standards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.standards.is_empty()
    }
}

fn normalize_form_type(form_type: &str) -> String {
    form_type.trim().to_lowercase()
}
