//! Built-in accounting standards
//!
//! Each module declares one standard's steps as static data. Patterns are
//! matched case-insensitively against whitespace-normalized text, so a single
//! space is enough to separate words.

pub mod asc450;
pub mod asc606;
pub mod ifrs15;

/// Static description of one step
#[derive(Debug)]
pub struct StepSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub patterns: &'static [&'static str],
}

/// Static description of one standard
#[derive(Debug)]
pub struct StandardSpec {
    pub form_type: &'static str,
    pub title: &'static str,
    pub steps: &'static [StepSpec],
}

/// Registration order is the listing order shown to users
pub const BUILTIN_STANDARDS: &[&StandardSpec] =
    &[&asc606::ASC_606, &ifrs15::IFRS_15, &asc450::ASC_450];
