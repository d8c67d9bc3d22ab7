//! Detection of malformed entity names that carry no identity value.

use std::collections::HashSet;
use std::fmt;

use regex::Regex;

use crate::{IntrographError, Result};

/// Generic role and degree labels that are never a real entity name.
const ROLE_LABELS: &[&str] = &[
    "ceo", "cto", "cfo", "coo", "cmo", "cpo",
    "founder", "co-founder", "cofounder",
    "investor", "angel investor",
    "director", "managing director",
    "partner", "general partner", "managing partner",
    "advisor", "board member", "chairman",
    "president", "vice president", "vp", "owner",
    "mba", "phd", "bs", "ba", "bsc", "ms", "msc", "ma", "md", "jd", "llb", "cpa", "cfa",
];

/// Characters left behind when a multi-valued field was imported as one name.
const MULTI_VALUE_SEPARATORS: &[char] = &[';', '<', '>', '\n'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GarbageReason {
    EmptyName,
    MultiValueSeparator(char),
    RoleLabel,
    ParenthesizedRole,
}

impl fmt::Display for GarbageReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GarbageReason::EmptyName => f.write_str("empty name"),
            GarbageReason::MultiValueSeparator(c) => write!(f, "multi-value separator {:?}", c),
            GarbageReason::RoleLabel => f.write_str("generic role label"),
            GarbageReason::ParenthesizedRole => f.write_str("role label in parentheses"),
        }
    }
}

fn strip_dots(s: &str) -> String {
    s.replace('.', "")
}

/// Classifies entity names as garbage using the built-in label set plus any
/// configured extras.
#[derive(Debug, Clone)]
pub struct GarbageFilter {
    role_labels: HashSet<String>,
    // e.g. "Jane Doe (CEO)", "Acme Founder)"
    parenthesized_role: Regex,
}

impl GarbageFilter {
    pub fn new(extra_labels: &[String]) -> Result<Self> {
        let role_labels: HashSet<String> = ROLE_LABELS
            .iter()
            .map(|l| l.to_string())
            .chain(
                extra_labels
                    .iter()
                    .map(|l| strip_dots(l.trim()).to_lowercase())
                    .filter(|l| !l.is_empty()),
            )
            .collect();

        let mut alternatives: Vec<String> = role_labels.iter().map(|l| regex::escape(l)).collect();
        // Longest first so "managing partner" wins over "partner"
        alternatives.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let pattern = format!(r"(?i)\b(?:{})\s*\)\s*$", alternatives.join("|"));
        let parenthesized_role = Regex::new(&pattern)
            .map_err(|e| IntrographError::Config(format!("invalid role label pattern: {}", e)))?;

        Ok(Self {
            role_labels,
            parenthesized_role,
        })
    }

    /// Why `name` is garbage, or `None` for a plausible entity name.
    pub fn classify(&self, name: &str) -> Option<GarbageReason> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Some(GarbageReason::EmptyName);
        }
        if let Some(c) = trimmed.chars().find(|c| MULTI_VALUE_SEPARATORS.contains(c)) {
            return Some(GarbageReason::MultiValueSeparator(c));
        }
        // "Ph.D." and "PhD" are the same label
        let undotted = strip_dots(trimmed);
        if self.role_labels.contains(&undotted.trim().to_lowercase()) {
            return Some(GarbageReason::RoleLabel);
        }
        if self.parenthesized_role.is_match(&undotted) {
            return Some(GarbageReason::ParenthesizedRole);
        }
        None
    }

    pub fn is_garbage(&self, name: &str) -> bool {
        self.classify(name).is_some()
    }
}
