//! Relationship graph data model: entities, typed edges, and edge strength.
//!
//! Entities are people or organizations ingested from external providers.
//! Edges are stored directed (`source --kind--> target`) but are walked in
//! either direction by the path finder.

mod strength;

pub use strength::{edge_strength, DEFAULT_STRENGTH_SCORE};

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{IntrographError, Result};

/// Kind of real-world thing an entity represents. Never changes for a given id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Person,
    Organization,
}

impl EntityType {
    pub const ALL: [EntityType; 2] = [EntityType::Person, EntityType::Organization];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Person => "person",
            EntityType::Organization => "organization",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = IntrographError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "person" => Ok(EntityType::Person),
            "organization" | "organisation" | "company" => Ok(EntityType::Organization),
            other => Err(IntrographError::InvalidInput(format!("unknown entity type: {}", other))),
        }
    }
}

/// Structured enrichment profile produced for an entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl BusinessProfile {
    fn is_blank(&self) -> bool {
        self.summary.trim().is_empty()
            && self.industry.as_deref().map_or(true, |s| s.trim().is_empty())
            && self.stage.as_deref().map_or(true, |s| s.trim().is_empty())
            && self.keywords.iter().all(|k| k.trim().is_empty())
    }
}

/// Enrichment outcome: either a usable profile or the explicit
/// "insufficient information" sentinel emitted when enrichment found nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BusinessAnalysis {
    Profile(BusinessProfile),
    InsufficientInformation,
}

const INSUFFICIENT_MARKER: &str = "insufficient information";

impl BusinessAnalysis {
    /// Normalise a raw provider payload. Strings and objects are accepted;
    /// null, empty strings and non-text scalars mean "no analysis".
    pub fn from_raw(raw: &serde_json::Value) -> Option<BusinessAnalysis> {
        match raw {
            serde_json::Value::String(text) => {
                let text = text.trim();
                if text.is_empty() {
                    None
                } else if text.to_lowercase().contains(INSUFFICIENT_MARKER) {
                    Some(BusinessAnalysis::InsufficientInformation)
                } else {
                    Some(BusinessAnalysis::Profile(BusinessProfile {
                        summary: text.to_string(),
                        ..BusinessProfile::default()
                    }))
                }
            }
            serde_json::Value::Object(map) => {
                if map.contains_key("status") {
                    if let Ok(analysis) = serde_json::from_value::<BusinessAnalysis>(raw.clone()) {
                        return Some(analysis);
                    }
                }
                let profile: BusinessProfile =
                    serde_json::from_value(raw.clone()).unwrap_or_default();
                let insufficient = profile.summary.to_lowercase().contains(INSUFFICIENT_MARKER);
                if profile.is_blank() || insufficient {
                    Some(BusinessAnalysis::InsufficientInformation)
                } else {
                    Some(BusinessAnalysis::Profile(profile))
                }
            }
            _ => None,
        }
    }

    pub fn is_substantive(&self) -> bool {
        match self {
            BusinessAnalysis::Profile(profile) => !profile.is_blank(),
            BusinessAnalysis::InsufficientInformation => false,
        }
    }
}

/// A node in the relationship graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub is_internal_owner: bool,
    #[serde(default)]
    pub is_portfolio: bool,
    #[serde(default)]
    pub is_pipeline: bool,
    #[serde(default)]
    pub linkedin_first_degree: bool,
    #[serde(default)]
    pub business_analysis: Option<BusinessAnalysis>,
    /// Derived from `business_analysis` whenever it is set.
    #[serde(default)]
    pub has_substantive_analysis: bool,
    #[serde(default)]
    pub enriched: bool,
    #[serde(default)]
    pub enrichment_source: Option<String>,
}

impl Entity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entity_type,
            domain: None,
            is_internal_owner: false,
            is_portfolio: false,
            is_pipeline: false,
            linkedin_first_degree: false,
            business_analysis: None,
            has_substantive_analysis: false,
            enriched: false,
            enrichment_source: None,
        }
    }

    pub fn set_business_analysis(&mut self, analysis: Option<BusinessAnalysis>) {
        self.has_substantive_analysis =
            analysis.as_ref().map_or(false, BusinessAnalysis::is_substantive);
        self.business_analysis = analysis;
    }

    pub fn has_domain(&self) -> bool {
        self.domain.as_deref().map_or(false, |d| !d.trim().is_empty())
    }

    /// Key used to detect duplicate records of the same real-world entity.
    pub fn normalized_name(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

/// A directed, typed relationship between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: String,
    /// Stored base weight; `None` means [`DEFAULT_STRENGTH_SCORE`].
    #[serde(default)]
    pub strength_score: Option<f64>,
    #[serde(default)]
    pub interaction_count: u32,
    #[serde(default)]
    pub last_interaction_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_type: Option<String>,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind: kind.into(),
            strength_score: None,
            interaction_count: 0,
            last_interaction_date: None,
            source_type: None,
        }
    }

    pub fn base_strength(&self) -> f64 {
        self.strength_score.unwrap_or(DEFAULT_STRENGTH_SCORE)
    }

    /// Fold another copy of the same relationship into this one, keeping the
    /// strongest weight, the highest interaction count and the latest contact.
    /// Returns true if any attribute changed.
    pub fn absorb(&mut self, other: &Edge) -> bool {
        let mut changed = false;

        if let Some(theirs) = other.strength_score {
            if self.strength_score.map_or(true, |ours| theirs > ours) {
                self.strength_score = Some(theirs);
                changed = true;
            }
        }
        if other.interaction_count > self.interaction_count {
            self.interaction_count = other.interaction_count;
            changed = true;
        }
        if let Some(theirs) = other.last_interaction_date {
            if self.last_interaction_date.map_or(true, |ours| theirs > ours) {
                self.last_interaction_date = Some(theirs);
                changed = true;
            }
        }
        if self.source_type.is_none() && other.source_type.is_some() {
            self.source_type = other.source_type.clone();
            changed = true;
        }

        changed
    }
}
