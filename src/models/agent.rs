// ABOUTME: Agent entity — a registered A2A endpoint, its skills, and its security posture
// ABOUTME: Mirrors the agent-card shape used by A2A clients

use super::server::RatingEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
    GroupRestricted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    Unverified,
    Community,
    Verified,
    Trusted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    /// Unique within the owning agent.
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub input_modes: Vec<String>,
    #[serde(default)]
    pub output_modes: Vec<String>,
    /// Names of entries in the agent's `security_schemes` this skill relies on.
    #[serde(default)]
    pub security: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecuritySchemeType {
    ApiKey,
    Http,
    OAuth2,
    OpenIdConnect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: SecuritySchemeType,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One requirement entry: named scheme → list of scopes it must grant.
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub path: String,

    pub name: String,
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub license: Option<String>,

    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub capabilities: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub default_input_modes: Vec<String>,
    #[serde(default)]
    pub default_output_modes: Vec<String>,
    #[serde(default)]
    pub preferred_transport: Option<String>,

    #[serde(default)]
    pub security_schemes: BTreeMap<String, SecurityScheme>,
    #[serde(default)]
    pub security: Vec<SecurityRequirement>,

    pub visibility: Visibility,
    #[serde(default)]
    pub allowed_groups: BTreeSet<String>,
    #[serde(default)]
    pub trust_level: TrustLevel,

    pub is_enabled: bool,
    #[serde(default)]
    pub health_status: Option<String>,
    #[serde(default)]
    pub last_checked: Option<DateTime<Utc>>,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub registered_by: Option<String>,

    #[serde(default)]
    pub rating_details: Vec<RatingEntry>,

    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub is_read_only: bool,
}

impl Default for TrustLevel {
    fn default() -> Self {
        Self::Unverified
    }
}

impl Agent {
    #[must_use]
    pub fn num_stars(&self) -> f64 {
        if self.rating_details.is_empty() {
            return 0.0;
        }
        let sum: u32 = self.rating_details.iter().map(|r| u32::from(r.rating)).sum();
        f64::from(sum) / f64::from(u32::try_from(self.rating_details.len()).unwrap_or(u32::MAX))
    }

    /// Every security-scheme name referenced by `security` must be declared
    /// in `security_schemes`.
    #[must_use]
    pub fn has_dangling_security_refs(&self) -> bool {
        self.security.iter().any(|requirement| {
            requirement
                .keys()
                .any(|scheme_name| !self.security_schemes.contains_key(scheme_name))
        })
    }

    #[must_use]
    pub fn text_for_embedding(&self) -> String {
        let mut parts = vec![self.name.clone(), self.description.clone()];
        if !self.tags.is_empty() {
            parts.push(format!("Tags: {}", self.tags.iter().cloned().collect::<Vec<_>>().join(", ")));
        }
        if !self.capabilities.is_empty() {
            parts.push(self.capabilities.keys().cloned().collect::<Vec<_>>().join(" "));
        }
        for skill in &self.skills {
            parts.push(format!("{} {}", skill.name, skill.description));
        }
        parts.join(" ")
    }
}
