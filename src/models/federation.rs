// ABOUTME: Federation config entity — per-upstream sync settings and selected items

use serde::{Deserialize, Serialize};

/// Which local entity kind an upstream's items transform into. A registry
/// federation source (e.g. an Anthropic-compatible MCP registry) synthesizes
/// servers; an agent-directory source (e.g. a Workday ASOR instance)
/// synthesizes agents. One `FederationConfig` only ever feeds one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FederationEntityType {
    #[default]
    Server,
    Agent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederationItem {
    /// Name as known to the upstream registry.
    pub upstream_name: String,
    #[serde(default)]
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederationConfig {
    /// Upstream identifier, also used as the primary key.
    pub id: String,
    pub enabled: bool,
    pub endpoint: String,
    #[serde(default)]
    pub auth_env_var: Option<String>,
    #[serde(default)]
    pub sync_on_startup: bool,
    #[serde(default)]
    pub entity_type: FederationEntityType,
    #[serde(default)]
    pub items: Vec<FederationItem>,
}

impl FederationConfig {
    /// Synthesize the local `path` for an item pulled from this upstream.
    #[must_use]
    pub fn synthesize_path(&self, upstream_item_name: &str) -> String {
        let slug = upstream_item_name
            .chars()
            .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect::<String>();
        format!("/{}/{}", self.id, slug.trim_matches('-'))
    }
}
