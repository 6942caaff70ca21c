// ABOUTME: Scope entity — named permission bundle mapping IdP groups to entity access
// ABOUTME: Also carries the caller-context shape produced by the authentication adapter

use registry_core::constants::scope::WILDCARD_ALL;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A single server-access grant: which methods/tools are allowed on one server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerAccessEntry {
    pub server: String,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
}

impl ServerAccessEntry {
    #[must_use]
    pub fn allows_method(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m == WILDCARD_ALL || m == method)
    }

    #[must_use]
    pub fn allows_tool(&self, tool: &str) -> bool {
        self.tools.iter().any(|t| t == WILDCARD_ALL || t == tool)
    }
}

/// A named permission bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
    pub name: String,
    #[serde(default)]
    pub group_mappings: BTreeSet<String>,
    #[serde(default)]
    pub server_access: Vec<ServerAccessEntry>,
    /// UI action -> list of server names (or `["all"]`) permitted for that action.
    #[serde(default)]
    pub ui_permissions: BTreeMap<String, Vec<String>>,
}

impl Scope {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.name == registry_core::constants::scope::ADMIN_SCOPE
    }
}

/// Per-request identity and entitlements, as handed to the core by the
/// authentication adapter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallerContext {
    pub username: String,
    #[serde(default)]
    pub groups: BTreeSet<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub accessible_servers: BTreeSet<String>,
    #[serde(default)]
    pub accessible_agents: BTreeSet<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl CallerContext {
    #[must_use]
    pub fn allows_all_servers(&self) -> bool {
        self.is_admin || self.accessible_servers.contains(WILDCARD_ALL)
    }

    #[must_use]
    pub fn allows_all_agents(&self) -> bool {
        self.is_admin || self.accessible_agents.contains(WILDCARD_ALL)
    }
}
