// ABOUTME: Data model re-exports for the registry and discovery gateway

pub mod agent;
pub mod federation;
pub mod scope;
pub mod search;
pub mod security_scan;
pub mod server;

pub use agent::{Agent, SecurityRequirement, SecurityScheme, Skill, TrustLevel, Visibility};
pub use federation::{FederationConfig, FederationEntityType, FederationItem};
pub use scope::{CallerContext, Scope, ServerAccessEntry};
pub use search::{EntityType, SearchDocument, SearchQuery, SearchResultItem, SearchResults, ToolSearchResultItem};
pub use security_scan::{SecurityScanResult, SeverityCounts};
pub use server::{RatingEntry, Server, ToolDescriptor, TransportType};

/// Enable/disable state for one entity kind, uniform across backends
///.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct EnabledState {
    pub enabled: std::collections::BTreeSet<String>,
    pub disabled: std::collections::BTreeSet<String>,
}

impl EnabledState {
    #[must_use]
    pub fn is_enabled(&self, path: &str) -> bool {
        let normalized = path.trim_end_matches('/');
        self.enabled.iter().any(|p| p.trim_end_matches('/') == normalized)
    }

    pub fn set_enabled(&mut self, path: &str, enabled: bool) {
        let normalized = path.trim_end_matches('/').to_string();
        self.enabled.retain(|p| p.trim_end_matches('/') != normalized);
        self.disabled.retain(|p| p.trim_end_matches('/') != normalized);
        if enabled {
            self.enabled.insert(normalized);
        } else {
            self.disabled.insert(normalized);
        }
    }
}
