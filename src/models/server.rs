// ABOUTME: Server entity — a registered MCP endpoint and its behavioral metadata
// ABOUTME: Mirrors the shape callers register, read back, and rate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Transport an MCP server is reached over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportType {
    Stdio,
    StreamableHttp,
    Sse,
}

/// One entry of a server's advertised tool list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema", skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<serde_json::Value>,
}

/// A single `{username, rating}` submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingEntry {
    pub username: String,
    pub rating: u8,
}

/// A registered MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    /// Unique, leading-slash routing identifier and primary key.
    pub path: String,

    pub server_name: String,
    pub description: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub license: Option<String>,

    pub proxy_pass_url: String,
    pub transport_type: TransportType,
    #[serde(default)]
    pub tool_list: Vec<ToolDescriptor>,

    pub is_enabled: bool,
    #[serde(default)]
    pub health_status: Option<String>,
    #[serde(default)]
    pub last_checked: Option<DateTime<Utc>>,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub rating_details: Vec<RatingEntry>,

    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub is_read_only: bool,
}

impl Server {
    /// Number of tools currently advertised.
    #[must_use]
    pub fn num_tools(&self) -> usize {
        self.tool_list.len()
    }

    /// Mean of `rating_details[*].rating`, or `0.0` when empty.
    #[must_use]
    pub fn num_stars(&self) -> f64 {
        if self.rating_details.is_empty() {
            return 0.0;
        }
        let sum: u32 = self.rating_details.iter().map(|r| u32::from(r.rating)).sum();
        f64::from(sum) / f64::from(u32::try_from(self.rating_details.len()).unwrap_or(u32::MAX))
    }

    /// Text blob fed to the embedding model.
    #[must_use]
    pub fn text_for_embedding(&self) -> String {
        let mut parts = vec![self.server_name.clone(), self.description.clone()];
        if !self.tags.is_empty() {
            parts.push(format!("Tags: {}", self.tags.iter().cloned().collect::<Vec<_>>().join(", ")));
        }
        for tool in &self.tool_list {
            parts.push(format!("{} {}", tool.name, tool.description));
        }
        parts.join(" ")
    }
}
