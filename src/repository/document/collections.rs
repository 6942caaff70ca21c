// ABOUTME: Collection naming for the DocumentDB/MongoDB-CE/MongoDB backends
// ABOUTME: `<base>_<namespace>` for entities, `<base>_<dims>_<namespace>` for embeddings

/// Namespaced collection name for a non-embedding entity kind.
#[must_use]
pub fn entity_collection(base: &str, namespace: &str) -> String {
    format!("{base}_{namespace}")
}

/// Namespaced, dimension-suffixed collection name for the embeddings store.
#[must_use]
pub fn embeddings_collection(dimensions: u32, namespace: &str) -> String {
    format!("mcp_embeddings_{dimensions}_{namespace}")
}

pub const SERVERS_BASE: &str = "mcp_servers";
pub const AGENTS_BASE: &str = "mcp_agents";
pub const SCOPES_BASE: &str = "mcp_scopes";
pub const SECURITY_SCANS_BASE: &str = "mcp_security_scans";
pub const FEDERATION_CONFIG_BASE: &str = "mcp_federation_config";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_namespaced_names() {
        assert_eq!(entity_collection(SERVERS_BASE, "prod"), "mcp_servers_prod");
        assert_eq!(embeddings_collection(384, "prod"), "mcp_embeddings_384_prod");
    }
}
