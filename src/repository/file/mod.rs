// ABOUTME: File backend — one JSON document per entity under well-known directories
// ABOUTME: Writes are non-transactional; readers tolerate missing state by defaulting to disabled

pub mod agents;
pub mod federation;
pub mod paths;
pub mod scans;
pub mod scopes;
pub mod servers;

pub use agents::FileAgentRepository;
pub use federation::FileFederationConfigRepository;
pub use scans::FileSecurityScanRepository;
pub use scopes::FileScopeRepository;
pub use servers::FileServerRepository;

use registry_core::AppResult;
use std::path::{Path, PathBuf};

/// All file-backend repositories rooted at one directory:
/// `servers/`, `agents/`, `scopes/`, `security_scans/`, `federation_config/`.
pub struct FileRepositories {
    pub servers: FileServerRepository,
    pub agents: FileAgentRepository,
    pub scopes: FileScopeRepository,
    pub scans: FileSecurityScanRepository,
    pub federation: FileFederationConfigRepository,
}

impl FileRepositories {
    pub async fn new(root: &Path) -> AppResult<Self> {
        let root: PathBuf = root.to_path_buf();
        Ok(Self {
            servers: FileServerRepository::new(root.join("servers")).await?,
            agents: FileAgentRepository::new(root.join("agents")).await?,
            scopes: FileScopeRepository::new(root.join("scopes")).await?,
            scans: FileSecurityScanRepository::new(root.join("security_scans")).await?,
            federation: FileFederationConfigRepository::new(root.join("federation_config")).await?,
        })
    }
}
