// ABOUTME: Business-logic layer — entity services, scope resolution, background subsystems
// ABOUTME: Higher layers (HTTP handlers) depend only on these; they never touch a repository trait object directly

pub mod agent_service;
pub mod federation_sync;
pub mod health_monitor;
pub mod lifecycle;
pub mod proxy_config;
pub mod scope_resolver;
pub mod security_admission;
pub mod server_service;
pub mod task_manager;
pub mod validation;

pub use agent_service::AgentService;
pub use federation_sync::FederationSync;
pub use health_monitor::HealthMonitor;
pub use lifecycle::Lifecycle;
pub use proxy_config::ProxyConfigEmitter;
pub use scope_resolver::ScopeResolver;
pub use security_admission::SecurityAdmission;
pub use server_service::ServerService;
pub use task_manager::TaskManager;
