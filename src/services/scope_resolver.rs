// ABOUTME: Scope resolver — group-to-scope union, server/agent access checks, UI-permission union
// ABOUTME: Pure logic over already-loaded scopes and a caller context; never touches a repository itself

use crate::models::{Agent, CallerContext, Scope, ServerAccessEntry, Visibility};
use registry_core::constants::scope::WILDCARD_ALL;
use std::collections::{BTreeMap, BTreeSet};

/// The technical name used in scope checks: the path stripped of slashes.
pub(crate) fn technical_name(server_path: &str) -> String {
    server_path.trim_matches('/').replace('/', "-")
}

/// Resolves group membership and per-entity checks against a loaded set of
/// [`Scope`]s. One instance is built from `ScopeRepository::list_all` and
/// reused for the lifetime of a request (or cached across requests, refreshed
/// whenever scopes change).
pub struct ScopeResolver {
    scopes_by_name: BTreeMap<String, Scope>,
}

impl ScopeResolver {
    #[must_use]
    pub fn new(scopes: Vec<Scope>) -> Self {
        Self {
            scopes_by_name: scopes.into_iter().map(|s| (s.name.clone(), s)).collect(),
        }
    }

    /// Effective scope set for a caller: union over the groups on their
    /// token of every scope whose `group_mappings` contains that group
    ///.
    #[must_use]
    pub fn effective_scopes(&self, groups: &BTreeSet<String>) -> Vec<&Scope> {
        self.scopes_by_name
            .values()
            .filter(|scope| scope.group_mappings.iter().any(|g| groups.contains(g)))
            .collect()
    }

    #[must_use]
    pub fn caller_has_admin_scope(&self, groups: &BTreeSet<String>) -> bool {
        self.effective_scopes(groups).iter().any(|s| s.is_admin())
    }

    /// Server access check.
    #[must_use]
    pub fn can_access_server(&self, caller: &CallerContext, server_path: &str, server_name: &str) -> bool {
        if caller.is_admin || self.caller_has_admin_scope(&caller.groups) {
            return true;
        }
        if caller.allows_all_servers() {
            return true;
        }
        let technical_name = technical_name(server_path);
        caller.accessible_servers.contains(&technical_name) || caller.accessible_servers.contains(server_name)
    }

    /// Invocation check: server access plus the per-server `methods`/`tools`
    /// gating carried by `ServerAccessEntry`. A caller who can see a server
    /// is not automatically permitted to call every method or tool on it —
    /// scopes that name the server in `server_access` further restrict which
    /// `method` and (when given) `tool` are allowed; a caller whose scopes
    /// never mention this server at all is unrestricted beyond the base
    /// server-access check.
    #[must_use]
    pub fn can_invoke(
        &self,
        caller: &CallerContext,
        server_path: &str,
        server_name: &str,
        method: &str,
        tool: Option<&str>,
    ) -> bool {
        if caller.is_admin || self.caller_has_admin_scope(&caller.groups) {
            return true;
        }
        if !self.can_access_server(caller, server_path, server_name) {
            return false;
        }
        let technical_name = technical_name(server_path);
        let entries: Vec<&ServerAccessEntry> = self
            .effective_scopes(&caller.groups)
            .into_iter()
            .flat_map(|scope| scope.server_access.iter())
            .filter(|entry| entry.server == technical_name || entry.server == server_name)
            .collect();
        if entries.is_empty() {
            return true;
        }
        entries
            .iter()
            .any(|entry| entry.allows_method(method) && tool.map_or(true, |t| entry.allows_tool(t)))
    }

    /// Agent access check.
    #[must_use]
    pub fn can_access_agent(&self, caller: &CallerContext, agent: &Agent) -> bool {
        if caller.is_admin || self.caller_has_admin_scope(&caller.groups) || caller.allows_all_agents() {
            return true;
        }
        match agent.visibility {
            Visibility::Public => true,
            Visibility::Private => agent.registered_by.as_deref() == Some(caller.username.as_str()),
            Visibility::GroupRestricted => !agent.allowed_groups.is_disjoint(&caller.groups),
        }
    }

    /// Union, across the caller's effective scopes, of the server names (or
    /// `["all"]`) permitted for one UI action.
    #[must_use]
    pub fn ui_permission_union(&self, groups: &BTreeSet<String>, action: &str) -> BTreeSet<String> {
        let mut union = BTreeSet::new();
        for scope in self.effective_scopes(groups) {
            if let Some(entries) = scope.ui_permissions.get(action) {
                union.extend(entries.iter().cloned());
            }
        }
        union
    }

    #[must_use]
    pub fn ui_permission_allows(&self, groups: &BTreeSet<String>, action: &str, server_name: &str) -> bool {
        let union = self.ui_permission_union(groups, action);
        union.contains(WILDCARD_ALL) || union.contains(server_name)
    }

    /// Every UI action named anywhere in the caller's effective scopes,
    /// mapped to the union (across those scopes) of servers permitted for
    /// it. Computed fresh per call since scopes can change between requests.
    #[must_use]
    pub fn ui_permissions_for_caller(&self, groups: &BTreeSet<String>) -> BTreeMap<String, BTreeSet<String>> {
        let mut actions: BTreeSet<String> = BTreeSet::new();
        for scope in self.effective_scopes(groups) {
            actions.extend(scope.ui_permissions.keys().cloned());
        }
        actions
            .into_iter()
            .map(|action| {
                let union = self.ui_permission_union(groups, &action);
                (action, union)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServerAccessEntry;
    use chrono::Utc;

    fn scope(name: &str, groups: &[&str]) -> Scope {
        Scope {
            name: name.to_string(),
            group_mappings: groups.iter().map(|g| (*g).to_string()).collect(),
            server_access: vec![ServerAccessEntry {
                server: "currenttime".to_string(),
                methods: vec!["*".to_string()],
                tools: vec!["*".to_string()],
            }],
            ui_permissions: BTreeMap::new(),
        }
    }

    fn restrictive_scope(name: &str, groups: &[&str], methods: &[&str], tools: &[&str]) -> Scope {
        Scope {
            name: name.to_string(),
            group_mappings: groups.iter().map(|g| (*g).to_string()).collect(),
            server_access: vec![ServerAccessEntry {
                server: "currenttime".to_string(),
                methods: methods.iter().map(|m| (*m).to_string()).collect(),
                tools: tools.iter().map(|t| (*t).to_string()).collect(),
            }],
            ui_permissions: BTreeMap::new(),
        }
    }

    fn caller(groups: &[&str]) -> CallerContext {
        CallerContext {
            username: "alice".to_string(),
            groups: groups.iter().map(|g| (*g).to_string()).collect(),
            ..Default::default()
        }
    }

    fn agent(visibility: Visibility, allowed_groups: &[&str], registered_by: Option<&str>) -> Agent {
        Agent {
            path: "/a".to_string(),
            name: "a".to_string(),
            description: "d".to_string(),
            url: "https://example.com".to_string(),
            version: None,
            protocol_version: None,
            tags: BTreeSet::new(),
            license: None,
            skills: vec![],
            capabilities: BTreeMap::new(),
            default_input_modes: vec![],
            default_output_modes: vec![],
            preferred_transport: None,
            security_schemes: BTreeMap::new(),
            security: vec![],
            visibility,
            allowed_groups: allowed_groups.iter().map(|g| (*g).to_string()).collect(),
            trust_level: crate::models::TrustLevel::Unverified,
            is_enabled: true,
            health_status: None,
            last_checked: None,
            registered_at: Utc::now(),
            updated_at: Utc::now(),
            registered_by: registered_by.map(String::from),
            rating_details: vec![],
            source: None,
            is_read_only: false,
        }
    }

    #[test]
    fn no_scope_no_wildcard_denies_server_access() {
        let resolver = ScopeResolver::new(vec![]);
        let caller = caller(&[]);
        assert!(!resolver.can_access_server(&caller, "/other", "other"));
    }

    #[test]
    fn accessible_servers_list_grants_by_technical_name() {
        let resolver = ScopeResolver::new(vec![]);
        let mut caller = caller(&[]);
        caller.accessible_servers.insert("currenttime".to_string());
        assert!(resolver.can_access_server(&caller, "/currenttime", "currenttime"));
        assert!(!resolver.can_access_server(&caller, "/other", "other"));
    }

    #[test]
    fn admin_scope_allows_every_server() {
        let resolver = ScopeResolver::new(vec![scope("admin", &["platform-admins"])]);
        let caller = caller(&["platform-admins"]);
        assert!(resolver.can_access_server(&caller, "/anything", "anything"));
    }

    #[test]
    fn group_restricted_agent_requires_group_overlap() {
        let resolver = ScopeResolver::new(vec![]);
        let a = agent(Visibility::GroupRestricted, &["eng"], None);
        assert!(!resolver.can_access_agent(&caller(&["ops"]), &a));
        assert!(resolver.can_access_agent(&caller(&["eng", "ops"]), &a));
    }

    #[test]
    fn can_invoke_denies_methods_outside_server_access_entry() {
        let resolver = ScopeResolver::new(vec![restrictive_scope("readers", &["eng"], &["list_tools"], &["*"])]);
        let caller = caller(&["eng"]);
        assert!(resolver.can_invoke(&caller, "/currenttime", "currenttime", "list_tools", None));
        assert!(!resolver.can_invoke(&caller, "/currenttime", "currenttime", "call_tool", None));
    }

    #[test]
    fn can_invoke_denies_tools_outside_server_access_entry() {
        let resolver = ScopeResolver::new(vec![restrictive_scope(
            "readers",
            &["eng"],
            &["*"],
            &["get_time"],
        )]);
        let caller = caller(&["eng"]);
        assert!(resolver.can_invoke(&caller, "/currenttime", "currenttime", "call_tool", Some("get_time")));
        assert!(!resolver.can_invoke(&caller, "/currenttime", "currenttime", "call_tool", Some("set_time")));
    }

    #[test]
    fn can_invoke_unrestricted_when_no_scope_names_the_server() {
        let resolver = ScopeResolver::new(vec![]);
        let mut caller = caller(&[]);
        caller.accessible_servers.insert("other".to_string());
        assert!(resolver.can_invoke(&caller, "/other", "other", "call_tool", Some("anything")));
    }

    #[test]
    fn can_invoke_denies_when_base_server_access_denied() {
        let resolver = ScopeResolver::new(vec![restrictive_scope("readers", &["eng"], &["*"], &["*"])]);
        let caller = caller(&["ops"]);
        assert!(!resolver.can_invoke(&caller, "/currenttime", "currenttime", "call_tool", None));
    }

    #[test]
    fn private_agent_visible_only_to_owner() {
        let resolver = ScopeResolver::new(vec![]);
        let a = agent(Visibility::Private, &[], Some("alice"));
        assert!(resolver.can_access_agent(&caller(&[]), &a));
        let mut other = caller(&[]);
        other.username = "bob".to_string();
        assert!(!resolver.can_access_agent(&other, &a));
    }
}
