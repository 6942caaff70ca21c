// ABOUTME: Domain constants shared between the HTTP layer and the background subsystems
// ABOUTME: Grouped by concern rather than dumped into one flat list

/// Scope and permission constants.
pub mod scope {
    /// Reserved scope name implying access to every entity and operation.
    pub const ADMIN_SCOPE: &str = "admin";

    /// Sentinel accepted in `accessible_servers`/`accessible_agents`/UI-permission
    /// lists meaning "every entity of this kind".
    pub const WILDCARD_ALL: &str = "all";
}

/// Search and ranking constants.
pub mod search {
    /// Default `numCandidates` multiplier for the `$vectorSearch` stage.
    pub const DEFAULT_NUM_CANDIDATES_MULTIPLIER: u32 = 10;

    /// `limit * CANDIDATE_FANOUT` results are pulled out of stage 1 before
    /// lexical boosting and re-ranking trims back down to `limit`.
    pub const CANDIDATE_FANOUT: usize = 3;

    /// Per-entity-type cap on a single search response.
    pub const DEFAULT_RESULTS_PER_TYPE: usize = 3;

    /// Minimum token length kept after tokenizing a query; shorter tokens are dropped.
    pub const MIN_TOKEN_LEN: usize = 3;

    pub const TEXT_BOOST_PATH_MATCH: f64 = 5.0;
    pub const TEXT_BOOST_NAME_MATCH: f64 = 3.0;
    pub const TEXT_BOOST_DESCRIPTION_MATCH: f64 = 2.0;
    pub const TEXT_BOOST_TAG_MATCH: f64 = 1.5;
    pub const TEXT_BOOST_TOOL_MATCH: f64 = 1.0;

    /// Weight applied to the lexical `text_boost` term when combining it with
    /// the normalized vector score.
    pub const TEXT_BOOST_WEIGHT: f64 = 0.1;

    /// MongoDB error code returned when `$vectorSearch` is unsupported by the
    /// connected cluster (no `mongot` companion process).
    pub const VECTOR_SEARCH_UNSUPPORTED_CODE: i32 = 31082;
}

/// Health monitor constants.
pub mod health {
    pub const DEFAULT_CHECK_INTERVAL_SECONDS: u64 = 300;
    pub const DEFAULT_CHECK_TIMEOUT_SECONDS: u64 = 2;
}

/// Security admission constants.
pub mod security {
    pub const DEFAULT_SCAN_TIMEOUT_SECONDS: u64 = 60;
}

/// Startup retry constants.
pub mod startup {
    /// Initial backoff before retrying the scope-load step when the backend
    /// is not yet reachable.
    pub const SCOPE_LOAD_INITIAL_DELAY_SECONDS: u64 = 2;
    pub const SCOPE_LOAD_BACKOFF_BASE: u32 = 2;
    pub const SCOPE_LOAD_MAX_ATTEMPTS: u32 = 5;
}

/// Rating constants.
pub mod rating {
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 5;
}
