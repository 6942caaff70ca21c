// ABOUTME: Path-to-filename mapping for the file backend
// ABOUTME: Strip the leading slash, replace remaining slashes with underscores, append a suffix

use std::path::PathBuf;

/// Map an entity `path` (e.g. `/currenttime`) to its on-disk filename.
#[must_use]
pub fn entity_filename(path: &str, suffix: &str) -> String {
    let stripped = path.trim_start_matches('/');
    let mangled = stripped.replace('/', "_");
    format!("{mangled}{suffix}")
}

#[must_use]
pub fn server_path(dir: &std::path::Path, path: &str) -> PathBuf {
    dir.join(entity_filename(path, ".json"))
}

#[must_use]
pub fn agent_path(dir: &std::path::Path, path: &str) -> PathBuf {
    dir.join(entity_filename(path, "_agent.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_nested_path() {
        assert_eq!(entity_filename("/foo/bar", ".json"), "foo_bar.json");
    }

    #[test]
    fn maps_top_level_path() {
        assert_eq!(entity_filename("/currenttime", ".json"), "currenttime.json");
        assert_eq!(entity_filename("/currenttime", "_agent.json"), "currenttime_agent.json");
    }
}
