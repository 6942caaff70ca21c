// ABOUTME: Security admission — invokes the external scanner process, classifies verdicts
// ABOUTME: The scanner is a configured command template; stdout/stderr are captured, ANSI-stripped, and JSON-extracted

use crate::config::SecurityScanSettings;
use crate::models::{SecurityScanResult, SeverityCounts};
use registry_core::AppError;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Runs a configured scanner command against one entity path and classifies
/// the verdict.
pub struct SecurityAdmission {
    settings: SecurityScanSettings,
}

impl SecurityAdmission {
    #[must_use]
    pub const fn new(settings: SecurityScanSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub const fn should_scan(&self) -> bool {
        self.settings.enabled && self.settings.scan_on_registration
    }

    #[must_use]
    pub const fn blocks_unsafe(&self) -> bool {
        self.settings.block_unsafe
    }

    /// Run the scanner for `entity_path`. Never returns `Err`: a process
    /// failure or timeout is itself represented as a failed-scan
    /// [`SecurityScanResult`].
    pub async fn scan(&self, entity_path: &str) -> SecurityScanResult {
        let command_line = crate::config::Config::render_scan_command(&self.settings.command_template, entity_path);
        let Some((program, args)) = split_command(&command_line) else {
            return SecurityScanResult::failed_scan(entity_path, "empty scanner command template");
        };

        let spawn = Command::new(program)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawn {
            Ok(child) => child,
            Err(e) => return SecurityScanResult::failed_scan(entity_path, format!("failed to spawn scanner: {e}")),
        };

        let timeout = Duration::from_secs(self.settings.timeout_seconds);
        let output = tokio::time::timeout(timeout, child.wait_with_output()).await;

        let output = match output {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return SecurityScanResult::failed_scan(entity_path, format!("scanner I/O error: {e}")),
            Err(_) => {
                tracing::warn!(path = %entity_path, timeout_seconds = self.settings.timeout_seconds, "scanner timed out");
                return SecurityScanResult::failed_scan(entity_path, "scanner timed out");
            }
        };

        if !output.status.success() {
            let stderr = strip_ansi(&String::from_utf8_lossy(&output.stderr));
            return SecurityScanResult::failed_scan(
                entity_path,
                format!("scanner exited with {}: {stderr}", output.status),
            );
        }

        let stdout = strip_ansi(&String::from_utf8_lossy(&output.stdout));
        match extract_json(&stdout) {
            Some(value) => classify(entity_path, value),
            None => SecurityScanResult::failed_scan(entity_path, "scanner produced no parseable JSON output"),
        }
    }
}

/// Classify raw analyzer JSON into a [`SecurityScanResult`].
/// Accepts either a single finding object with `critical`/`high`/`medium`/`low`
/// counters or an array of per-analyzer objects, summed across analyzers.
fn classify(entity_path: &str, value: serde_json::Value) -> SecurityScanResult {
    let mut severity = SeverityCounts::default();
    let mut analyzers = Vec::new();

    let items: Vec<&serde_json::Value> = match &value {
        serde_json::Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    for item in items {
        if let Some(name) = item.get("analyzer").and_then(serde_json::Value::as_str) {
            analyzers.push(name.to_string());
        }
        severity.critical += count_at(item, "critical");
        severity.high += count_at(item, "high");
        severity.medium += count_at(item, "medium");
        severity.low += count_at(item, "low");
    }

    SecurityScanResult {
        entity_path: entity_path.to_string(),
        scanned_at: chrono::Utc::now(),
        is_safe: severity.is_safe(),
        severity,
        analyzers,
        raw_output: Some(value),
        failed: false,
        error: None,
    }
}

fn count_at(item: &serde_json::Value, key: &str) -> u32 {
    item.get(key).and_then(serde_json::Value::as_u64).and_then(|v| u32::try_from(v).ok()).unwrap_or(0)
}

/// Strip ANSI escape sequences from scanner output before JSON extraction
/// and error surfacing.
fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' && chars.peek() == Some(&'[') {
            chars.next();
            for next in chars.by_ref() {
                if next.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Find the first JSON array or object in `text` and parse it.
fn extract_json(text: &str) -> Option<serde_json::Value> {
    let start = text.find(['{', '['])?;
    let opening = text.as_bytes()[start] as char;
    let closing = if opening == '{' { '}' } else { ']' };

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            c if c == opening => depth += 1,
            c if c == closing => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return serde_json::from_str(&text[start..end]).ok();
                }
            }
            _ => {}
        }
    }
    None
}

fn split_command(command_line: &str) -> Option<(String, Vec<String>)> {
    let mut parts = command_line.split_whitespace();
    let program = parts.next()?.to_string();
    Some((program, parts.map(String::from).collect()))
}

/// Build the `ExternalProcessFailed`/security-decision error for a blocked
/// registration.
#[must_use]
pub fn security_blocked_error(entity_path: &str, severity: SeverityCounts) -> AppError {
    AppError::new(
        registry_core::ErrorKind::ExternalProcessFailed,
        format!("registration of {entity_path} blocked by security scan"),
    )
    .with_detail(serde_json::json!({
        "critical": severity.critical,
        "high": severity.high,
        "medium": severity.medium,
        "low": severity.low,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_json_object_amid_prose() {
        let text = "Scanning...\nDone. Result: {\"critical\":1,\"high\":0} extra text";
        let value = extract_json(text).unwrap();
        assert_eq!(value["critical"], 1);
    }

    #[test]
    fn extracts_json_array() {
        let text = "[{\"analyzer\":\"semgrep\",\"high\":2}]";
        let value = extract_json(text).unwrap();
        assert!(value.is_array());
    }

    #[test]
    fn strips_ansi_color_codes() {
        let input = "\u{1b}[31merror\u{1b}[0m: bad";
        assert_eq!(strip_ansi(input), "error: bad");
    }

    #[test]
    fn classify_sums_counts_across_analyzers() {
        let value = serde_json::json!([
            {"analyzer": "a", "critical": 1, "high": 0},
            {"analyzer": "b", "critical": 0, "high": 2},
        ]);
        let result = classify("/x", value);
        assert_eq!(result.severity.critical, 1);
        assert_eq!(result.severity.high, 2);
        assert!(!result.is_safe);
    }

    #[test]
    fn classify_single_object_is_safe_with_no_critical_or_high() {
        let value = serde_json::json!({"critical": 0, "high": 0, "medium": 3});
        let result = classify("/x", value);
        assert!(result.is_safe);
    }
}
