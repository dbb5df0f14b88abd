pub mod sink;

use std::path::Path;

use serde::Serialize;

pub use sink::{NotifySink, StdoutSink, TelegramSink};

/// Outcome summary for one pipeline run, sent through the configured sinks.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: String,
    pub executed_at: String,
    pub variation_count: Option<usize>,
    /// Last lines of the run log, included only for failed runs.
    pub log_tail: Option<String>,
}

pub fn build_message(report: &RunReport) -> String {
    let status = report.status.to_lowercase();
    let headline = match status.as_str() {
        "success" => "Run completed successfully.".to_string(),
        "failure" => "Run finished with errors.".to_string(),
        other => format!("Run finished with status: {other}"),
    };

    let count = report
        .variation_count
        .map(|n| n.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    let mut parts = vec![
        "SEO variations pipeline".to_string(),
        headline,
        format!("Executed at: {}", report.executed_at),
        format!("Variation rows: {count}"),
    ];
    if status != "success" {
        if let Some(tail) = &report.log_tail {
            parts.push(String::new());
            parts.push("Last log lines:".to_string());
            parts.push(tail.clone());
        }
    }
    parts.join("\n")
}

/// Last `keep` lines of a run log, or `None` when the file is missing,
/// unreadable, or empty.
pub fn read_log_tail(path: &Path, keep: usize) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(keep);
    let tail = lines[start..].join("\n").trim().to_string();
    if tail.is_empty() {
        None
    } else {
        Some(tail)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn report(status: &str, tail: Option<&str>) -> RunReport {
        RunReport {
            status: status.to_string(),
            executed_at: "2026-08-29T08:00:00+00:00".to_string(),
            variation_count: Some(42),
            log_tail: tail.map(|t| t.to_string()),
        }
    }

    #[test]
    fn success_message_omits_the_log_tail() {
        let message = build_message(&report("SUCCESS", Some("boom")));
        assert!(message.contains("completed successfully"));
        assert!(message.contains("Variation rows: 42"));
        assert!(!message.contains("boom"));
    }

    #[test]
    fn failure_message_includes_the_log_tail() {
        let message = build_message(&report("failure", Some("stack trace here")));
        assert!(message.contains("finished with errors"));
        assert!(message.contains("stack trace here"));
    }

    #[test]
    fn unknown_status_is_reported_verbatim() {
        let message = build_message(&report("cancelled", None));
        assert!(message.contains("status: cancelled"));
    }

    #[test]
    fn log_tail_keeps_only_the_last_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for i in 0..50 {
            writeln!(file, "line {i}").unwrap();
        }
        let tail = read_log_tail(file.path(), 3).unwrap();
        assert_eq!(tail, "line 47\nline 48\nline 49");
    }

    #[test]
    fn log_tail_of_missing_file_is_none() {
        assert!(read_log_tail(Path::new("/nonexistent/run.log"), 40).is_none());
    }
}
