//! Per-workflow inspection of step outputs.
//!
//! Each runbook reports its checks as free text in its own format, so
//! every scenario carries its own [`Inspector`] naming the output keys to
//! read and the line markers that denote a failed check, a warning, or a
//! remediation hint.

use std::sync::LazyLock;

use regex::Regex;

use crate::report::Severity;
use crate::types::StepOutputs;

/// Leading bullet or list numbering stripped from report lines.
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*\u{2022}]|\d+[.)])\s+").expect("valid regex"));

/// Output inspection rules for one workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inspector {
    /// Output names to read, without the `Step.` prefix. Empty reads all.
    pub output_keys: &'static [&'static str],
    /// Substrings marking a failed check.
    pub error_markers: &'static [&'static str],
    /// Substrings marking a non-fatal issue.
    pub warning_markers: &'static [&'static str],
    /// Case-insensitive line prefixes introducing a remediation hint.
    pub remediation_prefixes: &'static [&'static str],
}

pub const EKS_WORKER_NODE: Inspector = Inspector {
    output_keys: &["Message"],
    error_markers: &["[X]", "[FAILED]", "[ERROR]"],
    warning_markers: &["[!]", "[WARNING]"],
    remediation_prefixes: &["recommendation:", "resolution:", "please "],
};

pub const ECS_CONTAINER_INSTANCE: Inspector = Inspector {
    output_keys: &["Output", "Message"],
    error_markers: &["[FAILED]", "[ERROR]", "[X]"],
    warning_markers: &["[WARNING]", "[!]"],
    remediation_prefixes: &["recommendation:", "remediation:", "suggestion:"],
};

pub const S3_LAMBDA_EVENT: Inspector = Inspector {
    output_keys: &["Report", "Message", "OutputPayload"],
    error_markers: &["[ERROR]", "[FAILED]", "[X]"],
    warning_markers: &["[WARNING]", "[WARN]"],
    remediation_prefixes: &["recommendation:", "resolution:", "action:"],
};

/// A single anomaly line found in step output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anomaly {
    pub severity: Severity,
    pub message: String,
}

/// What an inspector found in one step's outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observation {
    pub anomalies: Vec<Anomaly>,
    pub remediation: Vec<String>,
}

impl Inspector {
    /// Scan a step's outputs for anomaly and remediation lines.
    ///
    /// Lines are visited in output-key order, then in line order, so the
    /// result is deterministic for identical input.
    pub fn inspect(&self, outputs: &StepOutputs) -> Observation {
        let mut observation = Observation::default();

        for (key, value) in outputs {
            if !self.reads_key(key) {
                continue;
            }
            let mut lines = Vec::new();
            collect_lines(value, &mut lines);

            for raw in lines {
                let line = clean_line(&raw);
                if line.is_empty() {
                    continue;
                }
                if let Some(severity) = self.classify(line) {
                    observation.anomalies.push(Anomaly {
                        severity,
                        message: line.to_string(),
                    });
                } else if self.is_remediation(line) {
                    observation.remediation.push(line.to_string());
                }
            }
        }

        observation
    }

    fn reads_key(&self, key: &str) -> bool {
        self.output_keys.is_empty() || self.output_keys.contains(&output_name(key))
    }

    fn classify(&self, line: &str) -> Option<Severity> {
        if self.error_markers.iter().any(|m| line.contains(m)) {
            Some(Severity::Error)
        } else if self.warning_markers.iter().any(|m| line.contains(m)) {
            Some(Severity::Warning)
        } else {
            None
        }
    }

    fn is_remediation(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        self.remediation_prefixes
            .iter()
            .any(|prefix| lower.starts_with(prefix))
    }
}

/// Output name with any `StepName.` prefix removed.
pub fn output_name(key: &str) -> &str {
    key.rsplit_once('.').map_or(key, |(_, name)| name)
}

/// Flatten an output value into text lines.
///
/// Strings holding serialized JSON are decoded and flattened too, since
/// script steps commonly return their payload that way.
fn collect_lines(value: &serde_json::Value, lines: &mut Vec<String>) {
    match value {
        serde_json::Value::String(s) => {
            let trimmed = s.trim_start();
            if trimmed.starts_with('{') || trimmed.starts_with('[') {
                if let Ok(decoded) = serde_json::from_str::<serde_json::Value>(s) {
                    collect_lines(&decoded, lines);
                    return;
                }
            }
            lines.extend(s.lines().map(str::to_string));
        }
        serde_json::Value::Array(items) => {
            for item in items {
                collect_lines(item, lines);
            }
        }
        serde_json::Value::Object(map) => {
            for item in map.values() {
                collect_lines(item, lines);
            }
        }
        serde_json::Value::Null => {}
        other => lines.push(other.to_string()),
    }
}

fn clean_line(line: &str) -> &str {
    let stripped = match BULLET_RE.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    };
    stripped.trim()
}
