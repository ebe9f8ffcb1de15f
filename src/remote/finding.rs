//! Security findings reported by the analysis service

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Finding severity. Labels the service does not know map to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
    #[serde(other)]
    Unknown,
}

impl Severity {
    /// Ordering rank; `Unknown` ranks below `Low`
    fn rank(self) -> u8 {
        match self {
            Severity::Unknown => 0,
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Unknown => "unknown",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// One reported security issue in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub title: String,
    pub severity: Severity,
    #[serde(default, rename = "cwe_id", skip_serializing_if = "Option::is_none")]
    pub cwe_id: Option<String>,
    #[serde(default, rename = "cwe_name", skip_serializing_if = "Option::is_none")]
    pub cwe_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Finding {
    pub fn new(title: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            severity,
            cwe_id: None,
            cwe_name: None,
            suggestion: None,
            code_snippet: None,
            line: None,
            category: None,
        }
    }

    pub fn with_cwe(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.cwe_id = Some(id.into());
        self.cwe_name = Some(name.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// One-line description that drives a rewrite and its cache key.
    ///
    /// Stable for equal findings: every field that can change the rewrite
    /// appears in it.
    pub fn description(&self) -> String {
        let mut out = format!("[{}]", self.severity);
        if let Some(id) = &self.cwe_id {
            out.push(' ');
            out.push_str(id);
        }
        out.push(' ');
        out.push_str(&self.title);
        if let Some(line) = self.line {
            out.push_str(&format!(" (line {})", line));
        }
        if let Some(name) = &self.cwe_name {
            out.push_str(" - ");
            out.push_str(name);
        }
        if let Some(suggestion) = &self.suggestion {
            out.push_str(" | fix: ");
            out.push_str(suggestion);
        }
        out
    }
}

/// Descriptions of a finding list, in order
pub fn describe_all(findings: &[Finding]) -> Vec<String> {
    findings.iter().map(Finding::description).collect()
}
