use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 一列來源資料，key 為表頭原文
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
    /// 1-based row number in the source file, header included
    #[serde(default)]
    pub source_row: Option<usize>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_row(mut self, row: usize) -> Self {
        self.source_row = Some(row);
        self
    }

    pub fn with(mut self, column: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(column.to_string(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&serde_json::Value> {
        self.data.get(column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub leaves: Vec<Leaf>,
}

impl Group {
    pub fn leaf(&self, name: &str) -> Option<&Leaf> {
        self.leaves.iter().find(|l| l.name == name)
    }
}

/// One XML submission instance, in the exact element order it is serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub namespaces: Vec<(String, String)>,
    pub top_level: Vec<Leaf>,
    pub groups: Vec<Group>,
    pub instance_id: String,
}

impl Document {
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResponse {
    pub status: u16,
    pub body: String,
}

impl SubmissionResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub index: usize,
    pub source_row: Option<usize>,
    pub status: Option<u16>,
    pub body: String,
    pub error: Option<String>,
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && matches!(self.status, Some(s) if (200..300).contains(&s))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcomes: Vec<SubmissionOutcome>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn elapsed(&self) -> Option<chrono::Duration> {
        Some(self.finished_at? - self.started_at?)
    }
}
