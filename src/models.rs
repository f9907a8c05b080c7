//! Data models for the occupation dataset.
//!
//! This module contains the validated in-memory representation of the
//! dataset: job records, their taxonomy entries and parsed task lists.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// One of the four taxonomy depths, from broadest (level 1) to most
/// specific (level 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub enum TaxonomyLevel {
    Level1,
    Level2,
    Level3,
    Level4,
}

impl TaxonomyLevel {
    /// All levels, broadest first.
    pub const ALL: [TaxonomyLevel; 4] = [
        TaxonomyLevel::Level1,
        TaxonomyLevel::Level2,
        TaxonomyLevel::Level3,
        TaxonomyLevel::Level4,
    ];

    /// Zero-based position in a record's taxonomy array.
    pub fn index(self) -> usize {
        match self {
            TaxonomyLevel::Level1 => 0,
            TaxonomyLevel::Level2 => 1,
            TaxonomyLevel::Level3 => 2,
            TaxonomyLevel::Level4 => 3,
        }
    }

    /// One-based level number as used by callers.
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Map a one-based level number to a level.
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(TaxonomyLevel::Level1),
            2 => Some(TaxonomyLevel::Level2),
            3 => Some(TaxonomyLevel::Level3),
            4 => Some(TaxonomyLevel::Level4),
            _ => None,
        }
    }
}

impl From<TaxonomyLevel> for u8 {
    fn from(level: TaxonomyLevel) -> Self {
        level.number()
    }
}

impl fmt::Display for TaxonomyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Level {}", self.number())
    }
}

impl FromStr for TaxonomyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(TaxonomyLevel::from_number)
            .ok_or_else(|| format!("Level {} not available", s))
    }
}

/// Importance class of a task, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Primary,
    Secondary,
    Ancillary,
}

impl Importance {
    pub const ALL: [Importance; 3] = [
        Importance::Primary,
        Importance::Secondary,
        Importance::Ancillary,
    ];

    /// Parse a free-form classification; unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "primary" => Some(Importance::Primary),
            "secondary" => Some(Importance::Secondary),
            "ancillary" => Some(Importance::Ancillary),
            _ => None,
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Importance::Primary => write!(f, "Primary"),
            Importance::Secondary => write!(f, "Secondary"),
            Importance::Ancillary => write!(f, "Ancillary"),
        }
    }
}

/// Flag value marking a task as automatable.
pub const AUTOMATABLE_FLAG: &str = "Automatable";

/// Classification used when the payload omits one.
pub const DEFAULT_IMPORTANCE: &str = "Not specified";

/// Reasoning used when the payload omits one.
pub const DEFAULT_REASONING: &str = "No reasoning provided";

/// A unit of work inside a job, parsed once at load time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub automatability_flag: String,
    pub importance_classification: String,
    pub reasoning: String,
    /// Reason codes supporting the flag, in source order.
    pub question: Vec<String>,
    /// Payload fields without a dedicated slot (e.g. the task text).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Task {
    pub fn is_automatable(&self) -> bool {
        self.automatability_flag == AUTOMATABLE_FLAG
    }

    pub fn importance(&self) -> Option<Importance> {
        Importance::from_label(&self.importance_classification)
    }
}

impl Default for Task {
    fn default() -> Self {
        Self {
            automatability_flag: String::new(),
            importance_classification: DEFAULT_IMPORTANCE.to_string(),
            reasoning: DEFAULT_REASONING.to_string(),
            question: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Name and code of a record at one taxonomy level. Either may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaxonomyEntry {
    pub name: Option<String>,
    pub code: Option<String>,
}

impl TaxonomyEntry {
    #[allow(dead_code)] // Convenience constructor
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            code: Some(code.into()),
        }
    }
}

/// One occupation with both scores present and numeric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    pub title: String,
    pub description: String,
    pub taxonomy: [TaxonomyEntry; 4],
    pub auto_score: f64,
    pub manual_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    pub tasks: Vec<Task>,
}

impl JobRecord {
    pub fn level(&self, level: TaxonomyLevel) -> &TaxonomyEntry {
        &self.taxonomy[level.index()]
    }

    pub fn level_name(&self, level: TaxonomyLevel) -> Option<&str> {
        self.level(level).name.as_deref()
    }

    pub fn level_code(&self, level: TaxonomyLevel) -> Option<&str> {
        self.level(level).code.as_deref()
    }
}

/// The validated record collection plus the levels the source provides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<JobRecord>,
    /// Whether the source carried a name column for each level.
    pub levels_present: [bool; 4],
}

impl Dataset {
    pub fn new(records: Vec<JobRecord>, levels_present: [bool; 4]) -> Self {
        Self {
            records,
            levels_present,
        }
    }

    pub fn has_level(&self, level: TaxonomyLevel) -> bool {
        self.levels_present[level.index()]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[allow(dead_code)] // Pairs with len()
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record whose title matches exactly.
    pub fn find_by_title(&self, title: &str) -> Option<&JobRecord> {
        self.records.iter().find(|r| r.title == title)
    }
}
