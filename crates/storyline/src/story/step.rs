//! Story step records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StorylineError;

/// What a step asks the user to populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    #[default]
    Table,
    View,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Table => "table",
            SourceType::View => "view",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = StorylineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(SourceType::Table),
            "view" => Ok(SourceType::View),
            other => Err(StorylineError::Persistence(format!(
                "Unknown step source type '{}'",
                other
            ))),
        }
    }
}

/// A persisted story step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryStep {
    /// Row id in the system database.
    pub id: i64,
    pub source_type: SourceType,
    /// Table (or view) the step is bound to.
    pub source_name: String,
    /// Position in the story; unique among enabled steps.
    pub order_index: i64,
    pub title: String,
    pub description: String,
    /// Rows needed before the step counts as complete.
    pub min_records_required: u64,
    pub enabled: bool,
}

/// A step produced by the materializer, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStoryStep {
    pub source_type: SourceType,
    pub source_name: String,
    pub order_index: i64,
    pub title: String,
    pub description: String,
    pub min_records_required: u64,
    pub enabled: bool,
}

impl NewStoryStep {
    /// Attach the id assigned on insert.
    pub fn into_step(self, id: i64) -> StoryStep {
        StoryStep {
            id,
            source_type: self.source_type,
            source_name: self.source_name,
            order_index: self.order_index,
            title: self.title,
            description: self.description,
            min_records_required: self.min_records_required,
            enabled: self.enabled,
        }
    }
}

/// Sparse edit of a stored step. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_records_required: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i64>,
}

impl StepUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_min_records(mut self, min_records: u64) -> Self {
        self.min_records_required = Some(min_records);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn with_order_index(mut self, order_index: i64) -> Self {
        self.order_index = Some(order_index);
        self
    }

    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.min_records_required.is_none()
            && self.enabled.is_none()
            && self.order_index.is_none()
    }

    /// Apply the edit to an in-memory step.
    pub fn apply_to(&self, step: &mut StoryStep) {
        if let Some(title) = &self.title {
            step.title = title.clone();
        }
        if let Some(description) = &self.description {
            step.description = description.clone();
        }
        if let Some(min_records) = self.min_records_required {
            step.min_records_required = min_records;
        }
        if let Some(enabled) = self.enabled {
            step.enabled = enabled;
        }
        if let Some(order_index) = self.order_index {
            step.order_index = order_index;
        }
    }
}
