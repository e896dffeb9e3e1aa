//! Project-tracking issues: workflow status, board position, field-level
//! change history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::activity::ActivityLog;
use crate::error::ParseEnumError;
use crate::id::RecordId;

/// Workflow status. One enum spans the workflow domains the suite tracks:
/// engineering boards, editorial pipelines, and the support desk. Analytics
/// fold every variant into one of three groups via [`IssueStatus::group`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    // Engineering
    Backlog,
    Todo,
    InProgress,
    InReview,
    Blocked,
    Done,
    Cancelled,
    // Editorial
    Draft,
    InEdit,
    Published,
    // Support desk
    Open,
    Pending,
    OnHold,
    Resolved,
    Closed,
}

/// Coarse bucket used by task metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusGroup {
    Completed,
    InProgress,
    Pending,
}

impl IssueStatus {
    pub const ALL: [Self; 15] = [
        Self::Backlog,
        Self::Todo,
        Self::InProgress,
        Self::InReview,
        Self::Blocked,
        Self::Done,
        Self::Cancelled,
        Self::Draft,
        Self::InEdit,
        Self::Published,
        Self::Open,
        Self::Pending,
        Self::OnHold,
        Self::Resolved,
        Self::Closed,
    ];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::InReview => "in_review",
            Self::Blocked => "blocked",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
            Self::Draft => "draft",
            Self::InEdit => "in_edit",
            Self::Published => "published",
            Self::Open => "open",
            Self::Pending => "pending",
            Self::OnHold => "on_hold",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    /// Human-facing label used in activity descriptions.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::Todo => "Todo",
            Self::InProgress => "In Progress",
            Self::InReview => "In Review",
            Self::Blocked => "Blocked",
            Self::Done => "Done",
            Self::Cancelled => "Cancelled",
            Self::Draft => "Draft",
            Self::InEdit => "In Edit",
            Self::Published => "Published",
            Self::Open => "Open",
            Self::Pending => "Pending",
            Self::OnHold => "On Hold",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
        }
    }

    /// Terminal "done" statuses across the workflow domains. Drives
    /// completion counts, completion rate, velocity, and the overdue check.
    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done | Self::Published | Self::Resolved)
    }

    /// Statuses representing work actively being carried out.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(
            self,
            Self::InProgress | Self::InReview | Self::InEdit | Self::OnHold
        )
    }

    /// Fold into the three metric buckets. The buckets partition the enum,
    /// so per-group counts always sum to the total.
    #[must_use]
    pub const fn group(self) -> StatusGroup {
        if self.is_done() {
            StatusGroup::Completed
        } else if self.is_active() {
            StatusGroup::InProgress
        } else {
            StatusGroup::Pending
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "backlog" => Ok(Self::Backlog),
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "in_review" => Ok(Self::InReview),
            "blocked" => Ok(Self::Blocked),
            "done" => Ok(Self::Done),
            "cancelled" => Ok(Self::Cancelled),
            "draft" => Ok(Self::Draft),
            "in_edit" => Ok(Self::InEdit),
            "published" => Ok(Self::Published),
            "open" => Ok(Self::Open),
            "pending" => Ok(Self::Pending),
            "on_hold" => Ok(Self::OnHold),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(ParseEnumError {
                expected: "issue status",
                got: s.to_string(),
            }),
        }
    }
}

/// Issue priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ParseEnumError {
                expected: "priority",
                got: s.to_string(),
            }),
        }
    }
}

/// The kind of tracked unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Task,
    Bug,
    Story,
    Epic,
    Subtask,
}

impl IssueType {
    pub const ALL: [Self; 5] = [
        Self::Task,
        Self::Bug,
        Self::Story,
        Self::Epic,
        Self::Subtask,
    ];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Bug => "bug",
            Self::Story => "story",
            Self::Epic => "epic",
            Self::Subtask => "subtask",
        }
    }
}

impl Default for IssueType {
    fn default() -> Self {
        Self::Task
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "task" => Ok(Self::Task),
            "bug" => Ok(Self::Bug),
            "story" => Ok(Self::Story),
            "epic" => Ok(Self::Epic),
            "subtask" => Ok(Self::Subtask),
            _ => Err(ParseEnumError {
                expected: "issue type",
                got: s.to_string(),
            }),
        }
    }
}

/// One field-level change. Status changes form a contiguous chain within
/// the log (each `from` equals the previous status entry's `to`; the seed
/// entry has `from = None`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub changed_by: String,
    pub at: DateTime<Utc>,
}

/// A tracked issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: RecordId,
    pub project_id: RecordId,
    pub title: String,
    pub description: Option<String>,
    pub status: IssueStatus,
    pub priority: Priority,
    pub issue_type: IssueType,
    pub assignee_id: Option<String>,
    pub sprint_id: Option<RecordId>,
    pub epic_id: Option<RecordId>,
    pub parent_id: Option<RecordId>,
    pub story_points: Option<u32>,
    pub due_date: Option<DateTime<Utc>>,
    pub column_order: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
    pub(crate) history: Vec<FieldChange>,
    pub activities: ActivityLog,
}

impl Issue {
    /// The field-level change log, distinct from the activity trail.
    #[must_use]
    pub fn history(&self) -> &[FieldChange] {
        &self.history
    }
}

/// Issue fields minus system fields, for `IssueStore::add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIssue {
    pub project_id: RecordId,
    pub title: String,
    pub description: Option<String>,
    pub status: IssueStatus,
    pub priority: Priority,
    pub issue_type: IssueType,
    pub assignee_id: Option<String>,
    pub sprint_id: Option<RecordId>,
    pub epic_id: Option<RecordId>,
    pub parent_id: Option<RecordId>,
    pub story_points: Option<u32>,
    pub due_date: Option<DateTime<Utc>>,
    pub column_order: u32,
}

impl NewIssue {
    #[must_use]
    pub fn new(project_id: RecordId, title: impl Into<String>) -> Self {
        Self {
            project_id,
            title: title.into(),
            description: None,
            status: IssueStatus::Todo,
            priority: Priority::default(),
            issue_type: IssueType::default(),
            assignee_id: None,
            sprint_id: None,
            epic_id: None,
            parent_id: None,
            story_points: None,
            due_date: None,
            column_order: 0,
        }
    }
}

/// Partial update for an issue. Status and board position are absent by
/// design: they move through `IssueStore::update_status` and
/// `IssueStore::reorder` so the history chain stays contiguous.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssuePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub issue_type: Option<IssueType>,
    pub assignee_id: Option<String>,
    pub sprint_id: Option<RecordId>,
    pub epic_id: Option<RecordId>,
    pub story_points: Option<u32>,
    pub due_date: Option<DateTime<Utc>>,
}

impl IssuePatch {
    #[must_use]
    pub fn touched_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.priority.is_some() {
            fields.push("priority");
        }
        if self.issue_type.is_some() {
            fields.push("issue_type");
        }
        if self.assignee_id.is_some() {
            fields.push("assignee_id");
        }
        if self.sprint_id.is_some() {
            fields.push("sprint_id");
        }
        if self.epic_id.is_some() {
            fields.push("epic_id");
        }
        if self.story_points.is_some() {
            fields.push("story_points");
        }
        if self.due_date.is_some() {
            fields.push("due_date");
        }
        fields
    }
}
