use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Task urgency. Declaration order is the semantic order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Numeric rank persisted next to the label so the store can order and
    /// range-compare by urgency instead of by spelling.
    pub const fn rank(self) -> i64 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
            Priority::Urgent => 3,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash,
    Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash,
    Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TaskCategory {
    Project,
    Blog,
    Learning,
    Personal,
    #[default]
    Other,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Free-text note appended to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Checklist entry, addressable by its own id inside the parent task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub is_completed: bool,
}

/// Stored reminder; nothing in the server delivers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub sent: bool,
}

/// Recurrence metadata. Stored only; no scheduler acts on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecurringPattern {
    pub frequency: Frequency,
    pub interval: u32,
    pub end_date: Option<DateTime<Utc>>,
}

/// Foreign reference, optionally populated with the target's title.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRef {
    pub id: String,
    /// `None` when not populated or when the target no longer exists.
    pub title: Option<String>,
}

impl EntityRef {
    pub fn unpopulated(id: String) -> Self {
        Self { id, title: None }
    }
}

/// A row in the `tasks` table together with its embedded collections.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub category: TaskCategory,
    pub due_date: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub notes: Vec<Note>,
    pub checklist: Vec<ChecklistItem>,
    pub reminders: Vec<Reminder>,
    pub project_ref: Option<EntityRef>,
    pub blog_ref: Option<EntityRef>,
    pub is_recurring: bool,
    pub recurring_pattern: Option<RecurringPattern>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    /// Change status, latching `completed_at` the first time the task is
    /// completed. Later transitions never clear it.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == TaskStatus::Completed && self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
    }

    pub fn checklist_item_mut(&mut self, item_id: &str) -> Option<&mut ChecklistItem> {
        self.checklist.iter_mut().find(|item| item.id == item_id)
    }

    /// Remove a checklist item; returns `false` when no item has that id.
    pub fn remove_checklist_item(&mut self, item_id: &str) -> bool {
        let before = self.checklist.len();
        self.checklist.retain(|item| item.id != item_id);
        self.checklist.len() != before
    }
}
