use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::openapi::path::{Parameter, ParameterBuilder, ParameterIn};
use utoipa::openapi::schema::{ObjectBuilder, Type};
use utoipa::openapi::Required;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::entities::dao::{
    ChecklistItem, EntityRef, Note, Priority, RecurringPattern, Reminder, TaskCategory, TaskRecord,
    TaskStatus,
};
use crate::query::Projection;
use crate::schemas::{double_option, flexible_datetime_opt, normalize_tags, trimmed, trimmed_opt};

// ── requests ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteInput {
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

fn validate_pattern(pattern: &RecurringPattern) -> Result<(), ValidationError> {
    if pattern.interval == 0 {
        return Err(ValidationError::new("interval")
            .with_message("recurring interval must be at least 1".into()));
    }
    Ok(())
}

/// Body of `POST /api/tasks`. A `user` key in the body is ignored.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000, message = "description is limited to 2000 characters"))]
    pub description: String,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub category: Option<TaskCategory>,
    #[serde(default, deserialize_with = "flexible_datetime_opt")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Vec<NoteInput>,
    #[serde(default)]
    #[validate(nested)]
    pub checklist: Vec<AddChecklistItemRequest>,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
    pub project_ref: Option<String>,
    pub blog_ref: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    #[validate(custom(function = "validate_pattern"))]
    pub recurring_pattern: Option<RecurringPattern>,
}

impl CreateTaskRequest {
    /// Build the record owned by `user_id`. Status `completed` on creation
    /// latches `completedAt` immediately.
    pub fn into_record(self, user_id: &str, now: DateTime<Utc>) -> TaskRecord {
        let mut task = TaskRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_owned(),
            title: self.title,
            description: self.description,
            priority: self.priority.unwrap_or_default(),
            status: TaskStatus::default(),
            category: self.category.unwrap_or_default(),
            due_date: self.due_date.unwrap_or(now),
            completed_at: None,
            tags: normalize_tags(self.tags),
            notes: self
                .notes
                .into_iter()
                .map(|n| Note {
                    text: n.text,
                    created_at: n.created_at.unwrap_or(now),
                })
                .collect(),
            checklist: self
                .checklist
                .into_iter()
                .map(AddChecklistItemRequest::into_item)
                .collect(),
            reminders: self.reminders,
            project_ref: self.project_ref.map(EntityRef::unpopulated),
            blog_ref: self.blog_ref.map(EntityRef::unpopulated),
            is_recurring: self.is_recurring,
            recurring_pattern: self.recurring_pattern,
            created_at: now,
            updated_at: now,
        };
        task.set_status(self.status.unwrap_or_default(), now);
        task
    }
}

/// Body of `PUT /api/tasks/{id}`. Absent keys leave the field untouched;
/// `null` clears the nullable ones.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "description is limited to 2000 characters"))]
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub category: Option<TaskCategory>,
    #[serde(default, deserialize_with = "flexible_datetime_opt")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<Vec<NoteInput>>,
    #[validate(nested)]
    pub checklist: Option<Vec<AddChecklistItemRequest>>,
    pub reminders: Option<Vec<Reminder>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub project_ref: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub blog_ref: Option<Option<String>>,
    pub is_recurring: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<RecurringPattern>)]
    pub recurring_pattern: Option<Option<RecurringPattern>>,
}

impl UpdateTaskRequest {
    /// Merge into `task`, applying the completion latch in the same write.
    pub fn apply_to(self, task: &mut TaskRecord, now: DateTime<Utc>) -> Result<(), ValidationError> {
        if let Some(Some(pattern)) = &self.recurring_pattern {
            validate_pattern(pattern)?;
        }
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(tags) = self.tags {
            task.tags = normalize_tags(tags);
        }
        if let Some(notes) = self.notes {
            task.notes = notes
                .into_iter()
                .map(|n| Note {
                    text: n.text,
                    created_at: n.created_at.unwrap_or(now),
                })
                .collect();
        }
        if let Some(checklist) = self.checklist {
            task.checklist = checklist.into_iter().map(AddChecklistItemRequest::into_item).collect();
        }
        if let Some(reminders) = self.reminders {
            task.reminders = reminders;
        }
        if let Some(project_ref) = self.project_ref {
            task.project_ref = project_ref.map(EntityRef::unpopulated);
        }
        if let Some(blog_ref) = self.blog_ref {
            task.blog_ref = blog_ref.map(EntityRef::unpopulated);
        }
        if let Some(is_recurring) = self.is_recurring {
            task.is_recurring = is_recurring;
        }
        if let Some(pattern) = self.recurring_pattern {
            task.recurring_pattern = pattern;
        }
        if let Some(status) = self.status {
            task.set_status(status, now);
        }
        task.updated_at = now;
        Ok(())
    }
}

/// Body of `POST /api/tasks/{id}/checklist`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddChecklistItemRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 500, message = "checklist text must be 1-500 characters"))]
    pub text: String,
    pub is_completed: Option<bool>,
}

impl AddChecklistItemRequest {
    pub fn into_item(self) -> ChecklistItem {
        ChecklistItem {
            id: Uuid::new_v4().to_string(),
            text: self.text,
            is_completed: self.is_completed.unwrap_or(false),
        }
    }
}

/// Body of `PUT /api/tasks/{id}/checklist/{itemId}`. Both keys optional.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChecklistItemRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, max = 500, message = "checklist text must be 1-500 characters"))]
    pub text: Option<String>,
    pub is_completed: Option<bool>,
}

impl UpdateChecklistItemRequest {
    pub fn apply_to(self, item: &mut ChecklistItem) {
        if let Some(text) = self.text {
            item.text = text;
        }
        if let Some(done) = self.is_completed {
            item.is_completed = done;
        }
    }
}

/// Raw query pairs of `GET /api/tasks`, in request order.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct TaskListQuery(pub Vec<(String, String)>);

impl IntoParams for TaskListQuery {
    fn into_params(parameter_in_provider: impl Fn() -> Option<ParameterIn>) -> Vec<Parameter> {
        [
            ("select", "Comma-separated fields to return; `_id` is always included"),
            ("sort", "Comma-separated sort keys, `-` prefix for descending"),
            ("page", "1-based page number"),
            ("limit", "Page size"),
            ("search", "Case-insensitive substring over title, description and tags"),
            ("category", "Exact category"),
            ("priority", "Exact priority"),
            ("status", "Exact status"),
            ("dueDate", "Due bucket: today, week or overdue"),
        ]
        .into_iter()
        .map(|(name, description)| {
            ParameterBuilder::new()
                .name(name)
                .parameter_in(parameter_in_provider().unwrap_or(ParameterIn::Query))
                .required(Required::False)
                .description(Some(description))
                .schema(Some(ObjectBuilder::new().schema_type(Type::String).build()))
                .build()
        })
        .collect()
    }
}

// ── responses ────────────────────────────────────────────────────────────────

/// A populated `projectRef` / `blogRef`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RefSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: String,
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
    pub project_ref: Option<RefSummary>,
    pub blog_ref: Option<RefSummary>,
    pub is_recurring: bool,
    pub recurring_pattern: Option<RecurringPattern>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn summarize(reference: Option<EntityRef>) -> Option<RefSummary> {
    reference.and_then(|r| r.title.map(|title| RefSummary { id: r.id, title }))
}

impl From<TaskRecord> for TaskResponse {
    fn from(task: TaskRecord) -> Self {
        Self {
            id: task.id,
            user: task.user_id,
            title: task.title,
            description: task.description,
            priority: task.priority,
            status: task.status,
            category: task.category,
            due_date: task.due_date,
            completed_at: task.completed_at,
            tags: task.tags,
            notes: task.notes,
            checklist: task.checklist,
            reminders: task.reminders,
            project_ref: summarize(task.project_ref),
            blog_ref: summarize(task.blog_ref),
            is_recurring: task.is_recurring,
            recurring_pattern: task.recurring_pattern,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

impl TaskResponse {
    /// Serialise, keeping only the keys in `projection` (plus `_id`).
    pub fn project(self, projection: Option<&Projection>) -> Result<serde_json::Value, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let (Some(projection), Some(object)) = (projection, value.as_object_mut()) {
            object.retain(|key, _| projection.includes(key));
        }
        Ok(value)
    }
}

/// Aggregate counts for `GET /api/tasks/stats`, scoped to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    pub by_category: BTreeMap<String, u64>,
    pub by_priority: BTreeMap<String, u64>,
    pub today: u64,
    pub overdue: u64,
    pub completed_today: u64,
}
