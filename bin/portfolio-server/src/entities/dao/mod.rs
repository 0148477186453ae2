pub mod blog;
pub mod project;
pub mod task;

pub use blog::{slugify, BlogPostRecord};
pub use project::{ProjectRecord, ProjectStatus};
pub use task::{
    ChecklistItem, EntityRef, Frequency, Note, Priority, RecurringPattern, Reminder, TaskCategory,
    TaskRecord, TaskStatus,
};
