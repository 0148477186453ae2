use std::future::Future;

use sqlx::{QueryBuilder, Sqlite};

use crate::entities::dao::{EntityRef, Frequency, RecurringPattern, TaskRecord};
use crate::entities::{parse_json, parse_label, parse_opt_ts, parse_ts, to_json, ts, SqliteStore};
use crate::query::{Clause, CompareOp, Field, Filter, SortDirection, SortKey, Value};

/// Columns that can be grouped on for the stats endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Status,
    Category,
    Priority,
}

pub trait TaskStore: Send + Sync + 'static {
    fn insert_task(&self, task: &TaskRecord) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    /// Fetch one task with `projectRef` / `blogRef` titles populated.
    fn get_task(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<TaskRecord>, sqlx::Error>> + Send;
    /// Overwrite every mutable column of an existing task in one statement.
    fn save_task(&self, task: &TaskRecord) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    /// Returns `false` when no row had that id.
    fn delete_task(&self, id: &str) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
    fn find_tasks(
        &self,
        filter: &Filter,
        sort: &[SortKey],
        skip: u64,
        limit: Option<u32>,
    ) -> impl Future<Output = Result<Vec<TaskRecord>, sqlx::Error>> + Send;
    fn count_tasks(&self, filter: &Filter) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;
    fn count_tasks_by(
        &self,
        filter: &Filter,
        group: GroupBy,
    ) -> impl Future<Output = Result<Vec<(String, u64)>, sqlx::Error>> + Send;
    /// Null out references to a deleted project or blog post.
    fn clear_task_refs(
        &self,
        project_id: Option<&str>,
        blog_id: Option<&str>,
    ) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;
}

const SELECT_TASK: &str = "SELECT t.id, t.user_id, t.title, t.description, t.priority, t.status, \
     t.category, t.due_date, t.completed_at, t.tags, t.notes, t.checklist, t.reminders, \
     t.project_ref, t.blog_ref, t.is_recurring, t.recurring_frequency, t.recurring_interval, \
     t.recurring_end_date, t.created_at, t.updated_at, \
     p.title AS project_title, b.title AS blog_title \
     FROM tasks t \
     LEFT JOIN projects p ON p.id = t.project_ref \
     LEFT JOIN blog_posts b ON b.id = t.blog_ref";

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: String,
    user_id: String,
    title: String,
    description: String,
    priority: String,
    status: String,
    category: String,
    due_date: String,
    completed_at: Option<String>,
    tags: String,
    notes: String,
    checklist: String,
    reminders: String,
    project_ref: Option<String>,
    blog_ref: Option<String>,
    is_recurring: bool,
    recurring_frequency: Option<String>,
    recurring_interval: Option<i64>,
    recurring_end_date: Option<String>,
    created_at: String,
    updated_at: String,
    project_title: Option<String>,
    blog_title: Option<String>,
}

impl TaskRow {
    fn into_record(self) -> TaskRecord {
        let recurring_pattern = self
            .recurring_frequency
            .as_deref()
            .and_then(|f| f.parse::<Frequency>().ok())
            .map(|frequency| RecurringPattern {
                frequency,
                interval: self
                    .recurring_interval
                    .and_then(|i| u32::try_from(i).ok())
                    .unwrap_or(1),
                end_date: parse_opt_ts(self.recurring_end_date, "recurring_end_date"),
            });
        // A dangling reference populates to null, like a missing document.
        let populate = |id: Option<String>, title: Option<String>| {
            id.zip(title).map(|(id, title)| EntityRef { id, title: Some(title) })
        };
        TaskRecord {
            priority: parse_label(&self.priority, "priority"),
            status: parse_label(&self.status, "status"),
            category: parse_label(&self.category, "category"),
            due_date: parse_ts(&self.due_date, "due_date"),
            completed_at: parse_opt_ts(self.completed_at, "completed_at"),
            tags: parse_json(&self.tags, "tags"),
            notes: parse_json(&self.notes, "notes"),
            checklist: parse_json(&self.checklist, "checklist"),
            reminders: parse_json(&self.reminders, "reminders"),
            project_ref: populate(self.project_ref, self.project_title),
            blog_ref: populate(self.blog_ref, self.blog_title),
            is_recurring: self.is_recurring,
            recurring_pattern,
            created_at: parse_ts(&self.created_at, "created_at"),
            updated_at: parse_ts(&self.updated_at, "updated_at"),
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
        }
    }
}

// ── filter compilation ───────────────────────────────────────────────────────

fn column(field: Field, value: Option<&Value>) -> &'static str {
    match field {
        Field::User => "t.user_id",
        Field::Title => "t.title",
        Field::Description => "t.description",
        // Range comparisons and ordering use the semantic rank.
        Field::Priority => match value {
            Some(Value::Text(_)) => "t.priority",
            _ => "t.priority_rank",
        },
        Field::Status => "t.status",
        Field::Category => "t.category",
        Field::DueDate => "t.due_date",
        Field::CompletedAt => "t.completed_at",
        Field::CreatedAt => "t.created_at",
        Field::UpdatedAt => "t.updated_at",
        Field::Tags => "t.tags",
        Field::ProjectRef => "t.project_ref",
        Field::BlogRef => "t.blog_ref",
        Field::IsRecurring => "t.is_recurring",
        Field::RecurringFrequency => "t.recurring_frequency",
        Field::RecurringInterval => "t.recurring_interval",
        Field::RecurringEndDate => "t.recurring_end_date",
    }
}

fn operator(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => " = ",
        // Null-safe: a missing value is "not equal", as in a document store.
        CompareOp::Ne => " IS NOT ",
        CompareOp::Gt => " > ",
        CompareOp::Gte => " >= ",
        CompareOp::Lt => " < ",
        CompareOp::Lte => " <= ",
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Sqlite>, value: &Value) {
    match value {
        Value::Text(s) => qb.push_bind(s.clone()),
        Value::Integer(i) => qb.push_bind(*i),
        Value::Bool(b) => qb.push_bind(*b),
        Value::Timestamp(dt) => qb.push_bind(ts(dt)),
    };
}

/// Lowercased tag list for `tags_fold`.
fn fold_tags(tags: &[String]) -> Result<String, sqlx::Error> {
    to_json(&tags.iter().map(|t| t.to_lowercase()).collect::<Vec<_>>())
}

fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn push_clause(qb: &mut QueryBuilder<'_, Sqlite>, clause: &Clause) {
    match clause {
        Clause::Compare {
            field: Field::Tags,
            op,
            value,
        } => {
            if *op == CompareOp::Ne {
                qb.push("NOT ");
            }
            qb.push("EXISTS (SELECT 1 FROM json_each(t.tags) WHERE json_each.value = ");
            push_value(qb, value);
            qb.push(")");
        }
        Clause::Compare { field, op, value } => {
            qb.push(column(*field, Some(value)));
            qb.push(operator(*op));
            push_value(qb, value);
        }
        Clause::In { values, .. } if values.is_empty() => {
            qb.push("0");
        }
        Clause::In {
            field: Field::Tags,
            values,
        } => {
            qb.push("EXISTS (SELECT 1 FROM json_each(t.tags) WHERE json_each.value IN (");
            let mut list = qb.separated(", ");
            for value in values {
                match value {
                    Value::Text(s) => list.push_bind(s.clone()),
                    Value::Integer(i) => list.push_bind(*i),
                    Value::Bool(b) => list.push_bind(*b),
                    Value::Timestamp(dt) => list.push_bind(ts(dt)),
                };
            }
            qb.push("))");
        }
        Clause::In { field, values } => {
            qb.push(column(*field, values.first()));
            qb.push(" IN (");
            let mut list = qb.separated(", ");
            for value in values {
                match value {
                    Value::Text(s) => list.push_bind(s.clone()),
                    Value::Integer(i) => list.push_bind(*i),
                    Value::Bool(b) => list.push_bind(*b),
                    Value::Timestamp(dt) => list.push_bind(ts(dt)),
                };
            }
            qb.push(")");
        }
        Clause::Search(term) => {
            // The *_fold columns are already lowercased, so LIKE only has to
            // compare bytes for non-ASCII text.
            let pattern = like_pattern(&term.to_lowercase());
            qb.push("(t.title_fold LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" ESCAPE '\\' OR t.description_fold LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(
                " ESCAPE '\\' OR EXISTS (SELECT 1 FROM json_each(t.tags_fold) \
                 WHERE json_each.value LIKE ",
            );
            qb.push_bind(pattern);
            qb.push(" ESCAPE '\\'))");
        }
    }
}

fn push_where(qb: &mut QueryBuilder<'_, Sqlite>, filter: &Filter) {
    for (i, clause) in filter.clauses().iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        push_clause(qb, clause);
    }
}

fn push_order(qb: &mut QueryBuilder<'_, Sqlite>, sort: &[SortKey]) {
    qb.push(" ORDER BY ");
    for key in sort.iter().filter(|k| k.field != Field::Tags) {
        qb.push(column(key.field, None));
        qb.push(match key.direction {
            SortDirection::Asc => " ASC, ",
            SortDirection::Desc => " DESC, ",
        });
    }
    // Stable pagination across equal sort keys.
    qb.push("t.id ASC");
}

// ── TaskStore ────────────────────────────────────────────────────────────────

impl TaskStore for SqliteStore {
    async fn insert_task(&self, task: &TaskRecord) -> Result<(), sqlx::Error> {
        let pattern = task.recurring_pattern.as_ref();
        sqlx::query(
            "INSERT INTO tasks (id, user_id, title, description, priority, priority_rank, status, \
             category, due_date, completed_at, tags, notes, checklist, reminders, project_ref, \
             blog_ref, is_recurring, recurring_frequency, recurring_interval, recurring_end_date, \
             created_at, updated_at, title_fold, description_fold, tags_fold) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, \
             ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)",
        )
        .bind(&task.id)
        .bind(&task.user_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority.as_ref())
        .bind(task.priority.rank())
        .bind(task.status.as_ref())
        .bind(task.category.as_ref())
        .bind(ts(&task.due_date))
        .bind(task.completed_at.as_ref().map(ts))
        .bind(to_json(&task.tags)?)
        .bind(to_json(&task.notes)?)
        .bind(to_json(&task.checklist)?)
        .bind(to_json(&task.reminders)?)
        .bind(task.project_ref.as_ref().map(|r| r.id.as_str()))
        .bind(task.blog_ref.as_ref().map(|r| r.id.as_str()))
        .bind(task.is_recurring)
        .bind(pattern.map(|p| p.frequency.as_ref()))
        .bind(pattern.map(|p| i64::from(p.interval)))
        .bind(pattern.and_then(|p| p.end_date.as_ref()).map(ts))
        .bind(ts(&task.created_at))
        .bind(ts(&task.updated_at))
        .bind(task.title.to_lowercase())
        .bind(task.description.to_lowercase())
        .bind(fold_tags(&task.tags)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_task(&self, id: &str) -> Result<Option<TaskRecord>, sqlx::Error> {
        let row: Option<TaskRow> = sqlx::query_as(&format!("{SELECT_TASK} WHERE t.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(TaskRow::into_record))
    }

    async fn save_task(&self, task: &TaskRecord) -> Result<(), sqlx::Error> {
        let pattern = task.recurring_pattern.as_ref();
        sqlx::query(
            "UPDATE tasks SET title = ?1, description = ?2, priority = ?3, priority_rank = ?4, \
             status = ?5, category = ?6, due_date = ?7, completed_at = ?8, tags = ?9, notes = ?10, \
             checklist = ?11, reminders = ?12, project_ref = ?13, blog_ref = ?14, \
             is_recurring = ?15, recurring_frequency = ?16, recurring_interval = ?17, \
             recurring_end_date = ?18, updated_at = ?19, title_fold = ?20, \
             description_fold = ?21, tags_fold = ?22 \
             WHERE id = ?23",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority.as_ref())
        .bind(task.priority.rank())
        .bind(task.status.as_ref())
        .bind(task.category.as_ref())
        .bind(ts(&task.due_date))
        .bind(task.completed_at.as_ref().map(ts))
        .bind(to_json(&task.tags)?)
        .bind(to_json(&task.notes)?)
        .bind(to_json(&task.checklist)?)
        .bind(to_json(&task.reminders)?)
        .bind(task.project_ref.as_ref().map(|r| r.id.as_str()))
        .bind(task.blog_ref.as_ref().map(|r| r.id.as_str()))
        .bind(task.is_recurring)
        .bind(pattern.map(|p| p.frequency.as_ref()))
        .bind(pattern.map(|p| i64::from(p.interval)))
        .bind(pattern.and_then(|p| p.end_date.as_ref()).map(ts))
        .bind(ts(&task.updated_at))
        .bind(task.title.to_lowercase())
        .bind(task.description.to_lowercase())
        .bind(fold_tags(&task.tags)?)
        .bind(&task.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_task(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_tasks(
        &self,
        filter: &Filter,
        sort: &[SortKey],
        skip: u64,
        limit: Option<u32>,
    ) -> Result<Vec<TaskRecord>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_TASK);
        push_where(&mut qb, filter);
        push_order(&mut qb, sort);
        if let Some(limit) = limit {
            qb.push(" LIMIT ");
            qb.push_bind(i64::from(limit));
            qb.push(" OFFSET ");
            qb.push_bind(i64::try_from(skip).unwrap_or(i64::MAX));
        }
        let rows: Vec<TaskRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(TaskRow::into_record).collect())
    }

    async fn count_tasks(&self, filter: &Filter) -> Result<u64, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM tasks t");
        push_where(&mut qb, filter);
        let (n,): (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;
        Ok(u64::try_from(n).unwrap_or_default())
    }

    async fn count_tasks_by(
        &self,
        filter: &Filter,
        group: GroupBy,
    ) -> Result<Vec<(String, u64)>, sqlx::Error> {
        let col = match group {
            GroupBy::Status => "t.status",
            GroupBy::Category => "t.category",
            GroupBy::Priority => "t.priority",
        };
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {col}, COUNT(*) FROM tasks t"));
        push_where(&mut qb, filter);
        qb.push(format!(" GROUP BY {col}"));
        let rows: Vec<(String, i64)> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|(label, n)| (label, u64::try_from(n).unwrap_or_default()))
            .collect())
    }

    async fn clear_task_refs(
        &self,
        project_id: Option<&str>,
        blog_id: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let mut cleared = 0;
        if let Some(id) = project_id {
            cleared += sqlx::query("UPDATE tasks SET project_ref = NULL WHERE project_ref = ?1")
                .bind(id)
                .execute(&self.pool)
                .await?
                .rows_affected();
        }
        if let Some(id) = blog_id {
            cleared += sqlx::query("UPDATE tasks SET blog_ref = NULL WHERE blog_ref = ?1")
                .bind(id)
                .execute(&self.pool)
                .await?
                .rows_affected();
        }
        Ok(cleared)
    }
}

#[cfg(test)]
mod test {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::entities::dao::task::fixtures::task;
    use crate::entities::dao::{ChecklistItem, Priority, TaskStatus};
    use crate::query::{DueBucket, QueryBuilder, DEFAULT_SORT};

    async fn seeded() -> SqliteStore {
        let store = SqliteStore::in_memory().await;
        let now = Utc::now();
        let mut a = task("a", "u1");
        a.priority = Priority::Low;
        a.due_date = now + Duration::days(1);
        a.tags = vec!["Rust".into(), "web".into()];
        let mut b = task("b", "u1");
        b.priority = Priority::Urgent;
        b.due_date = now + Duration::days(3);
        b.description = "ship 100% of the release".into();
        let mut c = task("c", "u1");
        c.priority = Priority::Urgent;
        c.due_date = now + Duration::days(2);
        let mut d = task("d", "u2");
        d.priority = Priority::High;
        for t in [&a, &b, &c, &d] {
            store.insert_task(t).await.unwrap();
        }
        store
    }

    fn ids(tasks: &[TaskRecord]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[tokio::test]
    async fn insert_then_get_round_trips_embedded_data() {
        let store = SqliteStore::in_memory().await;
        let mut t = task("t1", "u1");
        t.checklist.push(ChecklistItem {
            id: "c1".into(),
            text: "outline".into(),
            is_completed: true,
        });
        t.recurring_pattern = Some(RecurringPattern {
            frequency: Frequency::Weekly,
            interval: 2,
            end_date: None,
        });
        t.is_recurring = true;
        store.insert_task(&t).await.unwrap();
        let loaded = store.get_task("t1").await.unwrap().unwrap();
        assert_eq!(loaded.checklist, t.checklist);
        assert_eq!(loaded.recurring_pattern, t.recurring_pattern);
        assert_eq!(ts(&loaded.due_date), ts(&t.due_date));
        assert!(store.get_task("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn default_sort_is_semantic_priority_then_due_date() {
        let store = seeded().await;
        let found = store
            .find_tasks(&Filter::owned_by("u1"), &DEFAULT_SORT, 0, None)
            .await
            .unwrap();
        assert_eq!(ids(&found), vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn skip_and_limit_window_results() {
        let store = seeded().await;
        let page = store
            .find_tasks(&Filter::owned_by("u1"), &DEFAULT_SORT, 1, Some(1))
            .await
            .unwrap();
        assert_eq!(ids(&page), vec!["b"]);
        assert_eq!(store.count_tasks(&Filter::owned_by("u1")).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn search_matches_title_description_and_tags() {
        let store = seeded().await;
        let search = |term: &str| Filter::owned_by("u1").with(Clause::Search(term.into()));

        let by_tag = store.find_tasks(&search("rus"), &DEFAULT_SORT, 0, None).await.unwrap();
        assert_eq!(ids(&by_tag), vec!["a"]);

        // Wildcards in the term are literal.
        let by_desc = store.find_tasks(&search("100%"), &DEFAULT_SORT, 0, None).await.unwrap();
        assert_eq!(ids(&by_desc), vec!["b"]);

        let none = store.find_tasks(&search("_"), &DEFAULT_SORT, 0, None).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let store = SqliteStore::in_memory().await;
        let mut release = task("release", "u1");
        release.title = "Über release".into();
        let mut grumble = task("grumble", "u1");
        grumble.title = "notes".into();
        grumble.tags = vec!["Ümlaut".into()];
        store.insert_task(&release).await.unwrap();
        store.insert_task(&grumble).await.unwrap();

        let search = |term: &str| Filter::owned_by("u1").with(Clause::Search(term.into()));
        let found = store.find_tasks(&search("über"), &DEFAULT_SORT, 0, None).await.unwrap();
        assert_eq!(ids(&found), vec!["release"]);
        let found = store.find_tasks(&search("ÜMLAUT"), &DEFAULT_SORT, 0, None).await.unwrap();
        assert_eq!(ids(&found), vec!["grumble"]);

        // Folded copies follow the row on save.
        release.title = "Ärger".into();
        store.save_task(&release).await.unwrap();
        let found = store.find_tasks(&search("ärger"), &DEFAULT_SORT, 0, None).await.unwrap();
        assert_eq!(ids(&found), vec!["release"]);
        assert!(store.find_tasks(&search("über"), &DEFAULT_SORT, 0, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn query_plan_comparisons_compile() {
        let store = seeded().await;
        let params = vec![
            ("priority[gte]".to_owned(), "high".to_owned()),
            ("tags[in]".to_owned(), "web,other".to_owned()),
        ];
        let plan = QueryBuilder::default().build(&params, "u1", &Utc::now()).unwrap();
        let found = store
            .find_tasks(&plan.filter, &plan.sort, plan.skip, Some(plan.limit))
            .await
            .unwrap();
        assert!(found.is_empty());

        let params = vec![("priority[gte]".to_owned(), "high".to_owned())];
        let plan = QueryBuilder::default().build(&params, "u1", &Utc::now()).unwrap();
        let found = store.find_tasks(&plan.filter, &plan.sort, 0, None).await.unwrap();
        assert_eq!(ids(&found), vec!["c", "b"]);
    }

    #[tokio::test]
    async fn overdue_bucket_skips_completed_tasks() {
        let store = SqliteStore::in_memory().await;
        let now = Utc::now();
        let mut late = task("late", "u1");
        late.due_date = now - Duration::days(2);
        let mut done = task("done", "u1");
        done.due_date = now - Duration::days(2);
        done.set_status(TaskStatus::Completed, now);
        store.insert_task(&late).await.unwrap();
        store.insert_task(&done).await.unwrap();

        let filter = QueryBuilder::default().bucket("u1", DueBucket::Overdue, &now);
        let found = store.find_tasks(&filter, &DEFAULT_SORT, 0, None).await.unwrap();
        assert_eq!(ids(&found), vec!["late"]);
    }

    #[tokio::test]
    async fn save_persists_changes_and_delete_reports_presence() {
        let store = seeded().await;
        let mut a = store.get_task("a").await.unwrap().unwrap();
        a.title = "renamed".into();
        a.set_status(TaskStatus::Completed, Utc::now());
        store.save_task(&a).await.unwrap();
        let reloaded = store.get_task("a").await.unwrap().unwrap();
        assert_eq!(reloaded.title, "renamed");
        assert!(reloaded.completed_at.is_some());

        assert!(store.delete_task("a").await.unwrap());
        assert!(!store.delete_task("a").await.unwrap());
    }

    #[tokio::test]
    async fn grouped_counts_are_owner_scoped() {
        let store = seeded().await;
        let mut counts = store
            .count_tasks_by(&Filter::owned_by("u1"), GroupBy::Priority)
            .await
            .unwrap();
        counts.sort();
        assert_eq!(counts, vec![("low".to_owned(), 1), ("urgent".to_owned(), 2)]);
    }
}
