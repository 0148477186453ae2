//! Task query planning.
//!
//! [`QueryBuilder::build`] turns the raw query string of `GET /api/tasks` into
//! a [`QueryPlan`]: a display filter, a narrower count filter used for
//! pagination totals, an optional projection, a sort order and a page window.
//! Everything here is pure; the store compiles the plan into SQL.

pub mod filter;
pub mod sort;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use strum::EnumString;
use thiserror::Error;
use tracing::debug;

use crate::entities::dao::TaskStatus;

pub use filter::{Clause, CompareOp, Field, Filter, Value};
pub use sort::{Projection, SortDirection, SortKey, DEFAULT_SORT};

/// Keys handled explicitly rather than as generic field filters.
const RESERVED: &[&str] = &[
    "select", "sort", "page", "limit", "search", "category", "priority", "status", "dueDate",
];

#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("invalid value '{value}' for filter on {field}")]
    InvalidValue { field: String, value: String },
}

/// Named server-computed `dueDate` windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DueBucket {
    Today,
    Week,
    Overdue,
}

/// Local-midnight anchored day boundaries, expressed in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub tomorrow: DateTime<Utc>,
    pub next_week: DateTime<Utc>,
}

impl DayWindow {
    pub fn containing<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let start = first_local_instant(now.date_naive(), |local| {
            tz.from_local_datetime(local).earliest().map(|dt| dt.with_timezone(&Utc))
        })
        .unwrap_or_else(|| now.with_timezone(&Utc));
        Self {
            start,
            tomorrow: start + Duration::days(1),
            next_week: start + Duration::days(7),
        }
    }

    /// Clauses selecting tasks in `bucket` relative to this window.
    pub fn bucket_clauses(&self, bucket: DueBucket) -> Vec<Clause> {
        let due = |op, at: DateTime<Utc>| Clause::Compare {
            field: Field::DueDate,
            op,
            value: Value::Timestamp(at),
        };
        match bucket {
            DueBucket::Today => vec![due(CompareOp::Gte, self.start), due(CompareOp::Lt, self.tomorrow)],
            DueBucket::Week => vec![due(CompareOp::Gte, self.start), due(CompareOp::Lt, self.next_week)],
            DueBucket::Overdue => vec![
                due(CompareOp::Lt, self.start),
                Clause::Compare {
                    field: Field::Status,
                    op: CompareOp::Ne,
                    value: Value::Text(TaskStatus::Completed.to_string()),
                },
            ],
        }
    }
}

/// Earliest existing local time on `day`. Midnight can be skipped by a DST
/// jump, in which case the day starts at the first valid half hour after it.
fn first_local_instant(
    day: NaiveDate,
    resolve: impl Fn(&NaiveDateTime) -> Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    (0..=6)
        .map(|half_hours| day.and_time(NaiveTime::MIN) + Duration::minutes(30 * half_hours))
        .find_map(|local| resolve(&local))
}

/// Everything the store needs to run one list request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub filter: Filter,
    pub count_filter: Filter,
    pub projection: Option<Projection>,
    pub sort: Vec<SortKey>,
    pub page: u32,
    pub limit: u32,
    pub skip: u64,
}

/// Builds [`QueryPlan`]s; holds the configured default page size.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder {
    default_limit: u32,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self { default_limit: 20 }
    }
}

impl QueryBuilder {
    pub fn new(default_limit: u32) -> Self {
        Self {
            default_limit: default_limit.max(1),
        }
    }

    /// Plan a task list request for `caller_id`.
    ///
    /// `params` are the decoded query pairs in request order; when a reserved
    /// key repeats, the last occurrence wins.
    pub fn build<Tz: TimeZone>(
        &self,
        params: &[(String, String)],
        caller_id: &str,
        now: &DateTime<Tz>,
    ) -> Result<QueryPlan, QueryError> {
        let reserved = |name: &str| {
            params
                .iter()
                .rev()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.trim())
                .filter(|v| !v.is_empty())
        };

        let mut filter = Filter::new();
        for (key, value) in params.iter().filter(|(k, _)| !RESERVED.contains(&k.as_str())) {
            if let Some(clause) = filter::parse_pair(key, value)? {
                filter.push(clause);
            }
        }

        // Ownership is applied last so nothing from the client can replace it.
        filter.drop_field(Field::User);
        let mut count_filter = Filter::owned_by(caller_id);
        filter.push(Clause::eq(Field::User, Value::Text(caller_id.to_owned())));

        for (name, field) in [
            ("category", Field::Category),
            ("priority", Field::Priority),
            ("status", Field::Status),
        ] {
            if let Some(value) = reserved(name) {
                let clause = Clause::eq(field, Value::Text(value.to_owned()));
                filter.push(clause.clone());
                count_filter.push(clause);
            }
        }

        if let Some(raw) = reserved("dueDate") {
            match raw.parse::<DueBucket>() {
                Ok(bucket) => {
                    for clause in DayWindow::containing(now).bucket_clauses(bucket) {
                        filter.push(clause);
                    }
                }
                Err(_) => debug!(due_date = raw, "ignoring unknown dueDate bucket"),
            }
        }

        if let Some(term) = reserved("search") {
            filter.push(Clause::Search(term.to_owned()));
        }

        let projection = reserved("select").and_then(Projection::parse);
        let sort = sort::parse_sort(reserved("sort"));
        let page = parse_positive(reserved("page")).unwrap_or(1);
        let limit = parse_positive(reserved("limit")).unwrap_or(self.default_limit);
        let skip = u64::from(page - 1) * u64::from(limit);

        Ok(QueryPlan {
            filter,
            count_filter,
            projection,
            sort,
            page,
            limit,
            skip,
        })
    }

    /// Filter for one of the fixed bucket endpoints (`/tasks/today`, ...).
    pub fn bucket<Tz: TimeZone>(&self, caller_id: &str, bucket: DueBucket, now: &DateTime<Tz>) -> Filter {
        let mut filter = Filter::owned_by(caller_id);
        for clause in DayWindow::containing(now).bucket_clauses(bucket) {
            filter.push(clause);
        }
        filter
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|v| v.parse::<u32>().ok()).filter(|v| *v > 0)
}
