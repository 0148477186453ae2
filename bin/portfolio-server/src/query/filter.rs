//! Typed filter clauses for task queries.
//!
//! Client keys such as `dueDate[gte]` or `recurringPattern[endDate][lte]` are
//! parsed against an allow-list of fields and operators. Anything outside the
//! allow-list is dropped before it can reach the store, so a client can never
//! smuggle a raw store operator through the query string.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use super::QueryError;
use crate::entities::dao::Priority;

/// Task fields that may appear in a filter or sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    User,
    Title,
    Description,
    Priority,
    Status,
    Category,
    DueDate,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
    Tags,
    ProjectRef,
    BlogRef,
    IsRecurring,
    RecurringFrequency,
    RecurringInterval,
    RecurringEndDate,
}

/// How raw query-string values are cast for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Priority,
    Timestamp,
    Bool,
    Integer,
    Tags,
}

impl Field {
    /// Resolve a (possibly nested) wire path such as `["recurringPattern", "endDate"]`.
    pub fn from_path(path: &[&str]) -> Option<Self> {
        let field = match path {
            ["user"] => Field::User,
            ["title"] => Field::Title,
            ["description"] => Field::Description,
            ["priority"] => Field::Priority,
            ["status"] => Field::Status,
            ["category"] => Field::Category,
            ["dueDate"] => Field::DueDate,
            ["completedAt"] => Field::CompletedAt,
            ["createdAt"] => Field::CreatedAt,
            ["updatedAt"] => Field::UpdatedAt,
            ["tags"] => Field::Tags,
            ["projectRef"] => Field::ProjectRef,
            ["blogRef"] => Field::BlogRef,
            ["isRecurring"] => Field::IsRecurring,
            ["recurringPattern", "frequency"] => Field::RecurringFrequency,
            ["recurringPattern", "interval"] => Field::RecurringInterval,
            ["recurringPattern", "endDate"] => Field::RecurringEndDate,
            _ => return None,
        };
        Some(field)
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Priority => FieldKind::Priority,
            Field::DueDate
            | Field::CompletedAt
            | Field::CreatedAt
            | Field::UpdatedAt
            | Field::RecurringEndDate => FieldKind::Timestamp,
            Field::IsRecurring => FieldKind::Bool,
            Field::RecurringInterval => FieldKind::Integer,
            Field::Tags => FieldKind::Tags,
            Field::User
            | Field::Title
            | Field::Description
            | Field::Status
            | Field::Category
            | Field::ProjectRef
            | Field::BlogRef
            | Field::RecurringFrequency => FieldKind::Text,
        }
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            Field::User => "user",
            Field::Title => "title",
            Field::Description => "description",
            Field::Priority => "priority",
            Field::Status => "status",
            Field::Category => "category",
            Field::DueDate => "dueDate",
            Field::CompletedAt => "completedAt",
            Field::CreatedAt => "createdAt",
            Field::UpdatedAt => "updatedAt",
            Field::Tags => "tags",
            Field::ProjectRef => "projectRef",
            Field::BlogRef => "blogRef",
            Field::IsRecurring => "isRecurring",
            Field::RecurringFrequency => "recurringPattern.frequency",
            Field::RecurringInterval => "recurringPattern.interval",
            Field::RecurringEndDate => "recurringPattern.endDate",
        }
    }
}

/// Comparison operators. Only `Gt`..`Lte` (and `in`, see [`Clause::In`]) are
/// reachable from the query string; `Eq` is the bare-key form and `Ne` is
/// used by server-side bucket filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Operator token found at the end of a bracketed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperatorToken {
    Compare(CompareOp),
    In,
}

impl OperatorToken {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "gt" => Some(Self::Compare(CompareOp::Gt)),
            "gte" => Some(Self::Compare(CompareOp::Gte)),
            "lt" => Some(Self::Compare(CompareOp::Lt)),
            "lte" => Some(Self::Compare(CompareOp::Lte)),
            "in" => Some(Self::In),
            _ => None,
        }
    }
}

/// A value already cast to the field's storage type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

/// One condition; a [`Filter`] is the conjunction of its clauses.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Compare {
        field: Field,
        op: CompareOp,
        value: Value,
    },
    In {
        field: Field,
        values: Vec<Value>,
    },
    /// Case-insensitive literal substring match on title, description or any tag.
    Search(String),
}

impl Clause {
    pub fn eq(field: Field, value: Value) -> Self {
        Clause::Compare {
            field,
            op: CompareOp::Eq,
            value,
        }
    }

    pub fn field(&self) -> Option<Field> {
        match self {
            Clause::Compare { field, .. } | Clause::In { field, .. } => Some(*field),
            Clause::Search(_) => None,
        }
    }
}

/// Conjunction of clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owned_by(user_id: &str) -> Self {
        let mut filter = Self::new();
        filter.push(Clause::eq(Field::User, Value::Text(user_id.to_owned())));
        filter
    }

    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    pub fn with(mut self, clause: Clause) -> Self {
        self.push(clause);
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Remove every clause on `field`.
    pub fn drop_field(&mut self, field: Field) {
        self.clauses.retain(|c| c.field() != Some(field));
    }
}

/// Parse one non-reserved query pair into a clause.
///
/// Returns `Ok(None)` when the key names an unknown field or operator; the
/// pair is then ignored. A known field whose value cannot be cast is an error.
pub fn parse_pair(key: &str, raw: &str) -> Result<Option<Clause>, QueryError> {
    let Some(segments) = split_key(key) else {
        debug!(key, "ignoring malformed filter key");
        return Ok(None);
    };

    let (path, operator) = match segments.split_last() {
        Some((last, rest)) if !rest.is_empty() => match OperatorToken::parse(last) {
            Some(op) => (rest, Some(op)),
            None => (segments.as_slice(), None),
        },
        _ => (segments.as_slice(), None),
    };

    let Some(field) = Field::from_path(path) else {
        debug!(key, "ignoring filter on unknown field");
        return Ok(None);
    };

    let clause = match operator {
        None => Clause::eq(field, cast(field, CompareOp::Eq, raw)?),
        Some(OperatorToken::In) => {
            let values = raw
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| cast(field, CompareOp::Eq, v))
                .collect::<Result<Vec<_>, _>>()?;
            Clause::In { field, values }
        }
        Some(OperatorToken::Compare(op)) => {
            if field.kind() == FieldKind::Tags {
                debug!(key, "ignoring range comparison on tags");
                return Ok(None);
            }
            Clause::Compare {
                field,
                op,
                value: cast(field, op, raw)?,
            }
        }
    };
    Ok(Some(clause))
}

/// Split `a[b][c]` or `a.b[c]` into `["a", "b", "c"]`.
fn split_key(key: &str) -> Option<Vec<&str>> {
    let (base, mut rest) = match key.find('[') {
        Some(idx) => (&key[..idx], &key[idx..]),
        None => (key, ""),
    };
    if base.is_empty() {
        return None;
    }
    let mut segments: Vec<&str> = base.split('.').collect();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        let segment = &inner[..close];
        if segment.is_empty() {
            return None;
        }
        segments.push(segment);
        rest = &inner[close + 1..];
    }
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(segments)
}

fn cast(field: Field, op: CompareOp, raw: &str) -> Result<Value, QueryError> {
    let invalid = || QueryError::InvalidValue {
        field: field.wire_name().to_owned(),
        value: raw.to_owned(),
    };
    match field.kind() {
        FieldKind::Text | FieldKind::Tags => Ok(Value::Text(raw.to_owned())),
        // Equality keeps the raw text so unknown enum values simply match
        // nothing; range comparisons need the semantic rank.
        FieldKind::Priority => match op {
            CompareOp::Eq | CompareOp::Ne => Ok(Value::Text(raw.to_owned())),
            _ => raw
                .parse::<Priority>()
                .map(|p| Value::Integer(p.rank()))
                .map_err(|_| invalid()),
        },
        FieldKind::Timestamp => parse_timestamp(raw).map(Value::Timestamp).ok_or_else(invalid),
        FieldKind::Bool => match raw {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        FieldKind::Integer => raw.trim().parse().map(Value::Integer).map_err(|_| invalid()),
    }
}

/// Accept RFC 3339 timestamps or bare `YYYY-MM-DD` dates (UTC midnight).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bare_key_is_equality() {
        let clause = parse_pair("title", "Write post").unwrap().unwrap();
        assert_eq!(clause, Clause::eq(Field::Title, Value::Text("Write post".into())));
    }

    #[test]
    fn bracket_operator_becomes_typed_comparison() {
        let clause = parse_pair("dueDate[gte]", "2026-01-02").unwrap().unwrap();
        let expected = NaiveDate::from_ymd_opt(2026, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        assert_eq!(
            clause,
            Clause::Compare {
                field: Field::DueDate,
                op: CompareOp::Gte,
                value: Value::Timestamp(expected),
            }
        );
    }

    #[test]
    fn nested_path_with_operator() {
        let clause = parse_pair("recurringPattern[interval][lt]", "3").unwrap().unwrap();
        assert_eq!(
            clause,
            Clause::Compare {
                field: Field::RecurringInterval,
                op: CompareOp::Lt,
                value: Value::Integer(3),
            }
        );
        let dotted = parse_pair("recurringPattern.interval[lt]", "3").unwrap().unwrap();
        assert_eq!(clause, dotted);
    }

    #[test]
    fn in_operator_splits_on_commas() {
        let clause = parse_pair("tags[in]", "rust, web,").unwrap().unwrap();
        assert_eq!(
            clause,
            Clause::In {
                field: Field::Tags,
                values: vec![Value::Text("rust".into()), Value::Text("web".into())],
            }
        );
    }

    #[test]
    fn unknown_fields_and_operators_are_dropped() {
        assert_eq!(parse_pair("password", "x").unwrap(), None);
        assert_eq!(parse_pair("title[regex]", ".*").unwrap(), None);
        assert_eq!(parse_pair("title[$where]", "1").unwrap(), None);
        assert_eq!(parse_pair("[gt]", "1").unwrap(), None);
        assert_eq!(parse_pair("title[gt", "1").unwrap(), None);
    }

    #[test]
    fn priority_range_uses_semantic_rank() {
        let clause = parse_pair("priority[gte]", "high").unwrap().unwrap();
        assert_eq!(
            clause,
            Clause::Compare {
                field: Field::Priority,
                op: CompareOp::Gte,
                value: Value::Integer(Priority::High.rank()),
            }
        );
        assert!(parse_pair("priority[gte]", "extreme").is_err());
    }

    #[test]
    fn uncastable_values_are_rejected() {
        assert!(matches!(
            parse_pair("dueDate[lt]", "tomorrow-ish"),
            Err(QueryError::InvalidValue { .. })
        ));
        assert!(parse_pair("isRecurring", "maybe").is_err());
    }

    #[test]
    fn range_on_tags_is_ignored() {
        assert_eq!(parse_pair("tags[gt]", "a").unwrap(), None);
    }

    #[test]
    fn drop_field_removes_matching_clauses() {
        let mut filter = Filter::owned_by("u1")
            .with(Clause::eq(Field::User, Value::Text("u2".into())))
            .with(Clause::Search("x".into()));
        filter.drop_field(Field::User);
        assert_eq!(filter.clauses(), &[Clause::Search("x".into())]);
    }
}
