//! `sort` and `select` parameter parsing.

use tracing::debug;

use super::filter::{Field, FieldKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: Field,
    pub direction: SortDirection,
}

impl SortKey {
    pub const fn asc(field: Field) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub const fn desc(field: Field) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }
}

/// Most urgent first, then soonest due.
pub const DEFAULT_SORT: [SortKey; 2] = [SortKey::desc(Field::Priority), SortKey::asc(Field::DueDate)];

/// Parse `"-priority,dueDate"` style sort specs. Unknown or unsortable fields
/// are skipped; an empty result falls back to [`DEFAULT_SORT`].
pub fn parse_sort(raw: Option<&str>) -> Vec<SortKey> {
    let keys: Vec<SortKey> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|token| {
            let (name, direction) = match token.strip_prefix('-') {
                Some(name) => (name, SortDirection::Desc),
                None => (token.strip_prefix('+').unwrap_or(token), SortDirection::Asc),
            };
            let path: Vec<&str> = name.split('.').collect();
            match Field::from_path(&path) {
                Some(field) if field.kind() != FieldKind::Tags => Some(SortKey { field, direction }),
                _ => {
                    debug!(field = name, "ignoring unsortable field");
                    None
                }
            }
        })
        .collect();

    if keys.is_empty() {
        DEFAULT_SORT.to_vec()
    } else {
        keys
    }
}

/// Top-level response keys a client may select.
const SELECTABLE: &[&str] = &[
    "user",
    "title",
    "description",
    "priority",
    "status",
    "category",
    "dueDate",
    "completedAt",
    "tags",
    "notes",
    "checklist",
    "reminders",
    "projectRef",
    "blogRef",
    "isRecurring",
    "recurringPattern",
    "createdAt",
    "updatedAt",
];

/// Field projection resolved from `select`. `_id` is always kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    fields: Vec<&'static str>,
}

impl Projection {
    pub fn parse(raw: &str) -> Option<Self> {
        let mut fields: Vec<&'static str> = Vec::new();
        for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match SELECTABLE.iter().find(|known| **known == name) {
                Some(known) if !fields.contains(known) => fields.push(known),
                Some(_) => {}
                None => debug!(field = name, "ignoring unknown select field"),
            }
        }
        if fields.is_empty() {
            None
        } else {
            Some(Self { fields })
        }
    }

    pub fn includes(&self, key: &str) -> bool {
        key == "_id" || self.fields.contains(&key)
    }

    #[cfg(test)]
    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn absent_sort_uses_default() {
        assert_eq!(parse_sort(None), DEFAULT_SORT.to_vec());
        assert_eq!(parse_sort(Some(" , ")), DEFAULT_SORT.to_vec());
    }

    #[test]
    fn minus_prefix_sorts_descending() {
        assert_eq!(
            parse_sort(Some("-createdAt,title")),
            vec![SortKey::desc(Field::CreatedAt), SortKey::asc(Field::Title)]
        );
    }

    #[test]
    fn unknown_sort_fields_are_skipped() {
        assert_eq!(
            parse_sort(Some("secret,-dueDate,tags")),
            vec![SortKey::desc(Field::DueDate)]
        );
    }

    #[test]
    fn projection_keeps_known_fields_once() {
        let p = Projection::parse("title,status,title,password").unwrap();
        assert_eq!(p.fields(), &["title", "status"]);
        assert!(p.includes("_id"));
        assert!(!p.includes("description"));
        assert!(Projection::parse("password").is_none());
    }
}
