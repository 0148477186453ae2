//! The `{ success, data, ... }` wrapper every endpoint responds with.

use serde::Serialize;
use utoipa::ToSchema;

/// Page coordinates of a neighbouring page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageLink {
    pub page: u32,
    pub limit: u32,
}

/// Links to the adjacent pages; each is present only if that page exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageLink>,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let seen = u64::from(page) * u64::from(limit);
        Self {
            next: (seen < total).then(|| PageLink {
                page: page + 1,
                limit,
            }),
            prev: (page > 1).then(|| PageLink {
                page: page - 1,
                limit,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            count: None,
            total: None,
            pagination: None,
            data: Some(data),
            message: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// A list response; `count` is the length of `data`.
    pub fn list(data: Vec<T>) -> Self {
        Self {
            count: Some(data.len()),
            ..Self::ok(data)
        }
    }

    pub fn page(data: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Self {
            total: Some(total),
            pagination: Some(pagination),
            ..Self::list(data)
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            count: None,
            total: None,
            pagination: None,
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::message(message)
        }
    }
}
