//! Cursor pagination over ID-ordered collections.
//!
//! Cursors are keyset positions: the ID of the last item of a page,
//! serialized as JSON and base64url-encoded. A page request with `after`
//! returns the items whose ID sorts after the cursor's ID, so cursors stay
//! valid when items before or after the position are added or removed.
//!
//! ```rust
//! use runtime_registry::pagination::{paginate, PageRequest};
//!
//! let ids: Vec<String> = (0..5).map(|i| format!("id-{}", i)).collect();
//! let first = paginate(ids.clone(), |id| id.as_str(), &PageRequest::first(2), 100, 500).unwrap();
//! assert_eq!(first.data, vec!["id-0", "id-1"]);
//! assert!(first.page_info.has_next_page);
//!
//! let next = PageRequest::first(2).after(first.page_info.end_cursor.clone());
//! let second = paginate(ids, |id| id.as_str(), &next, 100, 500).unwrap();
//! assert_eq!(second.data, vec!["id-2", "id-3"]);
//! assert_eq!(second.total_count, 5);
//! ```

use crate::error::{ValidationError, ValidationResult};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

/// Cursor payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageCursor {
    /// ID of the last item already returned.
    after_id: String,
}

impl PageCursor {
    fn encode(&self) -> String {
        let payload = serde_json::json!({ "afterId": self.after_id }).to_string();
        URL_SAFE_NO_PAD.encode(payload)
    }

    fn decode(cursor: &str) -> ValidationResult<Self> {
        let payload = URL_SAFE_NO_PAD
            .decode(cursor)
            .map_err(|_| ValidationError::InvalidCursor)?;
        serde_json::from_slice(&payload).map_err(|_| ValidationError::InvalidCursor)
    }
}

/// Pagination arguments of a list operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Page size; the registry default applies when absent.
    #[serde(default)]
    pub first: Option<usize>,
    /// End cursor of the previous page; absent or empty for the first page.
    #[serde(default)]
    pub after: Option<String>,
}

impl PageRequest {
    pub fn first(first: usize) -> Self {
        Self {
            first: Some(first),
            after: None,
        }
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    fn after_cursor(&self) -> ValidationResult<Option<PageCursor>> {
        match self.after.as_deref() {
            None | Some("") => Ok(None),
            Some(cursor) => PageCursor::decode(cursor).map(Some),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// The `after` cursor the page was requested with, empty for the first page.
    pub start_cursor: String,
    /// Cursor of the next page, empty on the last page.
    pub end_cursor: String,
    pub has_next_page: bool,
}

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    /// Size of the whole (filtered) collection.
    pub total_count: usize,
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    /// Convert the items of the page, keeping counts and cursors.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_info: self.page_info,
        }
    }
}

/// Resolve the page size of a request.
pub fn page_size(request: &PageRequest, default_size: usize, max_size: usize) -> ValidationResult<usize> {
    match request.first {
        None => Ok(default_size.min(max_size)),
        Some(first) if first == 0 || first > max_size => Err(ValidationError::InvalidPageSize {
            requested: first,
            max: max_size,
        }),
        Some(first) => Ok(first),
    }
}

/// Cut one page out of `items`, which must be sorted by ID.
pub fn paginate<T>(
    items: Vec<T>,
    id_of: impl Fn(&T) -> &str,
    request: &PageRequest,
    default_size: usize,
    max_size: usize,
) -> ValidationResult<Page<T>> {
    let size = page_size(request, default_size, max_size)?;
    let cursor = request.after_cursor()?;
    let total_count = items.len();

    let start = match &cursor {
        Some(cursor) => items.partition_point(|item| id_of(item) <= cursor.after_id.as_str()),
        None => 0,
    };

    let mut data: Vec<T> = items.into_iter().skip(start).collect();
    let has_next_page = data.len() > size;
    data.truncate(size);

    let end_cursor = match data.last() {
        Some(last) if has_next_page => PageCursor {
            after_id: id_of(last).to_string(),
        }
        .encode(),
        _ => String::new(),
    };

    Ok(Page {
        data,
        total_count,
        page_info: PageInfo {
            start_cursor: request.after.clone().unwrap_or_default(),
            end_cursor,
            has_next_page,
        },
    })
}
