//! Forward-only cursor pagination.
//!
//! Cursors are opaque base64 strings wrapping the id of the last item a client
//! saw. List endpoints accept `first` / `after` and return a [`PageInfo`].

use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: i32 = 25;
pub const MAX_PAGE_SIZE: i32 = 100;

/// Opaque cursor (base64-encoded UUID).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(Uuid);

impl Cursor {
    pub fn new(id: Uuid) -> Self {
        Cursor(id)
    }

    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0.as_bytes())
    }

    pub fn encode_uuid(id: Uuid) -> String {
        Cursor::new(id).encode()
    }

    pub fn decode(s: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(s)
            .context("Invalid cursor: not valid base64")?;
        let uuid = Uuid::from_slice(&bytes).context("Invalid cursor: not a valid UUID")?;
        Ok(Cursor(uuid))
    }

    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// Raw pagination input as it arrives on a query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationArgs {
    pub first: Option<i32>,
    pub after: Option<String>,
}

/// Pagination input with defaults applied and the cursor decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPaginationArgs {
    pub limit: i32,
    pub cursor: Option<Uuid>,
}

impl PaginationArgs {
    pub fn forward(first: i32, after: Option<String>) -> Self {
        PaginationArgs {
            first: Some(first),
            after,
        }
    }

    /// Applies the default page size, clamps to `1..=100` and decodes `after`.
    pub fn validate(&self) -> Result<ValidatedPaginationArgs, &'static str> {
        let limit = self
            .first
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let cursor = self
            .after
            .as_deref()
            .map(Cursor::decode)
            .transpose()
            .map_err(|_| "Invalid cursor")?
            .map(Cursor::into_uuid);

        Ok(ValidatedPaginationArgs { limit, cursor })
    }
}

/// Trim results to the requested limit and report whether more exist.
///
/// Callers fetch `limit + 1` items so the extra one signals a next page.
pub fn trim_results<T>(mut results: Vec<T>, limit: i32) -> (Vec<T>, bool) {
    let has_more = results.len() > limit as usize;
    results.truncate(limit as usize);
    (results, has_more)
}

pub fn build_page_info(has_more: bool, end_cursor: Option<Uuid>) -> PageInfo {
    PageInfo {
        has_next_page: has_more,
        end_cursor: end_cursor.map(Cursor::encode_uuid),
    }
}

/// Slice an already ordered list into one page after the cursor item.
///
/// An unknown cursor yields an empty page rather than restarting from the top.
pub fn page_after<T, F>(items: Vec<T>, args: &ValidatedPaginationArgs, id_of: F) -> (Vec<T>, PageInfo)
where
    F: Fn(&T) -> Uuid,
{
    let start = match args.cursor {
        Some(cursor) => match items.iter().position(|item| id_of(item) == cursor) {
            Some(index) => index + 1,
            None => items.len(),
        },
        None => 0,
    };

    let window: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(args.limit as usize + 1)
        .collect();
    let (page, has_more) = trim_results(window, args.limit);
    let end_cursor = page.last().map(&id_of);
    (page, build_page_info(has_more, end_cursor))
}
