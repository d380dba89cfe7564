//! Collection pagination engine.
//!
//! # Responsibility
//! - Interpret offset cursors and clamp requested page sizes.
//! - Build pages in ascending collection id order with a next cursor.
//! - Offer keyset (last-seen id) pages as a drift-free alternative.
//!
//! # Invariants
//! - Offset page contents are entries `[cursor, cursor + limit)`.
//! - `next_cursor` is `None` exactly when no entry exists at
//!   `cursor + limit`.
//! - A requested limit above `max_limit` is capped and logged, never rejected.
//!
//! Offset cursors are positions, not bookmarks: a collection minted or
//! removed before the cursor between two calls shifts later pages, so a walk
//! can skip or repeat entries. Keyset pages do not have that weakness.

use crate::model::collection::{CollectionId, CollectionSummary};
use crate::repo::collection_repo::CollectionRepository;
use crate::service::error::{StoreError, StoreResult};
use log::warn;
use serde::Serialize;

/// Cursor of the first offset page.
pub const INITIAL_CURSOR: &str = "0";

/// One offset-addressed page of collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionPage {
    /// Offset this page starts at, normalized to decimal.
    pub cursor: String,
    /// Effective limit after clamping.
    pub limit: u32,
    /// Cursor of the following page; `None` on the last page.
    pub next_cursor: Option<String>,
    pub items: Vec<CollectionSummary>,
}

/// One keyset-addressed page of collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeysetPage {
    /// Exclusive lower bound this page was read after.
    pub after: Option<CollectionId>,
    pub limit: u32,
    /// Pass as `after` to read the following page; `None` on the last page.
    pub next_after: Option<CollectionId>,
    pub items: Vec<CollectionSummary>,
}

/// Parses an offset cursor (`"0"`, `"1000"`, ...).
///
/// Surrounding whitespace is ignored. Negative, fractional and non-numeric
/// values are rejected.
pub fn parse_offset_cursor(cursor: &str) -> StoreResult<u64> {
    let trimmed = cursor.trim();
    trimmed.parse::<u64>().map_err(|_| {
        StoreError::InvalidArgument(format!(
            "cursor must be a non-negative integer offset, got `{cursor}`"
        ))
    })
}

/// Normalizes a requested page size against the configured cap.
///
/// - `None` and `Some(0)` take `max_limit`.
/// - Values above `max_limit` are capped with a `warn` event.
pub fn normalize_page_limit(requested: Option<u32>, max_limit: u32) -> u32 {
    let max_limit = max_limit.max(1);
    match requested {
        None | Some(0) => max_limit,
        Some(value) if value > max_limit => {
            warn!(
                "event=page_limit_capped module=pagination status=capped requested={value} max_limit={max_limit}"
            );
            max_limit
        }
        Some(value) => value,
    }
}

/// Reads one offset page from `repo`.
pub fn page_by_offset<R: CollectionRepository + ?Sized>(
    repo: &R,
    cursor: &str,
    limit: Option<u32>,
    max_limit: u32,
) -> StoreResult<CollectionPage> {
    let offset = parse_offset_cursor(cursor)?;
    let applied_limit = normalize_page_limit(limit, max_limit);

    // One extra row tells whether an entry exists at `offset + limit`.
    let mut items = repo.list_collection_range(offset, u64::from(applied_limit) + 1)?;
    let has_more = items.len() > applied_limit as usize;
    items.truncate(applied_limit as usize);

    let next_cursor = has_more.then(|| offset.saturating_add(u64::from(applied_limit)).to_string());

    Ok(CollectionPage {
        cursor: offset.to_string(),
        limit: applied_limit,
        next_cursor,
        items,
    })
}

/// Reads one keyset page from `repo`, starting strictly after `after`.
pub fn page_after<R: CollectionRepository + ?Sized>(
    repo: &R,
    after: Option<&str>,
    limit: Option<u32>,
    max_limit: u32,
) -> StoreResult<KeysetPage> {
    let applied_limit = normalize_page_limit(limit, max_limit);

    let mut items = repo.list_collections_after(after, u64::from(applied_limit) + 1)?;
    let has_more = items.len() > applied_limit as usize;
    items.truncate(applied_limit as usize);

    let next_after = if has_more {
        items.last().map(|item| item.id.clone())
    } else {
        None
    };

    Ok(KeysetPage {
        after: after.map(str::to_string),
        limit: applied_limit,
        next_after,
        items,
    })
}
