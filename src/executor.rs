//! Tool executor that dispatches assistant tool calls to corpus queries.
//!
//! Maps tool names to direct queries against a [`ListingStore`]. Results
//! are serialized JSON handed back to the model as tool messages. Domain
//! misses (malformed id, absent listing) become JSON error objects the
//! model can read and recover from; infrastructure failures and unknown
//! tool names surface as [`EngineError::ToolExecution`] and abort the
//! conversation turn.

use chrono::{DateTime, Duration, Month, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{Listing, ListingKind, ListingStats};
use crate::error::EngineError;
use crate::store::{ListingFilter, ListingOrder, ListingQuery, ListingStore};
use crate::tool::{ToolCall, ToolResult};

/// Maximum raw byte length of tool argument JSON from the LLM.
const MAX_TOOL_ARGS_LEN: usize = 10_000;
/// Maximum `limit` for the `search_listings` tool.
const MAX_SEARCH_LIMIT: usize = 50;

/// Executes tool calls by dispatching to listing store queries.
///
/// Every tool is read-only; the executor never writes to the store.
pub struct ToolExecutor<'a> {
    store: &'a dyn ListingStore,
}

impl<'a> ToolExecutor<'a> {
    /// Creates a new executor backed by the given store.
    #[must_use]
    pub fn new(store: &'a dyn ListingStore) -> Self {
        Self { store }
    }

    /// Dispatches a tool call to the appropriate corpus query.
    ///
    /// Validates raw argument size before dispatch to prevent oversized
    /// payloads.
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult, EngineError> {
        if call.arguments.len() > MAX_TOOL_ARGS_LEN {
            return Err(EngineError::ToolExecution {
                name: call.name.clone(),
                message: format!(
                    "arguments too large ({} bytes, max {MAX_TOOL_ARGS_LEN})",
                    call.arguments.len()
                ),
            });
        }

        let content = match call.name.as_str() {
            "search_listings" => self.tool_search_listings(&call.arguments).await?,
            "get_listing" => self.tool_get_listing(&call.arguments).await?,
            "get_monthly_report" => self.tool_get_monthly_report(&call.arguments).await?,
            "get_trends" => self.tool_get_trends(&call.arguments).await?,
            other => {
                return Err(EngineError::ToolExecution {
                    name: other.to_string(),
                    message: "unknown tool".to_string(),
                });
            }
        };

        Ok(ToolResult {
            tool_call_id: call.id.clone(),
            content,
        })
    }

    // -----------------------------------------------------------------------
    // Tool implementations
    // -----------------------------------------------------------------------

    /// Searches listings with optional type and free-text filters,
    /// newest event first, paginated.
    async fn tool_search_listings(&self, args: &str) -> Result<String, EngineError> {
        #[derive(Deserialize)]
        struct Args {
            #[serde(rename = "type")]
            kind: Option<String>,
            search: Option<String>,
            page: Option<i64>,
            limit: Option<i64>,
        }
        let args: Args = serde_json::from_str(args).map_err(|e| EngineError::ToolExecution {
            name: "search_listings".to_string(),
            message: format!("invalid arguments: {e}"),
        })?;

        let page = usize::try_from(args.page.unwrap_or(1)).unwrap_or(1).max(1);
        let limit = usize::try_from(args.limit.unwrap_or(9))
            .unwrap_or(1)
            .clamp(1, MAX_SEARCH_LIMIT);

        let mut filter = ListingFilter::default();
        if let Some(kind) = args.kind.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            match ListingKind::parse(kind) {
                Some(k) => filter.kind = Some(k),
                // An unrecognized type value matches no listings rather
                // than failing the call.
                None => {
                    let empty = PagedListingsView {
                        items: Vec::new(),
                        total: 0,
                        total_pages: 0,
                        page,
                    };
                    return serialize_view("search_listings", &empty);
                }
            }
        }
        filter.text_contains = args.search.filter(|s| !s.trim().is_empty());

        let query = ListingQuery {
            filter,
            order: ListingOrder::EventDateDesc,
            skip: (page - 1).saturating_mul(limit),
            take: Some(limit),
        };
        let result =
            self.store
                .query_listings(&query)
                .await
                .map_err(|e| EngineError::ToolExecution {
                    name: "search_listings".to_string(),
                    message: format!("query failed: {e}"),
                })?;

        let view = PagedListingsView {
            items: result.items.iter().map(ListingView::from).collect(),
            total: result.total,
            total_pages: result.total.div_ceil(u64::try_from(limit).unwrap_or(1)),
            page,
        };
        serialize_view("search_listings", &view)
    }

    /// Retrieves a single listing by id.
    async fn tool_get_listing(&self, args: &str) -> Result<String, EngineError> {
        #[derive(Deserialize)]
        struct Args {
            id: String,
        }
        let args: Args = serde_json::from_str(args).map_err(|e| EngineError::ToolExecution {
            name: "get_listing".to_string(),
            message: format!("invalid arguments: {e}"),
        })?;

        let Ok(id) = Uuid::parse_str(args.id.trim()) else {
            return Ok(r#"{"error": "Invalid listing ID format."}"#.to_string());
        };

        let listing =
            self.store
                .find_listing(id)
                .await
                .map_err(|e| EngineError::ToolExecution {
                    name: "get_listing".to_string(),
                    message: format!("lookup failed: {e}"),
                })?;

        match listing {
            Some(listing) => serialize_view("get_listing", &ListingView::from(&listing)),
            None => Ok(r#"{"error": "Listing not found."}"#.to_string()),
        }
    }

    /// Counts lost and found listings whose event falls in a calendar month.
    async fn tool_get_monthly_report(&self, args: &str) -> Result<String, EngineError> {
        #[derive(Deserialize)]
        struct Args {
            year: i32,
            month: u32,
        }
        let args: Args = serde_json::from_str(args).map_err(|e| EngineError::ToolExecution {
            name: "get_monthly_report".to_string(),
            message: format!("invalid arguments: {e}"),
        })?;

        let invalid = || EngineError::ToolExecution {
            name: "get_monthly_report".to_string(),
            message: format!("invalid month {}-{}", args.year, args.month),
        };
        let start = month_start(args.year, args.month).ok_or_else(invalid)?;
        let end = if args.month == 12 {
            month_start(args.year + 1, 1)
        } else {
            month_start(args.year, args.month + 1)
        }
        .ok_or_else(invalid)?;

        let query = ListingQuery {
            filter: ListingFilter {
                event_since: Some(start),
                event_before: Some(end),
                ..ListingFilter::default()
            },
            ..ListingQuery::default()
        };
        let result =
            self.store
                .query_listings(&query)
                .await
                .map_err(|e| EngineError::ToolExecution {
                    name: "get_monthly_report".to_string(),
                    message: format!("query failed: {e}"),
                })?;

        let lost = result
            .items
            .iter()
            .filter(|l| l.kind == ListingKind::Lost)
            .count();
        let name = u8::try_from(args.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map_or("Unknown", |m| m.name());
        let view = MonthlyReportView {
            month: format!("{name} {}", args.year),
            lost,
            found: result.items.len() - lost,
            total: result.items.len(),
        };
        serialize_view("get_monthly_report", &view)
    }

    /// Computes grouped statistics over a recent event window.
    async fn tool_get_trends(&self, args: &str) -> Result<String, EngineError> {
        #[derive(Deserialize)]
        struct Args {
            days: Option<i64>,
        }
        let args: Args = serde_json::from_str(args).map_err(|e| EngineError::ToolExecution {
            name: "get_trends".to_string(),
            message: format!("invalid arguments: {e}"),
        })?;

        let days = args.days.unwrap_or(30);
        let span = Duration::try_days(days).ok_or_else(|| EngineError::ToolExecution {
            name: "get_trends".to_string(),
            message: format!("day window out of range: {days}"),
        })?;

        let query = ListingQuery {
            filter: ListingFilter {
                event_since: Some(Utc::now() - span),
                ..ListingFilter::default()
            },
            ..ListingQuery::default()
        };
        let result =
            self.store
                .query_listings(&query)
                .await
                .map_err(|e| EngineError::ToolExecution {
                    name: "get_trends".to_string(),
                    message: format!("query failed: {e}"),
                })?;

        let view = TrendsView {
            days,
            stats: ListingStats::collect(&result.items),
        };
        serialize_view("get_trends", &view)
    }
}

impl std::fmt::Debug for ToolExecutor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolExecutor").finish_non_exhaustive()
    }
}

/// Midnight UTC on the first day of the given month.
fn month_start(year: i32, month: u32) -> Option<DateTime<Utc>> {
    Some(
        NaiveDate::from_ymd_opt(year, month, 1)?
            .and_time(NaiveTime::MIN)
            .and_utc(),
    )
}

/// Serializes a tool view, wrapping serialization failures with the tool name.
fn serialize_view<T: Serialize>(tool: &str, view: &T) -> Result<String, EngineError> {
    serde_json::to_string_pretty(view).map_err(|e| EngineError::ToolExecution {
        name: tool.to_string(),
        message: format!("serialization error: {e}"),
    })
}

// ---------------------------------------------------------------------------
// View types for serialization (subset of full structs)
// ---------------------------------------------------------------------------

/// Serializable view of a listing returned by tools.
///
/// Mirrors the public catalog row: embeddings and enrichment metadata
/// are internal and never shown to the model.
#[derive(Debug, Clone, Serialize)]
struct ListingView {
    id: Uuid,
    owner_name: String,
    #[serde(rename = "type")]
    kind: &'static str,
    title: String,
    description: String,
    category: String,
    location: String,
    event_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo_url: Option<String>,
    status: &'static str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&Listing> for ListingView {
    fn from(l: &Listing) -> Self {
        Self {
            id: l.id,
            owner_name: l.owner_name.clone(),
            kind: l.kind.as_str(),
            title: l.title.clone(),
            description: l.description.clone(),
            category: l.category.clone(),
            location: l.location.clone(),
            event_date: l.event_date,
            photo_url: l.photo_url.clone(),
            status: l.status.as_str(),
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

/// Serializable page of listings returned by `search_listings`.
#[derive(Debug, Clone, Serialize)]
struct PagedListingsView {
    items: Vec<ListingView>,
    total: u64,
    total_pages: u64,
    page: usize,
}

/// Serializable report returned by `get_monthly_report`.
#[derive(Debug, Clone, Serialize)]
struct MonthlyReportView {
    month: String,
    lost: usize,
    found: usize,
    total: usize,
}

/// Serializable statistics returned by `get_trends`.
#[derive(Debug, Clone, Serialize)]
struct TrendsView {
    days: i64,
    #[serde(flatten)]
    stats: ListingStats,
}
