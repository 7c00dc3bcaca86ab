//! Tool type definitions for corpus function-calling.
//!
//! Provides provider-agnostic types for tool definitions, calls, and
//! results. Tools expose read-only corpus operations (listing search,
//! lookup, reporting) as function-calling targets for the assistant.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// A tool definition that can be sent to a model for function-calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match the dispatch table in the executor).
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub parameters: serde_json::Value,
}

/// A tool call requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call (assigned by the provider).
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON-encoded arguments for the tool.
    pub arguments: String,
}

/// The result of executing a tool call.
///
/// Domain-level misses (listing not found, malformed id) are encoded as
/// JSON error objects in `content` so the model can react to them;
/// infrastructure failures surface as `Err` from the executor instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this result corresponds to.
    pub tool_call_id: String,
    /// Result content as a JSON string.
    pub content: String,
}

/// A set of tool definitions scoped to a conversation role.
///
/// The assistant gets all four corpus tools (`search_listings`,
/// `get_listing`, `get_monthly_report`, `get_trends`); the second,
/// grounding turn of the conversation gets none.
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    definitions: Vec<ToolDefinition>,
}

impl ToolSet {
    /// Returns the tool definitions in this set.
    #[must_use]
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Returns `true` if this set contains no tools.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns the number of tools in this set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Tool set for the campus assistant.
    ///
    /// Includes all four corpus tools: `search_listings`, `get_listing`,
    /// `get_monthly_report`, `get_trends`.
    #[must_use]
    pub fn assistant_tools() -> Self {
        Self {
            definitions: vec![
                def_search_listings(),
                def_get_listing(),
                def_get_monthly_report(),
                def_get_trends(),
            ],
        }
    }

    /// Empty tool set (no tools available).
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Tool schema definitions
// ---------------------------------------------------------------------------

/// Defines the `search_listings` tool.
fn def_search_listings() -> ToolDefinition {
    ToolDefinition {
        name: "search_listings".to_string(),
        description: "Search for lost or found item listings on campus. Supports optional \
                       filtering by item type and free-text search across title, description, \
                       category, and location."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "type": {
                    "type": "string",
                    "enum": ["Lost", "Found"],
                    "description": "Filter by listing type."
                },
                "search": {
                    "type": "string",
                    "description": "Free-text search across title, description, category, and location."
                },
                "page": {
                    "type": "integer",
                    "description": "Page number for pagination. Defaults to 1.",
                    "default": 1
                },
                "limit": {
                    "type": "integer",
                    "description": "Number of results per page. Defaults to 9.",
                    "default": 9
                }
            },
            "required": [],
            "additionalProperties": false
        }),
    }
}

/// Defines the `get_listing` tool.
fn def_get_listing() -> ToolDefinition {
    ToolDefinition {
        name: "get_listing".to_string(),
        description: "Retrieve a single lost or found listing by its unique identifier."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": "string",
                    "description": "The UUID of the listing to retrieve."
                }
            },
            "required": ["id"],
            "additionalProperties": false
        }),
    }
}

/// Defines the `get_monthly_report` tool.
fn def_get_monthly_report() -> ToolDefinition {
    ToolDefinition {
        name: "get_monthly_report".to_string(),
        description: "Get a summary report of lost and found listings for a given month and year."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "year": {
                    "type": "integer",
                    "description": "The four-digit calendar year (e.g. 2025)."
                },
                "month": {
                    "type": "integer",
                    "description": "The month as a number from 1 (January) to 12 (December)."
                }
            },
            "required": ["year", "month"],
            "additionalProperties": false
        }),
    }
}

/// Defines the `get_trends` tool.
fn def_get_trends() -> ToolDefinition {
    ToolDefinition {
        name: "get_trends".to_string(),
        description: "Get statistics and trends for lost and found items over a recent time \
                       period."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "days": {
                    "type": "integer",
                    "description": "Number of days to look back. Defaults to 30.",
                    "default": 30
                }
            },
            "required": [],
            "additionalProperties": false
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolset_assistant() {
        let ts = ToolSet::assistant_tools();
        assert_eq!(ts.len(), 4);
        let names: Vec<&str> = ts.definitions().iter().map(|d| d.name.as_str()).collect();
        assert!(names.contains(&"search_listings"));
        assert!(names.contains(&"get_listing"));
        assert!(names.contains(&"get_monthly_report"));
        assert!(names.contains(&"get_trends"));
    }

    #[test]
    fn test_toolset_none() {
        let ts = ToolSet::none();
        assert!(ts.is_empty());
        assert_eq!(ts.len(), 0);
    }

    #[test]
    fn test_tool_definition_serialization() {
        let def = def_search_listings();
        let json = serde_json::to_string(&def).unwrap_or_default();
        assert!(json.contains("search_listings"));
        assert!(json.contains("pagination"));
    }

    #[test]
    fn test_tool_call_serialization() {
        let call = ToolCall {
            id: "call_123".to_string(),
            name: "get_listing".to_string(),
            arguments: r#"{"id":"7d2c9f3a-1b8e-4a6d-9c2f-0e5b8a7d4c1e"}"#.to_string(),
        };
        let json = serde_json::to_string(&call).unwrap_or_default();
        assert!(json.contains("call_123"));
        assert!(json.contains("get_listing"));
    }

    #[test]
    fn test_tool_result_serialization() {
        let result = ToolResult {
            tool_call_id: "call_123".to_string(),
            content: r#"{"error": "Listing not found."}"#.to_string(),
        };
        let json = serde_json::to_string(&result).unwrap_or_default();
        assert!(json.contains("call_123"));
        assert!(json.contains("Listing not found."));
    }

    #[test]
    fn test_required_arguments_per_tool() {
        let required = |def: &ToolDefinition| {
            def.parameters["required"]
                .as_array()
                .map(Vec::len)
                .unwrap_or_default()
        };
        assert_eq!(required(&def_search_listings()), 0);
        assert_eq!(required(&def_get_listing()), 1);
        assert_eq!(required(&def_get_monthly_report()), 2);
        assert_eq!(required(&def_get_trends()), 0);
    }

    #[test]
    fn test_all_definitions_have_valid_schemas() {
        let all = vec![
            def_search_listings(),
            def_get_listing(),
            def_get_monthly_report(),
            def_get_trends(),
        ];
        for def in &all {
            assert!(!def.name.is_empty());
            assert!(!def.description.is_empty());
            assert!(def.parameters.is_object());
            assert_eq!(def.parameters["type"], "object");
        }
    }
}
