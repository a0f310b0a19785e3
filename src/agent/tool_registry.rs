// src/agent/tool_registry.rs
//! Maps an agent role to the tools it may call. Built once at startup and
//! treated as immutable configuration afterwards.

use crate::openai_client::{FunctionParameters, FunctionSpec, PropertyDefinition, ToolDefinition};
use std::collections::HashMap;

pub const WEB_SEARCH: &str = "web_search";
pub const READ_REFERENCE_DOC: &str = "read_reference_doc";
pub const NOTION_CREATE_PAGE: &str = "notion_create_page";

#[derive(Debug, Clone)]
pub struct ToolRegistry {
    export_enabled: bool,
}

impl ToolRegistry {
    pub fn new(export_enabled: bool) -> Self {
        Self { export_enabled }
    }

    /// Tools permitted for a role. Unknown roles get no tools.
    pub fn tools_for(&self, role: &str) -> Vec<ToolDefinition> {
        match role {
            "researcher" => vec![web_search_tool()],
            "screenwriter" => {
                let mut tools = vec![read_reference_doc_tool()];
                if self.export_enabled {
                    tools.push(notion_create_page_tool());
                }
                tools
            }
            _ => Vec::new(),
        }
    }
}

fn string_property(description: &str) -> PropertyDefinition {
    PropertyDefinition {
        prop_type: "string".to_string(),
        description: description.to_string(),
        items: None,
    }
}

fn function_tool(name: &str, description: &str, params: Vec<(&str, PropertyDefinition)>) -> ToolDefinition {
    let required = params.iter().map(|(k, _)| k.to_string()).collect();
    let properties: HashMap<String, PropertyDefinition> = params
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    ToolDefinition {
        kind: "function".to_string(),
        function: FunctionSpec {
            name: name.to_string(),
            description: description.to_string(),
            parameters: FunctionParameters {
                schema_type: "object".to_string(),
                properties,
                required,
            },
        },
    }
}

fn web_search_tool() -> ToolDefinition {
    function_tool(
        WEB_SEARCH,
        "Searches the web for current information and returns the top results as text",
        vec![("query", string_property("The search query"))],
    )
}

fn read_reference_doc_tool() -> ToolDefinition {
    function_tool(
        READ_REFERENCE_DOC,
        "Reads a reference document from disk and returns its text content",
        vec![("file_path", string_property("Path to the reference document"))],
    )
}

fn notion_create_page_tool() -> ToolDefinition {
    function_tool(
        NOTION_CREATE_PAGE,
        "Saves the finished script as a new Notion page",
        vec![
            ("title", string_property("Title of the page to create")),
            ("content", string_property("Markdown content to save in the page")),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tools: &[ToolDefinition]) -> Vec<&str> {
        tools.iter().map(|t| t.function.name.as_str()).collect()
    }

    #[test]
    fn test_researcher_gets_web_search_only() {
        let registry = ToolRegistry::new(true);
        assert_eq!(names(&registry.tools_for("researcher")), vec![WEB_SEARCH]);
    }

    #[test]
    fn test_screenwriter_tools_depend_on_export_flag() {
        let without = ToolRegistry::new(false);
        assert_eq!(
            names(&without.tools_for("screenwriter")),
            vec![READ_REFERENCE_DOC]
        );

        let with = ToolRegistry::new(true);
        assert_eq!(
            names(&with.tools_for("screenwriter")),
            vec![READ_REFERENCE_DOC, NOTION_CREATE_PAGE]
        );
    }

    #[test]
    fn test_unknown_role_gets_no_tools() {
        let registry = ToolRegistry::new(true);
        assert!(registry.tools_for("editor").is_empty());
    }
}
