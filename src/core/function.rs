//! Callable tool functions generated from tool schemas.
//!
//! A [`ToolFunction`] stands in for a remote tool: it knows the tool's
//! parameters, checks that required ones are present, and forwards the
//! call to the daemon. Derived data is computed once per `(server, tool)`
//! and shared through the [`FunctionBuilder`] cache.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

use super::error::{McpdError, Result};
use super::schema::{ParameterSpec, parameters};
use super::transport::Daemon;
use super::types::ToolDefinition;

/// Separator between server and tool in a qualified name.
pub const QUALIFIER: &str = "__";

/// Qualified name of a tool: `<server>__<tool>`.
#[must_use]
pub fn qualified_name(server: &str, tool: &str) -> String {
    format!("{server}{QUALIFIER}{tool}")
}

/// Everything derived from one tool schema.
#[derive(Debug)]
struct FunctionTemplate {
    qualified_name: String,
    server_name: String,
    definition: ToolDefinition,
    /// Signature order: required first.
    parameters: Vec<ParameterSpec>,
    /// Schema property order, used for the outgoing parameter map.
    property_order: Vec<String>,
    doc: String,
}

impl FunctionTemplate {
    fn build(definition: &ToolDefinition, server_name: &str) -> Self {
        let parameters = parameters(&definition.input_schema);
        let property_order = definition
            .input_schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default();
        let doc = render_doc(definition.description.as_deref(), &parameters);

        Self {
            qualified_name: qualified_name(server_name, &definition.name),
            server_name: server_name.to_string(),
            definition: definition.clone(),
            parameters,
            property_order,
            doc,
        }
    }
}

fn render_doc(description: Option<&str>, parameters: &[ParameterSpec]) -> String {
    let mut doc = description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or("No description provided")
        .to_string();

    if !parameters.is_empty() {
        doc.push_str("\n\nParameters:");
        for param in parameters {
            let optional = if param.required { "" } else { ", optional" };
            let description = param
                .description
                .as_deref()
                .unwrap_or("No description provided");
            let _ = write!(
                doc,
                "\n    {} ({}{optional}): {description}",
                param.name, param.param_type
            );
        }
    }

    doc.push_str("\n\nReturns:\n    The tool result as JSON.");
    doc.push_str(
        "\n\nErrors:\n    Validation if required parameters are missing, otherwise any daemon failure.",
    );
    doc
}

/// A remote tool bound to its server, callable with named arguments.
#[derive(Clone)]
pub struct ToolFunction {
    template: Arc<FunctionTemplate>,
    daemon: Arc<dyn Daemon>,
}

impl std::fmt::Debug for ToolFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolFunction")
            .field("name", &self.template.qualified_name)
            .finish_non_exhaustive()
    }
}

impl ToolFunction {
    /// Qualified name (`server__tool`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.template.qualified_name
    }

    /// Server hosting the tool.
    #[must_use]
    pub fn server_name(&self) -> &str {
        &self.template.server_name
    }

    /// Tool name as advertised by the server.
    #[must_use]
    pub fn tool_name(&self) -> &str {
        &self.template.definition.name
    }

    /// Tool description, if the server gave one.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.template.definition.description.as_deref()
    }

    /// The definition this function was generated from.
    #[must_use]
    pub fn schema(&self) -> &ToolDefinition {
        &self.template.definition
    }

    /// Parameters in signature order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.template.parameters
    }

    /// Human-readable documentation with one line per parameter.
    #[must_use]
    pub fn doc(&self) -> &str {
        &self.template.doc
    }

    /// Signature such as `time__now(timezone: string, format?: string) -> any`.
    #[must_use]
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .template
            .parameters
            .iter()
            .map(|p| {
                let marker = if p.required { "" } else { "?" };
                format!("{}{marker}: {}", p.name, p.param_type)
            })
            .collect();
        format!("{}({}) -> any", self.name(), params.join(", "))
    }

    /// Check `args` against the schema and build the parameter map.
    ///
    /// A key that is present counts as supplied, whatever its value. All
    /// missing required names and all unknown names are reported together.
    pub fn bind(&self, mut args: Map<String, Value>) -> Result<Map<String, Value>> {
        let template = &self.template;
        let missing: Vec<String> = template
            .parameters
            .iter()
            .filter(|p| p.required && !args.contains_key(&p.name))
            .map(|p| p.name.clone())
            .collect();
        let unexpected: Vec<String> = args
            .keys()
            .filter(|key| !template.property_order.contains(key))
            .cloned()
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(McpdError::Validation {
                tool: template.qualified_name.clone(),
                missing,
                unexpected,
            });
        }

        let mut params = Map::new();
        for name in &template.property_order {
            if let Some(value) = args.remove(name) {
                params.insert(name.clone(), value);
            }
        }
        Ok(params)
    }

    /// Validate `args` and run the tool.
    ///
    /// The daemon's result and errors are returned unchanged.
    pub fn call(&self, args: Map<String, Value>) -> Result<Value> {
        let params = self.bind(args)?;
        tracing::debug!(function = %self.name(), params = params.len(), "calling tool function");
        self.daemon
            .call_tool(self.server_name(), self.tool_name(), &params)
    }
}

/// Creates [`ToolFunction`]s and caches what they derive from schemas.
pub struct FunctionBuilder {
    daemon: Arc<dyn Daemon>,
    cache: RwLock<HashMap<(String, String), Arc<FunctionTemplate>>>,
}

impl FunctionBuilder {
    /// Create a builder whose functions call through `daemon`.
    #[must_use]
    pub fn new(daemon: Arc<dyn Daemon>) -> Self {
        Self {
            daemon,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Create the function for `definition` on `server_name`.
    ///
    /// Memoized per `(server, tool)` pair: once cached, later calls reuse the
    /// cached template until [`Self::clear_cache`]. The pair is kept apart
    /// so `a` + `b__c` and `a__b` + `c` do not share an entry.
    pub fn create_function(&self, definition: &ToolDefinition, server_name: &str) -> ToolFunction {
        let key = (server_name.to_string(), definition.name.clone());

        if let Some(template) = self.cache.read().get(&key) {
            tracing::trace!(server = %server_name, tool = %definition.name, "function cache hit");
            return self.function(Arc::clone(template));
        }

        let built = Arc::new(FunctionTemplate::build(definition, server_name));
        let template = Arc::clone(self.cache.write().entry(key).or_insert(built));
        self.function(template)
    }

    fn function(&self, template: Arc<FunctionTemplate>) -> ToolFunction {
        ToolFunction {
            template,
            daemon: Arc::clone(&self.daemon),
        }
    }

    /// Number of cached templates.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }

    /// Drop every cached template.
    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }
}
