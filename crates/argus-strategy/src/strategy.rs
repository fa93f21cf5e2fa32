use crate::error::{Result, StrategyError};
use crate::expression::ConditionSpec;
use crate::relation::{compile_conditions, Condition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Typed shape of a raw strategy document. Optional fields tolerate both
/// absence and an explicit JSON `null`.
#[derive(Debug, Deserialize)]
struct StrategyDoc {
    scope: String,
    #[serde(default)]
    context: Option<Vec<String>>,
    conditions: Vec<ConditionSpec>,
    #[serde(default)]
    relations: Option<Vec<String>>,
    #[serde(default)]
    action: Option<BTreeMap<String, String>>,
    #[serde(rename = "msgTemplate")]
    msg_template: String,
    #[serde(default)]
    instances: Option<Vec<String>>,
}

/// A compiled notify strategy: the ready-to-evaluate form of one
/// declarative monitoring rule.
///
/// Compilation is a pure, synchronous transformation; a finished value
/// holds only owned data and can be shared freely across evaluator
/// threads once construction completes.
#[derive(Debug, Clone, Serialize)]
pub struct Strategy {
    scope: String,
    context: Vec<String>,
    action: BTreeMap<String, String>,
    instances: Vec<String>,
    msg_template: String,
    conditions: Vec<Condition>,
    max_range_ms: u64,
}

impl Strategy {
    /// Build a strategy shell with no conditions yet.
    pub fn new(
        scope: String,
        context: Vec<String>,
        action: BTreeMap<String, String>,
        instances: Vec<String>,
        msg_template: String,
    ) -> Self {
        Strategy {
            scope,
            context,
            action,
            instances,
            msg_template,
            conditions: Vec::new(),
            max_range_ms: 0,
        }
    }

    /// Compile a strategy from raw JSON text.
    ///
    /// Fails with [`StrategyError::Decode`] when the text is not
    /// well-formed JSON, and with [`StrategyError::Shape`] when the
    /// decoded tree does not have the expected field shapes.
    pub fn parse(text: &str) -> Result<Self> {
        let doc: Value = serde_json::from_str(text)?;
        Self::from_document(doc)
    }

    /// Compile a strategy from an already-decoded document tree.
    ///
    /// This is the seam for callers that decode the document themselves
    /// (or synthesize one in tests); [`Strategy::parse`] is a thin
    /// convenience wrapper around it.
    pub fn from_document(doc: Value) -> Result<Self> {
        let doc: StrategyDoc =
            serde_json::from_value(doc).map_err(|e| StrategyError::Shape(e.to_string()))?;

        let mut strategy = Strategy::new(
            doc.scope,
            doc.context.unwrap_or_default(),
            doc.action.unwrap_or_default(),
            doc.instances.unwrap_or_default(),
            doc.msg_template,
        );
        strategy.set_conditions(&doc.conditions, &doc.relations.unwrap_or_default());
        Ok(strategy)
    }

    /// Recompile the condition list from raw specs and relation strings,
    /// then refresh the aggregate maximum range.
    pub fn set_conditions(&mut self, specs: &[ConditionSpec], relations: &[String]) {
        self.conditions = compile_conditions(specs, relations);
        self.max_range_ms = self
            .conditions
            .iter()
            .flat_map(|cond| cond.expressions())
            .map(|expr| expr.range_ms())
            .max()
            .unwrap_or(0);
    }

    /// Resource class this rule applies to.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Contextual field names attached to a fired alert.
    pub fn context(&self) -> &[String] {
        &self.context
    }

    /// Notification channel/target description.
    pub fn action(&self) -> &BTreeMap<String, String> {
        &self.action
    }

    /// Instance identifiers the rule is restricted to; empty means all.
    pub fn instances(&self) -> &[String] {
        &self.instances
    }

    /// Alert message template.
    pub fn msg_template(&self) -> &str {
        &self.msg_template
    }

    /// Compiled conditions, indexed 1..N in declaration order.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Largest sliding-window range in milliseconds across every
    /// expression; tells the evaluator how far back samples must be kept.
    pub fn max_range_ms(&self) -> u64 {
        self.max_range_ms
    }

    // Post-construction overrides are trusted internal operations
    // (e.g. template hot-reload) and are not revalidated.

    pub fn set_scope(&mut self, scope: String) {
        self.scope = scope;
    }

    pub fn set_context(&mut self, context: Vec<String>) {
        self.context = context;
    }

    pub fn set_action(&mut self, action: BTreeMap<String, String>) {
        self.action = action;
    }

    pub fn set_instances(&mut self, instances: Vec<String>) {
        self.instances = instances;
    }

    pub fn set_msg_template(&mut self, msg_template: String) {
        self.msg_template = msg_template;
    }
}
