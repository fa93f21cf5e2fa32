use crate::expression::{ConditionSpec, Expression};
use serde::Serialize;
use std::collections::HashMap;

/// One boolean-combinable unit of a strategy: a group of expressions plus
/// an optional relation text combining them by compact local index.
#[derive(Debug, Clone, Serialize)]
pub struct Condition {
    index: usize,
    expressions: Vec<Expression>,
    relation: Option<String>,
}

impl Condition {
    fn singleton(index: usize, expr: Expression) -> Self {
        Condition {
            index,
            expressions: vec![expr],
            relation: None,
        }
    }

    /// 1-based position among the strategy's conditions.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The expressions referenced by this condition, in compact local
    /// index order: `[0]` in the relation text is `expressions()[0]`.
    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    /// Boolean-combination text over the condition's own expressions,
    /// using dense zero-based bracketed indices. `None` for a singleton
    /// condition built without an explicit relation: such a condition is
    /// the truth value of its single expression.
    pub fn relation(&self) -> Option<&str> {
        self.relation.as_deref()
    }
}

/// A lexed piece of a relation string: either opaque literal text or a
/// bracketed expression reference.
enum RelationToken<'a> {
    Text(&'a str),
    Index(usize),
}

/// Split a relation string into literal runs and `[digits]` reference
/// tokens. Everything that is not a well-formed bracketed integer
/// (boolean operators, parentheses, whitespace, stray brackets) is passed
/// through as literal text.
fn tokenize(relation: &str) -> Vec<RelationToken<'_>> {
    let bytes = relation.as_bytes();
    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'[' {
            let mut j = i + 1;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j > i + 1 && j < bytes.len() && bytes[j] == b']' {
                // Digits wider than usize are left in the text as-is.
                if let Ok(index) = relation[i + 1..j].parse::<usize>() {
                    if literal_start < i {
                        tokens.push(RelationToken::Text(&relation[literal_start..i]));
                    }
                    tokens.push(RelationToken::Index(index));
                    i = j + 1;
                    literal_start = i;
                    continue;
                }
            }
        }
        i += 1;
    }

    if literal_start < bytes.len() {
        tokens.push(RelationToken::Text(&relation[literal_start..]));
    }
    tokens
}

/// Compile raw condition specs plus optional relation strings into the
/// strategy's condition list.
///
/// Every spec is first flattened into one [`Expression`] whose `idx` is
/// its 0-based position in input order. Without relations, each
/// expression becomes its own singleton condition. With relations, each
/// relation string becomes one condition: its `[i]` tokens are resolved
/// against the flattened list, de-duplicated in first-encounter order,
/// and renumbered to a dense 0-based local index space; the relation text
/// is rewritten accordingly. Tokens referencing a position past the end
/// of the flattened list are dropped from both the expression set and the
/// rewritten text.
pub fn compile_conditions(specs: &[ConditionSpec], relations: &[String]) -> Vec<Condition> {
    let exprs: Vec<Expression> = specs
        .iter()
        .enumerate()
        .map(|(idx, spec)| Expression::compile(spec, idx))
        .collect();

    if relations.is_empty() {
        return exprs
            .into_iter()
            .enumerate()
            .map(|(i, expr)| Condition::singleton(i + 1, expr))
            .collect();
    }

    relations
        .iter()
        .enumerate()
        .map(|(i, relation)| compile_relation(i + 1, relation, &exprs))
        .collect()
}

fn compile_relation(index: usize, relation: &str, exprs: &[Expression]) -> Condition {
    let mut local_of: HashMap<usize, usize> = HashMap::new();
    let mut referenced: Vec<usize> = Vec::new();
    let mut rewritten = String::with_capacity(relation.len());

    for token in tokenize(relation) {
        match token {
            RelationToken::Text(text) => rewritten.push_str(text),
            RelationToken::Index(global) => {
                if global >= exprs.len() {
                    tracing::warn!(
                        condition = index,
                        reference = global,
                        expression_count = exprs.len(),
                        "dropping out-of-range relation reference"
                    );
                    continue;
                }
                let local = *local_of.entry(global).or_insert_with(|| {
                    referenced.push(global);
                    referenced.len() - 1
                });
                rewritten.push_str(&format!("[{local}]"));
            }
        }
    }

    let expressions = referenced.iter().map(|&g| exprs[g].clone()).collect();
    Condition {
        index,
        expressions,
        relation: Some(rewritten),
    }
}
