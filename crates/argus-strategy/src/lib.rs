//! Compiler for declarative notify strategies.
//!
//! A notify strategy is a monitoring rule: a scope, one or more boolean
//! conditions built from `argument OPERATOR value` expressions, an
//! optional relation combining conditions' expressions by bracketed
//! positional index, a message template, a notification action and an
//! instance list. This crate compiles such a rule from its raw JSON
//! document into an immutable [`Strategy`] that a runtime evaluator can
//! match against live metric samples; it performs no evaluation,
//! scheduling or notification delivery itself.
//!
//! # Examples
//!
//! ```
//! use argus_strategy::Strategy;
//!
//! let doc = r#"{
//!     "scope": "application",
//!     "conditions": ["cpu.user>90", {"expr": "mem.heap>80", "func": "avg", "range": 60}],
//!     "relations": ["[0]&&[1]"],
//!     "action": {"mail": "ops@example.com"},
//!     "msgTemplate": "high load on {instance}"
//! }"#;
//!
//! let strategy = Strategy::parse(doc).unwrap();
//! assert_eq!(strategy.conditions().len(), 1);
//! assert_eq!(strategy.max_range_ms(), 60_000);
//! ```

pub mod error;
pub mod expression;
pub mod relation;
pub mod strategy;


pub use error::{Result, StrategyError};
pub use expression::{CompareOp, ConditionSpec, Expression};
pub use relation::Condition;
pub use strategy::Strategy;
