//! A reactive rule dispatcher for graph-change events: node add/del,
//! property set, tag add/del. Rules are validated records pointing at an
//! externally-defined query (`storm`), executed under an authenticated
//! identity with bounded dispatch recursion.
//!
//! This crate never depends on the graph or query engine directly —
//! [`traits::StormEngine`], [`traits::AuthResolver`], and [`traits::RuleStore`]
//! are the only seams, to avoid a dependency cycle with the crates that
//! implement them.

pub mod dispatcher;
pub mod error;
pub mod glob_index;
pub mod registry;
pub mod rule;
pub mod traits;

pub use dispatcher::{Dispatcher, MAX_RECURSION_DEPTH};
pub use error::{Result, TriggerError};
pub use registry::Registry;
pub use rule::{Condition, Rule, RuleId, new_rule_id};
pub use traits::{AuthResolver, AuthedUser, RuleStore, StormEngine, StormError};
