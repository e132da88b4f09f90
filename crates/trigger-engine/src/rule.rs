//! The trigger rule record: validation, deterministic binary encoding, and
//! execution against the external query engine.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TriggerError};
use crate::traits::{AuthResolver, StormEngine, StormError};

/// A rule's identity: a hex-encoded 16-byte random value.
pub type RuleId = String;

/// Generates a fresh rule identity, matching the original design's
/// `os.urandom(16)` key derivation.
pub fn new_rule_id() -> RuleId {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// The condition a rule fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    NodeAdd,
    NodeDel,
    PropSet,
    TagAdd,
    TagDel,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::NodeAdd => "node:add",
            Condition::NodeDel => "node:del",
            Condition::PropSet => "prop:set",
            Condition::TagAdd => "tag:add",
            Condition::TagDel => "tag:del",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "node:add" => Ok(Condition::NodeAdd),
            "node:del" => Ok(Condition::NodeDel),
            "prop:set" => Ok(Condition::PropSet),
            "tag:add" => Ok(Condition::TagAdd),
            "tag:del" => Ok(Condition::TagDel),
            other => Err(TriggerError::NoSuchCond(other.to_string())),
        }
    }
}

/// A validated trigger rule. Field order is fixed (`ver, cond, user, storm,
/// form, tag, prop`) so two logically-equal rules always encode to the same
/// bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub ver: u8,
    pub cond: Condition,
    pub user: String,
    pub storm: String,
    pub form: Option<String>,
    pub tag: Option<String>,
    pub prop: Option<String>,
}

impl Rule {
    /// Builds and validates a new rule. `ver` is always `0` for rules
    /// constructed in-process; [`Rule::decode`] re-validates whatever
    /// version a persisted record carries.
    pub fn new(
        cond: Condition,
        user: impl Into<String>,
        storm: impl Into<String>,
        form: Option<String>,
        tag: Option<String>,
        prop: Option<String>,
    ) -> Result<Self> {
        let rule = Rule { ver: 0, cond, user: user.into(), storm: storm.into(), form, tag, prop };
        rule.validate()?;
        Ok(rule)
    }

    fn validate(&self) -> Result<()> {
        if self.ver != 0 {
            return Err(TriggerError::BadOptValu("unexpected rule version".into()));
        }
        match self.cond {
            Condition::NodeAdd | Condition::NodeDel => {
                if self.form.is_none() {
                    return Err(TriggerError::BadOptValu("form must be present for node:add or node:del".into()));
                }
                if self.tag.is_some() {
                    return Err(TriggerError::BadOptValu("tag must not be present for node:add or node:del".into()));
                }
            }
            Condition::PropSet => {
                if self.form.is_some() || self.tag.is_some() {
                    return Err(TriggerError::BadOptValu("form and tag must not be present for prop:set".into()));
                }
                if self.prop.is_none() {
                    return Err(TriggerError::BadOptValu("missing prop parameter".into()));
                }
            }
            Condition::TagAdd | Condition::TagDel => {
                if self.tag.is_none() {
                    return Err(TriggerError::BadOptValu("missing tag".into()));
                }
            }
        }
        if self.prop.is_some() && !matches!(self.cond, Condition::PropSet) {
            return Err(TriggerError::BadOptValu("prop parameter invalid".into()));
        }
        Ok(())
    }

    /// Deterministic binary encoding via `bincode`'s default configuration.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decodes and re-validates a persisted record.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let rule: Rule = bincode::deserialize(bytes)?;
        rule.validate()?;
        Ok(rule)
    }

    /// Whether this rule's tag pattern is a glob (contains `*`).
    pub fn is_glob_tag(&self) -> bool {
        self.tag.as_deref().is_some_and(|t| t.contains('*'))
    }

    /// Resolves the rule's owner, submits `storm` to the query engine, and
    /// swallows every storm error except cancellation.
    pub fn execute(
        &self,
        storm: &dyn StormEngine,
        auth: &dyn AuthResolver,
        vars: Option<&std::collections::HashMap<String, String>>,
    ) -> Result<()> {
        let Some(user) = auth.resolve(&self.user) else {
            tracing::warn!(user = %self.user, "unknown user in stored trigger");
            return Ok(());
        };

        match storm.execute(&self.storm, vars, &user) {
            Ok(()) => Ok(()),
            Err(StormError::Cancelled) => Err(TriggerError::Cancellation),
            Err(StormError::Other(msg)) => {
                tracing::error!(query = %self.storm, error = %msg, "trigger query failed");
                Ok(())
            }
        }
    }
}
