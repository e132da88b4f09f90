//! In-memory dispatch indexes over trigger rules, mirrored to persistent
//! storage. All mutation goes through a single mutex so the registry is
//! safely callable from a multi-threaded runtime even though the design
//! does not require lock-free access.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{Result, TriggerError};
use crate::glob_index::GlobIndex;
use crate::rule::{Condition, Rule, RuleId, new_rule_id};
use crate::traits::{RuleStore, StormEngine};

#[derive(Default)]
struct RegistryState {
    by_id: HashMap<RuleId, Rule>,
    node_add: HashMap<String, Vec<RuleId>>,
    node_del: HashMap<String, Vec<RuleId>>,
    prop_set: HashMap<String, Vec<RuleId>>,
    tag_add: HashMap<(Option<String>, String), Vec<RuleId>>,
    tag_del: HashMap<(Option<String>, String), Vec<RuleId>>,
    tag_add_globs: HashMap<Option<String>, GlobIndex>,
    tag_del_globs: HashMap<Option<String>, GlobIndex>,
}

impl RegistryState {
    fn index_insert(&mut self, id: RuleId, rule: &Rule) {
        match rule.cond {
            Condition::NodeAdd => self.node_add.entry(rule.form.clone().unwrap()).or_default().push(id),
            Condition::NodeDel => self.node_del.entry(rule.form.clone().unwrap()).or_default().push(id),
            Condition::PropSet => self.prop_set.entry(rule.prop.clone().unwrap()).or_default().push(id),
            Condition::TagAdd => {
                let tag = rule.tag.clone().unwrap();
                if rule.is_glob_tag() {
                    self.tag_add_globs.entry(rule.form.clone()).or_default().add(&tag, id);
                } else {
                    self.tag_add.entry((rule.form.clone(), tag)).or_default().push(id);
                }
            }
            Condition::TagDel => {
                let tag = rule.tag.clone().unwrap();
                if rule.is_glob_tag() {
                    self.tag_del_globs.entry(rule.form.clone()).or_default().add(&tag, id);
                } else {
                    self.tag_del.entry((rule.form.clone(), tag)).or_default().push(id);
                }
            }
        }
    }

    fn index_remove(&mut self, id: &RuleId, rule: &Rule) {
        match rule.cond {
            Condition::NodeAdd => remove_from(&mut self.node_add, rule.form.as_deref().unwrap(), id),
            Condition::NodeDel => remove_from(&mut self.node_del, rule.form.as_deref().unwrap(), id),
            Condition::PropSet => remove_from(&mut self.prop_set, rule.prop.as_deref().unwrap(), id),
            Condition::TagAdd => {
                let tag = rule.tag.clone().unwrap();
                if rule.is_glob_tag() {
                    if let Some(idx) = self.tag_add_globs.get_mut(&rule.form) {
                        idx.remove(&tag, id);
                    }
                } else if let Some(v) = self.tag_add.get_mut(&(rule.form.clone(), tag)) {
                    v.retain(|r| r != id);
                }
            }
            Condition::TagDel => {
                let tag = rule.tag.clone().unwrap();
                if rule.is_glob_tag() {
                    if let Some(idx) = self.tag_del_globs.get_mut(&rule.form) {
                        idx.remove(&tag, id);
                    }
                } else if let Some(v) = self.tag_del.get_mut(&(rule.form.clone(), tag)) {
                    v.retain(|r| r != id);
                }
            }
        }
    }
}

fn remove_from(map: &mut HashMap<String, Vec<RuleId>>, key: &str, id: &RuleId) {
    if let Some(v) = map.get_mut(key) {
        v.retain(|r| r != id);
    }
}

/// Owns the in-memory trigger indexes and their persisted mirror.
pub struct Registry {
    state: Mutex<RegistryState>,
    store: Box<dyn RuleStore>,
}

impl Registry {
    /// Loads every persisted rule, skipping (and logging) any that fail to
    /// decode or re-validate.
    pub fn load(store: Box<dyn RuleStore>) -> Result<Self> {
        let mut state = RegistryState::default();
        let records = store.scan().map_err(|e| TriggerError::BadOptValu(format!("rule scan failed: {e}")))?;
        for (id, bytes) in records {
            match Rule::decode(&bytes) {
                Ok(rule) => {
                    state.index_insert(id.clone(), &rule);
                    state.by_id.insert(id, rule);
                }
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "invalid rule found in storage, skipping");
                }
            }
        }
        Ok(Self { state: Mutex::new(state), store })
    }

    /// Validates `query` via [`StormEngine::check`], persists the rule, and
    /// places it in the appropriate dispatch index.
    pub fn add(
        &self,
        storm: &dyn StormEngine,
        user: impl Into<String>,
        cond: Condition,
        query: impl Into<String>,
        form: Option<String>,
        tag: Option<String>,
        prop: Option<String>,
    ) -> Result<RuleId> {
        let query = query.into();
        if query.is_empty() {
            return Err(TriggerError::BadOptValu("empty query".into()));
        }
        storm.check(&query).map_err(|e| TriggerError::InvalidQuery(e.to_string()))?;

        let rule = Rule::new(cond, user, query, form, tag, prop)?;
        let id = new_rule_id();
        self.store
            .put(&id, &rule.encode()?)
            .map_err(|e| TriggerError::BadOptValu(format!("rule persist failed: {e}")))?;

        let mut state = self.state.lock().expect("registry mutex poisoned");
        state.index_insert(id.clone(), &rule);
        state.by_id.insert(id.clone(), rule);
        Ok(id)
    }

    pub fn delete(&self, id: &RuleId) -> Result<()> {
        let mut state = self.state.lock().expect("registry mutex poisoned");
        let rule = state.by_id.remove(id).ok_or_else(|| TriggerError::NoSuchIden(id.clone()))?;
        state.index_remove(id, &rule);
        drop(state);
        self.store.delete(id).map_err(|e| TriggerError::BadOptValu(format!("rule delete failed: {e}")))
    }

    /// Replaces a rule's `storm` text. Dispatch-index placement never
    /// changes since the condition keys are immutable after creation.
    pub fn modify(&self, storm_engine: &dyn StormEngine, id: &RuleId, query: impl Into<String>) -> Result<()> {
        let query = query.into();
        storm_engine.check(&query).map_err(|e| TriggerError::InvalidQuery(e.to_string()))?;

        let mut state = self.state.lock().expect("registry mutex poisoned");
        let rule = state.by_id.get_mut(id).ok_or_else(|| TriggerError::NoSuchIden(id.clone()))?;
        rule.storm = query;
        let encoded = rule.encode()?;
        drop(state);
        self.store.put(id, &encoded).map_err(|e| TriggerError::BadOptValu(format!("rule persist failed: {e}")))
    }

    pub fn get(&self, id: &RuleId) -> Result<Rule> {
        let state = self.state.lock().expect("registry mutex poisoned");
        state.by_id.get(id).cloned().ok_or_else(|| TriggerError::NoSuchIden(id.clone()))
    }

    pub fn list(&self) -> Vec<(RuleId, Rule)> {
        let state = self.state.lock().expect("registry mutex poisoned");
        state.by_id.iter().map(|(id, rule)| (id.clone(), rule.clone())).collect()
    }

    pub(crate) fn rules_for_node_add(&self, form: &str) -> Vec<Rule> {
        self.lookup_ids(|s| s.node_add.get(form).cloned().unwrap_or_default())
    }

    pub(crate) fn rules_for_node_del(&self, form: &str) -> Vec<Rule> {
        self.lookup_ids(|s| s.node_del.get(form).cloned().unwrap_or_default())
    }

    pub(crate) fn rules_for_prop_set(&self, prop: &str) -> Vec<Rule> {
        self.lookup_ids(|s| s.prop_set.get(prop).cloned().unwrap_or_default())
    }

    /// The four tag-event lookups, in the fixed order the dispatcher must
    /// execute them: form-specific exact, form-agnostic exact,
    /// form-specific globs, form-agnostic globs.
    pub(crate) fn rules_for_tag_add(&self, form: &str, tag: &str) -> Vec<Rule> {
        self.tag_rules(form, tag, |s| &s.tag_add, |s| &s.tag_add_globs)
    }

    pub(crate) fn rules_for_tag_del(&self, form: &str, tag: &str) -> Vec<Rule> {
        self.tag_rules(form, tag, |s| &s.tag_del, |s| &s.tag_del_globs)
    }

    fn tag_rules(
        &self,
        form: &str,
        tag: &str,
        exact: impl Fn(&RegistryState) -> &HashMap<(Option<String>, String), Vec<RuleId>>,
        globs: impl Fn(&RegistryState) -> &HashMap<Option<String>, GlobIndex>,
    ) -> Vec<Rule> {
        let state = self.state.lock().expect("registry mutex poisoned");
        let mut ids = Vec::new();
        ids.extend(exact(&state).get(&(Some(form.to_string()), tag.to_string())).cloned().unwrap_or_default());
        ids.extend(exact(&state).get(&(None, tag.to_string())).cloned().unwrap_or_default());
        if let Some(idx) = globs(&state).get(&Some(form.to_string())) {
            ids.extend(idx.matches(tag));
        }
        if let Some(idx) = globs(&state).get(&None) {
            ids.extend(idx.matches(tag));
        }
        ids.into_iter().filter_map(|id| state.by_id.get(&id).cloned()).collect()
    }

    fn lookup_ids(&self, f: impl Fn(&RegistryState) -> Vec<RuleId>) -> Vec<Rule> {
        let state = self.state.lock().expect("registry mutex poisoned");
        f(&state).into_iter().filter_map(|id| state.by_id.get(&id).cloned()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    struct MemStore(StdMutex<HashMap<String, Vec<u8>>>);
    impl RuleStore for MemStore {
        fn put(&self, id: &str, record: &[u8]) -> std::io::Result<()> {
            self.0.lock().unwrap().insert(id.to_string(), record.to_vec());
            Ok(())
        }
        fn delete(&self, id: &str) -> std::io::Result<()> {
            self.0.lock().unwrap().remove(id);
            Ok(())
        }
        fn scan(&self) -> std::io::Result<Vec<(String, Vec<u8>)>> {
            Ok(self.0.lock().unwrap().iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        }
    }

    struct AcceptAll;
    impl StormEngine for AcceptAll {
        fn check(&self, _q: &str) -> std::result::Result<(), crate::traits::StormError> {
            Ok(())
        }
        fn execute(
            &self,
            _q: &str,
            _vars: Option<&HashMap<String, String>>,
            _user: &crate::traits::AuthedUser,
        ) -> std::result::Result<(), crate::traits::StormError> {
            Ok(())
        }
    }

    fn registry() -> Registry {
        Registry::load(Box::new(MemStore(StdMutex::new(HashMap::new())))).unwrap()
    }

    #[test]
    fn add_then_list_then_delete() {
        let reg = registry();
        let id = reg.add(&AcceptAll, "u", Condition::NodeAdd, "q", Some("foo".into()), None, None).unwrap();
        assert_eq!(reg.list().len(), 1);
        assert_eq!(reg.rules_for_node_add("foo").len(), 1);
        reg.delete(&id).unwrap();
        assert!(reg.list().is_empty());
        assert!(reg.rules_for_node_add("foo").is_empty());
    }

    #[test]
    fn modify_replaces_storm_without_moving_dispatch_slot() {
        let reg = registry();
        let id = reg.add(&AcceptAll, "u", Condition::PropSet, "q1", None, None, Some("p".into())).unwrap();
        reg.modify(&AcceptAll, &id, "q2").unwrap();
        assert_eq!(reg.get(&id).unwrap().storm, "q2");
        assert_eq!(reg.rules_for_prop_set("p").len(), 1);
    }

    #[test]
    fn delete_unknown_id_errors() {
        let reg = registry();
        assert!(reg.delete(&"missing".to_string()).is_err());
    }

    #[test]
    fn tag_glob_scenario() {
        let reg = registry();
        reg.add(&AcceptAll, "u", Condition::TagAdd, "q", Some("foo".into()), Some("net.*".into()), None).unwrap();
        let matched = reg.rules_for_tag_add("foo", "net.ipv4");
        assert_eq!(matched.len(), 1);
        assert!(reg.rules_for_tag_add("bar", "net.ipv4").is_empty());
    }

    #[test]
    fn bad_rule_in_storage_is_skipped_not_fatal() {
        let store = MemStore(StdMutex::new(HashMap::new()));
        store.put("garbage", b"not a valid rule record").unwrap();
        let reg = Registry::load(Box::new(store)).unwrap();
        assert!(reg.list().is_empty());
    }
}
