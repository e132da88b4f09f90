//! Event hooks invoked by the graph layer on node/property/tag mutations,
//! recursion-bounded so a rule that triggers itself cannot loop forever.

use std::cell::Cell;
use std::collections::HashMap;

use crate::error::{Result, TriggerError};
use crate::registry::Registry;
use crate::traits::{AuthResolver, StormEngine};

/// Maximum nesting depth a dispatch hook may enter before being rejected.
pub const MAX_RECURSION_DEPTH: u32 = 64;

thread_local! {
    static DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// RAII recursion guard: increments on construction, decrements on drop.
/// Entering past [`MAX_RECURSION_DEPTH`] fails before incrementing, so the
/// depth is left untouched for the rejected layer.
struct RecursionGuard;

impl RecursionGuard {
    fn enter() -> Result<Self> {
        DEPTH.with(|d| {
            let depth = d.get();
            if depth > MAX_RECURSION_DEPTH {
                return Err(TriggerError::RecursionLimitHit);
            }
            d.set(depth + 1);
            Ok(Self)
        })
    }
}

impl Drop for RecursionGuard {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get() - 1));
    }
}

/// Dispatches graph-change events to matching rules.
pub struct Dispatcher<'a> {
    registry: &'a Registry,
    storm: &'a dyn StormEngine,
    auth: &'a dyn AuthResolver,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a Registry, storm: &'a dyn StormEngine, auth: &'a dyn AuthResolver) -> Self {
        Self { registry, storm, auth }
    }

    pub fn run_node_add(&self, form: &str) -> Result<()> {
        let _guard = RecursionGuard::enter()?;
        for rule in self.registry.rules_for_node_add(form) {
            rule.execute(self.storm, self.auth, None)?;
        }
        Ok(())
    }

    pub fn run_node_del(&self, form: &str) -> Result<()> {
        let _guard = RecursionGuard::enter()?;
        for rule in self.registry.rules_for_node_del(form) {
            rule.execute(self.storm, self.auth, None)?;
        }
        Ok(())
    }

    pub fn run_prop_set(&self, prop: &str) -> Result<()> {
        let _guard = RecursionGuard::enter()?;
        for rule in self.registry.rules_for_prop_set(prop) {
            rule.execute(self.storm, self.auth, None)?;
        }
        Ok(())
    }

    pub fn run_tag_add(&self, form: &str, tag: &str) -> Result<()> {
        let _guard = RecursionGuard::enter()?;
        let vars: HashMap<String, String> = HashMap::from([("tag".to_string(), tag.to_string())]);
        for rule in self.registry.rules_for_tag_add(form, tag) {
            rule.execute(self.storm, self.auth, Some(&vars))?;
        }
        Ok(())
    }

    pub fn run_tag_del(&self, form: &str, tag: &str) -> Result<()> {
        let _guard = RecursionGuard::enter()?;
        let vars: HashMap<String, String> = HashMap::from([("tag".to_string(), tag.to_string())]);
        for rule in self.registry.rules_for_tag_del(form, tag) {
            rule.execute(self.storm, self.auth, Some(&vars))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Condition;
    use crate::traits::{AuthedUser, RuleStore, StormError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MemStore(Mutex<HashMap<String, Vec<u8>>>);
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
        fn check(&self, _q: &str) -> std::result::Result<(), StormError> {
            Ok(())
        }
        fn execute(&self, _q: &str, _vars: Option<&HashMap<String, String>>, _user: &AuthedUser) -> std::result::Result<(), StormError> {
            Ok(())
        }
    }

    struct AllowAnyone;
    impl AuthResolver for AllowAnyone {
        fn resolve(&self, user: &str) -> Option<AuthedUser> {
            Some(AuthedUser { name: user.to_string() })
        }
    }

    fn registry() -> Registry {
        Registry::load(Box::new(MemStore(Mutex::new(HashMap::new())))).unwrap()
    }

    #[test]
    fn node_add_fires_registered_rule() {
        let reg = registry();
        reg.add(&AcceptAll, "u", Condition::NodeAdd, "q", Some("foo".into()), None, None).unwrap();
        let dispatcher = Dispatcher::new(&reg, &AcceptAll, &AllowAnyone);
        dispatcher.run_node_add("foo").unwrap();
        dispatcher.run_node_add("bar").unwrap();
    }

    #[test]
    fn recursion_guard_rejects_past_the_bound() {
        fn recurse(depth: u32, calls: &AtomicUsize) -> Result<()> {
            let _guard = RecursionGuard::enter()?;
            calls.fetch_add(1, Ordering::SeqCst);
            if depth < 100 {
                recurse(depth + 1, calls)?;
            }
            Ok(())
        }
        let calls = AtomicUsize::new(0);
        let result = recurse(0, &calls);
        assert!(matches!(result, Err(TriggerError::RecursionLimitHit)));
        assert_eq!(calls.load(Ordering::SeqCst), MAX_RECURSION_DEPTH as usize + 1);
    }

    #[test]
    fn depth_resets_after_guard_drops() {
        {
            let _g = RecursionGuard::enter().unwrap();
        }
        DEPTH.with(|d| assert_eq!(d.get(), 0));
    }
}
