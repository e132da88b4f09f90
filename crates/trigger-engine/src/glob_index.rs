//! Glob-pattern tag index: a small linear scan over compiled patterns,
//! distinct from the registry's exact-match `HashMap`.

use glob::Pattern;

use crate::rule::RuleId;

/// Patterns registered for one form (or form-agnostic, keyed separately by
/// the caller), each paired with the rule that should fire on a match.
#[derive(Default)]
pub struct GlobIndex {
    entries: Vec<(Pattern, RuleId)>,
}

impl GlobIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles and registers `pattern` for `rule`. Invalid glob syntax is
    /// rejected at rule-add time via [`crate::rule::Rule`] validation
    /// elsewhere; here it simply falls back to a literal pattern.
    pub fn add(&mut self, pattern: &str, rule: RuleId) {
        let compiled = Pattern::new(pattern).unwrap_or_else(|_| Pattern::new(&glob::Pattern::escape(pattern)).expect("escaped pattern always compiles"));
        self.entries.push((compiled, rule));
    }

    pub fn remove(&mut self, pattern: &str, rule: &RuleId) {
        self.entries.retain(|(p, r)| !(p.as_str() == pattern && r == rule));
    }

    /// Returns every rule whose pattern matches `tag`, in registration order.
    pub fn matches(&self, tag: &str) -> Vec<RuleId> {
        self.entries.iter().filter(|(p, _)| p.matches(tag)).map(|(_, r)| r.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_matches_prefix_pattern() {
        let mut idx = GlobIndex::new();
        idx.add("net.*", "r1".to_string());
        assert_eq!(idx.matches("net.ipv4"), vec!["r1".to_string()]);
        assert!(idx.matches("dns.a").is_empty());
    }

    #[test]
    fn remove_drops_only_the_matching_entry() {
        let mut idx = GlobIndex::new();
        idx.add("net.*", "r1".to_string());
        idx.add("net.*", "r2".to_string());
        idx.remove("net.*", &"r1".to_string());
        assert_eq!(idx.matches("net.ipv4"), vec!["r2".to_string()]);
    }
}
