//! Resolution of the acting identity used to attribute row-store writes.

/// Resolves the default actor name: `USER`/`USERNAME` env, falling back to
/// `"unknown"`. `HIVE_ACTOR` takes precedence over this but is applied as a
/// later `figment` layer, not here — this is only the compiled-in default.
pub fn default_actor() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_unknown_when_nothing_is_set() {
        // We can't unset env vars process-wide safely in a parallel test
        // binary, so this just checks the function never panics and always
        // returns a non-empty string.
        assert!(!default_actor().is_empty());
    }
}
