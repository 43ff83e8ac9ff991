//! Protection rules for refs.
//!
//! A ref is protected when its name matches a protect pattern and no
//! force-delete pattern. Patterns are literal names, or names containing `*`
//! where each `*` stands for any run of characters. Matching always covers
//! the whole name: `release-*` matches `release-1.0` but not `prerelease-1.0`.

use regex::Regex;
use std::collections::HashSet;
use tracing::warn;

/// Protect and force-delete pattern lists for one family of refs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectionConfig {
    pub protected_patterns: Vec<String>,
    pub force_delete_patterns: Vec<String>,
}

/// A compiled list of patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    literals: HashSet<String>,
    wildcards: Vec<Regex>,
}

impl PatternSet {
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut set = PatternSet::default();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            set.literals.insert(pattern.to_string());

            if pattern.contains('*') {
                match wildcard_regex(pattern) {
                    Ok(regex) => set.wildcards.push(regex),
                    Err(e) => {
                        warn!(pattern, error = %e, "wildcard pattern too large, matching it literally")
                    }
                }
            }
        }

        set
    }

    pub fn matches(&self, name: &str) -> bool {
        self.literals.contains(name) || self.wildcards.iter().any(|regex| regex.is_match(name))
    }
}

/// Anchored regex for a `*` pattern; every other character is literal.
fn wildcard_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^(?s:{})$", body))
}

/// Compiled [`ProtectionConfig`], built once per run.
#[derive(Debug, Clone, Default)]
pub struct ProtectionFilter {
    protected: PatternSet,
    force_delete: PatternSet,
}

impl ProtectionFilter {
    pub fn new(config: &ProtectionConfig) -> Self {
        Self {
            protected: PatternSet::compile(&config.protected_patterns),
            force_delete: PatternSet::compile(&config.force_delete_patterns),
        }
    }

    pub fn is_protected(&self, name: &str) -> bool {
        self.protected.matches(name) && !self.force_delete.matches(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn is_protected(name: &str, config: &ProtectionConfig) -> bool {
        ProtectionFilter::new(config).is_protected(name)
    }

    fn config(protected: &[&str], force: &[&str]) -> ProtectionConfig {
        ProtectionConfig {
            protected_patterns: protected.iter().map(|s| s.to_string()).collect(),
            force_delete_patterns: force.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_literal_match() {
        let cfg = config(&["main", "develop"], &[]);
        assert!(is_protected("main", &cfg));
        assert!(is_protected("develop", &cfg));
        assert!(!is_protected("mainline", &cfg));
        assert!(!is_protected("feature/main", &cfg));
    }

    #[test]
    fn test_wildcard_matches_whole_name() {
        let cfg = config(&["release-*"], &[]);
        assert!(is_protected("release-1.0", &cfg));
        assert!(is_protected("release-", &cfg));
        assert!(!is_protected("prerelease-1.0", &cfg));
        assert!(!is_protected("release", &cfg));
    }

    #[test]
    fn test_wildcard_in_the_middle_and_multiple_stars() {
        let cfg = config(&["hotfix/*/keep", "*-lts-*"], &[]);
        assert!(is_protected("hotfix/2024/keep", &cfg));
        assert!(is_protected("hotfix//keep", &cfg));
        assert!(!is_protected("hotfix/2024/keep-not", &cfg));
        assert!(is_protected("v1-lts-final", &cfg));
        assert!(!is_protected("v1-lts", &cfg));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let cfg = config(&["v1.0", "feat+(x)*"], &[]);
        assert!(is_protected("v1.0", &cfg));
        assert!(!is_protected("v1x0", &cfg));
        assert!(is_protected("feat+(x)-more", &cfg));
        assert!(!is_protected("featt(x)-more", &cfg));
    }

    #[test]
    fn test_force_delete_overrides_protection() {
        let cfg = config(&["release-*"], &["release-0.*"]);
        assert!(is_protected("release-1.0", &cfg));
        assert!(!is_protected("release-0.9", &cfg));
    }

    #[test]
    fn test_force_delete_alone_does_not_protect() {
        let cfg = config(&[], &["main"]);
        assert!(!is_protected("main", &cfg));
        assert!(!is_protected("anything", &cfg));
    }

    #[test]
    fn test_empty_config_protects_nothing() {
        let cfg = ProtectionConfig::default();
        assert!(!is_protected("main", &cfg));
        assert!(!is_protected("", &cfg));
    }

    #[test]
    fn test_star_alone_matches_everything() {
        let cfg = config(&["*"], &[]);
        assert!(is_protected("", &cfg));
        assert!(is_protected("a/b/c", &cfg));
        assert!(is_protected("line\nbreak", &cfg));
    }

    #[test]
    fn test_filter_is_reusable() {
        let filter = ProtectionFilter::new(&config(&["main", "release-*"], &["release-old"]));
        let names = ["main", "release-1", "release-old", "feature"];
        let protected: Vec<bool> = names.iter().map(|n| filter.is_protected(n)).collect();
        assert_eq!(protected, vec![true, true, false, false]);
    }

    /// Reference matcher: `*` pattern as a sequence of literal segments.
    fn naive_match(pattern: &str, name: &str) -> bool {
        if !pattern.contains('*') {
            return pattern == name;
        }
        let parts: Vec<&str> = pattern.split('*').collect();
        let (first, last) = (parts[0], parts[parts.len() - 1]);
        if name.len() < first.len() + last.len()
            || !name.starts_with(first)
            || !name.ends_with(last)
        {
            return false;
        }
        let mut rest = &name[first.len()..name.len() - last.len()];
        for middle in &parts[1..parts.len() - 1] {
            match rest.find(middle) {
                Some(idx) => rest = &rest[idx + middle.len()..],
                None => return false,
            }
        }
        true
    }

    proptest! {
        #[test]
        fn prop_protected_iff_protect_match_and_no_force_match(
            protected in prop::collection::vec("[ab.*-]{0,5}", 0..4),
            force in prop::collection::vec("[ab.*-]{0,5}", 0..4),
            name in "[ab.-]{0,6}",
        ) {
            let cfg = ProtectionConfig {
                protected_patterns: protected.clone(),
                force_delete_patterns: force.clone(),
            };
            let expected = protected.iter().any(|p| naive_match(p, &name))
                && !force.iter().any(|p| naive_match(p, &name));
            prop_assert_eq!(is_protected(&name, &cfg), expected);
        }

        #[test]
        fn prop_is_deterministic(name in ".{0,12}", pattern in ".{0,6}") {
            let cfg = ProtectionConfig {
                protected_patterns: vec![pattern],
                force_delete_patterns: Vec::new(),
            };
            prop_assert_eq!(is_protected(&name, &cfg), is_protected(&name, &cfg));
        }
    }
}
