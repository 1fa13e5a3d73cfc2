//! Public suffix lookup.
//!
//! The domain decomposer never reads the public suffix list directly. It asks
//! a [`SuffixOracle`] for the longest public suffix of a host and whether that
//! suffix is ICANN-delegated. The default oracle is backed by the list
//! compiled into the `psl` crate; tests inject a [`StaticSuffixList`].

use psl::{List, Psl, Type};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::trace;

/// The longest public suffix matched for a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixMatch {
    /// Suffix text, one or more dot-separated labels
    pub suffix: String,

    /// Whether the suffix is delegated through ICANN
    pub icann: bool,
}

impl SuffixMatch {
    pub fn new<S: Into<String>>(suffix: S, icann: bool) -> Self {
        Self {
            suffix: suffix.into(),
            icann,
        }
    }
}

/// Longest-matching-suffix lookup over a fixed rule set.
///
/// Implementations must be pure: the same host always yields the same match
/// for the lifetime of the rule set.
pub trait SuffixOracle: Send + Sync {
    /// Find the longest public suffix of `host`.
    ///
    /// Returns `None` only when no rule (not even the implicit `*` rule)
    /// applies, which happens for empty input.
    fn longest_suffix(&self, host: &str) -> Option<SuffixMatch>;
}

impl<O: SuffixOracle + ?Sized> SuffixOracle for &O {
    fn longest_suffix(&self, host: &str) -> Option<SuffixMatch> {
        (**self).longest_suffix(host)
    }
}

impl<O: SuffixOracle + ?Sized> SuffixOracle for Arc<O> {
    fn longest_suffix(&self, host: &str) -> Option<SuffixMatch> {
        (**self).longest_suffix(host)
    }
}

/// Oracle backed by the Mozilla public suffix list bundled with `psl`.
///
/// Matching is ASCII case-insensitive and the returned suffix is the
/// lowercase rule text. Hosts under an unlisted TLD fall through to the
/// list's implicit `*` rule: the last label, not ICANN.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicSuffixList;

impl SuffixOracle for PublicSuffixList {
    fn longest_suffix(&self, host: &str) -> Option<SuffixMatch> {
        let lowered = host.to_ascii_lowercase();
        let suffix = List.suffix(lowered.as_bytes())?;
        let text = std::str::from_utf8(suffix.as_bytes()).ok()?;
        let icann = matches!(suffix.typ(), Some(Type::Icann));

        trace!(host, suffix = text, icann, known = suffix.is_known(), "public suffix lookup");

        Some(SuffixMatch::new(text, icann))
    }
}

/// A small in-memory rule set.
///
/// Rules are exact suffixes (no wildcards or exceptions). Like the real list,
/// a host matching no rule resolves to its last label as a non-ICANN suffix.
#[derive(Debug, Clone, Default)]
pub struct StaticSuffixList {
    rules: HashMap<String, bool>,
}

impl StaticSuffixList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an ICANN-delegated suffix such as "com" or "co.uk".
    pub fn with_icann(mut self, suffix: &str) -> Self {
        self.rules.insert(suffix.to_ascii_lowercase(), true);
        self
    }

    /// Add a privately registered suffix such as "github.io".
    pub fn with_private(mut self, suffix: &str) -> Self {
        self.rules.insert(suffix.to_ascii_lowercase(), false);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl SuffixOracle for StaticSuffixList {
    fn longest_suffix(&self, host: &str) -> Option<SuffixMatch> {
        if host.is_empty() {
            return None;
        }

        let lowered = host.to_ascii_lowercase();

        // Candidates from longest to shortest: the host itself, then the
        // remainder after each dot.
        let candidates = std::iter::once(lowered.as_str()).chain(
            lowered
                .match_indices('.')
                .map(|(i, _)| &lowered[i + 1..]),
        );

        for candidate in candidates {
            if let Some(&icann) = self.rules.get(candidate) {
                return Some(SuffixMatch::new(candidate, icann));
            }
        }

        lowered
            .rsplit('.')
            .next()
            .map(|last| SuffixMatch::new(last, false))
    }
}

/// A rule set that can be swapped while other threads keep parsing.
///
/// Each lookup takes a snapshot of the whole current rule set, so a parse
/// sees either the list before a [`replace`](Self::replace) or the list
/// after it, never a mix.
pub struct SharedSuffixList {
    current: RwLock<Arc<dyn SuffixOracle>>,
}

impl SharedSuffixList {
    pub fn new<O: SuffixOracle + 'static>(oracle: O) -> Self {
        Self {
            current: RwLock::new(Arc::new(oracle)),
        }
    }

    /// Atomically install a new rule set.
    pub fn replace<O: SuffixOracle + 'static>(&self, oracle: O) {
        let next: Arc<dyn SuffixOracle> = Arc::new(oracle);
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = next;
    }

    /// The rule set in effect right now.
    pub fn snapshot(&self) -> Arc<dyn SuffixOracle> {
        let guard = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&*guard)
    }
}

impl Default for SharedSuffixList {
    fn default() -> Self {
        Self::new(PublicSuffixList)
    }
}

impl SuffixOracle for SharedSuffixList {
    fn longest_suffix(&self, host: &str) -> Option<SuffixMatch> {
        self.snapshot().longest_suffix(host)
    }
}

impl std::fmt::Debug for SharedSuffixList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSuffixList").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_list() -> StaticSuffixList {
        StaticSuffixList::new()
            .with_icann("com")
            .with_icann("uk")
            .with_icann("co.uk")
            .with_private("github.io")
    }

    #[test]
    fn test_public_list_icann_suffix() {
        let m = PublicSuffixList.longest_suffix("foo.bar.example.com").unwrap();
        assert_eq!(m, SuffixMatch::new("com", true));
    }

    #[test]
    fn test_public_list_multi_label_icann_suffix() {
        let m = PublicSuffixList.longest_suffix("www.example.co.uk").unwrap();
        assert_eq!(m, SuffixMatch::new("co.uk", true));
    }

    #[test]
    fn test_public_list_private_suffix() {
        let m = PublicSuffixList.longest_suffix("octocat.github.io").unwrap();
        assert_eq!(m, SuffixMatch::new("github.io", false));
    }

    #[test]
    fn test_public_list_unknown_tld_uses_last_label() {
        let m = PublicSuffixList
            .longest_suffix("printer.office.notarealtld")
            .unwrap();
        assert_eq!(m, SuffixMatch::new("notarealtld", false));
    }

    #[test]
    fn test_public_list_is_case_insensitive() {
        let m = PublicSuffixList.longest_suffix("WWW.EXAMPLE.COM").unwrap();
        assert_eq!(m, SuffixMatch::new("com", true));
    }

    #[test]
    fn test_static_list_prefers_longest_rule() {
        let list = sample_list();
        assert_eq!(
            list.longest_suffix("a.example.co.uk"),
            Some(SuffixMatch::new("co.uk", true))
        );
        assert_eq!(
            list.longest_suffix("example.uk"),
            Some(SuffixMatch::new("uk", true))
        );
    }

    #[test]
    fn test_static_list_matches_on_label_boundary() {
        // "xgithub.io" must not match the "github.io" rule
        let list = sample_list();
        assert_eq!(
            list.longest_suffix("xgithub.io"),
            Some(SuffixMatch::new("io", false))
        );
    }

    #[test]
    fn test_static_list_fallback_and_empty() {
        let list = sample_list();
        assert_eq!(
            list.longest_suffix("nas.lan"),
            Some(SuffixMatch::new("lan", false))
        );
        assert_eq!(list.longest_suffix(""), None);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_shared_list_replace_swaps_whole_rule_set() {
        let shared = SharedSuffixList::new(StaticSuffixList::new().with_icann("com"));
        let before = shared.snapshot();

        shared.replace(StaticSuffixList::new().with_private("example.com"));

        // The earlier snapshot keeps answering from the old rule set
        assert_eq!(
            before.longest_suffix("a.example.com"),
            Some(SuffixMatch::new("com", true))
        );
        assert_eq!(
            shared.longest_suffix("a.example.com"),
            Some(SuffixMatch::new("example.com", false))
        );
    }

    #[test]
    fn test_shared_list_is_usable_across_threads() {
        let shared = Arc::new(SharedSuffixList::default());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || shared.longest_suffix("example.com"))
            })
            .collect();

        for handle in handles {
            assert_eq!(
                handle.join().unwrap(),
                Some(SuffixMatch::new("com", true))
            );
        }
    }
}
