//! Navigation access decisions.
//!
//! A request is checked against an ordered list of allow rules; the first
//! rule that matches wins and anything left over is denied:
//!
//! | Order | Rule          | Allows when                                          |
//! |-------|---------------|------------------------------------------------------|
//! | 1     | `Reserved`    | path matches a pattern open to every signed-in user  |
//! | 2     | `Exact`       | path is in the allowed set                           |
//! | 3     | `Prefix`      | path lies under a non-root allowed path              |
//! | 4     | `DetailRoute` | path carries a detail fragment whose list is allowed |
//! | 5     | `Public`      | path is one of the public pages                      |
//!
//! Dynamic routes such as `/workorders/42/detail` never appear in the menu
//! tree; they inherit the permission of their static parent through the
//! prefix rule.

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::paths::{AllowedPathSet, normalize_path, segments};

/// How the prefix rule compares a request with an allowed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefixMode {
    /// Compare whole path segments: `/order` covers `/order/7` but not `/orders`.
    #[default]
    Segment,
    /// Plain string prefix: `/order` also covers `/orders`.
    String,
    /// No prefix matching; only detail rules reach dynamic routes.
    Off,
}

impl std::fmt::Display for PrefixMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefixMode::Segment => write!(f, "segment"),
            PrefixMode::String => write!(f, "string"),
            PrefixMode::Off => write!(f, "off"),
        }
    }
}

impl std::str::FromStr for PrefixMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "segment" => Ok(PrefixMode::Segment),
            "string" => Ok(PrefixMode::String),
            "off" => Ok(PrefixMode::Off),
            _ => anyhow::bail!(
                "Invalid prefix mode '{}'. Valid values: segment, string, off",
                s
            ),
        }
    }
}

/// Grants a detail route when the matching list route is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRule {
    /// Substring identifying the detail route, e.g. `/detail`.
    pub fragment: String,
    /// List route whose permission the detail route inherits.
    pub list_path: String,
}

impl DetailRule {
    pub fn new(fragment: impl Into<String>, list_path: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
            list_path: list_path.into(),
        }
    }

    /// The built-in work-order detail rule.
    pub fn work_order_detail() -> Self {
        Self::new("/detail", "/workorders")
    }

    fn matches(&self, request: &str, allowed: &AllowedPathSet) -> bool {
        if self.fragment.is_empty() || !request.contains(&self.fragment) {
            return false;
        }
        let list_path = normalize_path(&self.list_path);
        allowed.contains(&list_path) && under_segment(request, &list_path)
    }
}

/// Which rule allowed a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    Reserved,
    Exact,
    Prefix,
    DetailRoute,
    Public,
}

impl std::fmt::Display for MatchRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchRule::Reserved => write!(f, "reserved"),
            MatchRule::Exact => write!(f, "exact"),
            MatchRule::Prefix => write!(f, "prefix"),
            MatchRule::DetailRoute => write!(f, "detail_route"),
            MatchRule::Public => write!(f, "public"),
        }
    }
}

/// Outcome of an access check. Denial is a normal result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed(MatchRule),
    Denied,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed(_))
    }
}

/// Static inputs of the resolver that do not depend on the user.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    reserved: Vec<Pattern>,
    public_paths: HashSet<String>,
    detail_rules: Vec<DetailRule>,
    prefix_mode: PrefixMode,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            reserved: Vec::new(),
            public_paths: HashSet::new(),
            detail_rules: vec![DetailRule::work_order_detail()],
            prefix_mode: PrefixMode::default(),
        }
        .with_reserved_patterns(default_reserved_patterns())
    }
}

/// Patterns every signed-in user may open.
pub fn default_reserved_patterns() -> Vec<String> {
    vec![
        "/welcome".to_string(),
        "/profile".to_string(),
        "/profile/**".to_string(),
    ]
}

const RESERVED_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

impl AccessPolicy {
    /// A policy with no reserved patterns, no public paths and no detail rules.
    pub fn empty() -> Self {
        Self {
            reserved: Vec::new(),
            public_paths: HashSet::new(),
            detail_rules: Vec::new(),
            prefix_mode: PrefixMode::default(),
        }
    }

    /// Replace the reserved patterns. Invalid glob patterns are skipped.
    pub fn with_reserved_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.reserved = patterns
            .into_iter()
            .filter_map(|raw| {
                let raw = raw.as_ref();
                match Pattern::new(&normalize_path(raw)) {
                    Ok(pattern) => Some(pattern),
                    Err(err) => {
                        tracing::warn!(pattern = raw, error = %err, "Skipping invalid reserved pattern");
                        None
                    }
                }
            })
            .collect();
        self
    }

    /// Replace the public paths.
    pub fn with_public_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.public_paths = paths
            .into_iter()
            .map(|path| normalize_path(path.as_ref()))
            .collect();
        self
    }

    pub fn with_detail_rules(mut self, rules: Vec<DetailRule>) -> Self {
        self.detail_rules = rules;
        self
    }

    pub fn with_prefix_mode(mut self, mode: PrefixMode) -> Self {
        self.prefix_mode = mode;
        self
    }

    pub fn prefix_mode(&self) -> PrefixMode {
        self.prefix_mode
    }

    pub fn is_public(&self, normalized: &str) -> bool {
        self.public_paths.contains(normalized)
    }

    fn is_reserved(&self, normalized: &str) -> bool {
        self.reserved
            .iter()
            .any(|pattern| pattern.matches_with(normalized, RESERVED_MATCH))
    }
}

/// Decides whether a user may open a path.
#[derive(Debug, Clone, Default)]
pub struct PathAccessResolver {
    policy: AccessPolicy,
}

impl PathAccessResolver {
    pub fn new(policy: AccessPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Run the allow rules in order against `request_path`.
    pub fn decide(&self, request_path: &str, allowed: &AllowedPathSet) -> AccessDecision {
        let request = normalize_path(request_path);
        let decision = self.evaluate(&request, allowed);
        tracing::debug!(path = %request, ?decision, "Resolved access");
        decision
    }

    pub fn is_allowed(&self, request_path: &str, allowed: &AllowedPathSet) -> bool {
        self.decide(request_path, allowed).is_allowed()
    }

    fn evaluate(&self, request: &str, allowed: &AllowedPathSet) -> AccessDecision {
        if self.policy.is_reserved(request) {
            return AccessDecision::Allowed(MatchRule::Reserved);
        }
        if allowed.contains(request) {
            return AccessDecision::Allowed(MatchRule::Exact);
        }
        if self.prefix_allows(request, allowed) {
            return AccessDecision::Allowed(MatchRule::Prefix);
        }
        if self
            .policy
            .detail_rules
            .iter()
            .any(|rule| rule.matches(request, allowed))
        {
            return AccessDecision::Allowed(MatchRule::DetailRoute);
        }
        if self.policy.is_public(request) {
            return AccessDecision::Allowed(MatchRule::Public);
        }
        AccessDecision::Denied
    }

    fn prefix_allows(&self, request: &str, allowed: &AllowedPathSet) -> bool {
        // The root never acts as a prefix, or it would grant everything
        let mut candidates = allowed.iter().filter(|path| *path != "/");
        match self.policy.prefix_mode {
            PrefixMode::Segment => candidates.any(|path| under_segment(request, path)),
            PrefixMode::String => candidates.any(|path| request.starts_with(path)),
            PrefixMode::Off => false,
        }
    }
}

/// True when every segment of `parent` leads the segments of `request`.
fn under_segment(request: &str, parent: &str) -> bool {
    let mut request_segments = segments(request);
    let mut parent_segments = segments(parent).peekable();
    if parent_segments.peek().is_none() {
        return false;
    }
    parent_segments.all(|segment| request_segments.next() == Some(segment))
}

/// One-shot check with the default policy and the given public paths.
pub fn is_allowed<S: AsRef<str>>(
    request_path: &str,
    allowed: &AllowedPathSet,
    public_paths: &[S],
) -> bool {
    let policy = AccessPolicy::default().with_public_paths(public_paths);
    PathAccessResolver::new(policy).is_allowed(request_path, allowed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_PUBLIC: [&str; 0] = [];

    fn allowed(paths: &[&str]) -> AllowedPathSet {
        paths.iter().collect()
    }

    #[test]
    fn test_prefix_grants_dynamic_child_route() {
        let set = allowed(&["/workorders"]);
        assert!(is_allowed("/workorders/42/detail", &set, &NO_PUBLIC));
        assert!(!is_allowed("/orders", &set, &NO_PUBLIC));
    }

    #[test]
    fn test_default_deny_with_empty_sets() {
        let set = AllowedPathSet::new();
        for path in ["/orders", "/users", "/workorders/1", "/", "boms"] {
            assert!(!is_allowed(path, &set, &NO_PUBLIC), "{} should be denied", path);
        }
    }

    #[test]
    fn test_public_paths_allowed_regardless_of_menus() {
        let set = AllowedPathSet::new();
        let public = ["/login", "viewer"];
        assert!(is_allowed("/login", &set, &public));
        assert!(is_allowed("/viewer", &set, &public));
        assert!(!is_allowed("/orders", &set, &public));
    }

    #[test]
    fn test_relative_request_is_normalized() {
        let set = allowed(&["companies"]);
        assert!(is_allowed("companies", &set, &NO_PUBLIC));
    }

    #[test]
    fn test_reserved_paths_allowed_without_menus() {
        let resolver = PathAccessResolver::default();
        let set = AllowedPathSet::new();
        assert_eq!(
            resolver.decide("/welcome", &set),
            AccessDecision::Allowed(MatchRule::Reserved)
        );
        assert_eq!(
            resolver.decide("/profile/password", &set),
            AccessDecision::Allowed(MatchRule::Reserved)
        );
        assert_eq!(resolver.decide("/profiles", &set), AccessDecision::Denied);
    }

    #[test]
    fn test_exact_match_reported_before_prefix() {
        let resolver = PathAccessResolver::default();
        let set = allowed(&["/boms", "/boms/import"]);
        assert_eq!(
            resolver.decide("/boms/import", &set),
            AccessDecision::Allowed(MatchRule::Exact)
        );
        assert_eq!(
            resolver.decide("/boms/7", &set),
            AccessDecision::Allowed(MatchRule::Prefix)
        );
    }

    #[test]
    fn test_segment_mode_respects_boundaries() {
        let resolver = PathAccessResolver::default();
        let set = allowed(&["/order"]);
        assert!(resolver.is_allowed("/order/7", &set));
        assert!(!resolver.is_allowed("/orders", &set));
    }

    #[test]
    fn test_string_mode_matches_raw_prefix() {
        let policy = AccessPolicy::default().with_prefix_mode(PrefixMode::String);
        let resolver = PathAccessResolver::new(policy);
        let set = allowed(&["/order"]);
        assert!(resolver.is_allowed("/order/7", &set));
        assert!(resolver.is_allowed("/orders", &set));
    }

    #[test]
    fn test_root_entry_never_acts_as_prefix() {
        for mode in [PrefixMode::Segment, PrefixMode::String] {
            let resolver = PathAccessResolver::new(AccessPolicy::empty().with_prefix_mode(mode));
            let set = allowed(&["/"]);
            assert!(resolver.is_allowed("/", &set));
            assert!(!resolver.is_allowed("/users", &set), "mode {}", mode);
        }
    }

    #[test]
    fn test_detail_rule_applies_when_prefix_disabled() {
        let policy = AccessPolicy::empty()
            .with_prefix_mode(PrefixMode::Off)
            .with_detail_rules(vec![DetailRule::work_order_detail()]);
        let resolver = PathAccessResolver::new(policy);

        let set = allowed(&["/workorders"]);
        assert_eq!(
            resolver.decide("/workorders/42/detail", &set),
            AccessDecision::Allowed(MatchRule::DetailRoute)
        );
        // Without the fragment, a child route is not covered
        assert_eq!(resolver.decide("/workorders/42/edit", &set), AccessDecision::Denied);
        // The fragment alone does not open other lists
        assert_eq!(resolver.decide("/orders/42/detail", &set), AccessDecision::Denied);
    }

    #[test]
    fn test_detail_rule_requires_list_permission() {
        let policy = AccessPolicy::empty()
            .with_prefix_mode(PrefixMode::Off)
            .with_detail_rules(vec![DetailRule::work_order_detail()]);
        let resolver = PathAccessResolver::new(policy);
        let set = allowed(&["/workorder-feedback"]);
        assert!(!resolver.is_allowed("/workorders/42/detail", &set));
    }

    #[test]
    fn test_detail_rule_with_empty_fragment_never_matches() {
        let policy = AccessPolicy::empty()
            .with_prefix_mode(PrefixMode::Off)
            .with_detail_rules(vec![DetailRule::new("", "/workorders")]);
        let resolver = PathAccessResolver::new(policy);
        assert!(!resolver.is_allowed("/workorders/1", &allowed(&["/workorders"])));
    }

    #[test]
    fn test_invalid_reserved_pattern_is_skipped() {
        let policy = AccessPolicy::empty().with_reserved_patterns(["/[broken", "/help"]);
        let resolver = PathAccessResolver::new(policy);
        let set = AllowedPathSet::new();
        assert!(resolver.is_allowed("/help", &set));
        assert!(!resolver.is_allowed("/[broken", &set));
    }

    #[test]
    fn test_prefix_mode_round_trip() {
        for mode in [PrefixMode::Segment, PrefixMode::String, PrefixMode::Off] {
            let parsed: PrefixMode = mode.to_string().parse().unwrap();
            assert_eq!(parsed, mode);
        }
        assert!("fuzzy".parse::<PrefixMode>().is_err());
    }

    #[test]
    fn test_under_segment() {
        assert!(under_segment("/workorders/42", "/workorders"));
        assert!(under_segment("/workorders", "/workorders"));
        assert!(!under_segment("/workorder", "/workorders"));
        assert!(!under_segment("/anything", "/"));
    }
}
