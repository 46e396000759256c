use glob::{MatchOptions, Pattern, PatternError};
use tracing::info;

/// `/` in a request path only matches a literal `/` in the pattern, so
/// `/apps/*` cannot leak into `/apps/a/b`; `**` spans segments.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

struct ProtectedPattern {
    pattern: Pattern,
    /// For `<root>/**` patterns the bare root is covered as well.
    root: Option<String>,
}

/// Compiled protected-path matcher. Paths not matching any pattern bypass
/// the guard entirely.
pub struct ProtectedPaths {
    patterns: Vec<ProtectedPattern>,
}

impl ProtectedPaths {
    pub fn new(sources: &[String]) -> Result<Self, PatternError> {
        let mut patterns = Vec::with_capacity(sources.len());
        for source in sources {
            let root = source
                .strip_suffix("/**")
                .filter(|r| !r.is_empty())
                .map(|r| r.to_string());
            patterns.push(ProtectedPattern {
                pattern: Pattern::new(source)?,
                root,
            });
        }
        info!("Compiled {} protected path pattern(s)", patterns.len());
        Ok(ProtectedPaths { patterns })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| {
            p.root.as_deref() == Some(path) || p.pattern.matches_with(path, MATCH_OPTIONS)
        })
    }
}
