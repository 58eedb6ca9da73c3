/// Matches request paths by prefix. A plain value, not a `Matcher`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatternMatcher {
    prefix: String,
}

impl PatternMatcher {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        PatternMatcher {
            prefix: prefix.into(),
        }
    }

    pub fn accepts(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}
