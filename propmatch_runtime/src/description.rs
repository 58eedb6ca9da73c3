use crate::Matcher;
use std::fmt;

/// Text buffer a matcher describes its expectation or a mismatch into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Description {
    text: String,
}

impl Description {
    /// Creates an empty description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends literal text.
    pub fn append_text(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.text.push_str(text.as_ref());
        self
    }

    /// Appends the `Debug` rendering of a value.
    pub fn append_value<V: fmt::Debug + ?Sized>(&mut self, value: &V) -> &mut Self {
        self.text.push_str(&format!("{:?}", value));
        self
    }

    /// Appends what `matcher` expects.
    pub fn append_description_of<T, M>(&mut self, matcher: &M) -> &mut Self
    where
        T: ?Sized,
        M: Matcher<T> + ?Sized,
    {
        matcher.describe_to(self);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equal_to;

    #[test]
    fn test_append_text_and_value() {
        let mut description = Description::new();
        description.append_text("was ").append_value("Bob");
        assert_eq!(description.as_str(), "was \"Bob\"");
    }

    #[test]
    fn test_append_description_of_matcher() {
        let mut description = Description::new();
        description
            .append_text("expected ")
            .append_description_of::<u32, _>(&equal_to(3u32));
        assert_eq!(description.to_string(), "expected 3");
    }

    #[test]
    fn test_empty_description() {
        let description = Description::new();
        assert!(description.is_empty());
        assert_eq!(description.into_string(), "");
    }
}
