use crate::Description;

/// A condition over values of type `T` that can explain itself.
///
/// Generated matchers implement this trait by forwarding every method to
/// their inner [`PropertyMatcher`](crate::PropertyMatcher).
pub trait Matcher<T: ?Sized> {
    /// Returns `true` if `actual` satisfies the condition.
    fn matches(&self, actual: &T) -> bool;

    /// Describes the expected value.
    fn describe_to(&self, description: &mut Description);

    /// Describes why `actual` did not match.
    ///
    /// Only meaningful after [`matches`](Matcher::matches) returned `false`.
    fn describe_mismatch(&self, actual: &T, description: &mut Description) {
        let _ = actual;
        description.append_text("did not match");
    }
}

impl<T, M> Matcher<T> for Box<M>
where
    T: ?Sized,
    M: Matcher<T> + ?Sized,
{
    fn matches(&self, actual: &T) -> bool {
        (**self).matches(actual)
    }

    fn describe_to(&self, description: &mut Description) {
        (**self).describe_to(description)
    }

    fn describe_mismatch(&self, actual: &T, description: &mut Description) {
        (**self).describe_mismatch(actual, description)
    }
}

/// Panics with the expectation and the mismatch unless `matcher` matches `actual`.
#[track_caller]
pub fn assert_that<T, M>(actual: &T, matcher: M)
where
    T: ?Sized,
    M: Matcher<T>,
{
    if matcher.matches(actual) {
        return;
    }

    let mut expected = Description::new();
    matcher.describe_to(&mut expected);
    let mut mismatch = Description::new();
    matcher.describe_mismatch(actual, &mut mismatch);

    panic!("\nExpected: {}\n     but: {}", expected, mismatch);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{anything, equal_to};

    #[test]
    fn test_boxed_matcher_forwards() {
        let boxed: Box<dyn Matcher<i32>> = Box::new(equal_to(4i32));
        assert!(boxed.matches(&4));
        assert!(!boxed.matches(&5));

        let mut description = Description::new();
        boxed.describe_mismatch(&5, &mut description);
        assert_eq!(description.as_str(), "was 5");
    }

    #[test]
    fn test_assert_that_passes() {
        assert_that(&"text".to_string(), anything());
        assert_that("text", equal_to("text".to_string()));
    }

    #[test]
    #[should_panic(expected = "Expected: 1\n     but: was 2")]
    fn test_assert_that_reports_mismatch() {
        assert_that(&2i32, equal_to(1i32));
    }
}
