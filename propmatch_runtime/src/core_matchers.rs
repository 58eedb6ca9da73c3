use crate::{Description, Matcher};
use std::borrow::Borrow;
use std::fmt::Debug;

/// Matches values equal to an expected value.
///
/// The expected value may be an owned form of the matched type, so an
/// `EqualTo<String>` matches `str` and an `EqualTo<Vec<T>>` matches `[T]`.
#[derive(Debug, Clone, PartialEq)]
pub struct EqualTo<V> {
    expected: V,
}

/// Creates a matcher that checks equality with `expected`.
pub fn equal_to<V>(expected: V) -> EqualTo<V> {
    EqualTo { expected }
}

impl<V, U> Matcher<U> for EqualTo<V>
where
    V: Borrow<U> + Debug,
    U: PartialEq + Debug + ?Sized,
{
    fn matches(&self, actual: &U) -> bool {
        self.expected.borrow() == actual
    }

    fn describe_to(&self, description: &mut Description) {
        description.append_value(&self.expected);
    }

    fn describe_mismatch(&self, actual: &U, description: &mut Description) {
        description.append_text("was ").append_value(actual);
    }
}

/// Matches every value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anything;

pub fn anything() -> Anything {
    Anything
}

impl<T: ?Sized> Matcher<T> for Anything {
    fn matches(&self, _actual: &T) -> bool {
        true
    }

    fn describe_to(&self, description: &mut Description) {
        description.append_text("anything");
    }
}

/// Inverts another matcher.
#[derive(Debug, Clone)]
pub struct Not<M> {
    inner: M,
}

pub fn not<M>(inner: M) -> Not<M> {
    Not { inner }
}

impl<T, M> Matcher<T> for Not<M>
where
    T: ?Sized,
    M: Matcher<T>,
{
    fn matches(&self, actual: &T) -> bool {
        !self.inner.matches(actual)
    }

    fn describe_to(&self, description: &mut Description) {
        description.append_text("not ");
        self.inner.describe_to(description);
    }

    fn describe_mismatch(&self, _actual: &T, description: &mut Description) {
        description.append_text("was ");
        self.inner.describe_to(description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_to_owned_against_borrowed() {
        let matcher = equal_to("Alice".to_string());
        assert!(Matcher::<str>::matches(&matcher, "Alice"));
        assert!(!Matcher::<str>::matches(&matcher, "Bob"));
        assert!(Matcher::<String>::matches(&matcher, &"Alice".to_string()));
    }

    #[test]
    fn test_equal_to_slice() {
        let matcher = equal_to(vec![1u8, 2, 3]);
        assert!(Matcher::<[u8]>::matches(&matcher, &[1, 2, 3][..]));
    }

    #[test]
    fn test_equal_to_describes_mismatch() {
        let matcher = equal_to(30u32);
        let mut description = Description::new();
        matcher.describe_mismatch(&31u32, &mut description);
        assert_eq!(description.as_str(), "was 31");
    }

    #[test]
    fn test_anything_and_not() {
        assert!(Matcher::<i64>::matches(&anything(), &-1));
        let never = not(anything());
        assert!(!Matcher::<i64>::matches(&never, &-1));

        let mut description = Description::new();
        Matcher::<i64>::describe_to(&never, &mut description);
        assert_eq!(description.as_str(), "not anything");
    }
}
