use crate::{Description, Matcher};

/// Composite matcher holding one matcher per property of a bean type `T`.
///
/// Properties are registered under their name together with a projection
/// from the bean to the property value. Registering a name a second time
/// replaces the earlier matcher and keeps its position.
pub struct PropertyMatcher<T: ?Sized + 'static> {
    type_name: &'static str,
    conditions: Vec<Box<dyn PropertyCondition<T>>>,
}

impl<T: ?Sized + 'static> PropertyMatcher<T> {
    /// Creates an empty matcher for `T`, named after its runtime type.
    pub fn new() -> Self {
        Self {
            type_name: short_type_name(std::any::type_name::<T>()),
            conditions: Vec::new(),
        }
    }

    /// The simple name of `T` used in descriptions.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Registers `matcher` for a property read through a borrowing accessor.
    pub fn with_ref<V, M>(
        &mut self,
        name: &'static str,
        project: fn(&T) -> &V,
        matcher: M,
    ) -> &mut Self
    where
        V: ?Sized + 'static,
        M: Matcher<V> + 'static,
    {
        self.insert(Box::new(Borrowed {
            name,
            project,
            matcher,
        }))
    }

    /// Registers `matcher` for a property read through a by-value accessor.
    pub fn with_value<V, M>(&mut self, name: &'static str, project: fn(&T) -> V, matcher: M) -> &mut Self
    where
        V: 'static,
        M: Matcher<V> + 'static,
    {
        self.insert(Box::new(Owned {
            name,
            project,
            matcher,
        }))
    }

    /// Names of the registered properties, in registration order.
    pub fn property_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.conditions.iter().map(|condition| condition.name())
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    fn insert(&mut self, condition: Box<dyn PropertyCondition<T>>) -> &mut Self {
        match self
            .conditions
            .iter_mut()
            .find(|existing| existing.name() == condition.name())
        {
            Some(existing) => *existing = condition,
            None => self.conditions.push(condition),
        }
        self
    }
}

impl<T: ?Sized + 'static> Default for PropertyMatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + 'static> std::fmt::Debug for PropertyMatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyMatcher")
            .field("type_name", &self.type_name)
            .field("properties", &self.property_names().collect::<Vec<_>>())
            .finish()
    }
}

impl<T: ?Sized + 'static> Matcher<T> for PropertyMatcher<T> {
    fn matches(&self, actual: &T) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.matches(actual))
    }

    fn describe_to(&self, description: &mut Description) {
        if self.conditions.is_empty() {
            description.append_text("any ").append_text(self.type_name);
            return;
        }

        description.append_text(self.type_name).append_text(" { ");
        for (index, condition) in self.conditions.iter().enumerate() {
            if index > 0 {
                description.append_text(", ");
            }
            description.append_text(condition.name()).append_text(": ");
            condition.describe_to(description);
        }
        description.append_text(" }");
    }

    fn describe_mismatch(&self, actual: &T, description: &mut Description) {
        let mut first = true;
        for condition in self.conditions.iter().filter(|c| !c.matches(actual)) {
            if !first {
                description.append_text(", ");
            }
            first = false;
            description.append_text(condition.name()).append_text(": ");
            condition.describe_mismatch(actual, description);
        }
    }
}

trait PropertyCondition<T: ?Sized> {
    fn name(&self) -> &'static str;
    fn matches(&self, item: &T) -> bool;
    fn describe_to(&self, description: &mut Description);
    fn describe_mismatch(&self, item: &T, description: &mut Description);
}

struct Borrowed<T: ?Sized, V: ?Sized, M> {
    name: &'static str,
    project: fn(&T) -> &V,
    matcher: M,
}

impl<T, V, M> PropertyCondition<T> for Borrowed<T, V, M>
where
    T: ?Sized,
    V: ?Sized,
    M: Matcher<V>,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn matches(&self, item: &T) -> bool {
        self.matcher.matches((self.project)(item))
    }

    fn describe_to(&self, description: &mut Description) {
        self.matcher.describe_to(description)
    }

    fn describe_mismatch(&self, item: &T, description: &mut Description) {
        self.matcher
            .describe_mismatch((self.project)(item), description)
    }
}

struct Owned<T: ?Sized, V, M> {
    name: &'static str,
    project: fn(&T) -> V,
    matcher: M,
}

impl<T, V, M> PropertyCondition<T> for Owned<T, V, M>
where
    T: ?Sized,
    M: Matcher<V>,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn matches(&self, item: &T) -> bool {
        self.matcher.matches(&(self.project)(item))
    }

    fn describe_to(&self, description: &mut Description) {
        self.matcher.describe_to(description)
    }

    fn describe_mismatch(&self, item: &T, description: &mut Description) {
        self.matcher
            .describe_mismatch(&(self.project)(item), description)
    }
}

/// `my_crate::model::Person` -> `Person`, keeping generic arguments intact.
fn short_type_name(full: &'static str) -> &'static str {
    let head_end = full.find('<').unwrap_or(full.len());
    match full[..head_end].rfind("::") {
        Some(separator) => &full[separator + 2..],
        None => full,
    }
}
