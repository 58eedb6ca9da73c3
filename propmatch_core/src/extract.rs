use crate::model::{Candidate, MethodSig, ModulePath, Property, PropertyAccess, Receiver};
use crate::type_shape::{is_bool, is_unit, parse_type, projection, type_to_string};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Produces the ordered properties of a candidate.
///
/// `scope` is the module the matcher is mounted in; members not visible
/// from there are skipped. Implementations perform no I/O and never fail;
/// zero properties is a valid result.
pub trait PropertyExtractor: Send + Sync {
    fn extract(&self, candidate: &Candidate, scope: &ModulePath) -> Vec<Property>;
}

/// Reads properties from `get_x`/`is_x` accessor methods.
///
/// `get_x(&self)` may return anything projectable, `is_x(&self)` must
/// return `bool`. A `set_x(&mut self, v)` is paired when `v` has the
/// property's value type; any other setter is ignored and the getter wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessorExtractor;

impl PropertyExtractor for AccessorExtractor {
    fn extract(&self, candidate: &Candidate, scope: &ModulePath) -> Vec<Property> {
        let setters: HashMap<&str, &MethodSig> = candidate
            .methods
            .iter()
            .filter(|method| is_setter_shaped(method, scope))
            .filter_map(|method| Some((unraw(&method.name).strip_prefix("set_")?, method)))
            .collect();

        let mut seen = HashSet::new();
        let mut properties = Vec::new();

        for method in &candidate.methods {
            let Some(property) = getter_property(method, scope) else {
                continue;
            };
            if !seen.insert(property.name.clone()) {
                trace!(
                    "Ignoring {} on {}: property {} already has an accessor",
                    method.name, candidate.path, property.name
                );
                continue;
            }
            properties.push(pair_setter(property, method, &setters, candidate));
        }

        properties
    }
}

fn getter_property(method: &MethodSig, scope: &ModulePath) -> Option<Property> {
    if !method.visibility.is_visible_from(scope)
        || method.receiver != Receiver::Ref
        || !method.params.is_empty()
        || method.is_generic
        || method.is_async
        || method.is_unsafe
    {
        return None;
    }

    let return_type = parse_type(method.return_type.as_deref()?)?;
    if is_unit(&return_type) {
        return None;
    }

    let name = unraw(&method.name);
    let property_name = if let Some(rest) = name.strip_prefix("get_") {
        rest
    } else if let Some(rest) = name.strip_prefix("is_")
        && is_bool(&return_type)
    {
        rest
    } else {
        return None;
    };
    if property_name.is_empty() {
        return None;
    }

    let Some((value_type, access)) = projection(&return_type) else {
        trace!("Skipping accessor {}: return type cannot be projected", method.name);
        return None;
    };

    Some(Property {
        name: property_name.to_string(),
        value_type: type_to_string(&value_type),
        access,
        accessor: method.name.clone(),
        setter: None,
    })
}

fn is_setter_shaped(method: &MethodSig, scope: &ModulePath) -> bool {
    method.visibility.is_visible_from(scope)
        && method.receiver == Receiver::RefMut
        && method.params.len() == 1
        && !method.is_generic
        && !method.is_async
}

fn pair_setter(
    mut property: Property,
    getter: &MethodSig,
    setters: &HashMap<&str, &MethodSig>,
    candidate: &Candidate,
) -> Property {
    let Some(setter) = setters.get(property.name.as_str()) else {
        return property;
    };
    let param = &setter.params[0];
    let compatible = *param == property.value_type || getter.return_type.as_ref() == Some(param);
    if compatible {
        property.setter = Some(setter.name.clone());
    } else {
        trace!(
            "Ignoring setter {} on {}: takes {} but {} returns {}",
            setter.name,
            candidate.path,
            param,
            getter.name,
            getter.return_type.as_deref().unwrap_or("()")
        );
    }
    property
}

/// Reads properties straight from the named fields visible to the matcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldExtractor;

impl PropertyExtractor for FieldExtractor {
    fn extract(&self, candidate: &Candidate, scope: &ModulePath) -> Vec<Property> {
        candidate
            .fields
            .iter()
            .filter(|field| field.visibility.is_visible_from(scope))
            .filter(|field| parse_type(&field.ty).is_some())
            .map(|field| Property {
                name: unraw(&field.name).to_string(),
                value_type: field.ty.clone(),
                access: PropertyAccess::Field,
                accessor: field.name.clone(),
                setter: None,
            })
            .collect()
    }
}

fn unraw(name: &str) -> &str {
    name.strip_prefix("r#").unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::SourceIndex;
    use crate::model::TypePath;
    use pretty_assertions::assert_eq;

    fn candidate(source: &str) -> Candidate {
        let mut index = SourceIndex::new("demo");
        index.parse_module("model", source).expect("parses");
        index
            .type_at(&TypePath::from("model::Bean".to_string()))
            .expect("Bean indexed")
            .clone()
    }

    fn matchers() -> ModulePath {
        ModulePath::parse("model::bean_matcher")
    }

    fn summary(properties: &[Property]) -> Vec<(String, String, PropertyAccess)> {
        properties
            .iter()
            .map(|p| (p.name.clone(), p.value_type.clone(), p.access))
            .collect()
    }

    #[test]
    fn test_accessors_in_declaration_order() {
        let bean = candidate(
            r#"
            pub struct Bean { name: String, age: u32, active: bool }
            impl Bean {
                pub fn get_name(&self) -> &String { &self.name }
                pub fn get_age(&self) -> u32 { self.age }
                pub fn is_active(&self) -> bool { self.active }
            }
            "#,
        );
        let properties = AccessorExtractor.extract(&bean, &matchers());
        assert_eq!(
            summary(&properties),
            vec![
                ("name".to_string(), "String".to_string(), PropertyAccess::Borrowed),
                ("age".to_string(), "u32".to_string(), PropertyAccess::Owned),
                ("active".to_string(), "bool".to_string(), PropertyAccess::Owned),
            ]
        );
        assert_eq!(properties[0].accessor, "get_name");
    }

    #[test]
    fn test_non_accessors_are_ignored() {
        let bean = candidate(
            r#"
            pub struct Bean;
            impl Bean {
                fn get_private(&self) -> u32 { 0 }
                pub fn get_with_arg(&self, x: u32) -> u32 { x }
                pub fn get_owned(self) -> u32 { 0 }
                pub fn get_mut(&mut self) -> u32 { 0 }
                pub fn get_unit(&self) {}
                pub fn get_(&self) -> u32 { 0 }
                pub fn is_ready(&self) -> u32 { 0 }
                pub fn get_generic<T: Default>(&self) -> T { T::default() }
                pub fn get_lifetime<'a>(&'a self) -> &'a str { "" }
                pub fn get_iter(&self) -> impl Iterator<Item = u8> { std::iter::empty() }
                pub fn get_nested(&self) -> Option<&String> { None }
                pub fn name(&self) -> &str { "" }
                pub fn get_label(&self) -> &str { "" }
            }
            "#,
        );
        let properties = AccessorExtractor.extract(&bean, &matchers());
        assert_eq!(
            summary(&properties),
            vec![("label".to_string(), "str".to_string(), PropertyAccess::Borrowed)]
        );
    }

    #[test]
    fn test_first_accessor_wins_on_duplicate_names() {
        let bean = candidate(
            r#"
            pub struct Bean;
            impl Bean {
                pub fn is_active(&self) -> bool { true }
                pub fn get_active(&self) -> String { String::new() }
            }
            "#,
        );
        let properties = AccessorExtractor.extract(&bean, &matchers());
        assert_eq!(
            summary(&properties),
            vec![("active".to_string(), "bool".to_string(), PropertyAccess::Owned)]
        );
    }

    #[test]
    fn test_setter_pairing_trusts_getter() {
        let bean = candidate(
            r#"
            pub struct Bean;
            impl Bean {
                pub fn set_name(&mut self, name: String) {}
                pub fn get_name(&self) -> &String { todo!() }
                pub fn get_age(&self) -> u32 { 0 }
                pub fn set_age(&mut self, age: String) {}
                pub fn get_size(&self) -> usize { 0 }
            }
            "#,
        );
        let properties = AccessorExtractor.extract(&bean, &matchers());
        assert_eq!(properties.len(), 3);
        assert_eq!(properties[0].setter.as_deref(), Some("set_name"));
        assert_eq!(properties[1].value_type, "u32");
        assert_eq!(properties[1].setter, None);
        assert_eq!(properties[2].setter, None);
    }

    #[test]
    fn test_zero_properties() {
        let bean = candidate("#[derive(Default)] pub struct Bean;");
        assert!(AccessorExtractor.extract(&bean, &matchers()).is_empty());
        assert!(FieldExtractor.extract(&bean, &matchers()).is_empty());
    }

    #[test]
    fn test_field_extractor() {
        let bean = candidate(
            r#"
            pub struct Bean {
                pub name: String,
                pub(crate) r#type: u8,
                secret: u64,
            }
            "#,
        );
        let properties = FieldExtractor.extract(&bean, &matchers());
        assert_eq!(
            summary(&properties),
            vec![
                ("name".to_string(), "String".to_string(), PropertyAccess::Field),
                ("type".to_string(), "u8".to_string(), PropertyAccess::Field),
            ]
        );
        assert_eq!(properties[1].accessor, "r#type");
    }

    #[test]
    fn test_members_hidden_from_the_matcher_module_are_skipped() {
        let bean = candidate(
            r#"
            pub struct Bean {
                pub(crate) id: u64,
                pub(in crate::model) code: u32,
                pub(self) secret: u64,
            }
            impl Bean {
                pub(super) fn get_name(&self) -> &str { "" }
                pub(self) fn get_code(&self) -> u32 { 0 }
                pub(in crate::model) fn get_secret(&self) -> u64 { 0 }
            }
            "#,
        );
        let fields = FieldExtractor.extract(&bean, &matchers());
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "id");

        let accessors = AccessorExtractor.extract(&bean, &matchers());
        assert_eq!(
            summary(&accessors),
            vec![("name".to_string(), "str".to_string(), PropertyAccess::Borrowed)]
        );
    }
}
