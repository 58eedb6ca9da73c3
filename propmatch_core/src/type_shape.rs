use crate::model::PropertyAccess;
use quote::ToTokens;
use regex::Regex;
use once_cell::sync::Lazy;
use syn::{GenericArgument, PathArguments, ReturnType, Type, TypeParamBound};

static PUNCT_SPACING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*(::|<|>|&|\(|\)|\[|\]|;|,)\s*").expect("Invalid type spacing regex")
});

/// Renders a type as a compact token string: `Vec<Option<String>>`, `&'static str`.
pub fn type_to_string(ty: &Type) -> String {
    normalize(&ty.to_token_stream().to_string())
}

pub fn return_type_to_string(output: &ReturnType) -> Option<String> {
    match output {
        ReturnType::Default => None,
        ReturnType::Type(_, ty) => Some(type_to_string(ty)),
    }
}

fn normalize(tokens: &str) -> String {
    PUNCT_SPACING.replace_all(tokens, "$1").replace(',', ", ")
}

pub fn parse_type(text: &str) -> Option<Type> {
    syn::parse_str::<Type>(text).ok()
}

pub fn is_unit(ty: &Type) -> bool {
    matches!(strip_group(ty), Type::Tuple(tuple) if tuple.elems.is_empty())
}

pub fn is_bool(ty: &Type) -> bool {
    let Type::Path(path) = strip_group(ty) else {
        return false;
    };
    if path.qself.is_some() {
        return false;
    }
    let segments: Vec<String> = path
        .path
        .segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect();
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
    matches!(
        segments.as_slice(),
        ["bool"] | ["std", "primitive", "bool"] | ["core", "primitive", "bool"]
    )
}

/// How a property of this accessor return type is read from a borrowed bean.
///
/// Returns the value type and the access mode, or `None` when the value
/// cannot be exposed as a `'static` type (`&V` with `V: 'static`, or `V`).
pub fn projection(ty: &Type) -> Option<(Type, PropertyAccess)> {
    match strip_group(ty) {
        Type::Reference(reference) => {
            if reference.mutability.is_some() {
                return None;
            }
            if let Some(lifetime) = &reference.lifetime
                && lifetime.ident != "static"
            {
                return None;
            }
            let inner = strip_group(&reference.elem);
            // `&dyn Trait` defaults the object lifetime to the borrow.
            if let Type::TraitObject(object) = inner
                && !has_static_bound(object.bounds.iter())
            {
                return None;
            }
            if !is_plain(inner) {
                return None;
            }
            Some((inner.clone(), PropertyAccess::Borrowed))
        }
        other if is_plain(other) && !is_unit(other) => Some((other.clone(), PropertyAccess::Owned)),
        _ => None,
    }
}

/// A type that names no borrowed lifetime and can be spelled outside its impl.
pub fn is_plain(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => {
            if path.qself.is_some() {
                return false;
            }
            if path
                .path
                .segments
                .first()
                .is_some_and(|segment| segment.ident == "Self")
            {
                return false;
            }
            path.path
                .segments
                .iter()
                .all(|segment| arguments_are_plain(&segment.arguments))
        }
        Type::Reference(reference) => {
            reference
                .lifetime
                .as_ref()
                .is_some_and(|lifetime| lifetime.ident == "static")
                && is_plain(&reference.elem)
        }
        Type::Tuple(tuple) => tuple.elems.iter().all(is_plain),
        Type::Array(array) => is_plain(&array.elem),
        Type::Slice(slice) => is_plain(&slice.elem),
        Type::Paren(paren) => is_plain(&paren.elem),
        Type::Group(group) => is_plain(&group.elem),
        Type::TraitObject(object) => object.bounds.iter().all(bound_is_plain),
        // impl Trait, pointers, fn pointers, never, macros
        _ => false,
    }
}

fn arguments_are_plain(arguments: &PathArguments) -> bool {
    match arguments {
        PathArguments::None => true,
        PathArguments::AngleBracketed(args) => args.args.iter().all(|arg| match arg {
            GenericArgument::Type(ty) => is_plain(ty),
            GenericArgument::Lifetime(lifetime) => lifetime.ident == "static",
            GenericArgument::Const(_) => true,
            GenericArgument::AssocType(assoc) => is_plain(&assoc.ty),
            _ => false,
        }),
        PathArguments::Parenthesized(args) => {
            args.inputs.iter().all(is_plain)
                && match &args.output {
                    ReturnType::Default => true,
                    ReturnType::Type(_, ty) => is_plain(ty),
                }
        }
    }
}

fn bound_is_plain(bound: &TypeParamBound) -> bool {
    match bound {
        TypeParamBound::Trait(trait_bound) => {
            trait_bound.lifetimes.is_none()
                && trait_bound
                    .path
                    .segments
                    .iter()
                    .all(|segment| arguments_are_plain(&segment.arguments))
        }
        TypeParamBound::Lifetime(lifetime) => lifetime.ident == "static",
        _ => false,
    }
}

fn has_static_bound<'a>(mut bounds: impl Iterator<Item = &'a TypeParamBound>) -> bool {
    bounds.any(|bound| matches!(bound, TypeParamBound::Lifetime(lifetime) if lifetime.ident == "static"))
}

/// Value types that are themselves matchers get no equality shortcut.
pub fn is_matcher(ty: &Type) -> bool {
    match strip_group(ty) {
        Type::Path(path) => {
            let Some(last) = path.path.segments.last() else {
                return false;
            };
            if last.ident == "Matcher" {
                return true;
            }
            if matches!(last.ident.to_string().as_str(), "Box" | "Arc" | "Rc")
                && let PathArguments::AngleBracketed(args) = &last.arguments
                && let Some(GenericArgument::Type(inner)) = args.args.first()
            {
                return is_matcher(inner);
            }
            false
        }
        Type::TraitObject(object) => object.bounds.iter().any(bound_names_matcher),
        Type::ImplTrait(imp) => imp.bounds.iter().any(bound_names_matcher),
        Type::Reference(reference) => is_matcher(&reference.elem),
        _ => false,
    }
}

fn bound_names_matcher(bound: &TypeParamBound) -> bool {
    match bound {
        TypeParamBound::Trait(trait_bound) => trait_bound
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Matcher"),
        _ => false,
    }
}

fn strip_group(ty: &Type) -> &Type {
    match ty {
        Type::Paren(paren) => strip_group(&paren.elem),
        Type::Group(group) => strip_group(&group.elem),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ty(text: &str) -> Type {
        syn::parse_str(text).expect("valid type")
    }

    #[test]
    fn test_type_to_string_is_compact() {
        assert_eq!(type_to_string(&ty("Vec < Option < String > >")), "Vec<Option<String>>");
        assert_eq!(type_to_string(&ty("& 'static str")), "&'static str");
        assert_eq!(type_to_string(&ty("HashMap<String,u32>")), "HashMap<String, u32>");
        assert_eq!(type_to_string(&ty("&mut Vec<u8>")), "&mut Vec<u8>");
        assert_eq!(type_to_string(&ty("crate :: model :: Address")), "crate::model::Address");
        assert_eq!(type_to_string(&ty("[u8 ; 4]")), "[u8;4]");
    }

    #[test]
    fn test_normalized_strings_parse_back() {
        for text in ["Vec<Option<String>>", "&'static str", "HashMap<String, u32>", "[u8;4]", "&mut Vec<u8>"] {
            let parsed = parse_type(text).expect("parses");
            assert_eq!(type_to_string(&parsed), text);
        }
    }

    #[test]
    fn test_bool_detection() {
        assert!(is_bool(&ty("bool")));
        assert!(is_bool(&ty("std::primitive::bool")));
        assert!(!is_bool(&ty("Option<bool>")));
        assert!(!is_bool(&ty("&bool")));
    }

    #[test]
    fn test_projection_of_references() {
        let (value, access) = projection(&ty("&String")).expect("projectable");
        assert_eq!(type_to_string(&value), "String");
        assert_eq!(access, PropertyAccess::Borrowed);

        let (value, access) = projection(&ty("&str")).expect("projectable");
        assert_eq!(type_to_string(&value), "str");
        assert_eq!(access, PropertyAccess::Borrowed);

        assert!(projection(&ty("&mut String")).is_none());
        assert!(projection(&ty("&'a String")).is_none());
        assert!(projection(&ty("&dyn Display")).is_none());
        assert!(projection(&ty("&(dyn Display + 'static)")).is_some());
    }

    #[test]
    fn test_projection_of_owned_values() {
        let (value, access) = projection(&ty("Option<u32>")).expect("projectable");
        assert_eq!(type_to_string(&value), "Option<u32>");
        assert_eq!(access, PropertyAccess::Owned);

        assert!(projection(&ty("Option<&str>")).is_none());
        assert!(projection(&ty("Option<&'static str>")).is_some());
        assert!(projection(&ty("impl Iterator<Item = u8>")).is_none());
        assert!(projection(&ty("*const u8")).is_none());
        assert!(projection(&ty("fn(u8) -> u8")).is_none());
        assert!(projection(&ty("Self")).is_none());
        assert!(projection(&ty("()")).is_none());
        assert!(projection(&ty("Cow<'_, str>")).is_none());
    }

    #[test]
    fn test_matcher_valued_types() {
        assert!(is_matcher(&ty("Box<dyn Matcher<String>>")));
        assert!(is_matcher(&ty("Arc<dyn propmatch_runtime::Matcher<u32> + Send>")));
        assert!(is_matcher(&ty("&dyn Matcher<u8>")));
        assert!(is_matcher(&ty("impl Matcher<u8>")));
        assert!(is_matcher(&ty("Rc<Box<dyn Matcher<u8>>>")));
        assert!(!is_matcher(&ty("Box<String>")));
        assert!(!is_matcher(&ty("String")));
    }

    #[test]
    fn test_types_named_like_matchers_are_plain_values() {
        assert!(!is_matcher(&ty("RouteMatcher")));
        assert!(!is_matcher(&ty("crate::routing::PatternMatcher")));
        assert!(!is_matcher(&ty("Box<RouteMatcher>")));
        assert!(!is_matcher(&ty("dyn PatternMatcher")));
    }
}
