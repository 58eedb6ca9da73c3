use super::ir::{MatcherSpec, Projection, PropertySpec};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Ident, Path, Type};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmitError {
    #[error("'{0}' is not a valid identifier")]
    InvalidIdent(String),

    #[error("'{0}' is not a valid path")]
    InvalidPath(String),

    #[error("type '{ty}' of property '{property}' does not parse")]
    InvalidType { property: String, ty: String },

    #[error("generated tokens do not form a file: {0}")]
    SynParse(String),
}

/// Renders a [`MatcherSpec`] as source text.
pub trait SourceEmitter: Send + Sync {
    /// Extension of the files this emitter produces.
    fn file_extension(&self) -> &str;

    fn emit(&self, spec: &MatcherSpec) -> Result<String, EmitError>;
}

/// Emits formatted Rust source.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustEmitter;

impl SourceEmitter for RustEmitter {
    fn file_extension(&self) -> &str {
        "rs"
    }

    fn emit(&self, spec: &MatcherSpec) -> Result<String, EmitError> {
        let tokens = emit_tokens(spec)?;
        let syntax_tree: syn::File =
            syn::parse2(tokens).map_err(|e| EmitError::SynParse(e.to_string()))?;
        let formatted = prettyplease::unparse(&syntax_tree);

        let header = format!(
            "// @generated by {} from `{}`. Do not edit by hand.\n\n",
            spec.generator, spec.based_on
        );
        Ok(format!("{header}{formatted}"))
    }
}

fn emit_tokens(spec: &MatcherSpec) -> Result<TokenStream, EmitError> {
    let runtime = path(&format!("::{}", spec.runtime_crate))?;
    let bean = path(&spec.bean_path)?;
    let scope = path(&spec.scope_module)?;
    let matcher = ident(&spec.type_name)?;
    let factory = ident(&spec.factory)?;
    let based_on = &spec.based_on;
    let generator = &spec.generator;

    let methods = spec
        .properties
        .iter()
        .map(|property| property_methods(property, &runtime, &bean))
        .collect::<Result<Vec<_>, _>>()?;

    let type_doc = format!(" Matcher for [`{0}`]({1}), one condition per property.", spec.based_on, spec.bean_path);
    let factory_doc = format!(" Creates a [`{}`] that accepts any `{}`.", spec.type_name, spec.based_on);

    Ok(quote! {
        #[allow(unused_imports)]
        use #scope::*;

        #[doc = #type_doc]
        pub struct #matcher {
            inner: #runtime::PropertyMatcher<#bean>,
        }

        impl #matcher {
            pub fn new() -> Self {
                Self {
                    inner: #runtime::PropertyMatcher::new(),
                }
            }

            #(#methods)*
        }

        impl ::core::default::Default for #matcher {
            fn default() -> Self {
                Self::new()
            }
        }

        impl #runtime::Matcher<#bean> for #matcher {
            fn matches(&self, item: &#bean) -> bool {
                #runtime::Matcher::matches(&self.inner, item)
            }

            fn describe_to(&self, description: &mut #runtime::Description) {
                #runtime::Matcher::describe_to(&self.inner, description)
            }

            fn describe_mismatch(&self, item: &#bean, description: &mut #runtime::Description) {
                #runtime::Matcher::describe_mismatch(&self.inner, item, description)
            }
        }

        impl #runtime::GeneratedMatcher for #matcher {
            const BASED_ON: &'static str = #based_on;
            const GENERATOR: &'static str = #generator;
        }

        #[doc = #factory_doc]
        pub fn #factory() -> #matcher {
            #matcher::new()
        }
    })
}

fn property_methods(
    property: &PropertySpec,
    runtime: &Path,
    bean: &Path,
) -> Result<TokenStream, EmitError> {
    let value: Type = syn::parse_str(&property.value_type).map_err(|_| EmitError::InvalidType {
        property: property.name.clone(),
        ty: property.value_type.clone(),
    })?;
    let name = &property.name;
    let with_method = ident(&property.matcher_method)?;

    let register = match &property.projection {
        Projection::Accessor {
            method,
            borrowed: true,
        } => {
            let method = ident(method)?;
            quote!(self.inner.with_ref::<#value, _>(#name, #bean::#method, matcher);)
        }
        Projection::Accessor {
            method,
            borrowed: false,
        } => {
            let method = ident(method)?;
            quote!(self.inner.with_value::<#value, _>(#name, #bean::#method, matcher);)
        }
        Projection::Field { field } => {
            let field = ident(field)?;
            quote!(self.inner.with_ref::<#value, _>(#name, |item| &item.#field, matcher);)
        }
    };

    let with_doc = format!(" Requires `{name}` to satisfy `matcher`.");
    let mut tokens = quote! {
        #[doc = #with_doc]
        pub fn #with_method<M>(mut self, matcher: M) -> Self
        where
            M: #runtime::Matcher<#value> + 'static,
        {
            #register
            self
        }
    };

    if let Some(equality_method) = &property.equality_method {
        let eq_method = ident(equality_method)?;
        let eq_doc = format!(" Requires `{name}` to equal `value`.");
        tokens.extend(quote! {
            #[doc = #eq_doc]
            pub fn #eq_method<E>(self, value: E) -> Self
            where
                #runtime::EqualTo<E>: #runtime::Matcher<#value> + 'static,
            {
                self.#with_method(#runtime::equal_to(value))
            }
        });
    }

    Ok(tokens)
}

fn ident(name: &str) -> Result<Ident, EmitError> {
    syn::parse_str::<Ident>(name).map_err(|_| EmitError::InvalidIdent(name.to_string()))
}

fn path(text: &str) -> Result<Path, EmitError> {
    syn::parse_str::<Path>(text).map_err(|_| EmitError::InvalidPath(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::ir::GENERATOR_NAME;

    fn person_spec() -> MatcherSpec {
        MatcherSpec {
            based_on: "model::Person".to_string(),
            generator: GENERATOR_NAME.to_string(),
            bean_path: "crate::model::Person".to_string(),
            scope_module: "crate::model".to_string(),
            runtime_crate: "propmatch_runtime".to_string(),
            type_name: "PersonMatcher".to_string(),
            factory: "is_person".to_string(),
            properties: vec![
                PropertySpec {
                    name: "name".to_string(),
                    value_type: "String".to_string(),
                    projection: Projection::Accessor {
                        method: "get_name".to_string(),
                        borrowed: true,
                    },
                    matcher_method: "with_name".to_string(),
                    equality_method: Some("with_name_eq".to_string()),
                },
                PropertySpec {
                    name: "age".to_string(),
                    value_type: "u32".to_string(),
                    projection: Projection::Accessor {
                        method: "get_age".to_string(),
                        borrowed: false,
                    },
                    matcher_method: "with_age".to_string(),
                    equality_method: Some("with_age_eq".to_string()),
                },
                PropertySpec {
                    name: "type".to_string(),
                    value_type: "Box<dyn Matcher<u8>>".to_string(),
                    projection: Projection::Field {
                        field: "r#type".to_string(),
                    },
                    matcher_method: "with_type".to_string(),
                    equality_method: None,
                },
            ],
        }
    }

    #[test]
    fn test_emitted_source_shape() {
        let source = RustEmitter.emit(&person_spec()).expect("emits");

        assert!(source.starts_with(
            "// @generated by propmatch from `model::Person`. Do not edit by hand.\n\n"
        ));
        assert!(source.contains("use crate::model::*;"));
        assert!(source.contains("pub struct PersonMatcher {"));
        assert!(source.contains("inner: ::propmatch_runtime::PropertyMatcher<crate::model::Person>,"));
        assert!(source.contains("pub fn with_name<M>(mut self, matcher: M) -> Self"));
        assert!(source.contains("self.inner.with_ref::<String, _>("));
        assert!(source.contains("crate::model::Person::get_name"));
        assert!(source.contains("self.inner.with_value::<u32, _>("));
        assert!(source.contains("crate::model::Person::get_age"));
        assert!(source.contains("pub fn with_age_eq<E>(self, value: E) -> Self"));
        assert!(source.contains("&item.r#type"));
        assert!(!source.contains("with_type_eq"));
        assert!(source.contains("const BASED_ON: &'static str = \"model::Person\";"));
        assert!(source.contains("pub fn is_person() -> PersonMatcher {"));
    }

    #[test]
    fn test_emitted_source_reparses() {
        let source = RustEmitter.emit(&person_spec()).expect("emits");
        let file = syn::parse_file(&source).expect("emitted source parses");
        assert_eq!(file.items.len(), 7);
    }

    #[test]
    fn test_emission_is_deterministic() {
        let first = RustEmitter.emit(&person_spec()).expect("emits");
        let second = RustEmitter.emit(&person_spec()).expect("emits");
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_value_type_is_an_error() {
        let mut spec = person_spec();
        spec.properties[0].value_type = "Vec<".to_string();
        assert_eq!(
            RustEmitter.emit(&spec),
            Err(EmitError::InvalidType {
                property: "name".to_string(),
                ty: "Vec<".to_string()
            })
        );
    }
}
