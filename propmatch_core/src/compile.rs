use crate::error::CompileError;
use crate::generate::DELEGATES;
use crate::model::{GeneratedArtifact, MatcherSource, TypePath, factory_name};
use std::collections::HashMap;
use std::fs;
use syn::{ImplItem, Item, ItemImpl, Lit, Type};
use tracing::{debug, error};

/// Result of verifying one batch of generated sources.
#[derive(Debug, Clone, Default)]
pub struct CompileOutcome {
    pub artifacts: Vec<GeneratedArtifact>,
    pub failures: Vec<CompileError>,
}

/// Turns written matcher sources into usable artifacts.
///
/// The sources of one batch are handled as a unit. A source that does not
/// verify fails on its own; the rest still produce artifacts.
pub trait MatcherCompiler: Send + Sync {
    fn compile(&self, sources: &[MatcherSource]) -> CompileOutcome;
}

/// Re-reads each written file and checks its structure with `syn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SynCompiler;

impl MatcherCompiler for SynCompiler {
    fn compile(&self, sources: &[MatcherSource]) -> CompileOutcome {
        let mut outcome = CompileOutcome::default();
        let mut claimed: HashMap<TypePath, &TypePath> = HashMap::new();

        for source in sources {
            let matcher_path = source.naming.matcher_path();
            let result = match claimed.get(&matcher_path) {
                Some(owner) => Err(format!("matcher {matcher_path} is also generated for {owner}")),
                None => verify(source),
            };

            match result {
                Ok(artifact) => {
                    debug!("Verified {}", artifact.qualified_name());
                    claimed.insert(matcher_path, &source.candidate);
                    outcome.artifacts.push(artifact);
                }
                Err(message) => {
                    let failure = CompileError {
                        candidate: source.candidate.clone(),
                        path: source.output_path.clone(),
                        message,
                    };
                    error!(
                        candidate = %failure.candidate,
                        path = %failure.path.display(),
                        cause = %failure.message,
                        "Generated matcher failed verification"
                    );
                    outcome.failures.push(failure);
                }
            }
        }

        outcome
    }
}

fn verify(source: &MatcherSource) -> Result<GeneratedArtifact, String> {
    let text = fs::read_to_string(&source.output_path)
        .map_err(|e| format!("cannot read {}: {e}", source.output_path.display()))?;
    let file = syn::parse_file(&text).map_err(|e| format!("does not parse: {e}"))?;

    let type_name = &source.naming.type_name;
    let factory = factory_name(&source.candidate.name);

    let declares_struct = file
        .items
        .iter()
        .any(|item| matches!(item, Item::Struct(s) if s.ident == type_name));
    if !declares_struct {
        return Err(format!("struct {type_name} is missing"));
    }

    let mut property_methods = Vec::new();
    let mut has_new = false;
    let mut delegates = Vec::new();
    let mut based_on = None;

    for item in &file.items {
        let Item::Impl(item_impl) = item else {
            continue;
        };
        if !implements_for(item_impl, type_name) {
            continue;
        }
        match trait_name(item_impl).as_deref() {
            None => {
                for method in impl_fns(item_impl) {
                    let name = method.sig.ident.to_string();
                    if name == "new" && method.sig.inputs.is_empty() {
                        has_new = true;
                    } else if name.starts_with("with_") {
                        property_methods.push(name);
                    }
                }
            }
            Some("Matcher") => {
                delegates = impl_fns(item_impl)
                    .map(|method| method.sig.ident.to_string())
                    .collect();
            }
            Some("GeneratedMatcher") => based_on = based_on_literal(item_impl),
            Some(_) => {}
        }
    }

    if !has_new {
        return Err(format!("{type_name}::new() is missing"));
    }
    if let Some(missing) = DELEGATES.iter().find(|d| !delegates.iter().any(|m| m == *d)) {
        return Err(format!("Matcher impl does not define {missing}"));
    }
    let expected = source.candidate.qualified();
    if based_on.as_deref() != Some(expected.as_str()) {
        return Err(format!("GeneratedMatcher::BASED_ON is not \"{expected}\""));
    }

    let has_factory = file.items.iter().any(|item| {
        matches!(item, Item::Fn(f) if f.sig.ident == factory && f.sig.inputs.is_empty())
    });
    if !has_factory {
        return Err(format!("factory {factory}() is missing"));
    }

    Ok(GeneratedArtifact {
        based_on: source.candidate.clone(),
        module: source.naming.module.clone(),
        file_stem: source.naming.file_stem(),
        type_name: type_name.clone(),
        factory,
        source_path: source.output_path.clone(),
        property_methods,
        delegates,
    })
}

fn implements_for(item_impl: &ItemImpl, type_name: &str) -> bool {
    match item_impl.self_ty.as_ref() {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == type_name),
        _ => false,
    }
}

fn trait_name(item_impl: &ItemImpl) -> Option<String> {
    let (_, path, _) = item_impl.trait_.as_ref()?;
    path.segments.last().map(|segment| segment.ident.to_string())
}

fn impl_fns(item_impl: &ItemImpl) -> impl Iterator<Item = &syn::ImplItemFn> {
    item_impl.items.iter().filter_map(|item| match item {
        ImplItem::Fn(method) => Some(method),
        _ => None,
    })
}

fn based_on_literal(item_impl: &ItemImpl) -> Option<String> {
    item_impl.items.iter().find_map(|item| match item {
        ImplItem::Const(constant) if constant.ident == "BASED_ON" => match &constant.expr {
            syn::Expr::Lit(expr) => match &expr.lit {
                Lit::Str(text) => Some(text.value()),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    })
}
