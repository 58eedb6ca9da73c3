//! Collection of type declarations and impl blocks from a parsed module.

use crate::model::{
    Candidate, FieldSig, MethodSig, ModulePath, Receiver, TypeKind, TypePath, Visibility,
};
use crate::type_shape::{return_type_to_string, type_to_string};
use syn::punctuated::Punctuated;
use syn::visit::Visit;
use syn::{
    Attribute, Fields, FnArg, GenericParam, Generics, ImplItem, ImplItemFn, Item, ItemImpl, Token,
    Type,
};
use tracing::trace;

/// What an `impl` block contributes to its self type.
#[derive(Debug, Clone)]
pub(crate) enum ImplContribution {
    Inherent {
        methods: Vec<MethodSig>,
        has_new: bool,
    },
    Default,
    Generated,
}

/// An impl block whose self type may not be indexed yet.
#[derive(Debug, Clone)]
pub(crate) struct PendingImpl {
    /// Module the impl block appears in.
    pub scope: ModulePath,
    /// Segments of the self type path as written.
    pub self_path: Vec<String>,
    pub contribution: ImplContribution,
}

/// Output of walking one module's items.
#[derive(Debug, Default)]
pub(crate) struct CollectedItems {
    /// Types per module, in declaration order.
    pub types: Vec<(ModulePath, Candidate)>,
    /// Every module seen, including inline ones.
    pub modules: Vec<ModulePath>,
    pub impls: Vec<PendingImpl>,
}

pub(crate) fn collect(module: &ModulePath, items: &[Item], generated: bool) -> CollectedItems {
    let mut collected = CollectedItems::default();
    collected.modules.push(module.clone());
    walk(module, items, generated, &mut collected);
    collected
}

fn walk(module: &ModulePath, items: &[Item], generated: bool, out: &mut CollectedItems) {
    for item in items {
        if let Some(candidate) = declared_type(module, item, false, generated) {
            trace!("Found {} {}", candidate.kind, candidate.path);
            out.types.push((module.clone(), candidate));
        }

        match item {
            Item::Mod(item_mod) => {
                if let Some((_, content)) = &item_mod.content {
                    let child = module.child(item_mod.ident.to_string());
                    out.modules.push(child.clone());
                    walk(&child, content, generated, out);
                }
            }
            Item::Impl(item_impl) => {
                if let Some(pending) = pending_impl(module, item_impl) {
                    out.impls.push(pending);
                }
                for impl_item in &item_impl.items {
                    if let ImplItem::Fn(method) = impl_item {
                        collect_local(module, &method.block, generated, out);
                    }
                }
            }
            Item::Fn(item_fn) => collect_local(module, &item_fn.block, generated, out),
            _ => {}
        }
    }
}

/// Records types declared inside a function body as local to `module`.
fn collect_local(module: &ModulePath, block: &syn::Block, generated: bool, out: &mut CollectedItems) {
    let mut finder = LocalItems::default();
    finder.visit_block(block);
    for item in finder.items {
        if let Some(candidate) = declared_type(module, &item, true, generated) {
            trace!("Found local {} {}", candidate.kind, candidate.path);
            out.types.push((module.clone(), candidate));
        }
    }
}

#[derive(Default)]
struct LocalItems {
    items: Vec<Item>,
}

impl<'ast> Visit<'ast> for LocalItems {
    fn visit_item(&mut self, item: &'ast Item) {
        self.items.push(item.clone());
        syn::visit::visit_item(self, item);
    }
}

fn declared_type(module: &ModulePath, item: &Item, is_local: bool, generated: bool) -> Option<Candidate> {
    let (ident, kind, vis, generics, attrs) = match item {
        Item::Struct(s) => (&s.ident, TypeKind::Struct, &s.vis, &s.generics, &s.attrs),
        Item::Enum(e) => (&e.ident, TypeKind::Enum, &e.vis, &e.generics, &e.attrs),
        Item::Union(u) => (&u.ident, TypeKind::Union, &u.vis, &u.generics, &u.attrs),
        Item::Trait(t) => (&t.ident, TypeKind::Trait, &t.vis, &t.generics, &t.attrs),
        Item::Type(t) => (&t.ident, TypeKind::Alias, &t.vis, &t.generics, &t.attrs),
        _ => return None,
    };

    let fields = match item {
        Item::Struct(s) => named_fields(module, &s.fields),
        _ => Vec::new(),
    };

    Some(
        Candidate::builder()
            .path(TypePath::new(module.clone(), ident.to_string()))
            .kind(kind)
            .visibility(visibility(vis, module))
            .is_generic(!generics.params.is_empty())
            .is_local(is_local)
            .is_generated(generated)
            .has_default_constructor(derives_default(attrs))
            .fields(fields)
            .build(),
    )
}

fn named_fields(module: &ModulePath, fields: &Fields) -> Vec<FieldSig> {
    let Fields::Named(named) = fields else {
        return Vec::new();
    };
    named
        .named
        .iter()
        .filter_map(|field| {
            let ident = field.ident.as_ref()?;
            Some(FieldSig {
                name: ident.to_string(),
                ty: type_to_string(&field.ty),
                visibility: visibility(&field.vis, module),
            })
        })
        .collect()
}

/// Resolves a visibility written in `module` to the module it opens up to.
pub(crate) fn visibility(vis: &syn::Visibility, module: &ModulePath) -> Visibility {
    let restricted = match vis {
        syn::Visibility::Public(_) => return Visibility::Public,
        syn::Visibility::Inherited => return Visibility::Private,
        syn::Visibility::Restricted(restricted) => restricted,
    };

    let mut scope = module.clone();
    for (i, segment) in restricted.path.segments.iter().enumerate() {
        let name = segment.ident.to_string();
        scope = match name.as_str() {
            "crate" if i == 0 => ModulePath::root(),
            "self" if i == 0 => module.clone(),
            // `pub(super)` at the crate root is rejected by rustc
            "super" => scope.parent().unwrap_or_default(),
            _ => scope.child(name),
        };
    }

    if scope == *module {
        Visibility::Private
    } else {
        Visibility::Restricted { scope }
    }
}

fn derives_default(attrs: &[Attribute]) -> bool {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("derive"))
        .filter_map(|attr| {
            attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
                .ok()
        })
        .flatten()
        .any(|path| path.segments.last().is_some_and(|s| s.ident == "Default"))
}

fn pending_impl(scope: &ModulePath, item_impl: &ItemImpl) -> Option<PendingImpl> {
    let self_path = self_type_segments(&item_impl.self_ty)?;

    let contribution = match &item_impl.trait_ {
        Some((None, trait_path, _)) => {
            let name = trait_path.segments.last()?.ident.to_string();
            match name.as_str() {
                "Default" => ImplContribution::Default,
                "GeneratedMatcher" => ImplContribution::Generated,
                _ => return None,
            }
        }
        Some((Some(_), _, _)) => return None,
        None => {
            let type_name = self_path.last()?.clone();
            let mut has_new = false;
            let methods = item_impl
                .items
                .iter()
                .filter_map(|impl_item| match impl_item {
                    ImplItem::Fn(method) => Some(method),
                    _ => None,
                })
                .map(|method| {
                    has_new |= is_no_arg_constructor(method, &type_name);
                    method_signature(scope, method)
                })
                .collect();
            ImplContribution::Inherent { methods, has_new }
        }
    };

    Some(PendingImpl {
        scope: scope.clone(),
        self_path,
        contribution,
    })
}

fn self_type_segments(ty: &Type) -> Option<Vec<String>> {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => Some(
            type_path
                .path
                .segments
                .iter()
                .map(|segment| segment.ident.to_string())
                .collect(),
        ),
        Type::Paren(paren) => self_type_segments(&paren.elem),
        Type::Group(group) => self_type_segments(&group.elem),
        _ => None,
    }
}

fn method_signature(scope: &ModulePath, method: &ImplItemFn) -> MethodSig {
    let sig = &method.sig;
    let receiver = match sig.receiver() {
        None => Receiver::None,
        Some(receiver) if receiver.reference.is_some() && receiver.mutability.is_some() => {
            Receiver::RefMut
        }
        Some(receiver) if receiver.reference.is_some() => Receiver::Ref,
        Some(_) => Receiver::Value,
    };
    let params = sig
        .inputs
        .iter()
        .filter_map(|input| match input {
            FnArg::Typed(pat_type) => Some(type_to_string(&pat_type.ty)),
            FnArg::Receiver(_) => None,
        })
        .collect();

    MethodSig::builder()
        .name(sig.ident.to_string())
        .receiver(receiver)
        .params(params)
        .maybe_return_type(return_type_to_string(&sig.output))
        .visibility(visibility(&method.vis, scope))
        .is_generic(has_type_params(&sig.generics))
        .is_async(sig.asyncness.is_some())
        .is_unsafe(sig.unsafety.is_some())
        .build()
}

fn has_type_params(generics: &Generics) -> bool {
    generics
        .params
        .iter()
        .any(|param| !matches!(param, GenericParam::Lifetime(_)))
}

/// `fn new() -> Self` (or `-> TypeName`) with no parameters.
fn is_no_arg_constructor(method: &ImplItemFn, type_name: &str) -> bool {
    let sig = &method.sig;
    if sig.ident != "new" || !sig.inputs.is_empty() || sig.asyncness.is_some() {
        return false;
    }
    match return_type_to_string(&sig.output) {
        Some(ret) => ret == "Self" || ret == type_name,
        None => false,
    }
}
