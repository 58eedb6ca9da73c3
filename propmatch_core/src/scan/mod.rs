//! Static pre-analysis of a crate source tree.
//!
//! [`SourceIndex`] parses every `.rs` file below a source root with `syn` and
//! records, per module, the declared types together with the inherent
//! methods, named fields and constructor information the rest of the
//! pipeline needs. Nothing is compiled or executed.

mod items;

use crate::error::{PropmatchError, Result};
use crate::model::{Candidate, ModulePath, TypePath};
use items::{ImplContribution, PendingImpl};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

/// Marker at the top of files written by the generator.
pub const GENERATED_MARKER: &str = "// @generated";

/// Types declared directly in one module.
#[derive(Debug, Clone, Default)]
pub struct ModuleEntry {
    types: Vec<Candidate>,
}

impl ModuleEntry {
    /// Declared types, in declaration order.
    pub fn types(&self) -> &[Candidate] {
        &self.types
    }
}

#[derive(Debug, Clone)]
pub struct SourceIndex {
    crate_name: String,
    modules: BTreeMap<ModulePath, ModuleEntry>,
    pending: Vec<PendingImpl>,
}

impl SourceIndex {
    pub fn new(crate_name: impl Into<String>) -> Self {
        let mut modules = BTreeMap::new();
        modules.insert(ModulePath::root(), ModuleEntry::default());
        SourceIndex {
            crate_name: crate_name.into(),
            modules,
            pending: Vec::new(),
        }
    }

    /// Parses every `.rs` file below `root`.
    ///
    /// `lib.rs`/`main.rs` at the top are the crate root, `a.rs` and `a/mod.rs`
    /// are module `a`. Files under `bin/` belong to other crates and are
    /// skipped. Unreadable or unparseable files are logged and skipped.
    pub fn scan(root: impl AsRef<Path>, crate_name: &str) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(PropmatchError::workspace_scan(format!(
                "source root {} is not a directory",
                root.display()
            )));
        }

        info!("Scanning {} for crate {}", root.display(), crate_name);
        let mut index = SourceIndex::new(crate_name);
        let mut files = 0usize;

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || !(entry.file_type().is_dir() && entry.file_name() == "bin")
            });

        for entry in walker {
            let entry = entry.map_err(|e| PropmatchError::workspace_scan(e.to_string()))?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "rs") {
                continue;
            }
            let Some(module) = module_for_file(root, path) else {
                trace!("Skipping {}: not a module file", path.display());
                continue;
            };

            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Error reading file {}: {}", path.display(), e);
                    continue;
                }
            };
            let syntax = match syn::parse_file(&content) {
                Ok(syntax) => syntax,
                Err(e) => {
                    warn!("Error parsing file {}: {}", path.display(), e);
                    continue;
                }
            };

            index.add_items(&module, &syntax.items, is_generated_source(&content), Some(path));
            files += 1;
        }

        info!(
            "Indexed {} files into {} modules with {} types",
            files,
            index.modules.len(),
            index.type_count()
        );
        if !index.pending.is_empty() {
            debug!(
                "{} impl blocks could not be attached to an indexed type",
                index.pending.len()
            );
        }
        Ok(index)
    }

    /// Adds one module from in-memory source text.
    pub fn parse_module(&mut self, module: &str, source: &str) -> Result<()> {
        let module = ModulePath::parse(module);
        let syntax = syn::parse_file(source)
            .map_err(|e| PropmatchError::parse_error(module.to_string(), e.to_string()))?;
        self.add_items(&module, &syntax.items, is_generated_source(source), None);
        Ok(())
    }

    pub fn crate_name(&self) -> &str {
        &self.crate_name
    }

    pub fn module(&self, path: &ModulePath) -> Option<&ModuleEntry> {
        self.modules.get(path)
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModulePath> {
        self.modules.keys()
    }

    /// The first non-local type with this path.
    pub fn type_at(&self, path: &TypePath) -> Option<&Candidate> {
        self.modules
            .get(&path.module)?
            .types
            .iter()
            .find(|candidate| !candidate.is_local && candidate.path.name == path.name)
    }

    pub fn type_count(&self) -> usize {
        self.modules.values().map(|entry| entry.types.len()).sum()
    }

    fn add_items(
        &mut self,
        module: &ModulePath,
        items: &[syn::Item],
        generated: bool,
        source_file: Option<&Path>,
    ) {
        let collected = items::collect(module, items, generated);

        for path in &collected.modules {
            self.ensure_module(path);
        }
        for (path, mut candidate) in collected.types {
            candidate.source_file = source_file.map(Path::to_path_buf);
            self.ensure_module(&path).types.push(candidate);
        }

        self.pending.extend(collected.impls);
        self.attach_pending();
    }

    fn ensure_module(&mut self, path: &ModulePath) -> &mut ModuleEntry {
        let mut ancestor = path.parent();
        while let Some(current) = ancestor {
            ancestor = current.parent();
            self.modules.entry(current).or_default();
        }
        self.modules.entry(path.clone()).or_default()
    }

    /// Applies every impl block whose self type is now known.
    fn attach_pending(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        for pending_impl in pending {
            match self.resolve_self_type(&pending_impl.scope, &pending_impl.self_path) {
                Some(target) => self.apply(&target, pending_impl.contribution),
                None => self.pending.push(pending_impl),
            }
        }
    }

    fn apply(&mut self, target: &TypePath, contribution: ImplContribution) {
        let Some(candidate) = self
            .modules
            .get_mut(&target.module)
            .and_then(|entry| {
                entry
                    .types
                    .iter_mut()
                    .find(|candidate| !candidate.is_local && candidate.path.name == target.name)
            })
        else {
            return;
        };

        match contribution {
            ImplContribution::Inherent { methods, has_new } => {
                trace!("Attaching {} methods to {}", methods.len(), target);
                candidate.methods.extend(methods);
                candidate.has_default_constructor |= has_new;
            }
            ImplContribution::Default => candidate.has_default_constructor = true,
            ImplContribution::Generated => candidate.is_generated = true,
        }
    }

    /// Resolves an impl self type written in `scope` to an indexed type.
    fn resolve_self_type(&self, scope: &ModulePath, segments: &[String]) -> Option<TypePath> {
        let (name, prefix) = segments.split_last()?;
        let mut base = scope.clone();
        let mut rest = prefix;

        match prefix.first().map(String::as_str) {
            Some("crate") => {
                base = ModulePath::root();
                rest = &prefix[1..];
            }
            Some(first) if first == self.crate_name => {
                base = ModulePath::root();
                rest = &prefix[1..];
            }
            Some("self") => rest = &prefix[1..],
            Some("super") => {
                while rest.first().is_some_and(|segment| segment == "super") {
                    base = base.parent()?;
                    rest = &rest[1..];
                }
            }
            _ => {}
        }

        let mut module = base;
        for segment in rest {
            module = module.child(segment.clone());
        }
        let target = TypePath::new(module, name.clone());
        self.type_at(&target).map(|_| target)
    }
}

fn is_generated_source(content: &str) -> bool {
    content.trim_start().starts_with(GENERATED_MARKER)
}

/// Module path of a source file relative to the source root.
fn module_for_file(root: &Path, file: &Path) -> Option<ModulePath> {
    let relative = file.strip_prefix(root).ok()?;
    let mut segments: Vec<String> = relative
        .parent()
        .map(|parent| {
            parent
                .components()
                .map(|component| component.as_os_str().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    let stem = relative.file_stem()?.to_string_lossy().into_owned();

    match stem.as_str() {
        "lib" | "main" if segments.is_empty() => {}
        "mod" => {}
        _ => segments.push(stem),
    }

    if segments
        .iter()
        .any(|segment| syn::parse_str::<syn::Ident>(segment).is_err())
    {
        return None;
    }
    Some(ModulePath::from_segments(segments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().expect("has parent")).expect("create dirs");
        fs::write(path, content).expect("write source");
    }

    #[test]
    fn test_module_for_file() {
        let root = Path::new("/src");
        let module = |file: &str| module_for_file(root, &root.join(file)).map(|m| m.to_string());
        assert_eq!(module("lib.rs").as_deref(), Some("crate"));
        assert_eq!(module("model.rs").as_deref(), Some("model"));
        assert_eq!(module("model/mod.rs").as_deref(), Some("model"));
        assert_eq!(module("model/address.rs").as_deref(), Some("model::address"));
        assert_eq!(module("model/main.rs").as_deref(), Some("model::main"));
        assert_eq!(module("my-file.rs"), None);
    }

    #[test]
    fn test_scan_builds_module_tree() {
        let dir = TempDir::new().expect("tempdir");
        let root = dir.path();
        write(root, "lib.rs", "pub mod model;\npub struct Root;\n");
        write(
            root,
            "model.rs",
            "pub mod address;\n#[derive(Default)]\npub struct Person { pub name: String }\nimpl Person { pub fn get_name(&self) -> &String { &self.name } }\n",
        );
        write(root, "model/address.rs", "pub struct Address;\nimpl Default for Address { fn default() -> Self { Address } }\n");
        write(root, "bin/tool.rs", "pub struct Tool;\n");
        write(root, "broken.rs", "pub struct {");

        let index = SourceIndex::scan(root, "demo").expect("scan succeeds");
        let modules: Vec<String> = index.modules().map(ToString::to_string).collect();
        assert_eq!(modules, vec!["crate", "model", "model::address"]);

        let person = index
            .type_at(&TypePath::from("model::Person".to_string()))
            .expect("person indexed");
        assert!(person.has_default_constructor);
        assert_eq!(person.methods.len(), 1);
        assert_eq!(person.source_file.as_deref(), Some(root.join("model.rs").as_path()));

        let address = index
            .type_at(&TypePath::from("model::address::Address".to_string()))
            .expect("address indexed");
        assert!(address.has_default_constructor);
        assert!(index.type_at(&TypePath::from("Tool".to_string())).is_none());
    }

    #[test]
    fn test_scan_rejects_missing_root() {
        let dir = TempDir::new().expect("tempdir");
        let result = SourceIndex::scan(dir.path().join("missing"), "demo");
        assert!(matches!(result, Err(PropmatchError::WorkspaceScan(_))));
    }

    #[test]
    fn test_impls_resolve_across_modules() {
        let mut index = SourceIndex::new("demo");
        index
            .parse_module(
                "ops",
                "impl crate::model::Person { pub fn get_age(&self) -> u32 { 0 } }\n\
                 impl super::model::Person { pub fn is_adult(&self) -> bool { true } }\n\
                 impl demo::model::Person { pub fn new() -> Self { todo!() } }",
            )
            .expect("parses");
        index
            .parse_module("model", "pub struct Person;\nimpl self::Person { pub fn get_id(&self) -> u64 { 0 } }")
            .expect("parses");

        let person = index
            .type_at(&TypePath::from("model::Person".to_string()))
            .expect("indexed");
        let names: Vec<&str> = person.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["get_age", "is_adult", "new", "get_id"]);
        assert!(person.has_default_constructor);
    }

    #[test]
    fn test_generated_sources_are_marked() {
        let mut index = SourceIndex::new("demo");
        index
            .parse_module("model", "// @generated by propmatch\npub struct PersonMatcher;\n")
            .expect("parses");
        index
            .parse_module(
                "other",
                "pub struct Manual;\nimpl propmatch_runtime::GeneratedMatcher for Manual { const BASED_ON: &'static str = \"x\"; const GENERATOR: &'static str = \"y\"; }",
            )
            .expect("parses");

        assert!(index.type_at(&TypePath::from("model::PersonMatcher".to_string())).expect("indexed").is_generated);
        assert!(index.type_at(&TypePath::from("other::Manual".to_string())).expect("indexed").is_generated);
    }
}
