use crate::error::UnresolvedInput;
use crate::model::{Candidate, ModulePath, TypePath};
use crate::scan::SourceIndex;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Candidates found for a list of inputs.
#[derive(Debug, Clone, Default)]
pub struct FindResult {
    /// De-duplicated, in input order then declaration order.
    pub candidates: Vec<Candidate>,
    pub unresolved: Vec<UnresolvedInput>,
}

/// Resolves module paths and type paths to the types they name.
///
/// An input naming a module contributes every type declared directly in
/// it; an input naming a type contributes that type. An input may be both.
pub struct CandidateFinder<'a> {
    index: &'a SourceIndex,
}

impl<'a> CandidateFinder<'a> {
    pub fn new(index: &'a SourceIndex) -> Self {
        CandidateFinder { index }
    }

    pub fn find<S: AsRef<str>>(&self, inputs: &[S]) -> FindResult {
        let mut result = FindResult::default();
        let mut seen: HashSet<TypePath> = HashSet::new();

        for input in inputs {
            let input = input.as_ref();
            let normalized = self.normalize(input);
            let mut resolved = false;

            let module = ModulePath::parse(&normalized);
            if let Some(entry) = self.index.module(&module) {
                resolved = true;
                debug!("Input '{}' names module {} with {} types", input, module, entry.types().len());
                for candidate in entry.types() {
                    if seen.insert(candidate.path.clone()) {
                        result.candidates.push(candidate.clone());
                    }
                }
            }

            if !normalized.is_empty() {
                let type_path = TypePath::from(normalized.clone());
                if let Some(candidate) = self.index.type_at(&type_path) {
                    resolved = true;
                    debug!("Input '{}' names type {}", input, type_path);
                    if seen.insert(candidate.path.clone()) {
                        result.candidates.push(candidate.clone());
                    }
                }
            }

            if !resolved {
                warn!(input = %input, "Neither a module nor a type exists for input, skipping it");
                result.unresolved.push(UnresolvedInput {
                    input: input.to_string(),
                });
            }
        }

        result
    }

    /// Strips `crate::`, `::` and the crate name; `crate` alone is the root.
    fn normalize(&self, input: &str) -> String {
        let trimmed = input.trim().trim_start_matches("::");
        let crate_name = self.index.crate_name();

        if trimmed == "crate" || trimmed == crate_name {
            return String::new();
        }
        if let Some(rest) = trimmed.strip_prefix("crate::") {
            return rest.to_string();
        }
        if let Some(rest) = trimmed
            .strip_prefix(crate_name)
            .and_then(|rest| rest.strip_prefix("::"))
        {
            return rest.to_string();
        }
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn index() -> SourceIndex {
        let mut index = SourceIndex::new("demo");
        index
            .parse_module("", "pub struct Root;")
            .expect("parses");
        index
            .parse_module("model", "pub struct Person;\npub struct Empty;\npub mod Person {}")
            .expect("parses");
        index
            .parse_module("model::nested", "pub struct Deep;")
            .expect("parses");
        index
    }

    fn names(result: &FindResult) -> Vec<String> {
        result.candidates.iter().map(|c| c.path.to_string()).collect()
    }

    #[test]
    fn test_module_input_enumerates_direct_types() {
        let index = index();
        let result = CandidateFinder::new(&index).find(&["model"]);
        assert_eq!(names(&result), vec!["model::Person", "model::Empty"]);
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn test_type_inputs_and_prefixes() {
        let index = index();
        let result = CandidateFinder::new(&index).find(&[
            "crate::model::nested::Deep",
            "demo::Root",
            "::model::Empty",
        ]);
        assert_eq!(names(&result), vec!["model::nested::Deep", "Root", "model::Empty"]);
    }

    #[test]
    fn test_root_module_input() {
        let index = index();
        let result = CandidateFinder::new(&index).find(&["crate"]);
        assert_eq!(names(&result), vec!["Root"]);
    }

    #[test]
    fn test_input_resolving_as_module_and_type() {
        let index = index();
        let result = CandidateFinder::new(&index).find(&["model::Person"]);
        assert_eq!(names(&result), vec!["model::Person"]);
    }

    #[test]
    fn test_duplicates_removed_and_unresolved_reported() {
        let index = index();
        let result = CandidateFinder::new(&index).find(&[
            "model::Empty",
            "model",
            "nowhere",
            "model::Missing",
        ]);
        assert_eq!(names(&result), vec!["model::Empty", "model::Person"]);
        let unresolved: Vec<_> = result.unresolved.iter().map(|u| u.input.as_str()).collect();
        assert_eq!(unresolved, vec!["nowhere", "model::Missing"]);
    }
}
