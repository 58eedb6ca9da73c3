use crate::error::NamingError;
use crate::model::{Candidate, NamingDecision};

/// Decides the module and type name of a candidate's matcher.
pub trait NamingStrategy: Send + Sync {
    fn decide(&self, candidate: &Candidate) -> Result<NamingDecision, NamingError>;
}

/// `model::Person` -> `model::PersonMatcher`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SameModuleNaming {
    pub prefix: String,
    pub suffix: String,
}

impl Default for SameModuleNaming {
    fn default() -> Self {
        SameModuleNaming {
            prefix: String::new(),
            suffix: "Matcher".to_string(),
        }
    }
}

impl NamingStrategy for SameModuleNaming {
    fn decide(&self, candidate: &Candidate) -> Result<NamingDecision, NamingError> {
        NamingDecision::new(
            candidate.path.module.clone(),
            format!("{}{}{}", self.prefix, candidate.simple_name(), self.suffix),
        )
    }
}

/// `model::Person` -> `model::matchers::PersonMatcher`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubModuleNaming {
    pub module: String,
    pub prefix: String,
    pub suffix: String,
}

impl Default for SubModuleNaming {
    fn default() -> Self {
        SubModuleNaming {
            module: "matchers".to_string(),
            prefix: String::new(),
            suffix: "Matcher".to_string(),
        }
    }
}

impl NamingStrategy for SubModuleNaming {
    fn decide(&self, candidate: &Candidate) -> Result<NamingDecision, NamingError> {
        if self.module.is_empty() {
            return Err(NamingError::new("matcher sub-module name is empty"));
        }
        NamingDecision::new(
            candidate.path.module.child(self.module.clone()),
            format!("{}{}{}", self.prefix, candidate.simple_name(), self.suffix),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModulePath, TypeKind, TypePath};
    use pretty_assertions::assert_eq;

    fn person() -> Candidate {
        Candidate::builder()
            .path(TypePath::new(ModulePath::parse("model"), "Person"))
            .kind(TypeKind::Struct)
            .build()
    }

    #[test]
    fn test_same_module_naming() {
        let decision = SameModuleNaming::default().decide(&person()).expect("valid");
        assert_eq!(decision.module, ModulePath::parse("model"));
        assert_eq!(decision.type_name, "PersonMatcher");
    }

    #[test]
    fn test_prefix_and_suffix() {
        let naming = SameModuleNaming {
            prefix: "Is".to_string(),
            suffix: String::new(),
        };
        assert_eq!(naming.decide(&person()).expect("valid").type_name, "IsPerson");
    }

    #[test]
    fn test_sub_module_naming() {
        let decision = SubModuleNaming::default().decide(&person()).expect("valid");
        assert_eq!(decision.module, ModulePath::parse("model::matchers"));
        assert_eq!(decision.type_name, "PersonMatcher");
    }

    #[test]
    fn test_invalid_names_are_errors() {
        let naming = SameModuleNaming {
            prefix: "1".to_string(),
            suffix: "Matcher".to_string(),
        };
        assert!(naming.decide(&person()).is_err());

        let naming = SubModuleNaming {
            module: "not a module".to_string(),
            ..SubModuleNaming::default()
        };
        assert!(naming.decide(&person()).is_err());

        let naming = SubModuleNaming {
            module: String::new(),
            ..SubModuleNaming::default()
        };
        assert!(naming.decide(&person()).is_err());
    }
}
