use crate::model::{Candidate, TypeKind, Visibility};
use std::fmt;
use tracing::debug;

/// Why a candidate gets no matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    NotAStruct(TypeKind),
    Generic,
    Local,
    Generated,
    NotPublic,
    NoDefaultConstructor,
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ineligibility::NotAStruct(kind) => write!(f, "is a {kind}"),
            Ineligibility::Generic => f.write_str("has generic parameters"),
            Ineligibility::Local => f.write_str("is declared inside a function"),
            Ineligibility::Generated => f.write_str("was produced by propmatch"),
            Ineligibility::NotPublic => f.write_str("is not visible outside its module"),
            Ineligibility::NoDefaultConstructor => f.write_str("has no no-argument constructor"),
        }
    }
}

/// Decides which candidates get a matcher. Must not error or reorder.
pub trait EligibilityFilter: Send + Sync {
    fn check(&self, candidate: &Candidate) -> Result<(), Ineligibility>;

    fn filter(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates
            .into_iter()
            .filter(|candidate| match self.check(candidate) {
                Ok(()) => true,
                Err(reason) => {
                    debug!(candidate = %candidate.path, %reason, "Excluded from generation");
                    false
                }
            })
            .collect()
    }
}

/// Keeps public, non-generic, non-local structs with a no-argument constructor.
#[derive(Debug, Clone, Copy)]
pub struct StandardFilter {
    pub require_default_constructor: bool,
}

impl Default for StandardFilter {
    fn default() -> Self {
        StandardFilter {
            require_default_constructor: true,
        }
    }
}

impl EligibilityFilter for StandardFilter {
    fn check(&self, candidate: &Candidate) -> Result<(), Ineligibility> {
        if candidate.kind != TypeKind::Struct {
            return Err(Ineligibility::NotAStruct(candidate.kind));
        }
        if candidate.is_generic {
            return Err(Ineligibility::Generic);
        }
        if candidate.is_local {
            return Err(Ineligibility::Local);
        }
        if candidate.is_generated {
            return Err(Ineligibility::Generated);
        }
        if candidate.visibility == Visibility::Private {
            return Err(Ineligibility::NotPublic);
        }
        if self.require_default_constructor && !candidate.has_default_constructor {
            return Err(Ineligibility::NoDefaultConstructor);
        }
        Ok(())
    }
}
