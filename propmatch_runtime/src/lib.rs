//! Matcher runtime for code generated by `propmatch`.
//!
//! Generated matchers wrap a [`PropertyMatcher`] and expose one fluent
//! `with_*` method per bean property. This crate provides everything those
//! sources compile against:
//!
//! - [`Matcher`]: the single-argument matcher contract
//! - [`Description`]: the text buffer matchers describe themselves into
//! - [`PropertyMatcher`]: the composite matcher keyed by property name
//! - [`equal_to`], [`anything`], [`not`]: the basic matchers
//! - [`GeneratedMatcher`]: provenance of a generated matcher
//!
//! ## Quick Start
//!
//! ```rust
//! use propmatch_runtime::{Matcher, PropertyMatcher, assert_that, equal_to};
//!
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! impl Person {
//!     fn get_name(&self) -> &String {
//!         &self.name
//!     }
//!
//!     fn get_age(&self) -> u32 {
//!         self.age
//!     }
//! }
//!
//! let mut matcher = PropertyMatcher::<Person>::new();
//! matcher
//!     .with_ref::<String, _>("name", Person::get_name, equal_to("Alice".to_string()))
//!     .with_value::<u32, _>("age", Person::get_age, equal_to(30u32));
//!
//! let alice = Person { name: "Alice".into(), age: 30 };
//! assert!(matcher.matches(&alice));
//! assert_that(&alice, matcher);
//! ```

mod core_matchers;
mod description;
mod generated;
mod matcher;
mod property;

pub use core_matchers::{Anything, EqualTo, Not, anything, equal_to, not};
pub use description::Description;
pub use generated::GeneratedMatcher;
pub use matcher::{Matcher, assert_that};
pub use property::PropertyMatcher;
