//! Exercises the matchers `build.rs` generated for this crate's beans.

use pretty_assertions::assert_eq;
use propmatch_playground::model::check_matcher::{CheckMatcher, is_check};
use propmatch_playground::model::empty_matcher::{EmptyMatcher, is_empty};
use propmatch_playground::model::person_matcher::{PersonMatcher, is_person};
use propmatch_playground::model::route_matcher::is_route;
use propmatch_playground::model::{Check, Empty, Person, Route};
use propmatch_playground::routing::PatternMatcher;
use propmatch_runtime::{
    Description, GeneratedMatcher, Matcher, anything, assert_that, equal_to, not,
};

fn alice() -> Person {
    let mut person = Person::new("Alice", 30);
    person.add_tag("admin");
    person.set_active(true);
    person
}

#[test]
fn test_factory_matches_any_bean() {
    assert!(is_person().matches(&Person::default()));
    assert!(is_empty().matches(&Empty));
    assert_that(&Empty, is_empty());

    let mut description = Description::new();
    is_empty().describe_to(&mut description);
    assert_eq!(description.as_str(), "any Empty");
}

#[test]
fn test_equality_methods() {
    let matcher = is_person()
        .with_name_eq("Alice".to_string())
        .with_age_eq(30u32)
        .with_tags_eq(vec!["admin".to_string()])
        .with_active_eq(true);
    assert!(matcher.matches(&alice()));
    assert!(!matcher.matches(&Person::default()));
}

#[test]
fn test_matcher_methods_accept_any_matcher() {
    let matcher = is_person()
        .with_age(not(equal_to(3u32)))
        .with_name(anything())
        .with_tags(not(equal_to(Vec::<String>::new())));
    assert!(matcher.matches(&alice()));
    assert!(!matcher.matches(&Person::new("Bob", 3)));
}

#[test]
fn test_describe_mismatch_names_property() {
    let matcher = is_person().with_name_eq("Bob".to_string());
    let mut description = Description::new();
    matcher.describe_mismatch(&alice(), &mut description);
    assert_eq!(description.as_str(), "name: was \"Alice\"");
}

#[test]
#[should_panic(expected = "Expected: Person { age: 31 }")]
fn test_assert_that_with_generated_matcher() {
    assert_that(&alice(), is_person().with_age_eq(31u32));
}

#[test]
fn test_types_named_like_matchers_get_equality_methods() {
    let route = Route::new("GET", PatternMatcher::prefix("/users"));
    let matcher = is_route()
        .with_pattern_eq(PatternMatcher::prefix("/users"))
        .with_method_eq("GET");
    assert!(matcher.matches(&route));
    assert!(!is_route().with_method_eq("POST").matches(&route));
}

#[test]
fn test_matcher_valued_property_takes_a_matcher() {
    let matcher: CheckMatcher = is_check().with_rule(anything());
    assert!(matcher.matches(&Check::default()));
}

#[test]
fn test_provenance() {
    assert_eq!(PersonMatcher::BASED_ON, "model::Person");
    assert_eq!(PersonMatcher::GENERATOR, "propmatch");
    assert_eq!(EmptyMatcher::BASED_ON, "model::Empty");
    assert!(PersonMatcher::default().matches(&alice()));
}

#[test]
fn test_generated_files_carry_header() {
    let source = include_str!(concat!(env!("OUT_DIR"), "/model/person_matcher.rs"));
    assert!(source.starts_with(
        "// @generated by propmatch from `model::Person`. Do not edit by hand.\n"
    ));
    assert!(!source.contains("with_checksum"));
}
