use crate::routing::PatternMatcher;
use propmatch_runtime::{Matcher, anything};

#[derive(Debug, Default)]
pub struct Person {
    name: String,
    age: u32,
    tags: Vec<String>,
    active: bool,
}

impl Person {
    pub fn new(name: &str, age: u32) -> Self {
        Person {
            name: name.to_string(),
            age,
            ..Default::default()
        }
    }

    pub fn get_name(&self) -> &String {
        &self.name
    }

    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn get_age(&self) -> u32 {
        self.age
    }

    pub fn get_tags(&self) -> &Vec<String> {
        &self.tags
    }

    pub fn add_tag(&mut self, tag: &str) {
        self.tags.push(tag.to_string());
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn get_checksum(&self) -> u64 {
        self.name.len() as u64 + u64::from(self.age)
    }

    pub fn checksum(&self) -> u64 {
        self.get_checksum()
    }
}

#[derive(Debug, Default)]
pub struct Empty;

#[derive(Debug, Default)]
pub struct Route {
    pattern: PatternMatcher,
    method: String,
}

impl Route {
    pub fn new(method: &str, pattern: PatternMatcher) -> Self {
        Route {
            pattern,
            method: method.to_string(),
        }
    }

    pub fn get_pattern(&self) -> &PatternMatcher {
        &self.pattern
    }

    pub fn get_method(&self) -> &str {
        &self.method
    }
}

/// Holds a rule that is itself a matcher.
pub struct Check {
    rule: Box<dyn Matcher<u32>>,
}

impl Default for Check {
    fn default() -> Self {
        Check {
            rule: Box::new(anything()),
        }
    }
}

impl Check {
    pub fn get_rule(&self) -> &Box<dyn Matcher<u32>> {
        &self.rule
    }
}

pub mod person_matcher {
    include!(concat!(env!("OUT_DIR"), "/model/person_matcher.rs"));
}

pub mod empty_matcher {
    include!(concat!(env!("OUT_DIR"), "/model/empty_matcher.rs"));
}

pub mod route_matcher {
    include!(concat!(env!("OUT_DIR"), "/model/route_matcher.rs"));
}

pub mod check_matcher {
    include!(concat!(env!("OUT_DIR"), "/model/check_matcher.rs"));
}
