//! Beans whose matchers are generated by `build.rs` and mounted from `OUT_DIR`.

pub mod model;
pub mod routing;
