/// Provenance of a matcher produced by the `propmatch` generator.
///
/// Every generated matcher implements this trait. The generator also uses
/// it to recognise its own output and never generates a matcher for a
/// matcher.
pub trait GeneratedMatcher {
    /// Path of the bean type the matcher was generated from.
    const BASED_ON: &'static str;

    /// Name of the generator that produced the matcher.
    const GENERATOR: &'static str;
}
