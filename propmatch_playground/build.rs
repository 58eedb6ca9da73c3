fn main() {
    let report = propmatch_core::tooling::generate().expect("Matcher generation failed");
    if !report.is_success() {
        panic!("Matcher generation reported failures: {:#?}", report.failures);
    }
    println!("cargo:rerun-if-changed=src/");
    println!("cargo:rerun-if-changed=propmatch.toml");
}
