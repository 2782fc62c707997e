use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(SynthError::parse("x").to_string().contains("parse error:"));
    assert!(
        SynthError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(SynthError::backend("x").to_string().contains("backend error:"));
    assert!(SynthError::io("x").to_string().contains("io error:"));
}

#[test]
fn diagnostic_drops_category_prefix() {
    let err = SynthError::validation("patchsize must be an odd number!");
    assert_eq!(err.diagnostic(), "patchsize must be an odd number!");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SynthError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert!(err.diagnostic().contains("boom"));
}
