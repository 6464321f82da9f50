use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CliptrackError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        CliptrackError::config("x")
            .to_string()
            .contains("config error:")
    );
    assert!(
        CliptrackError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CliptrackError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
