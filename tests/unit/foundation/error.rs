use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StoryError::invalid_input("x")
            .to_string()
            .contains("invalid input:")
    );
    assert!(
        StoryError::invalid_pattern("XL")
            .to_string()
            .contains("invalid noise pattern:")
    );
    assert!(
        StoryError::resource_settings("x")
            .to_string()
            .contains("invalid resource settings:")
    );
    assert!(
        StoryError::resource_load("x")
            .to_string()
            .contains("resource load error:")
    );
    assert!(
        StoryError::corrupt_store("x")
            .to_string()
            .contains("corrupt choice store:")
    );
    assert!(StoryError::EmptyOptions.to_string().contains("empty options"));
}

#[test]
fn io_and_other_preserve_source() {
    let err: StoryError = std::io::Error::other("disk full").into();
    assert!(matches!(err, StoryError::Io(_)));
    assert!(err.to_string().contains("disk full"));

    let err = StoryError::Other(anyhow::anyhow!("boom"));
    assert!(err.to_string().contains("boom"));
}
