//! Environment overrides live in their own test binary: env vars are process global.

use std::time::Duration;

use treewalk::application::ApplicationError;
use treewalk::config::Settings;

#[test]
fn given_env_vars_when_loading_then_they_override_settings() {
    // Arrange
    std::env::set_var("TREEWALK_PLAYBACK__INTERVAL_MS", "120");
    std::env::set_var("TREEWALK_LAYOUT__BASE_SPACING", "55");
    std::env::set_var("TREEWALK_BUILDER__DEFAULT_MODE", "preorder");

    // Act
    let settings = Settings::load(None).expect("load");

    // Assert
    assert_eq!(settings.playback.interval(), Duration::from_millis(120));
    assert_eq!(settings.layout.base_spacing, 55.0);
    assert_eq!(settings.builder.default_mode.to_string(), "preorder");

    // Arrange: malformed number
    std::env::set_var("TREEWALK_PLAYBACK__INTERVAL_MS", "soon");

    // Act
    let result = Settings::load(None);

    // Assert
    assert!(matches!(result, Err(ApplicationError::Config { .. })));

    std::env::remove_var("TREEWALK_PLAYBACK__INTERVAL_MS");
    std::env::remove_var("TREEWALK_LAYOUT__BASE_SPACING");
    std::env::remove_var("TREEWALK_BUILDER__DEFAULT_MODE");
}
