//! Names and defaults of the per-deployment flags.

use serde::{Deserialize, Serialize};

pub const REQUIRE_MODERATION: &str = "require-moderation";
pub const REQUIRE_SIGN_IN: &str = "require-sign-in";

/// Value a key is initialised to the first time it is read.
pub fn default_value(key: &str) -> Option<&'static str> {
    match key {
        REQUIRE_MODERATION => Some("true"),
        REQUIRE_SIGN_IN => Some("true"),
        _ => None,
    }
}

/// Anything other than the literal `false` counts as on.
pub fn parse_flag(value: &str) -> bool {
    value != "false"
}

pub fn format_flag(flag: bool) -> &'static str {
    if flag {
        "true"
    } else {
        "false"
    }
}

/// HTML checkboxes submit `on` when ticked and nothing otherwise.
pub fn checkbox(value: Option<&str>) -> bool {
    value == Some("on")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub require_moderation: bool,
    pub require_sign_in: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            require_moderation: true,
            require_sign_in: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_settings_default() {
        let s = Settings::default();
        assert_eq!(default_value(REQUIRE_MODERATION).map(parse_flag), Some(s.require_moderation));
        assert_eq!(default_value(REQUIRE_SIGN_IN).map(parse_flag), Some(s.require_sign_in));
        assert_eq!(default_value("csrf-key"), None);
    }

    #[test]
    fn flags_default_to_on() {
        assert!(parse_flag("true"));
        assert!(parse_flag(""));
        assert!(!parse_flag("false"));
    }

    #[test]
    fn checkbox_normalisation() {
        assert!(checkbox(Some("on")));
        assert!(!checkbox(Some("off")));
        assert!(!checkbox(Some("")));
        assert!(!checkbox(None));
    }
}
