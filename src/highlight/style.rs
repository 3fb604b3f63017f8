// WHY: formatting snapshot shared with the host and the CSS it renders to
// A default flag or a missing color means the marker inherits the page styling

use serde::{Deserialize, Serialize};

pub const DEFAULT_BACKGROUND: &str = "#ffff00";
pub const DEFAULT_TEXT: &str = "#000000";

const INHERIT: &str = "inherit";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Formatting {
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub use_default_background: bool,
    pub use_default_text: bool,
}

impl Default for Formatting {
    fn default() -> Self {
        Self {
            background_color: Some(DEFAULT_BACKGROUND.to_string()),
            text_color: Some(DEFAULT_TEXT.to_string()),
            use_default_background: false,
            use_default_text: false,
        }
    }
}

impl Formatting {
    /// Overlay the fields present in `patch`
    pub fn apply(&mut self, patch: &FormattingPatch) {
        if let Some(color) = &patch.background_color {
            self.background_color = Some(color.clone());
        }
        if let Some(color) = &patch.text_color {
            self.text_color = Some(color.clone());
        }
        if let Some(flag) = patch.use_default_background {
            self.use_default_background = flag;
        }
        if let Some(flag) = patch.use_default_text {
            self.use_default_text = flag;
        }
    }

    pub fn merged(&self, patch: &FormattingPatch) -> Self {
        let mut merged = self.clone();
        merged.apply(patch);
        merged
    }

    /// CSS value for the marker background
    pub fn background_value(&self) -> &str {
        css_color(self.use_default_background, self.background_color.as_deref())
    }

    /// CSS value for the marker text color
    pub fn text_value(&self) -> &str {
        css_color(self.use_default_text, self.text_color.as_deref())
    }
}

fn css_color(use_default: bool, color: Option<&str>) -> &str {
    match color {
        Some(color) if !use_default && !color.trim().is_empty() => color,
        _ => INHERIT,
    }
}

/// Partial formatting update as sent in change notifications.
///
/// Absent and `null` fields both leave the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormattingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_default_background: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_default_text: Option<bool>,
}

impl From<Formatting> for FormattingPatch {
    fn from(formatting: Formatting) -> Self {
        Self {
            background_color: formatting.background_color,
            text_color: formatting.text_color,
            use_default_background: Some(formatting.use_default_background),
            use_default_text: Some(formatting.use_default_text),
        }
    }
}

/// Stylesheet text for the highlight marker
pub fn stylesheet(formatting: &Formatting) -> String {
    let background = formatting.background_value();
    let text = formatting.text_value();
    format!(
        ".sentence-highlight {{\n  background-color: {background} !important;\n  color: {text} !important;\n  transition: background-color 0.2s;\n  display: inline;\n}}\nli .sentence-highlight {{\n  background-color: {background} !important;\n  color: {text} !important;\n}}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stylesheet_uses_literal_colors() {
        let css = stylesheet(&Formatting::default());
        assert!(css.contains("background-color: #ffff00 !important;"));
        assert!(css.contains("color: #000000 !important;"));
        assert!(css.contains("li .sentence-highlight {"));
        assert!(!css.contains("inherit"));
    }

    #[test]
    fn test_default_flags_inherit() {
        let formatting = Formatting {
            use_default_background: true,
            text_color: None,
            ..Formatting::default()
        };
        assert_eq!(formatting.background_value(), "inherit");
        assert_eq!(formatting.text_value(), "inherit");
        let css = stylesheet(&formatting);
        assert!(css.contains("background-color: inherit !important;"));
        assert!(!css.contains("#ffff00"));
    }

    #[test]
    fn test_json_shape_is_camel_case() {
        let json = serde_json::to_value(Formatting::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "backgroundColor": "#ffff00",
                "textColor": "#000000",
                "useDefaultBackground": false,
                "useDefaultText": false
            })
        );
        let parsed: Formatting =
            serde_json::from_str(r#"{"backgroundColor":null,"useDefaultText":true}"#).unwrap();
        assert_eq!(parsed.background_color, None);
        assert_eq!(parsed.text_color.as_deref(), Some(DEFAULT_TEXT));
        assert!(parsed.use_default_text);
    }

    #[test]
    fn test_patch_overlays_present_fields() {
        let patch: FormattingPatch = serde_json::from_str(r##"{"textColor":"#333333"}"##).unwrap();
        let merged = Formatting::default().merged(&patch);
        assert_eq!(merged.text_color.as_deref(), Some("#333333"));
        assert_eq!(merged.background_color.as_deref(), Some(DEFAULT_BACKGROUND));
        assert_eq!(serde_json::to_string(&patch).unwrap(), r##"{"textColor":"#333333"}"##);
    }
}
