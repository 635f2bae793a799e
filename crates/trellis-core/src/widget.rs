//! Widget classification handed to the platform emitter.

use serde::{Deserialize, Serialize};

/// Orientation of a linear or scrolling container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

/// Native widget or container kind of a rendered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
    Text,
    Button,
    EditText,
    CheckBox,
    RadioButton,
    Spinner,
    Image,
    Space,
    View,
    Frame,
    Linear(Orientation),
    Grid,
    Constraint,
    Relative,
    Scroll(Orientation),
    RadioGroup,
}

impl Widget {
    /// Classify a leaf element from its tag and input type.
    pub fn classify(tag: &str, input_type: Option<&str>, has_text: bool) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "input" => match input_type.unwrap_or("text") {
                "checkbox" => Self::CheckBox,
                "radio" => Self::RadioButton,
                "button" | "submit" | "reset" => Self::Button,
                "image" => Self::Image,
                "hidden" => Self::Space,
                _ => Self::EditText,
            },
            "textarea" => Self::EditText,
            "button" => Self::Button,
            "select" => Self::Spinner,
            "img" | "svg" | "canvas" => Self::Image,
            "#text" | "p" | "span" | "label" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "a"
            | "b" | "strong" | "em" | "i" | "small" | "code" | "pre" | "blockquote" | "li"
            | "td" | "th" | "dt" | "dd" | "figcaption" => Self::Text,
            "hr" | "br" | "wbr" => Self::Space,
            _ if has_text => Self::Text,
            _ => Self::View,
        }
    }

    /// Platform element name used by the emitter.
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::Text => "TextView",
            Self::Button => "Button",
            Self::EditText => "EditText",
            Self::CheckBox => "CheckBox",
            Self::RadioButton => "RadioButton",
            Self::Spinner => "Spinner",
            Self::Image => "ImageView",
            Self::Space => "Space",
            Self::View => "View",
            Self::Frame => "FrameLayout",
            Self::Linear(_) => "LinearLayout",
            Self::Grid => "GridLayout",
            Self::Constraint => "androidx.constraintlayout.widget.ConstraintLayout",
            Self::Relative => "RelativeLayout",
            Self::Scroll(Orientation::Vertical) => "ScrollView",
            Self::Scroll(Orientation::Horizontal) => "HorizontalScrollView",
            Self::RadioGroup => "RadioGroup",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Frame
                | Self::Linear(_)
                | Self::Grid
                | Self::Constraint
                | Self::Relative
                | Self::Scroll(_)
                | Self::RadioGroup
        )
    }

    /// Widgets that display text content.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            Self::Text | Self::Button | Self::EditText | Self::CheckBox | Self::RadioButton
        )
    }

    /// Containers whose children are placed by anchors.
    pub fn is_free_form(&self) -> bool {
        matches!(self, Self::Constraint | Self::Relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(Widget::classify("input", Some("radio"), false), Widget::RadioButton);
        assert_eq!(Widget::classify("INPUT", None, false), Widget::EditText);
        assert_eq!(Widget::classify("div", None, true), Widget::Text);
        assert_eq!(Widget::classify("div", None, false), Widget::View);
        assert_eq!(Widget::classify("select", None, false), Widget::Spinner);
    }

    #[test]
    fn test_element_name() {
        assert_eq!(Widget::Scroll(Orientation::Horizontal).element_name(), "HorizontalScrollView");
        assert!(Widget::Constraint.is_free_form());
        assert!(!Widget::Text.is_container());
    }
}
