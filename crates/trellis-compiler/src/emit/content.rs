//! Widget content: text, inputs, spinner entries and images.

use trellis_core::{AttributeStore, Namespace, Node, Widget};
use trellis_resources::ResourceTables;

use super::Emitter;

/// Font weight from which text is emitted bold.
const BOLD_WEIGHT: u16 = 600;

pub(super) fn content(emitter: &Emitter<'_>, node: &Node, tables: &mut ResourceTables, out: &mut AttributeStore) {
    match node.widget {
        Widget::Text | Widget::Button | Widget::CheckBox | Widget::RadioButton => {
            let label = node.text.as_deref().or_else(|| node.property("value"));
            if let Some(label) = label.and_then(collapse_whitespace) {
                out.set(Namespace::Android, "text", format!("@string/{}", tables.add_string(&label)));
            }
            if node.property("checked").is_some() {
                out.set(Namespace::Android, "checked", "true");
            }
            appearance(emitter, node, tables, out);
        }
        Widget::EditText => {
            if let Some(value) = node.property("value").and_then(collapse_whitespace) {
                out.set(Namespace::Android, "text", format!("@string/{}", tables.add_string(&value)));
            }
            if let Some(hint) = node.property("placeholder").and_then(collapse_whitespace) {
                out.set(Namespace::Android, "hint", format!("@string/{}", tables.add_string(&hint)));
            }
            out.set(Namespace::Android, "inputType", input_type(node));
            appearance(emitter, node, tables, out);
        }
        Widget::Spinner if !node.options.is_empty() => {
            let name = tables.add_string_array(&node.options);
            out.set(Namespace::Android, "entries", format!("@array/{name}"));
        }
        Widget::Image => {
            if let Some(source) = node.property("src").filter(|s| !s.trim().is_empty()) {
                out.set(Namespace::Android, "src", format!("@drawable/{}", tables.add_image(source)));
            }
            if let Some(alt) = node.property("alt").and_then(collapse_whitespace) {
                out.set(Namespace::Android, "contentDescription", format!("@string/{}", tables.add_string(&alt)));
            }
        }
        _ => {}
    }
}

/// Color, size, weight and alignment of text.
fn appearance(emitter: &Emitter<'_>, node: &Node, tables: &mut ResourceTables, out: &mut AttributeStore) {
    let style = &node.style;
    if let Some(name) = style.get("color").and_then(|css| tables.add_color(css)) {
        out.set(Namespace::Android, "textColor", format!("@color/{name}"));
    }
    if let Some(size) = style.length("font-size").filter(|s| *s > 0.0) {
        out.set(Namespace::Android, "textSize", emitter.settings.format_sp(size));
    }
    let bold = style.font_weight() >= BOLD_WEIGHT;
    let italic = style.is("font-style", "italic") || style.is("font-style", "oblique");
    let text_style = match (bold, italic) {
        (true, true) => Some("bold|italic"),
        (true, false) => Some("bold"),
        (false, true) => Some("italic"),
        (false, false) => None,
    };
    if let Some(text_style) = text_style {
        out.set(Namespace::Android, "textStyle", text_style);
    }
    let gravity = match style.get("text-align") {
        Some("center") => Some("center_horizontal"),
        Some("right") | Some("end") => Some("end"),
        _ => None,
    };
    if let Some(gravity) = gravity {
        out.set(Namespace::Android, "gravity", gravity);
    }
}

fn input_type(node: &Node) -> &'static str {
    if node.tag == "textarea" {
        return "textMultiLine";
    }
    match node.property("type").unwrap_or("text") {
        "email" => "textEmailAddress",
        "password" => "textPassword",
        "number" => "number",
        "tel" => "phone",
        "url" => "textUri",
        "date" => "date",
        _ => "text",
    }
}

/// Rendered text collapses runs of whitespace. `None` when nothing is left.
fn collapse_whitespace(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}
