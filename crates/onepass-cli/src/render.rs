//! Plain-text rendering of items and their decrypted content.

use onepass_vault::{Item, ItemContent};

pub fn item_line(item: &Item) -> String {
    let mut line = format!("{} ({})", item.title, item.type_display_name());
    if item.trashed {
        line.push_str(" [trashed]");
    }
    line
}

pub fn content_text(content: &ItemContent) -> String {
    let mut out = String::new();

    if !content.sections.is_empty() {
        out.push_str("Sections:\n");
        for (i, section) in content.sections.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            if !section.title.is_empty() {
                out.push_str(&format!("  {}:\n", section.title));
            }
            for field in &section.fields {
                out.push_str(&format!("    {}: {}\n", field.title, field.value_string()));
            }
        }
    }

    if !content.urls.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("Websites:\n");
        for url in &content.urls {
            out.push_str(&format!("  {}: {}\n", url.label, url.url));
        }
    }

    if !content.form_fields.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("Form Fields:\n");
        for field in &content.form_fields {
            out.push_str(&format!("  {} ({}): {}\n", field.name, field.r#type, field.value));
        }
    }

    if !content.html_action.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!(
            "Form Destination: {} {}\n",
            content.html_method.to_uppercase(),
            content.html_action
        ));
    }

    if !content.notes.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("Notes:\n  {}\n", content.notes));
    }

    out
}
