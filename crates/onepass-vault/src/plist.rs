//! Minimal XML plist emitter for the `1password.keys` mirror file.
//!
//! The mirror only ever contains dictionaries, arrays, integers, strings and
//! base64 data, so a schema-following emitter is all that is needed.

use base64::{engine::general_purpose::STANDARD, Engine};

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const DOCTYPE: &str = r#"<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">"#;

/// A plist value tree. Dictionary entries keep their insertion order, which
/// follows the declaration order of the source struct fields.
#[derive(Debug, Clone)]
pub(crate) enum PlistValue {
    Dict(Vec<(String, PlistValue)>),
    Array(Vec<PlistValue>),
    /// Byte arrays are mirrored as base64 in a `<string>` element, matching
    /// their JSON representation.
    Data(Vec<u8>),
    Integer(i64),
    String(String),
}

/// Render a value tree as a complete plist document.
pub(crate) fn marshal_plist(root: &PlistValue) -> String {
    let mut out = String::new();
    out.push_str(XML_HEADER);
    out.push('\n');
    out.push_str(DOCTYPE);
    out.push('\n');
    out.push_str("<plist version=\"1.0\">\n");
    emit(root, 1, &mut out);
    out.push_str("</plist>\n");
    out
}

fn emit(value: &PlistValue, depth: usize, out: &mut String) {
    match value {
        PlistValue::Dict(entries) => {
            push_line(out, depth, "<dict>");
            for (key, child) in entries {
                push_line(out, depth + 1, &format!("<key>{}</key>", escape(key)));
                emit(child, depth + 1, out);
            }
            push_line(out, depth, "</dict>");
        }
        PlistValue::Array(values) => {
            push_line(out, depth, "<array>");
            for child in values {
                emit(child, depth + 1, out);
            }
            push_line(out, depth, "</array>");
        }
        PlistValue::Data(bytes) => {
            push_line(
                out,
                depth,
                &format!("<string>{}</string>", STANDARD.encode(bytes)),
            );
        }
        PlistValue::Integer(n) => {
            push_line(out, depth, &format!("<integer>{n}</integer>"));
        }
        PlistValue::String(s) => {
            push_line(out, depth, &format!("<string>{}</string>", escape(s)));
        }
    }
}

fn push_line(out: &mut String, depth: usize, line: &str) {
    for _ in 0..depth {
        out.push('\t');
    }
    out.push_str(line);
    out.push('\n');
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marshals_nested_structures() {
        let root = PlistValue::Dict(vec![
            ("IntField".to_owned(), PlistValue::Integer(42)),
            (
                "StrField".to_owned(),
                PlistValue::String("test-string".to_owned()),
            ),
            ("DataField".to_owned(), PlistValue::Data(b"ABC".to_vec())),
            (
                "StructArray".to_owned(),
                PlistValue::Array(vec![
                    PlistValue::Dict(vec![(
                        "IntField".to_owned(),
                        PlistValue::Integer(1),
                    )]),
                    PlistValue::Dict(vec![(
                        "IntField".to_owned(),
                        PlistValue::Integer(2),
                    )]),
                ]),
            ),
        ]);

        let data = marshal_plist(&root);
        assert!(data.starts_with(XML_HEADER));
        assert!(data.contains(DOCTYPE));
        assert!(data.contains("\t<dict>\n"));
        assert!(data.contains("\t\t<key>IntField</key>\n\t\t<integer>42</integer>\n"));
        assert!(data.contains("\t\t<key>StrField</key>\n\t\t<string>test-string</string>\n"));
        assert!(data.contains("\t\t<key>DataField</key>\n\t\t<string>QUJD</string>\n"));
        assert!(data.contains("\t\t<array>\n\t\t\t<dict>\n"));
        assert!(data.ends_with("</plist>\n"));
    }

    #[test]
    fn escapes_xml_metacharacters() {
        let root = PlistValue::Dict(vec![(
            "note".to_owned(),
            PlistValue::String("a < b & c > d".to_owned()),
        )]);
        let data = marshal_plist(&root);
        assert!(data.contains("<string>a &lt; b &amp; c &gt; d</string>"));
    }
}
