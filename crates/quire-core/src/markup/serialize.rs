use super::Attribute;

/// Elements that never have content or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub(crate) fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

pub(crate) fn write_start_tag(out: &mut String, name: &str, attributes: &[Attribute]) {
    out.push('<');
    out.push_str(name);
    for attribute in attributes {
        out.push(' ');
        out.push_str(&attribute.name);
        out.push_str("=\"");
        // values were read from either quote style
        if attribute.value.contains('"') {
            out.push_str(&attribute.value.replace('"', "&quot;"));
        } else {
            out.push_str(&attribute.value);
        }
        out.push('"');
    }
    out.push('>');
}

pub(crate) fn write_end_tag(out: &mut String, name: &str) {
    if is_void(name) {
        return;
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

pub(crate) fn write_comment(out: &mut String, text: &str) {
    out.push_str("<!--");
    out.push_str(text);
    out.push_str("-->");
}

pub(crate) fn write_cdata(out: &mut String, text: &str) {
    out.push_str("<![CDATA[");
    out.push_str(text);
    out.push_str("]]>");
}

pub(crate) fn write_doctype(out: &mut String, text: &str) {
    out.push_str("<!DOCTYPE ");
    out.push_str(text);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_elements() {
        assert!(is_void("br"));
        assert!(is_void("IMG"));
        assert!(!is_void("object"));
    }

    #[test]
    fn test_start_tag_requotes_values() {
        let mut out = String::new();
        write_start_tag(
            &mut out,
            "a",
            &[
                Attribute::from_text("title", "say \"hi\""),
                Attribute {
                    name: "data-x".into(),
                    value: "it\"s".into(),
                },
            ],
        );
        assert_eq!(out, r#"<a title="say &quot;hi&quot;" data-x="it&quot;s">"#);
    }

    #[test]
    fn test_end_tag_skips_void() {
        let mut out = String::new();
        write_end_tag(&mut out, "br");
        write_end_tag(&mut out, "p");
        assert_eq!(out, "</p>");
    }
}
