use super::Attribute;
use crate::error::{QuireError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

/// Flat token stream of an HTML fragment.
///
/// Text, comments and attribute values stay in their escaped source form so
/// that untouched markup serializes back byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Open {
        name: String,
        attributes: Vec<Attribute>,
        self_closing: bool,
    },
    Close {
        name: String,
    },
    Text(String),
    Comment(String),
    CData(String),
    Doctype(String),
}

pub(crate) fn tokenize(html: &str) -> Result<Vec<Token>> {
    let html = escape_stray_lt(html);
    let mut reader = Reader::from_str(&html);
    let config = reader.config_mut();
    config.trim_text(false);
    // HTML void elements never close, stray end tags are dropped by the tree builders.
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut tokens = Vec::new();
    loop {
        let event = reader.read_event().map_err(|e| {
            QuireError::Markup(format!(
                "failed to parse rich text at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(start) => tokens.push(open(&start, false)?),
            Event::Empty(start) => tokens.push(open(&start, true)?),
            Event::End(end) => tokens.push(Token::Close {
                name: utf8(end.name().as_ref())?,
            }),
            Event::Text(text) => tokens.push(Token::Text(utf8(&text)?)),
            Event::CData(cdata) => tokens.push(Token::CData(utf8(&cdata)?)),
            Event::Comment(comment) => tokens.push(Token::Comment(utf8(&comment)?)),
            Event::DocType(doctype) => {
                tokens.push(Token::Doctype(utf8(&doctype)?.trim().to_string()))
            }
            Event::Eof => break,
            // declarations and processing instructions have no place in rich text
            _ => {}
        }
    }

    Ok(tokens)
}

/// Escapes every `<` in text that cannot open a tag, such as `x < y`.
///
/// Comments, CDATA sections and quoted attribute values are copied as they are.
fn escape_stray_lt(html: &str) -> Cow<'_, str> {
    let bytes = html.as_bytes();
    let mut escaped: Option<String> = None;
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        match bytes.get(i + 1) {
            Some(b) if b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?') => {
                i = markup_end(html, i);
            }
            _ => {
                let out = escaped.get_or_insert_with(|| String::with_capacity(html.len() + 8));
                out.push_str(&html[copied..i]);
                out.push_str("&lt;");
                i += 1;
                copied = i;
            }
        }
    }

    match escaped {
        Some(mut out) => {
            out.push_str(&html[copied..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(html),
    }
}

/// Index just past the comment, CDATA section or tag opening at `start`.
fn markup_end(html: &str, start: usize) -> usize {
    let rest = &html[start..];
    let (open, close) = if rest.starts_with("<!--") {
        ("<!--", "-->")
    } else if rest.starts_with("<![CDATA[") {
        ("<![CDATA[", "]]>")
    } else {
        return tag_end(html.as_bytes(), start);
    };

    match rest[open.len()..].find(close) {
        Some(at) => start + open.len() + at + close.len(),
        None => html.len(),
    }
}

fn tag_end(bytes: &[u8], start: usize) -> usize {
    let mut quote = None;
    for (i, &b) in bytes.iter().enumerate().skip(start + 1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return i + 1,
            None => {}
        }
    }
    bytes.len()
}

fn open(start: &BytesStart<'_>, self_closing: bool) -> Result<Token> {
    let name = utf8(start.name().as_ref())?;
    let mut attributes = Vec::new();
    for attribute in start.html_attributes() {
        let attribute = attribute.map_err(|e| {
            QuireError::Markup(format!("invalid attribute on <{}>: {}", name, e))
        })?;
        attributes.push(Attribute {
            name: utf8(attribute.key.as_ref())?,
            value: utf8(&attribute.value)?,
        });
    }

    Ok(Token::Open {
        name,
        attributes,
        self_closing,
    })
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| QuireError::Markup(format!("invalid UTF-8 in rich text: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str, value: &str) -> Attribute {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }

    #[test]
    fn test_tokenize_keeps_text_escaped() {
        let tokens = tokenize("<p>Fish &amp; chips</p>").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Open {
                    name: "p".into(),
                    attributes: vec![],
                    self_closing: false
                },
                Token::Text("Fish &amp; chips".into()),
                Token::Close { name: "p".into() },
            ]
        );
    }

    #[test]
    fn test_tokenize_attributes_in_order() {
        let tokens = tokenize(r#"<a data-item-id="42" href="">Tom</a>"#).unwrap();
        match &tokens[0] {
            Token::Open { name, attributes, .. } => {
                assert_eq!(name, "a");
                assert_eq!(attributes, &vec![attr("data-item-id", "42"), attr("href", "")]);
            }
            other => panic!("unexpected token {:?}", other),
        }
    }

    #[test]
    fn test_tokenize_tolerates_html_shapes() {
        let tokens = tokenize(r#"<p>a<br>b</p></div><img src="x.png"/>"#).unwrap();
        assert!(tokens.contains(&Token::Close { name: "div".into() }));
        assert!(tokens.iter().any(|t| matches!(
            t,
            Token::Open { name, self_closing: false, .. } if name == "br"
        )));
    }

    #[test]
    fn test_tokenize_comments() {
        let tokens = tokenize("<!-- note --><p>x</p>").unwrap();
        assert_eq!(tokens[0], Token::Comment(" note ".into()));
    }

    #[test]
    fn test_stray_lt_is_escaped() {
        assert_eq!(escape_stray_lt("<p>x < y</p>"), "<p>x &lt; y</p>");
        assert_eq!(escape_stray_lt("a <3 b<"), "a &lt;3 b&lt;");
        assert!(matches!(escape_stray_lt("<p>plain</p>"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_stray_lt_skips_comments_cdata_and_attributes() {
        let html = r#"<!-- a < b --><![CDATA[ 1 < 2 ]]><p title="a < b" data-x='1 > 0'>c</p>"#;
        assert_eq!(escape_stray_lt(html), html);
    }

    #[test]
    fn test_tokenize_stray_lt_stays_text() {
        let tokens = tokenize("<p>x < y</p>").unwrap();
        assert_eq!(tokens[1], Token::Text("x &lt; y".into()));
        assert_eq!(tokens[2], Token::Close { name: "p".into() });
        assert_eq!(tokens.len(), 3);
    }
}
