use super::lexer::{tokenize, Token};
use super::serialize::{
    is_void, write_cdata, write_comment, write_doctype, write_end_tag, write_start_tag,
};
use super::{
    visit_element, wrapper_attributes, Attribute, HtmlResolverConfig, RichTextParser,
    RichTextReplacements, RichTextResolution, Visit,
};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Element {
    name: String,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    CData(String),
    Doctype(String),
}

fn parse_fragment(html: &str) -> Result<Vec<Node>> {
    let mut root: Vec<Node> = Vec::new();
    // elements still waiting for their end tag
    let mut open: Vec<Element> = Vec::new();

    for token in tokenize(html)? {
        let node = match token {
            Token::Open {
                name,
                attributes,
                self_closing,
            } => {
                let element = Element {
                    name,
                    attributes,
                    children: Vec::new(),
                };
                if self_closing || is_void(&element.name) {
                    Node::Element(element)
                } else {
                    open.push(element);
                    continue;
                }
            }
            Token::Close { name } => {
                if let Some(position) = open
                    .iter()
                    .rposition(|e| e.name.eq_ignore_ascii_case(&name))
                {
                    while open.len() > position {
                        close_innermost(&mut open, &mut root);
                    }
                }
                continue;
            }
            Token::Text(text) => Node::Text(text),
            Token::Comment(text) => Node::Comment(text),
            Token::CData(text) => Node::CData(text),
            Token::Doctype(text) => Node::Doctype(text),
        };
        append(&mut open, &mut root, node);
    }

    while !open.is_empty() {
        close_innermost(&mut open, &mut root);
    }

    Ok(root)
}

fn append(open: &mut [Element], root: &mut Vec<Node>, node: Node) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => root.push(node),
    }
}

fn close_innermost(open: &mut Vec<Element>, root: &mut Vec<Node>) {
    if let Some(element) = open.pop() {
        append(open, root, Node::Element(element));
    }
}

fn serialize(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Element(element) => {
                write_start_tag(out, &element.name, &element.attributes);
                serialize(&element.children, out);
                write_end_tag(out, &element.name);
            }
            Node::Text(text) => out.push_str(text),
            Node::Comment(text) => write_comment(out, text),
            Node::CData(text) => write_cdata(out, text),
            Node::Doctype(text) => write_doctype(out, text),
        }
    }
}

fn to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    serialize(nodes, &mut out);
    out
}

/// Backend that owns its tree and splices replacements while recursing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeRichTextParser;

impl TreeRichTextParser {
    fn process(
        &self,
        nodes: &mut Vec<Node>,
        replacements: &dyn RichTextReplacements,
        config: &HtmlResolverConfig,
        result: &mut RichTextResolution,
    ) -> Result<()> {
        let mut index = 0;
        while index < nodes.len() {
            let Node::Element(element) = &mut nodes[index] else {
                index += 1;
                continue;
            };

            let visit = {
                let children = &element.children;
                visit_element(
                    &element.name,
                    &mut element.attributes,
                    || to_html(children),
                    replacements,
                    config,
                    result,
                )?
            };

            match visit {
                Visit::Descend => {
                    self.process(&mut element.children, replacements, config, result)?;
                    index += 1;
                }
                Visit::Wrap(html) => {
                    nodes[index] = Node::Element(Element {
                        name: config.wrapper_tag.clone(),
                        attributes: wrapper_attributes(config),
                        children: parse_fragment(&html)?,
                    });
                    index += 1;
                }
                Visit::Replace(html) => {
                    let fragment = parse_fragment(&html)?;
                    let inserted = fragment.len();
                    nodes.splice(index..=index, fragment);
                    index += inserted;
                }
            }
        }
        Ok(())
    }
}

impl RichTextParser for TreeRichTextParser {
    fn name(&self) -> &'static str {
        "tree"
    }

    fn resolve_rich_text(
        &self,
        html: &str,
        replacements: &dyn RichTextReplacements,
        config: &HtmlResolverConfig,
    ) -> Result<RichTextResolution> {
        let mut nodes = parse_fragment(html)?;
        let mut result = RichTextResolution::default();

        self.process(&mut nodes, replacements, config, &mut result)?;

        result.resolved_html = to_html(&nodes);
        Ok(result)
    }
}
