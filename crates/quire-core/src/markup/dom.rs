use super::lexer::{tokenize, Token};
use super::serialize::{
    is_void, write_cdata, write_comment, write_doctype, write_end_tag, write_start_tag,
};
use super::{
    visit_element, wrapper_attributes, Attribute, HtmlResolverConfig, RichTextParser,
    RichTextReplacements, RichTextResolution, Visit,
};
use crate::error::Result;

/// Index into a [`Document`]'s arena.
type DomId = usize;

#[derive(Debug, Clone)]
enum NodeData {
    Fragment,
    Element {
        name: String,
        attributes: Vec<Attribute>,
    },
    Text(String),
    Comment(String),
    CData(String),
    Doctype(String),
}

#[derive(Debug, Clone)]
struct DomNode {
    data: NodeData,
    parent: Option<DomId>,
    children: Vec<DomId>,
}

/// Arena document. Detached nodes stay in the arena but are unreachable from the root.
#[derive(Debug, Clone)]
struct Document {
    nodes: Vec<DomNode>,
}

impl Document {
    const ROOT: DomId = 0;

    fn parse_fragment(html: &str) -> Result<Self> {
        let mut document = Self {
            nodes: vec![DomNode {
                data: NodeData::Fragment,
                parent: None,
                children: Vec::new(),
            }],
        };
        document.build(Self::ROOT, tokenize(html)?);
        Ok(document)
    }

    fn create(&mut self, data: NodeData) -> DomId {
        self.nodes.push(DomNode {
            data,
            parent: None,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    fn append_child(&mut self, parent: DomId, child: DomId) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    fn build(&mut self, parent: DomId, tokens: Vec<Token>) {
        let mut open: Vec<DomId> = vec![parent];

        for token in tokens {
            let current = *open.last().unwrap_or(&parent);
            match token {
                Token::Open {
                    name,
                    attributes,
                    self_closing,
                } => {
                    let container = !self_closing && !is_void(&name);
                    let id = self.create(NodeData::Element { name, attributes });
                    self.append_child(current, id);
                    if container {
                        open.push(id);
                    }
                }
                Token::Close { name } => {
                    // the bottom of the stack is the fragment itself
                    let position = open.iter().skip(1).rposition(|&id| {
                        matches!(
                            &self.nodes[id].data,
                            NodeData::Element { name: n, .. } if n.eq_ignore_ascii_case(&name)
                        )
                    });
                    if let Some(position) = position {
                        open.truncate(position + 1);
                    }
                }
                Token::Text(text) => {
                    let id = self.create(NodeData::Text(text));
                    self.append_child(current, id);
                }
                Token::Comment(text) => {
                    let id = self.create(NodeData::Comment(text));
                    self.append_child(current, id);
                }
                Token::CData(text) => {
                    let id = self.create(NodeData::CData(text));
                    self.append_child(current, id);
                }
                Token::Doctype(text) => {
                    let id = self.create(NodeData::Doctype(text));
                    self.append_child(current, id);
                }
            }
        }
    }

    /// Parses `html` into this arena and returns the detached top-level nodes.
    fn import_fragment(&mut self, html: &str) -> Result<Vec<DomId>> {
        let holder = self.create(NodeData::Fragment);
        self.build(holder, tokenize(html)?);
        let children = std::mem::take(&mut self.nodes[holder].children);
        for &child in &children {
            self.nodes[child].parent = None;
        }
        Ok(children)
    }

    /// Puts `replacements` where `old` was and detaches `old`.
    fn replace_child(&mut self, old: DomId, replacements: Vec<DomId>) {
        let Some(parent) = self.nodes[old].parent else {
            return;
        };
        for &id in &replacements {
            self.nodes[id].parent = Some(parent);
        }
        let siblings = &mut self.nodes[parent].children;
        if let Some(position) = siblings.iter().position(|&id| id == old) {
            siblings.splice(position..=position, replacements);
        }
        self.nodes[old].parent = None;
    }

    fn inner_html(&self, id: DomId) -> String {
        let mut out = String::new();
        for &child in &self.nodes[id].children {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: DomId, out: &mut String) {
        let node = &self.nodes[id];
        match &node.data {
            NodeData::Fragment => {
                for &child in &node.children {
                    self.write_node(child, out);
                }
            }
            NodeData::Element { name, attributes } => {
                write_start_tag(out, name, attributes);
                for &child in &node.children {
                    self.write_node(child, out);
                }
                write_end_tag(out, name);
            }
            NodeData::Text(text) => out.push_str(text),
            NodeData::Comment(text) => write_comment(out, text),
            NodeData::CData(text) => write_cdata(out, text),
            NodeData::Doctype(text) => write_doctype(out, text),
        }
    }
}

/// Backend that mutates an arena document in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomRichTextParser;

impl DomRichTextParser {
    /// Pre-order walk with an explicit stack. Replacement nodes are never pushed.
    fn process(
        &self,
        document: &mut Document,
        replacements: &dyn RichTextReplacements,
        config: &HtmlResolverConfig,
        result: &mut RichTextResolution,
    ) -> Result<()> {
        let mut pending: Vec<DomId> = document.nodes[Document::ROOT]
            .children
            .iter()
            .rev()
            .copied()
            .collect();

        while let Some(id) = pending.pop() {
            let (name, mut attributes) = match &document.nodes[id].data {
                NodeData::Element { name, attributes } => (name.clone(), attributes.clone()),
                _ => continue,
            };

            let visit = visit_element(
                &name,
                &mut attributes,
                || document.inner_html(id),
                replacements,
                config,
                result,
            )?;

            if let NodeData::Element {
                attributes: stored, ..
            } = &mut document.nodes[id].data
            {
                *stored = attributes;
            }

            match visit {
                Visit::Descend => {
                    pending.extend(document.nodes[id].children.iter().rev().copied());
                }
                Visit::Wrap(html) => {
                    let wrapper = document.create(NodeData::Element {
                        name: config.wrapper_tag.clone(),
                        attributes: wrapper_attributes(config),
                    });
                    for child in document.import_fragment(&html)? {
                        document.append_child(wrapper, child);
                    }
                    document.replace_child(id, vec![wrapper]);
                }
                Visit::Replace(html) => {
                    let nodes = document.import_fragment(&html)?;
                    document.replace_child(id, nodes);
                }
            }
        }

        Ok(())
    }
}

impl RichTextParser for DomRichTextParser {
    fn name(&self) -> &'static str {
        "dom"
    }

    fn resolve_rich_text(
        &self,
        html: &str,
        replacements: &dyn RichTextReplacements,
        config: &HtmlResolverConfig,
    ) -> Result<RichTextResolution> {
        let mut document = Document::parse_fragment(html)?;
        let mut result = RichTextResolution::default();

        self.process(&mut document, replacements, config, &mut result)?;

        result.resolved_html = document.inner_html(Document::ROOT);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let html = r#"<p>Hello <b>world</b><br><img src="a.png"></p><!--c-->"#;
        let document = Document::parse_fragment(html).unwrap();
        assert_eq!(document.inner_html(Document::ROOT), html);
    }

    #[test]
    fn test_unclosed_and_stray_tags() {
        let document = Document::parse_fragment("<p>one<b>two</p>three</i>").unwrap();
        assert_eq!(document.inner_html(Document::ROOT), "<p>one<b>two</b></p>three");
    }

    #[test]
    fn test_replace_child_keeps_sibling_order() {
        let mut document = Document::parse_fragment("<p>a<i>b</i>c</p>").unwrap();
        let p = document.nodes[Document::ROOT].children[0];
        let i = document.nodes[p].children[1];

        let nodes = document.import_fragment("<b>x</b><b>y</b>").unwrap();
        document.replace_child(i, nodes);

        assert_eq!(document.inner_html(Document::ROOT), "<p>a<b>x</b><b>y</b>c</p>");
        assert_eq!(document.nodes[i].parent, None);
    }

    #[test]
    fn test_self_closing_element_serializes_with_end_tag() {
        let document = Document::parse_fragment("<object data-codename=\"x\"/>").unwrap();
        assert_eq!(
            document.inner_html(Document::ROOT),
            "<object data-codename=\"x\"></object>"
        );
    }
}
