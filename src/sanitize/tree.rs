use std::io;

use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope};
use markup5ever::{LocalName, Namespace, QualName};

const XHTML: &str = "http://www.w3.org/1999/xhtml";

/// A node of the rebuilt output tree.
///
/// This is deliberately disjoint from the parsed dom: nothing from the input
/// reaches the output unless it was copied here by the sanitizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CleanNode {
    Text(String),
    Element(CleanElement),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CleanElement {
    name: QualName,
    attrs: Vec<(QualName, String)>,
    pub(crate) children: Vec<CleanNode>,
}

impl CleanElement {
    pub(crate) fn new(tag: &str, attrs: Vec<(String, String)>) -> Self {
        let attrs = attrs
            .into_iter()
            .map(|(name, value)| (attribute_name(&name), value))
            .collect();

        Self {
            name: QualName::new(None, Namespace::from(XHTML), LocalName::from(tag)),
            attrs,
            children: vec![],
        }
    }

    /// The parser drops a single newline right after `<pre>`, so one has to be
    /// added back if the content itself starts with a newline.
    fn leading_newline_is_eaten(&self) -> bool {
        matches!(&*self.name.local, "pre" | "listing")
            && matches!(self.children.first(), Some(CleanNode::Text(text)) if text.starts_with('\n'))
    }
}

fn attribute_name(name: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(name))
}

impl Serialize for CleanNode {
    fn serialize<S>(&self, serializer: &mut S, _traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        match self {
            CleanNode::Text(text) => serializer.write_text(text),
            CleanNode::Element(element) => {
                serializer.start_elem(
                    element.name.clone(),
                    element
                        .attrs
                        .iter()
                        .map(|(name, value)| (name, value.as_str())),
                )?;

                if element.leading_newline_is_eaten() {
                    serializer.write_text("\n")?;
                }
                for child in &element.children {
                    child.serialize(serializer, TraversalScope::IncludeNode)?;
                }

                serializer.end_elem(element.name.clone())
            }
        }
    }
}

struct Fragment<'a>(&'a [CleanNode]);

impl Serialize for Fragment<'_> {
    fn serialize<S>(&self, serializer: &mut S, _traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        for node in self.0 {
            node.serialize(serializer, TraversalScope::IncludeNode)?;
        }
        Ok(())
    }
}

/// Serializes the nodes as an html fragment.
///
/// Writing into a `Vec` cannot fail, but if the serializer ever does the
/// content is dropped rather than partially emitted.
pub(crate) fn serialize_html(nodes: &[CleanNode]) -> String {
    let mut bytes = vec![];

    let result = html5ever::serialize(
        &mut bytes,
        &Fragment(nodes),
        SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..SerializeOpts::default()
        },
    );
    if let Err(e) = result {
        log::warn!("Failed to serialize sanitized html, dropping it: {e}");
        return String::new();
    }

    String::from_utf8(bytes).unwrap_or_else(|e| {
        log::warn!("Serialized html is not valid utf-8, dropping it: {e}");
        String::new()
    })
}
