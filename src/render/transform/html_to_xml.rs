use markup5ever_rcdom::{RcDom, SerializableHandle};

use crate::sanitize::parse_fragment;

/// Re-serializes html as xhtml, for embedding in xml documents such as the atom feed.
///
/// Void tags in html look like `<br>`, while in xhtml they need to be closed,
/// and named entities other than the xml ones are not defined.
pub fn html_to_xml(content: &str) -> String {
    let Some(xml) = serialize_xml(parse_fragment(content)) else {
        return String::new();
    };

    // This is serialised as `<html xmlns="http://www.w3.org/1999/xhtml">(content)</html>`
    // but we don't want the wrapping tag.
    xml.split_once('>')
        .and_then(|(_, inner)| inner.strip_suffix("</html>"))
        .unwrap_or_default()
        .to_string()
}

fn serialize_xml(content: RcDom) -> Option<String> {
    let document: SerializableHandle = content.document.into();

    let mut bytes = vec![];
    let result = xml5ever::serialize::serialize(
        &mut bytes,
        &document,
        xml5ever::serialize::SerializeOpts {
            traversal_scope: xml5ever::serialize::TraversalScope::ChildrenOnly(None),
        },
    );
    if let Err(e) = result {
        log::warn!("Failed to serialize xhtml: {e}");
        return None;
    }

    String::from_utf8(bytes).ok()
}
