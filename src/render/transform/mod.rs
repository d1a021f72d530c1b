mod excerpt;
mod html_to_xml;
mod storage_urls;

pub use excerpt::excerpt;
pub use html_to_xml::html_to_xml;
pub use storage_urls::rewrite_storage_urls;

/// Escapes plain text for use in element content or a quoted attribute value.
pub fn encode_html(text: &str) -> String {
    html_escape::encode_quoted_attribute(text).into_owned()
}
