//! The allowlist that drives [crate::Sanitizer].

use std::{
    collections::{BTreeMap, BTreeSet},
    error::Error,
    path::Path,
};

use ammonia::Url;
use serde::{Deserialize, Serialize};

/// Key in [AllowPolicy::allowed_attributes] whose attributes are allowed on every tag.
pub const WILDCARD: &str = "*";

/// Elements whose text content the html serializer writes out unescaped.
/// Allowing any of them would let escaped text turn back into live markup.
const RAW_TEXT_TAGS: [&str; 10] = [
    "iframe",
    "noembed",
    "noframes",
    "noscript",
    "plaintext",
    "script",
    "style",
    "textarea",
    "title",
    "xmp",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllowPolicy {
    /// Lowercase tag names that survive sanitization.
    pub allowed_tags: BTreeSet<String>,
    /// Tag name (or [WILDCARD]) to the attribute names allowed on it.
    pub allowed_attributes: BTreeMap<String, BTreeSet<String>>,
    /// Schemes allowed in `href` and `src` values, without the trailing colon.
    pub allowed_url_schemes: BTreeSet<String>,
    /// Tags that are removed together with everything inside them,
    /// instead of being unwrapped.
    #[serde(default = "default_clean_content_tags")]
    pub clean_content_tags: BTreeSet<String>,
    /// Origin that relative urls are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// If set, `style` attributes are only kept when their value is one of these.
    #[serde(default)]
    pub allowed_styles: Option<BTreeSet<String>>,
}

impl Default for AllowPolicy {
    fn default() -> Self {
        let allowed_attributes = DEFAULT_ATTRIBUTES
            .iter()
            .map(|(tag, attributes)| (tag.to_string(), to_set(attributes)))
            .collect();

        Self {
            allowed_tags: to_set(&DEFAULT_TAGS),
            allowed_attributes,
            allowed_url_schemes: to_set(&["http", "https", "mailto"]),
            clean_content_tags: default_clean_content_tags(),
            base_url: default_base_url(),
            allowed_styles: None,
        }
    }
}

impl AllowPolicy {
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let policy: Self = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let json = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Could not read policy {:?}: {e}", path.as_ref()))?;
        Self::from_json(&json)
    }

    /// Checks the invariants the sanitizer relies on to produce inert output.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        for tag in &self.allowed_tags {
            if tag != &tag.to_lowercase() {
                Err(format!("Allowed tag `{tag}` must be lowercase."))?
            }
            if RAW_TEXT_TAGS.contains(&tag.as_str()) {
                Err(format!("Tag `{tag}` cannot be allowed, its text is not escaped."))?
            }
            if self.clean_content_tags.contains(tag) {
                Err(format!(
                    "Tag `{tag}` cannot be both allowed and have its content cleaned."
                ))?
            }
        }

        for (tag, attributes) in &self.allowed_attributes {
            if let Some(attribute) = attributes.iter().find(|a| **a != a.to_lowercase()) {
                Err(format!(
                    "Attribute `{attribute}` allowed on `{tag}` must be lowercase."
                ))?
            }
        }

        self.base_url()?;

        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, Box<dyn Error>> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid base url `{}`: {e}", self.base_url))?;
        if url.cannot_be_a_base() {
            Err(format!("Base url `{}` cannot be a base.", self.base_url))?
        }
        Ok(url)
    }

    pub fn allows_tag(&self, tag: &str) -> bool {
        self.allowed_tags.contains(tag)
    }

    pub fn cleans_content_of(&self, tag: &str) -> bool {
        self.clean_content_tags.contains(tag)
    }

    pub fn allows_attribute(&self, tag: &str, attribute: &str) -> bool {
        [tag, WILDCARD].iter().any(|key| {
            self.allowed_attributes
                .get(*key)
                .is_some_and(|attributes| attributes.contains(attribute))
        })
    }

    pub fn allows_scheme(&self, scheme: &str) -> bool {
        self.allowed_url_schemes.contains(scheme)
    }

    pub fn allows_style(&self, style: &str) -> bool {
        match &self.allowed_styles {
            Some(styles) => styles.contains(style.trim()),
            None => true,
        }
    }
}

fn to_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn default_clean_content_tags() -> BTreeSet<String> {
    to_set(&["script", "style"])
}

fn default_base_url() -> String {
    "https://example.com/".to_string()
}

const DEFAULT_TAGS: [&str; 44] = [
    "a",
    "abbr",
    "b",
    "blockquote",
    "br",
    "caption",
    "code",
    "del",
    "div",
    "em",
    "figcaption",
    "figure",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "i",
    "img",
    "ins",
    "kbd",
    "li",
    "mark",
    "ol",
    "p",
    "pre",
    "q",
    "s",
    "small",
    "span",
    "strong",
    "sub",
    "sup",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "u",
    "ul",
];

const DEFAULT_ATTRIBUTES: [(&str, &[&str]); 8] = [
    (WILDCARD, &["class", "style", "title"]),
    ("a", &["href", "target", "rel"]),
    ("img", &["src", "alt", "width", "height", "loading"]),
    ("td", &["colspan", "rowspan"]),
    ("th", &["colspan", "rowspan"]),
    ("ol", &["start"]),
    ("q", &["cite"]),
    ("blockquote", &["cite"]),
];
