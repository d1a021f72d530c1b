//! Allowlist-based html sanitization.
//!
//! The input is parsed as a `<body>` fragment and a fresh tree is built from
//! the parts of it the [AllowPolicy] lets through:
//!
//! - text is copied as is (it is escaped again on serialization),
//! - allowed elements are recreated with their allowed attributes only,
//! - other elements are unwrapped, keeping their content in place,
//!   except for [AllowPolicy::clean_content_tags] which are dropped whole,
//! - comments, doctypes and processing instructions are dropped.

mod tree;

use std::{error::Error, sync::OnceLock};

use ammonia::Url;
use html5ever::{tendril::TendrilSink, tree_builder::TreeBuilderOpts, Attribute, ParseOpts};
use markup5ever::{LocalName, Namespace, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::policy::AllowPolicy;

use tree::{serialize_html, CleanElement, CleanNode};

const NOOPENER: &str = "noopener noreferrer";

/// Elements nested deeper than this are flattened into their text.
const MAX_DEPTH: usize = 512;

/// Upper bound on parse and rewrite rounds for a single input.
const MAX_PASSES: usize = 4;

/// Sanitizes `raw` with the default [AllowPolicy].
pub fn sanitize(raw: &str) -> String {
    Sanitizer::global().sanitize(raw)
}

#[derive(Debug, Clone)]
pub struct Sanitizer {
    policy: AllowPolicy,
    base_url: Url,
}

impl Default for Sanitizer {
    fn default() -> Self {
        // Built-in tables: lowercase names, no raw text tags, and a fixed absolute
        // base url. Checked by `policy::tests::default_policy_is_valid`.
        Self::new(AllowPolicy::default()).expect("the default policy should be valid")
    }
}

impl Sanitizer {
    pub fn new(policy: AllowPolicy) -> Result<Self, Box<dyn Error>> {
        policy.validate()?;
        let base_url = policy.base_url()?;

        Ok(Self { policy, base_url })
    }

    /// The process-wide sanitizer, built from the default policy on first use.
    pub fn global() -> &'static Self {
        static SANITIZER: OnceLock<Sanitizer> = OnceLock::new();
        SANITIZER.get_or_init(Sanitizer::default)
    }

    pub fn policy(&self) -> &AllowPolicy {
        &self.policy
    }

    /// Never fails: whatever the parser cannot make sense of is dropped or kept as text.
    ///
    /// Unwrapping can leave nesting the parser never produces, like a `<p>` or an `<a>`
    /// directly inside another one. Such output is parsed and rewritten again until it
    /// stops changing, so sanitizing the result a second time is a no-op.
    pub fn sanitize(&self, raw: &str) -> String {
        let (mut clean, mut restructured) = self.rewrite(raw);

        let mut passes = 1;
        while restructured {
            if passes == MAX_PASSES {
                log::warn!("Html still changing after {MAX_PASSES} passes, keeping the last one.");
                break;
            }
            let (again, _) = self.rewrite(&clean);
            restructured = again != clean;
            clean = again;
            passes += 1;
        }

        clean
    }

    /// One parse and rewrite round. Also reports whether any element was unwrapped.
    fn rewrite(&self, raw: &str) -> (String, bool) {
        let dom = parse_fragment(raw);

        let mut output = vec![];
        let mut unwrapped = false;
        // The fragment is parsed into a wrapping `<html>` element.
        if let Some(root) = dom.document.children.borrow().first() {
            for child in root.children.borrow().iter() {
                self.clean_node(child, 0, &mut output, &mut unwrapped);
            }
        }

        (serialize_html(&output), unwrapped)
    }

    fn clean_node(
        &self,
        node: &Handle,
        depth: usize,
        output: &mut Vec<CleanNode>,
        unwrapped: &mut bool,
    ) {
        match &node.data {
            NodeData::Text { contents } => {
                output.push(CleanNode::Text(contents.borrow().to_string()));
            }
            NodeData::Element { name, attrs, .. } => {
                let tag = name.local.to_lowercase();
                let children = node.children.borrow();

                if self.policy.cleans_content_of(&tag) {
                    log::debug!("Removing <{tag}> together with its content.");
                } else if depth >= MAX_DEPTH {
                    log::warn!("Html nested deeper than {MAX_DEPTH} levels, keeping only its text.");
                    self.collect_text(node, output);
                } else if self.policy.allows_tag(&tag) {
                    let attrs = self.clean_attributes(&tag, &attrs.borrow());
                    let mut element = CleanElement::new(&tag, attrs);
                    for child in children.iter() {
                        self.clean_node(child, depth + 1, &mut element.children, unwrapped);
                    }
                    output.push(CleanNode::Element(element));
                } else {
                    *unwrapped |= !children.is_empty();
                    for child in children.iter() {
                        self.clean_node(child, depth + 1, output, unwrapped);
                    }
                }
            }
            NodeData::Document
            | NodeData::Doctype { .. }
            | NodeData::Comment { .. }
            | NodeData::ProcessingInstruction { .. } => {}
        }
    }

    /// Appends the text below `node` in document order, skipping clean content tags.
    /// Walks with its own stack, the subtree can be arbitrarily deep.
    fn collect_text(&self, node: &Handle, output: &mut Vec<CleanNode>) {
        let mut stack = vec![node.clone()];

        while let Some(node) = stack.pop() {
            match &node.data {
                NodeData::Text { contents } => {
                    output.push(CleanNode::Text(contents.borrow().to_string()));
                }
                NodeData::Element { name, .. }
                    if !self.policy.cleans_content_of(&name.local.to_lowercase()) =>
                {
                    stack.extend(node.children.borrow().iter().rev().cloned());
                }
                _ => {}
            }
        }
    }

    fn clean_attributes(&self, tag: &str, attrs: &[Attribute]) -> Vec<(String, String)> {
        let opens_new_tab = attrs.iter().any(|attribute| {
            attribute.name.local.as_ref().eq_ignore_ascii_case("target")
                && attribute.value.trim().eq_ignore_ascii_case("_blank")
        });

        let mut cleaned: Vec<(String, String)> = vec![];
        let mut force_noopener = false;

        for attribute in attrs {
            let name = attribute.name.local.to_lowercase();
            let value: &str = &attribute.value;

            if !self.policy.allows_attribute(tag, &name) {
                log::debug!("Removing attribute `{name}` from <{tag}>.");
                continue;
            }
            if (name == "href" || name == "src") && !self.allows_url(&name, value) {
                log::debug!("Removing {name}=\"{value}\" from <{tag}>, its url is not allowed.");
                continue;
            }
            if value.to_lowercase().contains("javascript:") {
                log::debug!("Removing attribute `{name}` from <{tag}>, it mentions `javascript:`.");
                continue;
            }
            if name == "style" && !self.policy.allows_style(value) {
                log::debug!("Style attribute with value \"{value}\" found, removing it.");
                continue;
            }

            if name == "href" && opens_new_tab {
                force_noopener = true;
            }
            cleaned.push((name, value.to_string()));
        }

        if force_noopener {
            match cleaned.iter_mut().find(|(name, _)| name == "rel") {
                Some((_, rel)) => *rel = NOOPENER.to_string(),
                None => cleaned.push(("rel".to_string(), NOOPENER.to_string())),
            }
        }

        cleaned
    }

    fn allows_url(&self, attribute: &str, value: &str) -> bool {
        match self.base_url.join(value) {
            Ok(url) => self.policy.allows_scheme(url.scheme()),
            // Relative image paths are left for the page to resolve.
            Err(_) => attribute == "src" && !has_scheme(value),
        }
    }
}

pub(crate) fn has_scheme(url: &str) -> bool {
    url.split(['/', '?', '#'])
        .next()
        .is_some_and(|head| head.contains(':'))
}

/// Parses `content` as the children of a `<body>`, wrapped in an `<html>` element.
pub(crate) fn parse_fragment(content: &str) -> RcDom {
    let context = QualName::new(
        None,
        Namespace::from("http://www.w3.org/1999/xhtml"),
        LocalName::from("body"),
    );

    // Scripting stays off, like in a document from `DOMParser`, so `<noscript>`
    // content is parsed as markup instead of raw text.
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };

    html5ever::parse_fragment(
        RcDom::default(),
        opts,
        context,
        vec![],
    )
    .one(content)
}
