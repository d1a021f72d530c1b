//! Html for the content records.
//!
//! Plain fields are escaped, rich text fields go through the [Sanitizer].

mod feed;
mod html;
mod transform;

pub use feed::FeedOptions;
pub use transform::{encode_html, excerpt, html_to_xml, rewrite_storage_urls};

use crate::{
    types::{BlogPost, FaqEntry, Project},
    Sanitizer,
};

const DATE_FORMAT: &str = "%B %-d, %Y";

#[derive(Debug, Clone, Copy)]
pub struct Options<'a> {
    pub sanitizer: &'a Sanitizer,
    /// Public url of the storage bucket that bare image paths live in.
    pub storage_url: Option<&'a str>,
    /// Maximum number of characters in generated post excerpts.
    pub excerpt_length: usize,
}

impl Default for Options<'static> {
    fn default() -> Self {
        Self {
            sanitizer: Sanitizer::global(),
            storage_url: None,
            excerpt_length: 160,
        }
    }
}

impl Options<'_> {
    /// Sanitizes rich text and resolves its storage images.
    fn fix_content(&self, content: &str) -> String {
        let content = self.sanitizer.sanitize(content);

        match self.storage_url {
            Some(storage_url) => rewrite_storage_urls(&content, storage_url),
            None => content,
        }
    }

    fn image(&self, url: &str, alt: &str) -> String {
        let url = encode_html(url);
        let alt = encode_html(alt);
        self.fix_content(&format!(r#"<img src="{url}" alt="{alt}" loading="lazy">"#))
    }
}

impl BlogPost {
    /// The excerpt set by the editor, or one taken from the start of the content.
    pub fn summary(&self, options: Options) -> String {
        match self.excerpt.as_deref().map(str::trim) {
            Some(excerpt) if !excerpt.is_empty() => excerpt.to_string(),
            _ => excerpt(
                &options.sanitizer.sanitize(&self.content),
                options.excerpt_length,
            ),
        }
    }

    pub fn to_html(&self, options: Options) -> String {
        let slug = encode_html(&self.slug());
        let title = encode_html(&self.title);
        let summary = encode_html(&self.summary(options));

        let date = self.date();
        let datetime = date.to_rfc3339();
        let formatted_date = date.format(DATE_FORMAT);

        let cover = self
            .cover_image
            .as_deref()
            .map(|url| options.image(url, &self.title))
            .map(|image| format!(r#"<figure class="cover">{image}</figure>"#))
            .unwrap_or_default();

        let content = options.fix_content(&self.content);

        let tags = list("tags", &self.tags);

        format!(
            r##"
    <article class="post" id="post-{slug}">
        <h2><a href="/blog/{slug}">{title}</a></h2>
        <time datetime="{datetime}">{formatted_date}</time>
        {cover}
        <p class="excerpt">{summary}</p>
        <div class="content">{content}</div>
        {tags}
    </article>
    "##
        )
    }
}

impl Project {
    pub fn to_html(&self, options: Options) -> String {
        let slug = encode_html(&self.slug());
        let title = encode_html(&self.title);

        let class = if self.featured {
            "project featured"
        } else {
            "project"
        };

        let image = self
            .image_url
            .as_deref()
            .map(|url| options.image(url, &self.title))
            .unwrap_or_default();

        let description = options.fix_content(&self.description);

        let technologies = list("technologies", &self.technologies);

        let link = self
            .live_url
            .as_deref()
            .map(|url| {
                let url = encode_html(url);
                options.fix_content(&format!(
                    r#"<p class="live"><a href="{url}" target="_blank">Visit {title}</a></p>"#
                ))
            })
            .unwrap_or_default();

        format!(
            r##"
    <article class="{class}" id="project-{slug}">
        {image}
        <h3>{title}</h3>
        <div class="description">{description}</div>
        {technologies}
        {link}
    </article>
    "##
        )
    }
}

impl FaqEntry {
    pub fn to_html(&self, options: Options) -> String {
        let question = encode_html(&self.question);
        let answer = options.fix_content(&self.answer);

        format!(
            r##"
    <details class="faq">
        <summary>{question}</summary>
        <div class="answer">{answer}</div>
    </details>
    "##
        )
    }
}

fn list(class: &str, items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }

    let items: String = items
        .iter()
        .map(|item| format!("<li>{}</li>", encode_html(item)))
        .collect();

    format!(r#"<ul class="{class}">{items}</ul>"#)
}
