use super::{encode_html, Options};
use crate::types::ContentExport;

impl ContentExport {
    /// A standalone page with every published post, project and faq entry.
    pub fn to_html_page(&self, site_title: &str, options: Options) -> String {
        let posts: String = self
            .published_posts()
            .iter()
            .map(|post| post.to_html(options))
            .collect();
        let projects: String = self
            .ordered_projects()
            .iter()
            .map(|project| project.to_html(options))
            .collect();
        let faqs: String = self
            .ordered_faqs()
            .iter()
            .map(|faq| faq.to_html(options))
            .collect();

        let content = [
            section("blog", "Blog", &posts),
            section("portfolio", "Portfolio", &projects),
            section("faq", "Frequently asked questions", &faqs),
        ]
        .concat();

        wrap_html(&encode_html(site_title), &content)
    }
}

fn section(id: &str, heading: &str, content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }

    format!(
        r##"
    <section id="{id}">
        <h1>{heading}</h1>
        {content}
    </section>
    "##
    )
}

fn wrap_html(title: &str, content: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8"/>
        <meta name="viewport" content="width=device-width, initial-scale=1.0"/>
        <title>{title}</title>
    </head>
    <body>

        {content}

    </body>
</html>
"##
    )
}
