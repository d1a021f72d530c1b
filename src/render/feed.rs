use super::{encode_html, html_to_xml, Options};
use crate::types::{BlogPost, ContentExport};

#[derive(Debug, Clone, Copy)]
pub struct FeedOptions<'a> {
    pub title: &'a str,
    /// Absolute url of the site, posts live under `<site_url>/blog/<slug>`.
    pub site_url: &'a str,
}

impl ContentExport {
    /// An atom feed of the published posts, with their full content inlined as xhtml.
    pub fn to_atom_feed(&self, feed: FeedOptions, options: Options) -> String {
        let site_url = feed.site_url.trim_end_matches('/');
        let escaped_site_url = encode_html(site_url);
        let title = encode_html(feed.title);
        let updated = self.latest_update().unwrap_or_default().to_rfc3339();

        let entries: String = self
            .published_posts()
            .iter()
            .map(|post| post.to_atom_entry(site_url, options))
            .collect();

        format!(
            r##"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title>{title}</title>
    <id>{escaped_site_url}/</id>
    <link href="{escaped_site_url}/"/>
    <link rel="self" href="{escaped_site_url}/feed.xml"/>
    <updated>{updated}</updated>
{entries}</feed>
"##
        )
    }
}

impl BlogPost {
    fn to_atom_entry(&self, site_url: &str, options: Options) -> String {
        let url = encode_html(&format!("{site_url}/blog/{}", self.slug()));
        let title = encode_html(&self.title);
        let summary = encode_html(&self.summary(options));
        let published = self.date().to_rfc3339();

        let categories: String = self
            .tags
            .iter()
            .map(|tag| format!(r#"<category term="{}"/>"#, encode_html(tag)))
            .collect();

        let content = html_to_xml(&options.fix_content(&self.content));

        format!(
            r##"    <entry>
        <title>{title}</title>
        <id>{url}</id>
        <link href="{url}"/>
        <published>{published}</published>
        <updated>{published}</updated>
        <summary>{summary}</summary>
        {categories}
        <content type="xhtml"><div xmlns="http://www.w3.org/1999/xhtml">{content}</div></content>
    </entry>
"##
        )
    }
}
