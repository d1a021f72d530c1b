use std::fs::read_to_string;

use folio::{
    render::{FeedOptions, Options},
    ContentExport,
};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const EXPORT: &str = "./tests/fixtures/content-export.json";
const STORAGE: &str = "https://cdn.example.com/media/";

fn export() -> Result<ContentExport> {
    Ok(serde_json::from_str(&read_to_string(EXPORT)?)?)
}

fn options() -> Options<'static> {
    Options {
        storage_url: Some(STORAGE),
        ..Options::default()
    }
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found"))
}

#[test]
fn page_contains_only_published_posts_newest_first() -> Result<()> {
    let page = export()?.to_html_page("Studio", options());

    assert!(!page.contains("Unfinished thoughts"));
    assert!(
        position(&page, "Designing for small studios")
            < position(&page, "Choosing a colour palette")
    );

    Ok(())
}

#[test]
fn rich_text_is_sanitized() -> Result<()> {
    let page = export()?.to_html_page("Studio", options());

    for unsafe_markup in ["onerror", "onmouseover", "javascript:", "document.cookie", "<script", "<marquee", "draft note"] {
        assert!(!page.contains(unsafe_markup), "{unsafe_markup} leaked");
    }

    assert!(page.contains("<strong>move fast</strong> &amp; need sites"));
    assert!(page.contains("<a>one colour</a>"));
    assert!(page.contains("<em>daily specials</em>"));
    assert!(page.contains(r#"<p style="color: red">Event listings and sign-ups.</p>"#));
    assert!(page.contains(r#"<a href="mailto:hello@example.com">hello@example.com</a>"#));

    Ok(())
}

#[test]
fn new_tab_links_get_noopener() -> Result<()> {
    let page = export()?.to_html_page("Studio", options());

    assert!(page.contains(
        r#"<a href="https://example.org/case-study" target="_blank" rel="noopener noreferrer">Read the case study</a>"#
    ));
    assert!(page.contains(
        r#"<a href="https://bakery.example.com" target="_blank" rel="noopener noreferrer">Visit Corner Bakery</a>"#
    ));

    Ok(())
}

#[test]
fn storage_images_are_resolved() -> Result<()> {
    let page = export()?.to_html_page("Studio", options());

    assert!(page.contains(
        r#"<img src="https://cdn.example.com/media/posts/studio.jpg" alt="A studio">"#
    ));
    assert!(page.contains(
        r#"<img src="https://cdn.example.com/media/covers/studio.jpg" alt="Designing for small studios" loading="lazy">"#
    ));
    // The unsafe project image loses its source but keeps the alt text.
    assert!(page.contains(r#"<img alt="Trail Runners Club" loading="lazy">"#));

    Ok(())
}

#[test]
fn projects_and_faqs_are_ordered() -> Result<()> {
    let page = export()?.to_html_page("Studio", options());

    assert!(position(&page, "Trail Runners Club") < position(&page, "Corner Bakery"));
    assert!(page.contains(r#"<article class="project featured" id="project-trail-runners-club">"#));
    assert!(position(&page, "Do you offer hosting?") < position(&page, "How long does a site take?"));

    Ok(())
}

#[test]
fn summaries_prefer_the_editor_excerpt() -> Result<()> {
    let export = export()?;
    let options = Options {
        excerpt_length: 20,
        ..options()
    };

    assert_eq!(export.posts[1].summary(options), "How I pick colours that last.");
    assert_eq!(export.posts[0].summary(options), "Why small?Small…");

    Ok(())
}

#[test]
fn feed_lists_published_posts() -> Result<()> {
    let feed = export()?.to_atom_feed(
        FeedOptions {
            title: "Studio blog",
            site_url: "https://studio.example.com/",
        },
        options(),
    );

    assert!(feed.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
    assert_eq!(feed.matches("<entry>").count(), 2);
    assert!(feed.contains("<updated>2024-05-02T09:30:00+00:00</updated>"));
    assert!(feed.contains("<id>https://studio.example.com/blog/designing-for-small-studios</id>"));
    assert!(feed.contains("<id>https://studio.example.com/blog/choosing-a-colour-palette</id>"));
    assert!(feed.contains(r#"<category term="design"/>"#));
    assert!(!feed.contains("onerror"));
    assert!(!feed.contains("Unfinished thoughts"));

    Ok(())
}
