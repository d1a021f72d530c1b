use lol_html::{element, rewrite_str, RewriteStrSettings};

use crate::sanitize::has_scheme;

/// Points images stored as bare bucket paths (`covers/hero.png`) at the public storage url.
///
/// Absolute urls, root-relative paths and fragments are left alone.
pub fn rewrite_storage_urls(content: &str, storage_url: &str) -> String {
    let storage_url = storage_url.trim_end_matches('/');

    let rewritten = rewrite_str(
        content,
        RewriteStrSettings {
            element_content_handlers: vec![element!("img[src]", |el| {
                if let Some(src) = el.get_attribute("src") {
                    if is_storage_path(&src) {
                        el.set_attribute("src", &format!("{storage_url}/{src}"))?;
                    }
                }
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    );

    match rewritten {
        Ok(rewritten) => rewritten,
        Err(e) => {
            log::warn!("Could not rewrite storage urls, keeping them as they are: {e}");
            content.to_string()
        }
    }
}

fn is_storage_path(src: &str) -> bool {
    let src = src.trim();
    !src.is_empty() && !src.starts_with(['/', '#', '.', '?']) && !has_scheme(src)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORAGE: &str = "https://cdn.example.com/storage/v1/object/public/media/";

    #[test]
    fn bucket_paths_are_prefixed() {
        assert_eq!(
            rewrite_storage_urls(r#"<img src="covers/hero.png" alt="">"#, STORAGE),
            r#"<img src="https://cdn.example.com/storage/v1/object/public/media/covers/hero.png" alt="">"#
        );
    }

    #[test]
    fn other_urls_are_untouched() {
        let content = r#"<img src="https://other.com/a.png"><img src="/static/b.png"><img src="//cdn.com/c.png"><a href="covers/d.png">d</a>"#;

        assert_eq!(rewrite_storage_urls(content, STORAGE), content);
    }
}
