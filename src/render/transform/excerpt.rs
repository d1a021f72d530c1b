use std::sync::OnceLock;

use regex::Regex;

/// Plain text summary of (already sanitized) html, at most `max_chars` long plus an ellipsis.
///
/// The result is unescaped text: encode it before putting it back into markup.
pub fn excerpt(content: &str, max_chars: usize) -> String {
    let text = ammonia::Builder::empty().clean(content).to_string();
    let text = html_escape::decode_html_entities(&text);
    let text = whitespace().replace_all(text.trim(), " ");

    match text.char_indices().nth(max_chars) {
        None => text.into_owned(),
        Some((end, _)) => {
            let cut = &text[..end];
            // Prefer ending on a word boundary.
            let cut = match cut.rsplit_once(' ') {
                Some((words, _)) if !words.is_empty() => words,
                _ => cut,
            };
            format!("{}…", cut.trim_end_matches([' ', ',', '.', ';', ':']))
        }
    }
}

fn whitespace() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex should be valid"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_is_removed_and_whitespace_collapsed() {
        let content = "<h2>Title</h2>\n\n<p>Some   <b>bold</b>\ttext &amp; more.</p>";

        assert_eq!(excerpt(content, 100), "Title Some bold text & more.");
    }

    #[test]
    fn long_text_is_cut_on_a_word_boundary() {
        assert_eq!(excerpt("<p>one two three four</p>", 10), "one two…");
    }

    #[test]
    fn cutting_respects_multibyte_characters() {
        assert_eq!(excerpt("ééééé", 3), "ééé…");
    }
}
