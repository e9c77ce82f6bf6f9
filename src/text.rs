//! Text helpers shared by the summarizer, the embedder and the word cloud

use std::collections::HashSet;
use once_cell::sync::Lazy;

/// Common English function words
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
        "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
        "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down",
        "during", "each", "few", "for", "from", "further", "had", "has", "have", "having",
        "he", "her", "here", "hers", "herself", "him", "himself", "his", "how", "i", "if",
        "in", "into", "is", "it", "its", "itself", "just", "me", "more", "most", "my",
        "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or",
        "other", "our", "ours", "ourselves", "out", "over", "own", "said", "same", "she",
        "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
        "themselves", "then", "there", "these", "they", "this", "those", "through", "to",
        "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where",
        "which", "while", "who", "whom", "why", "will", "with", "would", "you", "your",
        "yours", "yourself", "yourselves", "s", "t", "says", "new", "one", "two", "like",
    ]
    .into_iter()
    .collect()
});

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Lowercased alphanumeric words, in order
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
}

/// Lowercased content words with stop words and single characters removed
pub fn content_words(text: &str) -> Vec<String> {
    words(text)
        .filter(|w| w.chars().count() > 1 && !is_stop_word(w))
        .collect()
}

/// Strip the most common English inflections so "launches" matches "launched"
pub fn stem(word: &str) -> String {
    const SUFFIXES: [&str; 8] = ["ations", "ation", "ings", "ing", "ies", "ed", "es", "s"];
    for suffix in SUFFIXES {
        if let Some(stripped) = word.strip_suffix(suffix) {
            if stripped.chars().count() >= 3 {
                return if suffix == "ies" {
                    format!("{}y", stripped)
                } else {
                    stripped.to_string()
                };
            }
        }
    }
    word.to_string()
}

/// Split text into sentences on terminal punctuation
///
/// A terminator only ends a sentence when followed by whitespace, so
/// decimals and domain names stay intact.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            while let Some(&next) = chars.peek() {
                if matches!(next, '.' | '!' | '?' | '"' | '\'' | ')' | '\u{201d}') {
                    current.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            let at_boundary = chars.peek().map_or(true, |n| n.is_whitespace());
            if at_boundary {
                push_sentence(&mut sentences, &current);
                current.clear();
            }
        }
    }
    push_sentence(&mut sentences, &current);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let sentence = collapse_whitespace(raw);
    if sentence.chars().any(|c| c.is_alphanumeric()) {
        sentences.push(sentence);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        let text = "India launched Chandrayaan-3 in 2023. It landed near the south pole!  \
                    Was it the first? Costs were 7.5 billion rupees.";
        let sentences = split_sentences(text);
        assert_eq!(sentences.len(), 4);
        assert_eq!(sentences[0], "India launched Chandrayaan-3 in 2023.");
        assert_eq!(sentences[3], "Costs were 7.5 billion rupees.");
    }

    #[test]
    fn test_split_sentences_without_terminator() {
        let sentences = split_sentences("no punctuation at all");
        assert_eq!(sentences, vec!["no punctuation at all".to_string()]);
        assert!(split_sentences("  ...  ").is_empty());
    }

    #[test]
    fn test_content_words_drop_stop_words() {
        let words = content_words("The vaccine is NOT a microchip, and it's safe.");
        assert_eq!(words, vec!["vaccine", "microchip", "safe"]);
    }

    #[test]
    fn test_stem() {
        assert_eq!(stem("launches"), "launch");
        assert_eq!(stem("launched"), "launch");
        assert_eq!(stem("launching"), "launch");
        assert_eq!(stem("stories"), "story");
        assert_eq!(stem("is"), "is");
        assert_eq!(stem("news"), "new");
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 50), "short");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  c "), "a b c");
    }
}
