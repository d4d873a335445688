//! Fuzzy full-text query generation
//!
//! Maps an entity name from a user question to a Lucene full-text query
//! that tolerates small spelling differences, so "Ceaser" still matches
//! the stored "Caesar" node.

/// Edit distance appended to every token of a fuzzy query.
pub const FUZZY_EDIT_DISTANCE: u8 = 2;

/// Characters with special meaning in Lucene query syntax.
const LUCENE_SPECIAL: &[char] = &[
    '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\', '/',
];

/// Replace Lucene special characters with spaces so user input cannot
/// change the query structure.
pub fn remove_lucene_chars(input: &str) -> String {
    input
        .chars()
        .map(|c| if LUCENE_SPECIAL.contains(&c) { ' ' } else { c })
        .collect()
}

/// Build a fuzzy full-text query for an entity name.
///
/// Tokenizes on whitespace, appends `~2` to every token, and joins with
/// `AND`. Returns `None` when no tokens survive cleaning.
pub fn fulltext_query(input: &str) -> Option<String> {
    let cleaned = remove_lucene_chars(input);
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }

    Some(
        words
            .iter()
            .map(|word| format!("{}~{}", word, FUZZY_EDIT_DISTANCE))
            .collect::<Vec<_>>()
            .join(" AND "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_word_entity() {
        assert_eq!(
            fulltext_query("Julius Caesar").as_deref(),
            Some("Julius~2 AND Caesar~2")
        );
    }

    #[test]
    fn single_word_entity() {
        assert_eq!(fulltext_query("Rome").as_deref(), Some("Rome~2"));
    }

    #[test]
    fn punctuation_is_stripped_from_the_term() {
        assert_eq!(fulltext_query("Rome!").as_deref(), Some("Rome~2"));
        assert_eq!(
            fulltext_query("\"Julius\" (Caesar)").as_deref(),
            Some("Julius~2 AND Caesar~2")
        );
    }

    #[test]
    fn special_chars_split_tokens() {
        // Lucene specials become spaces, which may split a token in two.
        assert_eq!(
            fulltext_query("Jul*ius").as_deref(),
            Some("Jul~2 AND ius~2")
        );
    }

    #[test]
    fn empty_and_all_punctuation_inputs_yield_none() {
        assert_eq!(fulltext_query(""), None);
        assert_eq!(fulltext_query("   "), None);
        assert_eq!(fulltext_query("!?~*"), None);
    }

    #[test]
    fn extra_whitespace_is_collapsed() {
        assert_eq!(
            fulltext_query("  Julius   Caesar  ").as_deref(),
            Some("Julius~2 AND Caesar~2")
        );
    }

    #[test]
    fn remove_lucene_chars_keeps_plain_text() {
        assert_eq!(remove_lucene_chars("Marcus Aurelius"), "Marcus Aurelius");
        assert_eq!(remove_lucene_chars("a+b-c"), "a b c");
    }
}
