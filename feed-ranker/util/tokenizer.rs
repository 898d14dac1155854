/// Lowercased alphanumeric runs. Everything else separates tokens, so
/// `"#Rust-lang!"` yields `["rust", "lang"]`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Matches text against a viewer's muted phrases. A phrase matches when its
/// tokens appear contiguously in the text's tokens, which keeps `"cat"` from
/// matching `"category"`.
#[derive(Clone, Debug, Default)]
pub struct MutedPhraseMatcher {
    phrases: Vec<Vec<String>>,
}

impl MutedPhraseMatcher {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let phrases = keywords
            .iter()
            .map(|k| tokenize(k.as_ref()))
            .filter(|tokens| !tokens.is_empty())
            .collect();
        Self { phrases }
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn matches(&self, tokens: &[String]) -> bool {
        self.phrases.iter().any(|phrase| {
            tokens
                .windows(phrase.len())
                .any(|window| window == phrase.as_slice())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_punctuation_and_lowercases() {
        assert_eq!(tokenize("Hello, World!  #Rust-lang"), vec!["hello", "world", "rust", "lang"]);
        assert!(tokenize("  ...  ").is_empty());
    }

    #[test]
    fn whole_token_match_only() {
        let matcher = MutedPhraseMatcher::new(&["cat"]);
        assert!(matcher.matches(&tokenize("my CAT is asleep")));
        assert!(matcher.matches(&tokenize("cat.")));
        assert!(!matcher.matches(&tokenize("a new category of posts")));
        assert!(!matcher.matches(&tokenize("concatenate")));
    }

    #[test]
    fn phrases_must_be_contiguous() {
        let matcher = MutedPhraseMatcher::new(&["hot take"]);
        assert!(matcher.matches(&tokenize("Here is my hot take: tabs")));
        assert!(!matcher.matches(&tokenize("hot coffee, take it")));
    }

    #[test]
    fn blank_keywords_are_ignored() {
        let matcher = MutedPhraseMatcher::new(&["", "  !! "]);
        assert!(matcher.is_empty());
        assert!(!matcher.matches(&tokenize("anything")));
    }
}
