//! Consistency tokens - fixed descriptive phrases bound to bible entities.
//!
//! Tokens are minted once by the bible builder. Every illustration prompt
//! that names an entity must carry that entity's token verbatim; `enforce`
//! repairs prompts where the model left a token out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyTokens {
    /// Character name -> token
    pub character_tokens: BTreeMap<String, String>,
    /// Location name -> token
    pub location_tokens: BTreeMap<String, String>,
    pub global_style_tokens: Vec<String>,
}

impl ConsistencyTokens {
    pub fn is_empty(&self) -> bool {
        self.character_tokens.is_empty()
            && self.location_tokens.is_empty()
            && self.global_style_tokens.is_empty()
    }

    /// Entity tokens (characters first, then locations) whose entity name
    /// appears in `prompt` as a whole word, case-insensitively.
    pub fn tokens_referenced_by<'a>(&'a self, prompt: &str) -> Vec<&'a str> {
        let lower = prompt.to_lowercase();
        self.entity_tokens()
            .filter(|(name, _)| mentions(&lower, &name.to_lowercase()))
            .map(|(_, token)| token)
            .collect()
    }

    /// Tokens the prompt is required to carry but does not.
    pub fn missing_from<'a>(&'a self, prompt: &str) -> Vec<&'a str> {
        let mut missing: Vec<&str> = Vec::new();
        let required = self.tokens_referenced_by(prompt).into_iter().chain(
            self.global_style_tokens
                .iter()
                .map(String::as_str)
                .filter(|t| !t.trim().is_empty()),
        );
        for token in required {
            if !prompt.contains(token) && !missing.contains(&token) {
                missing.push(token);
            }
        }
        missing
    }

    /// Append every missing required token to `prompt`.
    ///
    /// Appended tokens can name further entities, so this repeats until
    /// nothing is missing. Each pass adds at least one token that is then
    /// present, so the loop ends within the size of the token set.
    ///
    /// Empty prompts are returned unchanged. Applying this twice yields the
    /// same string as applying it once.
    pub fn enforce(&self, prompt: &str) -> String {
        if prompt.trim().is_empty() {
            return prompt.to_string();
        }
        let mut enforced = prompt.to_string();
        loop {
            let missing = self.missing_from(&enforced);
            if missing.is_empty() {
                return enforced;
            }
            enforced = format!("{}, {}", enforced.trim_end(), missing.join(", "));
        }
    }

    fn entity_tokens(&self) -> impl Iterator<Item = (&str, &str)> {
        self.character_tokens
            .iter()
            .chain(self.location_tokens.iter())
            .map(|(name, token)| (name.trim(), token.as_str()))
            .filter(|(name, token)| !name.is_empty() && !token.trim().is_empty())
    }
}

/// Whole-word, already-lowercased match. Boundaries are only checked on the
/// side where the name starts or ends with an ASCII letter or digit, so names
/// in scripts written without spaces still match inside running text.
fn mentions(haystack: &str, name: &str) -> bool {
    let needs_start = name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
    let needs_end = name.chars().last().is_some_and(|c| c.is_ascii_alphanumeric());
    haystack.match_indices(name).any(|(at, matched)| {
        let before = haystack[..at].chars().next_back();
        let after = haystack[at + matched.len()..].chars().next();
        let is_word = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
        !(needs_start && is_word(before)) && !(needs_end && is_word(after))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> ConsistencyTokens {
        ConsistencyTokens {
            character_tokens: BTreeMap::from([
                ("Miso".to_string(), "small grey cat with a red scarf".to_string()),
                ("Old Tam".to_string(), "elderly lamplighter in a blue coat".to_string()),
            ]),
            location_tokens: BTreeMap::from([(
                "Lantern Alley".to_string(),
                "narrow cobbled alley lit by paper lanterns".to_string(),
            )]),
            global_style_tokens: vec!["soft watercolor".to_string()],
        }
    }

    #[test]
    fn appends_missing_tokens_for_named_entities_only() {
        let enforced = tokens().enforce("Miso looks up at the night sky");
        assert!(enforced.contains("small grey cat with a red scarf"));
        assert!(enforced.contains("soft watercolor"));
        assert!(!enforced.contains("elderly lamplighter"));
    }

    #[test]
    fn name_matching_is_case_insensitive() {
        let enforced = tokens().enforce("a wide shot of lantern alley at dusk");
        assert!(enforced.contains("narrow cobbled alley lit by paper lanterns"));
    }

    #[test]
    fn enforce_is_idempotent() {
        let t = tokens();
        let once = t.enforce("Miso and Old Tam walk down Lantern Alley");
        assert_eq!(t.enforce(&once), once);
        assert!(t.missing_from(&once).is_empty());
    }

    #[test]
    fn prompt_already_carrying_tokens_is_untouched() {
        let prompt = "Miso, small grey cat with a red scarf, soft watercolor";
        assert_eq!(tokens().enforce(prompt), prompt);
    }

    #[test]
    fn tokens_naming_other_entities_pull_in_their_tokens() {
        let t = ConsistencyTokens {
            character_tokens: BTreeMap::from([
                ("Tam".to_string(), "old lamplighter who walks with Miso".to_string()),
                ("Miso".to_string(), "small grey cat with a red scarf".to_string()),
            ]),
            ..Default::default()
        };
        let once = t.enforce("Tam lights a lamp");
        assert!(once.contains("old lamplighter who walks with Miso"));
        assert!(once.contains("small grey cat with a red scarf"));
        assert!(t.missing_from(&once).is_empty());
        assert_eq!(t.enforce(&once), once);
    }

    #[test]
    fn names_match_whole_words_only() {
        let t = ConsistencyTokens {
            character_tokens: BTreeMap::from([(
                "Al".to_string(),
                "tall boy in a yellow raincoat".to_string(),
            )]),
            ..Default::default()
        };
        assert!(t.tokens_referenced_by("a wide shot of Lantern Alley").is_empty());
        assert_eq!(
            t.tokens_referenced_by("Al waves from the bridge"),
            vec!["tall boy in a yellow raincoat"]
        );
        assert_eq!(t.tokens_referenced_by("hello, al!").len(), 1);
    }

    #[test]
    fn empty_prompt_stays_empty() {
        assert_eq!(tokens().enforce(""), "");
    }
}
