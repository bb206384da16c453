//! Input gate: decides whether a text is worth sending to the provider at all.

use crate::error::ValidationError;

/// Minimum number of whitespace-delimited words for an analysis.
pub const MIN_WORDS: usize = 20;

/// Word count as shown next to the input box.
/// Shares its splitting rule with [`validate`], so the two never disagree.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn validate(text: &str) -> Result<(), ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyInput);
    }
    let words = word_count(trimmed);
    if words < MIN_WORDS {
        return Err(ValidationError::TooShort {
            words,
            min: MIN_WORDS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_is_empty() {
        assert_eq!(validate(""), Err(ValidationError::EmptyInput));
        assert_eq!(validate(" \n\t  "), Err(ValidationError::EmptyInput));
    }

    #[test]
    fn nineteen_words_is_too_short_twenty_is_fine() {
        let nineteen = vec!["word"; 19].join(" ");
        assert_eq!(
            validate(&nineteen),
            Err(ValidationError::TooShort { words: 19, min: 20 })
        );
        let twenty = vec!["word"; 20].join(" ");
        assert_eq!(validate(&twenty), Ok(()));
    }

    #[test]
    fn runs_of_mixed_whitespace_count_once() {
        let text = "a  b\t\tc\n\nd \u{00a0} e";
        assert_eq!(word_count(text), 5);
        assert_eq!(word_count("   "), 0);
    }
}
