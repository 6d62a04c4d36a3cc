//! Rule-language keywords.
//!
//! Keywords are recognised on whole words only: the identifier parser reads a
//! full word and then checks it against [`Keyword`], so `iffy` or `whenever`
//! stay identifiers.

/// Reserved words of the rule language.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display, strum::EnumIter, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    If,
    Then,
    Else,
    When,
    And,
    Or,
    Using,
    To,
}

impl Keyword {
    /// Keywords that may continue a statement onto the next line.
    pub fn continues_chain(&self) -> bool {
        matches!(self, Keyword::Then | Keyword::Else)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    // check if all keywords round-trip through their spelling
    #[test]
    fn test_all_keyword() {
        for keyword in Keyword::iter() {
            let spelled = keyword.to_string();
            assert_eq!(Keyword::from_str(&spelled).unwrap(), keyword);
            assert_eq!(spelled, spelled.to_lowercase());
        }
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert!(Keyword::from_str("IF").is_err());
        assert!(Keyword::from_str("Then").is_err());
    }

    #[test]
    fn test_continues_chain() {
        assert!(Keyword::Then.continues_chain());
        assert!(Keyword::Else.continues_chain());
        assert!(!Keyword::When.continues_chain());
        assert!(!Keyword::Using.continues_chain());
    }
}
