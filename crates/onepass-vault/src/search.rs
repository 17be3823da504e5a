use crate::types::type_code_for_alias;
use crate::Item;

/// A parsed search pattern.
///
/// Patterns match case-insensitively against item titles (substring) and
/// UUIDs (prefix). A pattern may be restricted to one item type by prefixing
/// it with a known short alias and a colon, e.g. `login:github`; an alias on
/// its own (`login:`) matches every item of that type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPattern {
    pub type_name: Option<&'static str>,
    pub term: String,
}

impl ItemPattern {
    pub fn parse(pattern: &str) -> ItemPattern {
        if let Some((alias, rest)) = pattern.split_once(':') {
            if let Some(type_name) = type_code_for_alias(alias) {
                return ItemPattern {
                    type_name: Some(type_name),
                    term: rest.to_lowercase(),
                };
            }
        }
        ItemPattern {
            type_name: None,
            term: pattern.to_lowercase(),
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        if let Some(type_name) = self.type_name {
            if item.type_name != type_name {
                return false;
            }
        }
        if self.term.is_empty() {
            return true;
        }
        item.title.to_lowercase().contains(&self.term)
            || item.uuid.to_lowercase().starts_with(&self.term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, type_name: &str) -> Item {
        Item::new(title, type_name, "SL5")
    }

    #[test]
    fn title_matching_is_a_case_insensitive_substring() {
        let pattern = ItemPattern::parse("GitHub");
        assert!(pattern.matches(&item("github.com login", "webforms.WebForm")));
        assert!(!pattern.matches(&item("gitlab", "webforms.WebForm")));
    }

    #[test]
    fn uuid_matching_is_a_prefix() {
        let target = item("Some Item", "securenotes.SecureNote");
        let prefix = target.uuid[..8].to_lowercase();
        assert!(ItemPattern::parse(&prefix).matches(&target));
        assert!(!ItemPattern::parse("ZZZZ").matches(&target));
    }

    #[test]
    fn alias_prefix_restricts_the_type() {
        let pattern = ItemPattern::parse("login:git");
        assert_eq!(pattern.type_name, Some("webforms.WebForm"));
        assert!(pattern.matches(&item("github", "webforms.WebForm")));
        assert!(!pattern.matches(&item("github", "securenotes.SecureNote")));

        // a bare alias matches all items of the type
        let all_notes = ItemPattern::parse("note:");
        assert!(all_notes.matches(&item("anything", "securenotes.SecureNote")));
    }

    #[test]
    fn unknown_alias_is_treated_as_a_plain_term() {
        let pattern = ItemPattern::parse("http://example.com");
        assert_eq!(pattern.type_name, None);
        assert!(pattern.matches(&item("see http://example.com", "securenotes.SecureNote")));
    }
}
