//! Identifier normalization and word splitting

/// Convert an identifier to snake_case.
///
/// A new word starts at a lowercase/digit to uppercase edge and at the end
/// of an acronym (`HTTPServer` -> `http_server`). Spaces and hyphens become
/// underscores; existing underscores are kept as-is.
pub fn to_snake_case(identifier: &str) -> String {
    let chars: Vec<char> = identifier.chars().collect();
    let mut out = String::with_capacity(identifier.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' || c == '-' {
            out.push('_');
            continue;
        }

        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|j| chars[j]);
            let next = chars.get(i + 1);
            let starts_word = match prev {
                Some(p) if p.is_lowercase() || p.is_numeric() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if starts_word && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// Split into maximal alphabetic and non-alphabetic runs, in order.
///
/// Concatenating the runs gives back the input.
pub fn split_runs(s: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut previous: Option<bool> = None;

    for (offset, c) in s.char_indices() {
        let alpha = c.is_alphabetic();
        if previous.is_some_and(|p| p != alpha) {
            runs.push(&s[start..offset]);
            start = offset;
        }
        previous = Some(alpha);
    }
    if start < s.len() {
        runs.push(&s[start..]);
    }

    runs
}

/// Words of an identifier worth looking up: snake-cased runs, de-duplicated
/// in first-occurrence order, longer than one character.
pub fn candidate_words(identifier: &str) -> Vec<String> {
    let snake = to_snake_case(identifier);
    let mut words: Vec<String> = Vec::new();
    for run in split_runs(&snake) {
        if words.iter().any(|w| w == run) {
            continue;
        }
        words.push(run.to_string());
    }
    words.retain(|w| w.chars().count() > 1);
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_snake_case_conversions() {
        assert_eq!(to_snake_case("amznProductsByLocale123"), "amzn_products_by_locale123");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("OrderService"), "order_service");
        assert_eq!(to_snake_case("get_user_id"), "get_user_id");
        assert_eq!(to_snake_case("parseJSON"), "parse_json");
        assert_eq!(to_snake_case("version2Beta"), "version2_beta");
        assert_eq!(to_snake_case("kebab-case name"), "kebab_case_name");
        assert_eq!(to_snake_case("_PrivateName"), "_private_name");
        assert_eq!(to_snake_case("__init__"), "__init__");
    }

    #[test]
    fn test_split_runs() {
        assert_eq!(
            split_runs("amzn_products_by_locale123"),
            vec!["amzn", "_", "products", "_", "by", "_", "locale", "123"]
        );
        assert_eq!(split_runs("__init__"), vec!["__", "init", "__"]);
        assert_eq!(split_runs("x"), vec!["x"]);
        assert!(split_runs("").is_empty());
    }

    #[test]
    fn test_candidate_words_example() {
        assert_eq!(
            candidate_words("amznProductsByLocale123"),
            vec!["amzn", "products", "by", "locale", "123"]
        );
    }

    #[test]
    fn test_candidate_words_deduplicates() {
        assert_eq!(candidate_words("getUserGetUser"), vec!["get", "user"]);
    }

    #[test]
    fn test_candidate_words_drops_single_characters() {
        assert!(candidate_words("x").is_empty());
        assert!(candidate_words("a_b_c").is_empty());
        assert_eq!(candidate_words("x_value"), vec!["value"]);
    }

    proptest! {
        #[test]
        fn split_runs_round_trips(s in "\\PC{0,40}") {
            let runs = split_runs(&s);
            prop_assert_eq!(runs.concat(), s.clone());
            prop_assert!(runs.iter().all(|r| !r.is_empty()));
        }

        #[test]
        fn split_runs_alternate_kinds(s in "[a-zA-Z0-9_]{1,30}") {
            let runs = split_runs(&s);
            for pair in runs.windows(2) {
                let first = pair[0].chars().all(char::is_alphabetic);
                let second = pair[1].chars().all(char::is_alphabetic);
                prop_assert_ne!(first, second);
            }
        }

        #[test]
        fn candidate_words_are_unique_and_long(s in "[a-zA-Z0-9_]{0,30}") {
            let words = candidate_words(&s);
            for (i, word) in words.iter().enumerate() {
                prop_assert!(word.chars().count() > 1);
                prop_assert!(!words[..i].contains(word));
            }
        }
    }
}
