//! Search-query variants tried in priority order for one product name.

/// Fewest trailing words a truncated variant may keep.
const MIN_QUERY_WORDS: usize = 3;

/// Query variants for a product name, most specific first:
/// the full name, the collaboration separator `" x "` collapsed, then
/// the collapsed name with trailing words dropped one at a time down to
/// three. Truncation works on the collapsed form so a lone `"x"` never
/// counts as a word or survives into a broader query.
#[must_use]
pub fn query_variants(name: &str) -> Vec<String> {
    let mut variants = vec![name.to_string()];

    let collapsed = if name.contains(" x ") {
        let collapsed = name.replace(" x ", " ");
        variants.push(collapsed.clone());
        collapsed
    } else {
        name.to_string()
    };

    let words: Vec<&str> = collapsed.split_whitespace().collect();
    for keep in (MIN_QUERY_WORDS..words.len()).rev() {
        variants.push(words[..keep].join(" "));
    }

    variants
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_yields_single_variant() {
        assert_eq!(query_variants("Lervig Pils"), vec!["Lervig Pils"]);
    }

    #[test]
    fn collaboration_separator_is_collapsed_second() {
        let variants = query_variants("Lervig x Mikkeller Spontan");
        assert_eq!(variants[0], "Lervig x Mikkeller Spontan");
        assert_eq!(variants[1], "Lervig Mikkeller Spontan");
    }

    #[test]
    fn trailing_words_drop_until_three_remain() {
        let variants = query_variants("Nøgne Ø Imperial Rye Porter 2021");
        assert_eq!(
            variants,
            vec![
                "Nøgne Ø Imperial Rye Porter 2021",
                "Nøgne Ø Imperial Rye Porter",
                "Nøgne Ø Imperial Rye",
                "Nøgne Ø Imperial",
            ]
        );
    }

    #[test]
    fn truncation_runs_on_the_collapsed_name() {
        let variants = query_variants("Amundsen x To Øl Fruit Machine");
        assert_eq!(
            variants,
            vec![
                "Amundsen x To Øl Fruit Machine",
                "Amundsen To Øl Fruit Machine",
                "Amundsen To Øl Fruit",
                "Amundsen To Øl",
            ]
        );
        assert!(variants[1..].iter().all(|v| !v.contains(" x ")));
    }
}
