//! Deterministic English pluralization for root field names.
//!
//! Only the last word of a PascalCase name is pluralized, so
//! `ProductionCompany` becomes `ProductionCompanies`.

use heck::{ToLowerCamelCase, ToUpperCamelCase};

/// Irregular singular/plural pairs, lowercase.
const IRREGULAR: &[(&str, &str)] = &[
    ("analysis", "analyses"),
    ("cactus", "cacti"),
    ("child", "children"),
    ("crisis", "crises"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("half", "halves"),
    ("index", "indices"),
    ("knife", "knives"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("man", "men"),
    ("matrix", "matrices"),
    ("medium", "media"),
    ("mouse", "mice"),
    ("ox", "oxen"),
    ("person", "people"),
    ("phenomenon", "phenomena"),
    ("shelf", "shelves"),
    ("thesis", "theses"),
    ("tooth", "teeth"),
    ("vertex", "vertices"),
    ("wife", "wives"),
    ("wolf", "wolves"),
    ("woman", "women"),
];

/// Words whose plural is the word itself, lowercase.
const UNCOUNTABLE: &[&str] = &[
    "aircraft",
    "data",
    "deer",
    "equipment",
    "feedback",
    "fish",
    "information",
    "metadata",
    "money",
    "news",
    "people",
    "series",
    "sheep",
    "species",
];

/// Pluralizes a PascalCase type name.
///
/// ```
/// use nodegql_augment::pluralize::pluralize;
///
/// assert_eq!(pluralize("Person"), "People");
/// assert_eq!(pluralize("ProductionCompany"), "ProductionCompanies");
/// ```
#[must_use]
pub fn pluralize(name: &str) -> String {
    let split = last_word_start(name);
    let (head, word) = name.split_at(split);
    format!("{head}{}", pluralize_word(word))
}

/// Plural used for generated type names, e.g. `Movies` in `MoviesConnection`.
#[must_use]
pub fn plural_type_name(name: &str, plural: Option<&str>) -> String {
    match plural {
        Some(plural) => plural.to_upper_camel_case(),
        None => pluralize(name),
    }
}

/// Plural used for root field names, e.g. `movies`.
#[must_use]
pub fn plural_field_name(name: &str, plural: Option<&str>) -> String {
    plural_type_name(name, plural).to_lower_camel_case()
}

fn last_word_start(name: &str) -> usize {
    let mut start = 0;
    let mut prev: Option<char> = None;
    for (i, c) in name.char_indices() {
        if c.is_uppercase() && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
            start = i;
        }
        prev = Some(c);
    }
    start
}

fn pluralize_word(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let lower = word.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == lower) {
        return match_case(word, plural);
    }

    if let Some(stem) = word.strip_suffix('y') {
        let before = stem.chars().last();
        if before.is_some_and(|c| !"aeiouAEIOU".contains(c)) {
            return format!("{stem}ies");
        }
    }
    if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        return format!("{word}es");
    }
    format!("{word}s")
}

fn match_case(original: &str, plural: &str) -> String {
    let mut chars = original.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            let mut out: String = plural.chars().take(1).flat_map(char::to_uppercase).collect();
            out.push_str(&plural[1..]);
            out
        }
        _ => plural.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_plurals() {
        assert_eq!(pluralize("Movie"), "Movies");
        assert_eq!(pluralize("Actor"), "Actors");
        assert_eq!(pluralize("Genre"), "Genres");
        assert_eq!(pluralize("Day"), "Days");
    }

    #[test]
    fn test_suffix_rules() {
        assert_eq!(pluralize("Company"), "Companies");
        assert_eq!(pluralize("Address"), "Addresses");
        assert_eq!(pluralize("Box"), "Boxes");
        assert_eq!(pluralize("Match"), "Matches");
        assert_eq!(pluralize("Wish"), "Wishes");
    }

    #[test]
    fn test_irregular_plurals() {
        assert_eq!(pluralize("Person"), "People");
        assert_eq!(pluralize("Child"), "Children");
        assert_eq!(pluralize("SalesPerson"), "SalesPeople");
        assert_eq!(pluralize("Mouse"), "Mice");
        assert_eq!(pluralize("Woman"), "Women");
    }

    #[test]
    fn test_uncountable() {
        assert_eq!(pluralize("Series"), "Series");
        assert_eq!(pluralize("Sheep"), "Sheep");
        assert_eq!(pluralize("MovieSeries"), "MovieSeries");
    }

    #[test]
    fn test_last_word_only() {
        assert_eq!(pluralize("ProductionCompany"), "ProductionCompanies");
        assert_eq!(pluralize("FilmMan"), "FilmMen");
        assert_eq!(pluralize("Movie2Person"), "Movie2People");
    }

    #[test]
    fn test_root_field_names() {
        assert_eq!(plural_field_name("Movie", None), "movies");
        assert_eq!(plural_field_name("ProductionCompany", None), "productionCompanies");
        assert_eq!(plural_field_name("Tech", Some("technologies")), "technologies");
        assert_eq!(plural_type_name("Tech", Some("technologies")), "Technologies");
    }

    #[test]
    fn test_plural_table() {
        let plurals: Vec<String> = ["Genre", "Company", "Person", "Series", "Address"]
            .iter()
            .map(|name| format!("{name} -> {}", pluralize(name)))
            .collect();
        insta::assert_debug_snapshot!(plurals, @r###"
        [
            "Genre -> Genres",
            "Company -> Companies",
            "Person -> People",
            "Series -> Series",
            "Address -> Addresses",
        ]
        "###);
    }
}
