//! Spell checking using Levenshtein distance.
//!
//! Used to suggest a bound control sequence name when an undefined one is referenced.
//! The distance is computed with the usual dynamic program, keeping only the previous row
//! of the matrix.

/// Returns the words in the dictionary within `max_distance` edits of the word,
/// closest first. Words at equal distance keep their dictionary order.
pub fn find_close_words<'a>(dictionary: &[&'a str], word: &str, max_distance: usize) -> Vec<&'a str> {
    let mut matches: Vec<(usize, &'a str)> = dictionary
        .iter()
        .map(|candidate| (levenshtein_distance(word, candidate), *candidate))
        .filter(|(distance, _)| *distance <= max_distance)
        .collect();
    matches.sort_by_key(|(distance, _)| *distance);
    matches.into_iter().map(|(_, candidate)| candidate).collect()
}

pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, a_i) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, b_j) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if a_i == *b_j {
                diagonal
            } else {
                1 + diagonal.min(above).min(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! levenshtein_tests {
        ($( ($name: ident, $a: expr, $b: expr, $want: expr), )+) => {
            $(
            #[test]
            fn $name() {
                assert_eq!(levenshtein_distance($a, $b), $want);
                assert_eq!(levenshtein_distance($b, $a), $want);
            }
            )+
        };
    }

    levenshtein_tests![
        (identical, "def", "def", 0),
        (both_empty, "", "", 0),
        (one_empty, "", "edef", 4),
        (one_substitution, "def", "dex", 1),
        (one_addition, "def", "edef", 1),
        (kitten, "kitten", "sitting", 3),
        (unicode, "été", "ete", 2),
    ];

    #[test]
    fn close_words_sorted() {
        let dictionary = ["input", "edef", "def", "gdef", "write"];
        assert_eq!(find_close_words(&dictionary, "gef", 1), vec!["def", "gdef"]);
        assert_eq!(
            find_close_words(&dictionary, "gef", 2),
            vec!["def", "gdef", "edef"]
        );
        assert!(find_close_words(&dictionary, "uppercase", 2).is_empty());
    }
}
