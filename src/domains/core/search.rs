/// Entities that can be narrowed by the free-text search box of a list view.
pub trait Searchable {
    /// Text fields the search term is matched against.
    fn search_fields(&self) -> Vec<&str>;

    fn matches_search(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Keeps the items where any searchable field contains `term`, ignoring case.
/// A blank term keeps everything.
pub fn filter_by_search<T: Searchable>(items: Vec<T>, term: &str) -> Vec<T> {
    if term.trim().is_empty() {
        return items;
    }
    items.into_iter().filter(|item| item.matches_search(term)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(&'static str, &'static str);

    impl Searchable for Row {
        fn search_fields(&self) -> Vec<&str> {
            vec![self.0, self.1]
        }
    }

    #[test]
    fn test_case_insensitive_substring() {
        let rows = vec![Row("Farmácia Central", "Recife"), Row("Drogaria Sul", "Olinda")];
        let found = filter_by_search(rows, "  central ");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "Farmácia Central");
    }

    #[test]
    fn test_matches_any_field() {
        let rows = vec![Row("Farmácia Central", "Recife"), Row("Drogaria Sul", "Olinda")];
        assert_eq!(filter_by_search(rows, "OLIN").len(), 1);
    }

    #[test]
    fn test_blank_term_keeps_all() {
        let rows = vec![Row("a", "b"), Row("c", "d")];
        assert_eq!(filter_by_search(rows, "   ").len(), 2);
    }
}
