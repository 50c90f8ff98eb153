/// Canonical form used for embedding and search cache keys: trimmed,
/// lowercased, internal whitespace collapsed to single spaces.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_and_lowercases() {
        assert_eq!(
            normalize_query("  Architecture\t\nDECISIONS  "),
            "architecture decisions"
        );
    }

    #[test]
    fn whitespace_only_is_empty() {
        assert_eq!(normalize_query(" \t\n "), "");
    }

    #[test]
    fn idempotent() {
        let once = normalize_query(" Hybrid   Retrieval ");
        assert_eq!(normalize_query(&once), once);
    }
}
