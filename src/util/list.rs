//! Semicolon-separated list handling.
//!
//! Build-graph properties arrive as single configuration strings where `;`
//! separates entries. Option strings that themselves contain `;` are carried
//! inside a list entry with the `@LSEP@` sub-separator.

/// Separator used inside a single list entry that itself holds a list.
pub const LIST_SEP: &str = "@LSEP@";

/// Expand a configuration string into individual entries.
///
/// Empty entries are dropped, so `"a;;b"` and `"a;b"` expand identically.
pub fn expand_list(value: &str) -> Vec<String> {
    value
        .split(';')
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join entries back into a configuration string.
pub fn join_list<S: AsRef<str>>(entries: &[S]) -> String {
    entries
        .iter()
        .map(|e| e.as_ref())
        .collect::<Vec<_>>()
        .join(";")
}

/// Replace the list separator inside an entry with the sub-separator.
pub fn to_sub_list(value: &str) -> String {
    value.replace(';', LIST_SEP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_list() {
        assert_eq!(expand_list("a;b;c"), vec!["a", "b", "c"]);
        assert_eq!(expand_list("a;;b"), vec!["a", "b"]);
        assert_eq!(expand_list(""), Vec::<String>::new());
    }

    #[test]
    fn test_join_list() {
        assert_eq!(join_list(&["a", "b"]), "a;b");
        assert_eq!(join_list::<&str>(&[]), "");
    }

    #[test]
    fn test_round_trip() {
        let entries = vec!["x".to_string(), "y".to_string()];
        assert_eq!(expand_list(&join_list(&entries)), entries);
    }

    #[test]
    fn test_to_sub_list() {
        assert_eq!(to_sub_list("-name;base"), "-name@LSEP@base");
    }
}
