//! Resource tool option merging.
//!
//! A resource file's own option list is merged over the target-wide list:
//! file values win for shared switches, new switches append at the end.

/// Options whose following token is their value.
const VALUE_OPTIONS: [&str; 4] = ["name", "root", "compress", "threshold"];

/// Strip the leading dash, and a second one for the newer tool generation,
/// returning the bare option name. Returns `None` for tokens without a
/// leading dash (values, file arguments).
fn option_name(token: &str, v5: bool) -> Option<&str> {
    let mut name = token.strip_prefix('-')?;
    if v5 {
        if let Some(rest) = name.strip_prefix('-') {
            name = rest;
        }
    }
    Some(name)
}

/// Merge a file-level option list into a target-level one.
///
/// For each file token already present in `opts`: if it names a value
/// option, the existing value token is replaced with the file's value
/// token; otherwise the existing occurrence already satisfies it. Tokens
/// not present queue up and append at the end in file order.
pub fn merge_options(opts: &mut Vec<String>, file_opts: &[String], v5: bool) {
    let mut extra: Vec<String> = Vec::new();
    let mut i = 0;
    while i < file_opts.len() {
        let token = &file_opts[i];
        if let Some(existing) = opts.iter().position(|o| o == token) {
            let is_value_option = option_name(token, v5)
                .map(|name| VALUE_OPTIONS.contains(&name))
                .unwrap_or(false);
            if is_value_option && existing + 1 < opts.len() && i + 1 < file_opts.len() {
                opts[existing + 1] = file_opts[i + 1].clone();
                i += 1;
            }
        } else {
            extra.push(token.clone());
        }
        i += 1;
    }
    opts.extend(extra);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_file_value_wins_and_new_switches_append() {
        let mut opts = strs(&["--name", "foo", "--verbose"]);
        merge_options(&mut opts, &strs(&["--name", "bar", "--root", "/r"]), true);
        assert_eq!(opts, strs(&["--name", "bar", "--verbose", "--root", "/r"]));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let original = strs(&["--name", "base", "--compress", "9", "--verbose"]);
        let mut opts = original.clone();
        merge_options(&mut opts, &original.clone(), true);
        assert_eq!(opts, original);
    }

    #[test]
    fn test_non_value_duplicate_is_noop() {
        let mut opts = strs(&["--verbose"]);
        merge_options(&mut opts, &strs(&["--verbose"]), true);
        assert_eq!(opts, strs(&["--verbose"]));
    }

    #[test]
    fn test_old_generation_single_dash_value_option() {
        let mut opts = strs(&["-name", "base"]);
        merge_options(&mut opts, &strs(&["-name", "override"]), false);
        assert_eq!(opts, strs(&["-name", "override"]));
    }

    #[test]
    fn test_old_generation_keeps_second_dash() {
        // Without the second strip, "--name" is not recognized as a value
        // option; the file's value token then appends on its own.
        let mut opts = strs(&["--name", "base"]);
        merge_options(&mut opts, &strs(&["--name", "override"]), false);
        assert_eq!(opts, strs(&["--name", "base", "override"]));
    }

    #[test]
    fn test_appended_entries_keep_file_order() {
        let mut opts = strs(&["--verbose"]);
        merge_options(
            &mut opts,
            &strs(&["--threshold", "70", "--no-compress"]),
            true,
        );
        assert_eq!(opts, strs(&["--verbose", "--threshold", "70", "--no-compress"]));
    }

    #[test]
    fn test_value_replacement_needs_both_value_tokens() {
        // An existing value option at the very end has no value token to
        // replace; nothing happens.
        let mut opts = strs(&["--name"]);
        merge_options(&mut opts, &strs(&["--name"]), true);
        assert_eq!(opts, strs(&["--name"]));
    }

    #[test]
    fn test_merge_into_empty_target_list() {
        let mut opts: Vec<String> = Vec::new();
        merge_options(&mut opts, &strs(&["--root", "/res"]), true);
        assert_eq!(opts, strs(&["--root", "/res"]));
    }
}
