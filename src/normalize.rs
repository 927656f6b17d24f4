use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Reduce a name to its bare alphanumeric skeleton: NFKD
/// decomposition, combining marks stripped, lowercased, everything
/// non-alphanumeric dropped. Used only to derive shard keys; the
/// stored names keep their original spelling.
pub fn normalize_name(name: &str) -> String {
    name.nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .filter(|ch| ch.is_alphanumeric())
        .collect()
}

/// Fixed-length shard key for `name`, or `None` when sharding is off
/// (`shard_len == 0`) or the name normalises to nothing. Code points
/// outside ASCII alphanumerics become `'_'`, and short keys are
/// right-padded with `'_'`.
pub fn shard_key_for_name(name: &str, shard_len: usize) -> Option<String> {
    if shard_len == 0 {
        return None;
    }
    let normalized = normalize_name(name);
    if normalized.is_empty() {
        return None;
    }
    let mut key: String = normalized
        .chars()
        .take(shard_len)
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect();
    while key.len() < shard_len {
        key.push('_');
    }
    Some(key)
}
