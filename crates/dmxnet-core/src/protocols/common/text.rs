/// Truncates `value` to at most `max_bytes` of UTF-8 without splitting a
/// character.
///
/// # Examples
/// ```
/// use dmxnet_core::protocols::truncate_utf8;
///
/// assert_eq!(truncate_utf8("héllo", 2), "h");
/// assert_eq!(truncate_utf8("héllo", 3), "hé");
/// ```
pub fn truncate_utf8(value: &str, max_bytes: usize) -> &str {
    if value.len() <= max_bytes {
        return value;
    }
    let mut end = max_bytes;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

#[cfg(test)]
mod tests {
    use super::truncate_utf8;

    #[test]
    fn short_strings_are_untouched() {
        assert_eq!(truncate_utf8("console", 63), "console");
    }

    #[test]
    fn cuts_on_char_boundary() {
        let name = "€".repeat(30);
        let cut = truncate_utf8(&name, 63);
        assert_eq!(cut.len(), 63);
        let cut = truncate_utf8(&name, 62);
        assert_eq!(cut.len(), 60);
    }
}
