pub(crate) fn optional_nonzero_u16(value: u16) -> Option<u16> {
    if value == 0 { None } else { Some(value) }
}

/// Slice up to the first NUL byte, or the whole slice when there is none.
pub(crate) fn until_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|b| *b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}
