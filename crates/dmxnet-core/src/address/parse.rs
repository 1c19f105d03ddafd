use super::error::AddressError;

/// Characters accepted between the numeric fields of an address string.
pub const DELIMITERS: &[char] = &['.', ',', ' ', ':', '/', '\\', '-', '_'];

pub(crate) fn split_tokens<'a>(kind: &'static str, input: &'a str) -> Result<Vec<&'a str>, AddressError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AddressError::Parse {
            kind,
            input: input.to_string(),
            reason: "empty input".to_string(),
        });
    }
    let tokens: Vec<&str> = trimmed.split(DELIMITERS).collect();
    if tokens.iter().any(|token| token.is_empty()) {
        return Err(AddressError::Parse {
            kind,
            input: input.to_string(),
            reason: "empty field".to_string(),
        });
    }
    Ok(tokens)
}

pub(crate) fn parse_number(kind: &'static str, input: &str, token: &str) -> Result<u32, AddressError> {
    token.parse::<u32>().map_err(|_| AddressError::Parse {
        kind,
        input: input.to_string(),
        reason: format!("field '{token}' is not a number"),
    })
}
