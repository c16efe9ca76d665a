use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("invalid object reference: {0:?}")]
    InvalidReference(String),
}

/// Extracts the numeric object id from a WSAPI reference.
///
/// Accepts relative refs (`/milestone/123`), absolute refs
/// (`https://host/slm/webservice/v2.0/milestone/123.js`) and bare ids.
pub fn object_id_from_ref(reference: &str) -> Result<u64, ReferenceError> {
    let invalid = || ReferenceError::InvalidReference(reference.to_string());
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let last_segment = trimmed
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .ok_or_else(invalid)?;
    let last_segment = last_segment.strip_suffix(".js").unwrap_or(last_segment);

    if last_segment.is_empty() || !last_segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    last_segment.parse::<u64>().map_err(|_| invalid())
}
