use crate::errors::{NametabError, Result};

/// Composite key parsed out of a raw record line.
///
/// The first three whitespace-separated tokens form the identity
/// (surname, given name, patronymic); the last token is the numeric id.
/// Tokens in between are payload and never participate in the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKey {
    pub identity: String,
    pub id: u32,
}

/// Parse a raw line into its key. Fewer than four tokens or a non-numeric
/// final token is a malformed record, never a panic.
pub fn parse_record(line: &str) -> Result<RecordKey> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 4 {
        return Err(NametabError::MalformedRecord(line.to_string()));
    }
    let identity = tokens[..3].join(" ");
    let last = tokens[tokens.len() - 1];
    let id = last
        .parse::<u32>()
        .map_err(|_| NametabError::BadId(last.to_string()))?;
    Ok(RecordKey { identity, id })
}
