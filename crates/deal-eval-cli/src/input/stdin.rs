use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Deserialise a request piped on stdin.
///
/// Returns `None` when stdin is a TTY (interactive) or the pipe is empty.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

/// JSON first; anything that is not a JSON document is tried as YAML.
fn parse_piped<T: DeserializeOwned>(buffer: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.starts_with('{') {
        return Ok(Some(serde_json::from_str(trimmed)?));
    }
    Ok(Some(serde_yaml::from_str(trimmed)?))
}
