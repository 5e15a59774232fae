pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load a request from `--input <file>` if given, otherwise from piped stdin.
pub fn load_request<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Some(file::read_input(path)?)),
        None => stdin::read_stdin(),
    }
}
