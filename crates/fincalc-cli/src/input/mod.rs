pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load a command's input record from `--input <file>` or, failing that,
/// from JSON piped on stdin.
pub fn read_record<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_json(path)?));
    }
    match stdin::read_stdin()? {
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}

/// Like [`read_record`] for commands that have no flag form.
pub fn require_record<T: DeserializeOwned>(
    path: Option<&str>,
    command: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    read_record(path)?.ok_or_else(|| {
        format!("{command} needs a JSON record: pass --input <file> or pipe it on stdin").into()
    })
}
