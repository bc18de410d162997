pub mod analysis;
pub mod financing;
pub mod solar;
pub mod tariff;

use serde::de::DeserializeOwned;

use crate::input;

/// Load a typed input from `--input`, else from piped stdin. `None` when
/// neither is present, so the caller can fall back to individual flags.
pub fn load_input<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(input::file::read_input(path)?));
    }
    match input::stdin::read_stdin()? {
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}
