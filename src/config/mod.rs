use anyhow::{Result, anyhow};
use serde_json::Value;

use crate::model::Options;

/// Parse compiler options from a JSON document.
///
/// The document must be an object; every key is optional and falls back to
/// the default in `Options`. Unknown keys are rejected so that a misspelt
/// option does not silently do nothing.
pub fn load_from_json(json: &str) -> Result<Options> {
    let root: Value = serde_json::from_str(json)?;
    if !root.is_object() {
        return Err(anyhow!("options file must hold a JSON object"));
    }

    let options: Options = serde_json::from_value(root)?;
    if options.max_steps == 0 {
        return Err(anyhow!("`max-steps` must be at least 1"));
    }
    Ok(options)
}
