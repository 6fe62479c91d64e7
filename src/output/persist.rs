//! Saving and restoring the last crawl result and output format

use crate::crawler::CrawlResult;
use crate::output::{OutputFormat, OutputResult};
use crate::storage::{KeyValueStore, EXTRACTED_DATA_KEY, OUTPUT_FORMAT_KEY};
use serde_json::Value;

/// Stores a crawl result as the last extracted data
pub fn save_result(store: &mut dyn KeyValueStore, result: &CrawlResult) -> OutputResult<()> {
    store.set_one(EXTRACTED_DATA_KEY, serde_json::to_value(result)?)?;
    Ok(())
}

/// Loads the last extracted data, if any
pub fn load_result(store: &dyn KeyValueStore) -> OutputResult<Option<CrawlResult>> {
    match store.get_one(EXTRACTED_DATA_KEY)? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Removes the last extracted data
pub fn clear_saved_result(store: &mut dyn KeyValueStore) -> OutputResult<()> {
    store.remove(&[EXTRACTED_DATA_KEY])?;
    Ok(())
}

/// Stores the last-used output format
pub fn save_format(store: &mut dyn KeyValueStore, format: OutputFormat) -> OutputResult<()> {
    store.set_one(OUTPUT_FORMAT_KEY, Value::String(format.as_str().to_string()))?;
    Ok(())
}

/// Loads the last-used output format
///
/// An unrecognised stored value is ignored.
pub fn load_format(store: &dyn KeyValueStore) -> OutputResult<Option<OutputFormat>> {
    let stored = store.get_one(OUTPUT_FORMAT_KEY)?;
    Ok(stored
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok()))
}
