//! Schema command: JSON Schema of the dataset file.

use crate::cli::commands::print_json;
use crate::error::Result;
use crate::model::Dataset;
use schemars::schema_for;

/// Execute the schema command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute() -> Result<()> {
    let schema = schema_for!(Dataset);
    print_json(&schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_names_dataset_fields() {
        let schema = serde_json::to_value(schema_for!(Dataset)).unwrap();
        let properties = &schema["properties"];
        assert!(properties.get("commits").is_some());
        assert!(properties.get("best_times").is_some());
        assert!(properties.get("generated_at").is_some());
        assert!(schema["definitions"].get("CommitSnapshot").is_some());
    }
}
