use serde::Serialize;
use symbol_layout::Region;

/// One line of `manifest.jsonl`.
#[derive(Serialize, Debug)]
pub struct JsonRecord {
    pub schema: &'static str,
    pub image: String,
    pub labels: String,
    pub seed: u64,
    pub class_ids: Vec<u32>,
    pub boxes: Vec<Region>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    /// Context image regions; they carry no label.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clutter: Vec<Region>,
}
