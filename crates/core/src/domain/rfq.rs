use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub const UNTITLED_PROJECT: &str = "Untitled RFQ";

/// Buyer-entered commercial terms (destination, incoterm, payment terms...).
pub type CommercialTerms = Map<String, Value>;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RfqId(pub String);

impl RfqId {
    pub fn generate() -> Self {
        Self(format!("RFQ-{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RfqId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RfqId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub value: f64,
    pub unit: String,
}

impl Measurement {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self { value, unit: unit.into() }
    }

    fn compact(&self) -> String {
        let unit = self.unit.trim();
        if unit.is_empty() {
            format_number(self.value)
        } else {
            format!("{} {unit}", format_number(self.value))
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Size {
    pub outer_diameter: Option<Measurement>,
    pub wall_thickness: Option<Measurement>,
    pub length: Option<Measurement>,
}

impl Size {
    pub fn is_empty(&self) -> bool {
        self.outer_diameter.is_none() && self.wall_thickness.is_none() && self.length.is_none()
    }

    /// Short human form used in prompt snapshots, e.g. `OD 2 in x L 6 m`.
    pub fn compact(&self) -> Option<String> {
        let parts = [("OD", &self.outer_diameter), ("WT", &self.wall_thickness), ("L", &self.length)]
            .into_iter()
            .filter_map(|(label, measurement)| {
                measurement.as_ref().map(|m| format!("{label} {}", m.compact()))
            })
            .collect::<Vec<_>>();

        (!parts.is_empty()).then(|| parts.join(" x "))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    pub item_id: String,
    pub raw_description: String,
    pub product_category: Option<String>,
    pub product_type: Option<String>,
    pub material_grade: Option<String>,
    pub standard_or_spec: Option<String>,
    pub size: Size,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub delivery_location: Option<String>,
    pub required_delivery_date: Option<String>,
    pub incoterm: Option<String>,
    pub payment_terms: Option<String>,
    pub other_requirements: Vec<String>,
}

impl LineItem {
    pub fn new(item_id: impl Into<String>, raw_description: impl Into<String>) -> Self {
        Self { item_id: item_id.into(), raw_description: raw_description.into(), ..Self::default() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Spreadsheet,
    LegacySpreadsheet,
    Csv,
    Pdf,
    WordDocument,
    PlainText,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "spreadsheet",
            Self::LegacySpreadsheet => "legacy_spreadsheet",
            Self::Csv => "csv",
            Self::Pdf => "pdf",
            Self::WordDocument => "word_document",
            Self::PlainText => "plain_text",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub filename: String,
    pub origin: SourceKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rfq {
    pub id: RfqId,
    pub project_name: String,
    pub line_items: Vec<LineItem>,
    pub original_text: String,
    pub commercial: Option<CommercialTerms>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

impl Rfq {
    /// Creates a record with a freshly generated id. `original_text` is the
    /// full provenance text and is never rewritten afterwards.
    pub fn new(
        project_name: impl Into<String>,
        line_items: Vec<LineItem>,
        original_text: impl Into<String>,
        sources: Vec<SourceRef>,
    ) -> Self {
        Self {
            id: RfqId::generate(),
            project_name: project_name.into(),
            line_items,
            original_text: original_text.into(),
            commercial: None,
            created_at: Utc::now(),
            sources,
        }
    }

    pub fn with_commercial(mut self, commercial: CommercialTerms) -> Self {
        self.commercial = Some(commercial);
        self
    }
}

/// Project name precedence: extracted name, then caller hint, then placeholder.
pub fn resolve_project_name(extracted: Option<&str>, hint: Option<&str>) -> String {
    [extracted, hint]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNTITLED_PROJECT.to_string())
}

/// Renders `2.0` as `2` and `0.154` as `0.154`.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
