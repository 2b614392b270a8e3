//! Single compatibility step for RFQ payloads arriving from clients.
//!
//! Older front-ends post RFQs with `items` instead of `line_items`, `grade`
//! instead of `material_grade` and `description` instead of
//! `raw_description`, and frequently omit fields they never displayed. All of
//! that is absorbed here so the rest of the crate only sees [`Rfq`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::rfq::{
    resolve_project_name, CommercialTerms, LineItem, Measurement, Rfq, RfqId, Size, SourceRef,
};
use crate::errors::DomainError;
use crate::lenient::{self, NumberReading};

pub fn rfq_from_client(value: Value) -> Result<Rfq, DomainError> {
    if !value.is_object() {
        return Err(DomainError::InvalidRfq("rfq must be a JSON object".to_string()));
    }

    let client: ClientRfq =
        serde_json::from_value(value).map_err(|error| DomainError::InvalidRfq(error.to_string()))?;

    Ok(client.into_rfq())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClientRfq {
    #[serde(deserialize_with = "lenient::option_string")]
    id: Option<String>,
    #[serde(alias = "project", deserialize_with = "lenient::option_string")]
    project_name: Option<String>,
    #[serde(alias = "items")]
    line_items: Option<Vec<LineItemDraft>>,
    original_text: Option<String>,
    commercial: Option<CommercialTerms>,
    created_at: Option<DateTime<Utc>>,
    sources: Option<Vec<SourceRef>>,
}

/// One line item in the loosely-typed shape produced by clients and by the
/// extraction model.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LineItemDraft {
    #[serde(alias = "line", deserialize_with = "lenient::option_string")]
    item_id: Option<String>,
    #[serde(alias = "description", deserialize_with = "lenient::option_string")]
    raw_description: Option<String>,
    #[serde(deserialize_with = "lenient::option_string")]
    product_category: Option<String>,
    #[serde(deserialize_with = "lenient::option_string")]
    product_type: Option<String>,
    #[serde(alias = "grade", deserialize_with = "lenient::option_string")]
    material_grade: Option<String>,
    #[serde(alias = "standard", deserialize_with = "lenient::option_string")]
    standard_or_spec: Option<String>,
    size: Option<ClientSize>,
    #[serde(alias = "qty", deserialize_with = "lenient::number_or_text")]
    quantity: Option<NumberReading>,
    #[serde(alias = "uom", deserialize_with = "lenient::option_string")]
    unit: Option<String>,
    #[serde(deserialize_with = "lenient::option_string")]
    delivery_location: Option<String>,
    #[serde(deserialize_with = "lenient::option_string")]
    required_delivery_date: Option<String>,
    #[serde(deserialize_with = "lenient::option_string")]
    incoterm: Option<String>,
    #[serde(deserialize_with = "lenient::option_string")]
    payment_terms: Option<String>,
    #[serde(alias = "notes", deserialize_with = "lenient::string_list")]
    other_requirements: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClientSize {
    #[serde(alias = "od")]
    outer_diameter: Option<ClientMeasurement>,
    #[serde(alias = "wt")]
    wall_thickness: Option<ClientMeasurement>,
    length: Option<ClientMeasurement>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClientMeasurement {
    #[serde(deserialize_with = "lenient::number_or_text")]
    value: Option<NumberReading>,
    #[serde(deserialize_with = "lenient::option_string")]
    unit: Option<String>,
}

impl ClientSize {
    /// Unparseable dimensions are left out of the size and reported as notes.
    fn into_size(self, notes: &mut Vec<String>) -> Size {
        Size {
            outer_diameter: ClientMeasurement::resolve(self.outer_diameter, "outer_diameter", notes),
            wall_thickness: ClientMeasurement::resolve(self.wall_thickness, "wall_thickness", notes),
            length: ClientMeasurement::resolve(self.length, "length", notes),
        }
    }
}

impl ClientMeasurement {
    fn resolve(measurement: Option<Self>, field: &str, notes: &mut Vec<String>) -> Option<Measurement> {
        let ClientMeasurement { value, unit } = measurement?;
        let unit = unit.unwrap_or_default();
        match value? {
            NumberReading::Value(value) => Some(Measurement::new(value, unit)),
            NumberReading::Unparsed(raw) => {
                notes.push(unparsed_note(field, &raw, &unit));
                None
            }
        }
    }
}

fn unparsed_note(field: &str, raw: &str, unit: &str) -> String {
    format!("{field}: {raw} {}", unit.trim()).trim_end().to_string()
}

impl ClientRfq {
    fn into_rfq(self) -> Rfq {
        let line_items = self
            .line_items
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, item)| item.into_line_item(index))
            .collect();

        Rfq {
            id: self.id.map(RfqId).unwrap_or_else(RfqId::generate),
            project_name: resolve_project_name(self.project_name.as_deref(), None),
            line_items,
            original_text: self.original_text.unwrap_or_default(),
            commercial: self.commercial,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            sources: self.sources.unwrap_or_default(),
        }
    }
}

impl LineItemDraft {
    /// `index` is the zero-based position, used when the draft has no id.
    /// Quantities or dimensions that are not plain numbers are kept verbatim
    /// in `other_requirements` as `<field>: <text>`.
    pub fn into_line_item(self, index: usize) -> LineItem {
        let mut notes = Vec::new();
        let quantity = match self.quantity {
            Some(NumberReading::Unparsed(raw)) => {
                notes.push(unparsed_note("quantity", &raw, ""));
                None
            }
            reading => reading.and_then(|reading| reading.value()),
        };
        let size = self.size.map(|size| size.into_size(&mut notes)).unwrap_or_default();

        let mut other_requirements = self.other_requirements;
        other_requirements.extend(notes);

        LineItem {
            item_id: self.item_id.unwrap_or_else(|| format!("item-{}", index + 1)),
            raw_description: self.raw_description.unwrap_or_default(),
            product_category: self.product_category,
            product_type: self.product_type,
            material_grade: self.material_grade,
            standard_or_spec: self.standard_or_spec,
            size,
            quantity,
            unit: self.unit,
            delivery_location: self.delivery_location,
            required_delivery_date: self.required_delivery_date,
            incoterm: self.incoterm,
            payment_terms: self.payment_terms,
            other_requirements,
        }
    }
}
