use serde_json::{json, Map, Value};

use rfqdesk_core::domain::quote::SupplierQuote;
use rfqdesk_core::domain::rfq::Rfq;

pub const NORMALIZER_SYSTEM: &str = "\
You convert procurement requests for industrial materials (pipe, tube, fittings, flanges, plate, \
fasteners) into structured RFQ data.

Reply with one JSON object and nothing else, using exactly this shape:
{
  \"project_name\": string or null,
  \"line_items\": [
    {
      \"item_id\": string or null,
      \"raw_description\": string,
      \"product_category\": string or null,
      \"product_type\": string or null,
      \"material_grade\": string or null,
      \"standard_or_spec\": string or null,
      \"size\": {
        \"outer_diameter\": {\"value\": number, \"unit\": string} or null,
        \"wall_thickness\": {\"value\": number, \"unit\": string} or null,
        \"length\": {\"value\": number, \"unit\": string} or null
      },
      \"quantity\": number or null,
      \"unit\": string or null,
      \"delivery_location\": string or null,
      \"required_delivery_date\": string or null,
      \"incoterm\": string or null,
      \"payment_terms\": string or null,
      \"other_requirements\": [string]
    }
  ]
}

Rules:
- One line item per distinct product requested, in the order it appears in the source.
- raw_description is the literal source text for the item.
- Use null for anything the source does not state. Never guess a number, grade, standard or unit.
- Every number you output must appear in the source text.
- Requirements that fit no field (certificates, testing, packing, marking) go into \
other_requirements verbatim.
- Source files are separated by lines of the form \"===== FILE: <name> (<type>) =====\"; \
treat every file as part of the same request.";

pub const CLARIFICATION_SYSTEM: &str = "\
You are a procurement assistant helping a buyer refine a request for quote before it is sent \
to suppliers.

The first message contains the current RFQ snapshot. Treat it as ground truth:
- Never ask about a value that is already present in the snapshot (description, grade, size, \
quantity, unit, destination, incoterm, payment terms).
- Ask only about what is missing or ambiguous and would change a supplier's price or lead time.
- If the buyer supplies new details, acknowledge them briefly.
- Keep replies short: at most three focused questions or suggestions, plain text, no JSON.";

pub const NEGOTIATION_SYSTEM: &str = "\
You advise a buyer negotiating with an industrial materials supplier.

You receive the buyer's RFQ, one supplier quote and the buyer's goal. Compare the quote against \
the RFQ, point out gaps or deviations (grade, quantity, delivery, incoterm, payment terms), and \
propose concrete negotiation moves and a short message the buyer could send. Never invent \
prices or terms that are not in the quote. Reply in plain text.";

pub const DEFAULT_NEGOTIATION_GOAL: &str = "Negotiate the best overall terms for the buyer on \
price, lead time and payment terms while keeping the supplier engaged.";

pub const DEFAULT_CLARIFICATION: &str = "The RFQ looks complete based on the details so far. \
Let me know if anything should change before it goes out to suppliers.";

pub const DEFAULT_ADVICE: &str = "No specific negotiation levers were identified in this quote. \
Confirm price validity, lead time and payment terms with the supplier before accepting.";

pub const PROPOSE_REFINEMENTS: &str = "Based only on the RFQ snapshot above, propose the most \
useful refinements or missing details before this RFQ is sent to suppliers.";

pub fn normalizer_user_message(source: &str, project_hint: Option<&str>) -> String {
    let hint = project_hint.map(str::trim).filter(|hint| !hint.is_empty());
    match hint {
        Some(hint) => format!("Project name supplied by the buyer: {hint}\n\nSource:\n{source}"),
        None => format!("Source:\n{source}"),
    }
}

/// Compact ground-truth view of an RFQ for the clarification chat.
pub fn clarification_snapshot(rfq: &Rfq) -> Value {
    let items = rfq
        .line_items
        .iter()
        .map(|item| {
            json!({
                "line": item.item_id,
                "description": item.raw_description,
                "grade": item.material_grade,
                "size": item.size.compact(),
                "quantity": item.quantity,
                "uom": item.unit,
            })
        })
        .collect::<Vec<_>>();

    json!({
        "id": rfq.id,
        "project_name": rfq.project_name,
        "commercial": commercial(rfq),
        "line_items": items,
    })
}

pub fn clarification_context(rfq: &Rfq) -> String {
    format!("Current RFQ snapshot (ground truth):\n{}", pretty(&clarification_snapshot(rfq)))
}

pub fn clarification_latest(message: &str) -> String {
    format!(
        "Latest buyer message. It may contain clarifying commercial details such as destination, \
         incoterm or payment terms:\n{message}"
    )
}

pub fn negotiation_context(rfq: &Rfq, quote: &SupplierQuote, goal: &str) -> String {
    let items = rfq
        .line_items
        .iter()
        .map(|item| {
            json!({
                "line": item.item_id,
                "description": item.raw_description,
                "grade": item.material_grade,
                "quantity": item.quantity,
                "uom": item.unit,
            })
        })
        .collect::<Vec<_>>();
    let context = json!({
        "rfq_id": rfq.id,
        "commercial": commercial(rfq),
        "line_items": items,
    });

    format!(
        "Goal: {goal}\n\nRFQ:\n{}\n\nSupplier quote:\n{}",
        pretty(&context),
        pretty(&quote.to_value())
    )
}

fn commercial(rfq: &Rfq) -> Value {
    Value::Object(rfq.commercial.clone().unwrap_or_else(Map::new))
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
