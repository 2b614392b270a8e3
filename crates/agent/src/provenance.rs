//! Local check that every number on a line item came from the source text.

use rfqdesk_core::domain::rfq::{format_number, LineItem, Measurement};

/// Number literals found in source text: integers, decimals (`0.154`,
/// `.154`, `1,000`, `2,5`), simple fractions (`1/2`) and mixed numbers (`1 1/2`,
/// `1-1/2`). Numbers glued to letters (`2in`, `SS316`) count as literals.
#[derive(Debug, Default)]
pub struct SourceNumbers {
    values: Vec<f64>,
}

impl SourceNumbers {
    pub fn scan(text: &str) -> Self {
        let chars = text.chars().collect::<Vec<_>>();
        let mut values = Vec::new();
        let mut index = 0;
        // (value, end index) of the last integer literal, for mixed numbers
        let mut last_integer: Option<(f64, usize)> = None;

        while index < chars.len() {
            let bare_decimal = chars[index] == '.'
                && chars.get(index + 1).is_some_and(char::is_ascii_digit);
            if !chars[index].is_ascii_digit() && !bare_decimal {
                index += 1;
                continue;
            }

            let start = index;
            index += 1;
            while index < chars.len()
                && (chars[index].is_ascii_digit() || matches!(chars[index], '.' | ','))
            {
                index += 1;
            }
            let mut token = chars[start..index].iter().collect::<String>();
            if bare_decimal {
                token.insert(0, '0');
            }
            let token = token.trim_end_matches(['.', ',']);
            let literals = parse_literal(token);
            let Some(number) = literals.last().copied() else {
                continue;
            };
            values.extend(literals.iter().copied());

            if chars.get(index) == Some(&'/') {
                let denominator_start = index + 1;
                let mut end = denominator_start;
                while end < chars.len() && chars[end].is_ascii_digit() {
                    end += 1;
                }
                let denominator = chars[denominator_start..end]
                    .iter()
                    .collect::<String>()
                    .parse::<f64>()
                    .ok()
                    .filter(|value| *value > 0.0);
                if let Some(denominator) = denominator {
                    let fraction = number / denominator;
                    values.push(fraction);
                    if let Some((whole, whole_end)) = last_integer {
                        let gap = chars[whole_end..start].iter().collect::<String>();
                        if gap == " " || gap == "-" {
                            values.push(whole + fraction);
                        }
                    }
                    values.push(denominator);
                    last_integer = None;
                    index = end;
                    continue;
                }
            }

            last_integer =
                (literals.len() == 1 && number.fract() == 0.0).then_some((number, index));
        }

        Self { values }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.values.iter().any(|candidate| (candidate - value).abs() <= 1e-6 * value.abs().max(1.0))
    }
}

/// Every reading of a token: a comma token yields its grouped value
/// (`1,000`, `2,5`) when it has one, plus each comma-separated part. The
/// last entry is the part adjacent to whatever follows the token.
fn parse_literal(token: &str) -> Vec<f64> {
    if token.is_empty() {
        return Vec::new();
    }
    if !token.contains(',') {
        return token.parse::<f64>().ok().into_iter().collect();
    }

    let groups = token.split(',').collect::<Vec<_>>();
    let thousands = !groups[0].contains('.')
        && groups[1..].iter().enumerate().all(|(position, group)| {
            let digits = group.split('.').next().unwrap_or_default();
            digits.len() == 3 && (position + 2 == groups.len() || !group.contains('.'))
        });

    let mut readings = Vec::new();
    if thousands {
        readings.extend(token.replace(',', "").parse::<f64>().ok());
    } else if groups.len() == 2 && !token.contains('.') {
        readings.extend(token.replace(',', ".").parse::<f64>().ok());
    }
    readings.extend(groups.iter().filter_map(|group| group.parse::<f64>().ok()));
    readings
}

/// Clears untraceable numbers and records each one in `other_requirements`
/// as `unverified <field>: <value> <unit>`. Returns how many were cleared.
pub fn verify_line_item(item: &mut LineItem, numbers: &SourceNumbers) -> usize {
    let mut notes = Vec::new();

    if let Some(quantity) = item.quantity {
        if !numbers.contains(quantity) {
            item.quantity = None;
            notes.push(note("quantity", quantity, item.unit.as_deref().unwrap_or_default()));
        }
    }

    let size = &mut item.size;
    for (field, slot) in [
        ("outer_diameter", &mut size.outer_diameter),
        ("wall_thickness", &mut size.wall_thickness),
        ("length", &mut size.length),
    ] {
        if let Some(Measurement { value, unit }) = slot.as_ref() {
            if !numbers.contains(*value) {
                notes.push(note(field, *value, unit));
                *slot = None;
            }
        }
    }

    let cleared = notes.len();
    item.other_requirements.extend(notes);
    cleared
}

fn note(field: &str, value: f64, unit: &str) -> String {
    format!("unverified {field}: {} {}", format_number(value), unit.trim()).trim_end().to_string()
}
