use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::ooxml::{attribute, open_archive, read_entry, Archive, OoxmlError};

const MAX_SHEETS: usize = 100;
const MAX_CELLS_PER_SHEET: usize = 100_000;
const MAX_COLUMNS: usize = 16_384;

const WORKBOOK: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS: &str = "xl/sharedStrings.xml";

#[derive(Debug, PartialEq)]
pub(crate) struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Comma-delimited rows under a `### Sheet: <name>` header.
    pub(crate) fn render(&self) -> String {
        let mut out = format!("### Sheet: {}\n", self.name);
        for row in &self.rows {
            let line = row.iter().map(|cell| csv_field(cell)).collect::<Vec<_>>().join(",");
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

/// Renders every non-empty sheet in workbook order. `Ok("")` means the
/// workbook opened fine but had no cells.
pub(crate) fn extract_xlsx(bytes: &[u8]) -> Result<String, OoxmlError> {
    let sheets = read_sheets(bytes)?;
    Ok(sheets.iter().map(Sheet::render).collect::<Vec<_>>().join("\n"))
}

pub(crate) fn read_sheets(bytes: &[u8]) -> Result<Vec<Sheet>, OoxmlError> {
    let mut archive = open_archive(bytes)?;
    let shared_strings = match read_entry(&mut archive, SHARED_STRINGS)? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };

    let mut sheets = Vec::new();
    for (name, path) in sheet_locations(&mut archive)?.into_iter().take(MAX_SHEETS) {
        let Some(xml) = read_entry(&mut archive, &path)? else {
            continue;
        };
        let sheet = Sheet { name, rows: parse_rows(&xml, &shared_strings)? };
        if !sheet.is_empty() {
            sheets.push(sheet);
        }
    }
    Ok(sheets)
}

/// `(display name, archive path)` per sheet in workbook order. Archives
/// without a workbook part fall back to numbered worksheet files.
fn sheet_locations(archive: &mut Archive<'_>) -> Result<Vec<(String, String)>, OoxmlError> {
    let workbook = read_entry(archive, WORKBOOK)?;
    let rels = read_entry(archive, WORKBOOK_RELS)?;

    if let (Some(workbook), Some(rels)) = (workbook, rels) {
        let targets = parse_relationships(&rels)?;
        let located = parse_workbook_sheets(&workbook)?
            .into_iter()
            .filter_map(|(name, rel_id)| {
                targets.get(&rel_id).map(|target| (name, resolve_target(target)))
            })
            .collect::<Vec<_>>();
        if !located.is_empty() {
            return Ok(located);
        }
    }

    let mut paths = archive
        .file_names()
        .filter(|name| name.starts_with("xl/worksheets/sheet") && name.ends_with(".xml"))
        .map(str::to_string)
        .collect::<Vec<_>>();
    if paths.is_empty() && archive.file_names().all(|name| !name.starts_with("xl/")) {
        return Err(OoxmlError::MissingEntry(WORKBOOK));
    }
    paths.sort_by_key(|name| sheet_number(name));

    Ok(paths
        .into_iter()
        .map(|path| (format!("Sheet{}", sheet_number(&path)), path))
        .collect())
}

fn sheet_number(path: &str) -> u32 {
    path.trim_start_matches("xl/worksheets/sheet")
        .trim_end_matches(".xml")
        .parse::<u32>()
        .unwrap_or(u32::MAX)
}

fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    }
}

fn parse_workbook_sheets(xml: &[u8]) -> Result<Vec<(String, String)>, OoxmlError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(element) | Event::Empty(element)
                if element.local_name().as_ref() == b"sheet" =>
            {
                if let (Some(name), Some(rel_id)) =
                    (attribute(&element, b"name"), attribute(&element, b"id"))
                {
                    sheets.push((name, rel_id));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(sheets)
}

fn parse_relationships(xml: &[u8]) -> Result<HashMap<String, String>, OoxmlError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut targets = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(element) | Event::Empty(element)
                if element.local_name().as_ref() == b"Relationship" =>
            {
                if let (Some(id), Some(target)) =
                    (attribute(&element, b"Id"), attribute(&element, b"Target"))
                {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(targets)
}

/// Each `<si>` is one entry; rich-text runs inside it are concatenated.
fn parse_shared_strings(xml: &[u8]) -> Result<Vec<String>, OoxmlError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(element) => match element.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"rPh" => in_phonetic = true,
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(element) if element.local_name().as_ref() == b"si" => {
                strings.push(String::new());
            }
            Event::Text(text) if in_text && !in_phonetic => {
                if let Some(current) = current.as_mut() {
                    current.push_str(&text.unescape()?);
                }
            }
            Event::End(element) => match element.local_name().as_ref() {
                b"si" => strings.push(current.take().unwrap_or_default()),
                b"rPh" => in_phonetic = false,
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

#[derive(Default)]
struct PendingCell {
    column: Option<usize>,
    kind: Option<String>,
    value: String,
    inline: String,
}

impl PendingCell {
    fn resolve(self, shared_strings: &[String]) -> String {
        let raw = self.value.trim();
        match self.kind.as_deref() {
            Some("s") => raw
                .parse::<usize>()
                .ok()
                .and_then(|index| shared_strings.get(index).cloned())
                .unwrap_or_default(),
            Some("inlineStr") => self.inline,
            Some("b") => if raw == "1" { "TRUE" } else { "FALSE" }.to_string(),
            _ => raw.to_string(),
        }
    }
}

fn parse_rows(xml: &[u8], shared_strings: &[String]) -> Result<Vec<Vec<String>>, OoxmlError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell: Option<PendingCell> = None;
    let mut in_value = false;
    let mut in_inline_text = false;
    let mut cell_count = 0usize;

    loop {
        if cell_count >= MAX_CELLS_PER_SHEET {
            break;
        }
        match reader.read_event_into(&mut buf)? {
            Event::Start(element) => match element.local_name().as_ref() {
                b"row" => row.clear(),
                b"c" => {
                    cell = Some(PendingCell {
                        column: attribute(&element, b"r").and_then(|reference| column_index(&reference)),
                        kind: attribute(&element, b"t"),
                        ..PendingCell::default()
                    });
                }
                b"v" => in_value = true,
                b"t" => in_inline_text = cell.is_some(),
                _ => {}
            },
            Event::Text(text) => {
                if let Some(cell) = cell.as_mut() {
                    if in_value {
                        cell.value.push_str(&text.unescape()?);
                    } else if in_inline_text {
                        cell.inline.push_str(&text.unescape()?);
                    }
                }
            }
            Event::End(element) => match element.local_name().as_ref() {
                b"v" => in_value = false,
                b"t" => in_inline_text = false,
                b"c" => {
                    if let Some(done) = cell.take() {
                        let column =
                            done.column.filter(|column| *column < MAX_COLUMNS).unwrap_or(row.len());
                        let text = done.resolve(shared_strings);
                        if column >= row.len() {
                            row.resize(column + 1, String::new());
                        }
                        row[column] = text;
                        cell_count += 1;
                    }
                }
                b"row" => {
                    trim_trailing_empty(&mut row);
                    if !row.is_empty() {
                        rows.push(std::mem::take(&mut row));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(rows)
}

fn trim_trailing_empty(row: &mut Vec<String>) {
    while row.last().is_some_and(|cell| cell.trim().is_empty()) {
        row.pop();
    }
}

/// Zero-based column of an A1-style reference (`"C7"` -> 2).
fn column_index(reference: &str) -> Option<usize> {
    let letters = reference.chars().take_while(char::is_ascii_alphabetic).collect::<String>();
    if letters.is_empty() {
        return None;
    }
    letters
        .chars()
        .try_fold(0usize, |acc, letter| {
            let digit = (letter.to_ascii_uppercase() as u8).checked_sub(b'A')? as usize + 1;
            acc.checked_mul(26)?.checked_add(digit)
        })
        .map(|value| value - 1)
}

fn csv_field(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
