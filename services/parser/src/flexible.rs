//! Heuristic extractor for sheets that do not follow the standard template.
//!
//! [`detect_format`] sniffs the delimiter and locates fuzzy field labels in
//! the first lines; [`process_with_format`] pulls values from the recorded
//! positions and buckets the remaining rows with keyword predicates. A row may
//! land in several collections at once.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::document::{SectionType, ServiceSheet, SheetField};
use crate::rules::extract_time;
use crate::tokenizer::{cell, tokenize_with};

/// Lines inspected when counting delimiters.
pub const DELIMITER_SAMPLE_LINES: usize = 5;
/// Lines inspected when looking for field labels.
pub const LABEL_SCAN_LINES: usize = 20;
/// Fallback value column when the cell next to a label is empty.
pub const DEFAULT_VALUE_COLUMN: usize = 3;

const CANDIDATE_DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Fuzzy vocabulary for unknown templates. Deliberately smaller and more
/// generic than the exact lists in `rules`.
pub mod vocab {
    use crate::document::{ScheduleSlot, SheetField};

    /// Label patterns per field, in claim order.
    pub const FIELD_PATTERNS: &[(SheetField, &[&str])] = &[
        (SheetField::Client, &["cliente", "client", "empresa", "customer"]),
        (SheetField::ResponsiblePerson, &["responsable", "encargado", "coordinador", "manager"]),
        (SheetField::Contact, &["contacto", "contact", "teléfono", "telefono", "móvil", "movil"]),
        (SheetField::Address, &["dirección", "direccion", "address", "ubicación", "ubicacion"]),
        (SheetField::Transporter, &["transportista", "transporte", "driver"]),
        (SheetField::PersonCount, &["personas", "pax", "comensales", "asistentes"]),
        (SheetField::StaffText, &["personal", "staff", "camareros"]),
        (SheetField::ServiceDate, &["fecha", "date", "servicio"]),
    ];

    pub const SCHEDULE_PATTERNS: &[(ScheduleSlot, &[&str])] = &[
        (ScheduleSlot::Setup, &["montaje", "setup"]),
        (ScheduleSlot::Welcome, &["welcome", "bienvenida"]),
        (ScheduleSlot::Breakfast, &["desayuno", "breakfast"]),
        (ScheduleSlot::Lunch, &["comida", "almuerzo", "lunch"]),
        (ScheduleSlot::Pickup, &["recogida", "pickup"]),
    ];

    pub const EQUIPMENT_KEYWORDS: &[&str] = &[
        "mesa", "silla", "mantel", "carpa", "nevera", "termo", "bandeja", "vajilla", "cubierto",
        "plato", "vaso", "servilleta",
    ];

    pub const MENU_KEYWORDS: &[&str] = &[
        "menu", "menú", "bocadillo", "sandwich", "ensalada", "postre", "fruta", "canapé",
        "desayuno", "plato",
    ];

    pub const BEVERAGE_KEYWORDS: &[&str] = &[
        "agua", "refresco", "zumo", "cerveza", "vino", "cava", "bebida", "café", "cafe",
    ];

    pub const WARNING_MARKERS: &[&str] = &["ojo!", "importante", "atención", "atencion"];
}

static LOOSE_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})[:.](\d{2})").expect("loose time pattern"));

/// Where a field's value was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldLocation {
    pub field: SheetField,
    pub label_line: usize,
    pub label_column: usize,
    pub value_line: usize,
    pub value_column: usize,
}

/// Result of sniffing an unknown sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatDescriptor {
    pub delimiter: char,
    pub fields: Vec<FieldLocation>,
    /// Set when a row of column headers was found instead of label/value rows.
    pub header_line: Option<usize>,
}

impl FormatDescriptor {
    pub fn location(&self, field: SheetField) -> Option<&FieldLocation> {
        self.fields.iter().find(|l| l.field == field)
    }
}

/// Delimiter with the highest count over the first sampled lines. Ties go to
/// the earlier candidate, so a sheet with no delimiters reads as commas.
pub fn detect_delimiter<S: AsRef<str>>(lines: &[S]) -> char {
    let mut best = (CANDIDATE_DELIMITERS[0], 0usize);
    for candidate in CANDIDATE_DELIMITERS {
        let count: usize = lines
            .iter()
            .take(DELIMITER_SAMPLE_LINES)
            .map(|l| l.as_ref().matches(candidate).count())
            .sum();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

pub fn detect_format<S: AsRef<str>>(lines: &[S]) -> FormatDescriptor {
    let delimiter = detect_delimiter(lines);
    let mut fields: Vec<FieldLocation> = Vec::new();
    let mut header_line = None;

    for (line_idx, line) in lines.iter().take(LABEL_SCAN_LINES).enumerate() {
        let cells: Vec<String> = tokenize_with(line.as_ref(), delimiter)
            .into_iter()
            .map(|c| c.to_lowercase())
            .collect();
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }

        let labels = find_labels(&cells, &fields);

        // Three or more labels and nothing else on the row: a column header,
        // values below. Mixed rows are horizontal label/value pairs.
        if labels.len() >= 3 && header_line.is_none() && is_header_row(&cells, &labels) {
            header_line = Some(line_idx);
            for (field, column) in labels {
                fields.push(FieldLocation {
                    field,
                    label_line: line_idx,
                    label_column: column,
                    value_line: line_idx + 1,
                    value_column: column,
                });
            }
            continue;
        }

        let mut claimed: HashSet<usize> = HashSet::new();
        for (field, column) in labels {
            if claimed.contains(&column) {
                continue;
            }
            let value_column = infer_value_column(&cells, column);
            claimed.insert(column);
            claimed.insert(value_column);
            fields.push(FieldLocation {
                field,
                label_line: line_idx,
                label_column: column,
                value_line: line_idx,
                value_column,
            });
        }
    }

    debug!(
        delimiter = ?delimiter,
        fields = fields.len(),
        header_line = ?header_line,
        "detected sheet format"
    );

    FormatDescriptor {
        delimiter,
        fields,
        header_line,
    }
}

/// `(field, column)` for every field not yet located whose pattern appears in
/// one of the cells.
fn find_labels(cells: &[String], known: &[FieldLocation]) -> Vec<(SheetField, usize)> {
    let mut used_columns: HashSet<usize> = HashSet::new();
    let mut found = Vec::new();
    for (field, patterns) in vocab::FIELD_PATTERNS {
        if known.iter().any(|l| l.field == *field) {
            continue;
        }
        let column = cells.iter().enumerate().position(|(i, c)| {
            !used_columns.contains(&i) && patterns.iter().any(|p| c.contains(p))
        });
        if let Some(column) = column {
            used_columns.insert(column);
            found.push((*field, column));
        }
    }
    found.sort_by_key(|(_, column)| *column);
    found
}

fn is_header_row(cells: &[String], labels: &[(SheetField, usize)]) -> bool {
    cells
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_empty())
        .all(|(i, _)| labels.iter().any(|(_, column)| *column == i))
}

fn infer_value_column(cells: &[String], label_column: usize) -> usize {
    let next = label_column + 1;
    if !cell(cells, next).is_empty() {
        next
    } else if label_column < DEFAULT_VALUE_COLUMN && !cell(cells, DEFAULT_VALUE_COLUMN).is_empty() {
        DEFAULT_VALUE_COLUMN
    } else {
        next
    }
}

pub fn looks_like_equipment(text: &str) -> bool {
    contains_any(text, vocab::EQUIPMENT_KEYWORDS)
}

pub fn looks_like_menu(text: &str) -> bool {
    contains_any(text, vocab::MENU_KEYWORDS)
}

pub fn looks_like_beverage(text: &str) -> bool {
    contains_any(text, vocab::BEVERAGE_KEYWORDS)
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    !lower.trim().is_empty() && keywords.iter().any(|k| lower.contains(k))
}

/// First `HH:MM` or `HH.MM` in `text`, normalized to `HH:MM`.
fn loose_time(text: &str) -> Option<String> {
    LOOSE_TIME
        .captures(text)
        .map(|caps| format!("{}:{}", &caps[1], &caps[2]))
}

pub fn process_with_format<S: AsRef<str>>(lines: &[S], format: &FormatDescriptor) -> ServiceSheet {
    let mut sheet = ServiceSheet::default();
    let mut consumed: HashSet<usize> = HashSet::new();

    for location in &format.fields {
        consumed.insert(location.label_line);
        consumed.insert(location.value_line);
        let Some(line) = lines.get(location.value_line) else {
            continue;
        };
        let cells = tokenize_with(line.as_ref(), format.delimiter);
        sheet.set_field(location.field, cell(&cells, location.value_column));
    }

    for (slot, patterns) in vocab::SCHEDULE_PATTERNS {
        if let Some((idx, time)) = find_schedule(lines, patterns) {
            consumed.insert(idx);
            sheet.schedule.set(*slot, time);
        }
    }

    for (idx, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        let lower = line.to_lowercase();
        if vocab::WARNING_MARKERS.iter().any(|m| lower.contains(m)) {
            sheet.notes.push(line.trim().to_string());
        }
        if consumed.contains(&idx) {
            continue;
        }

        let cells = tokenize_with(line, format.delimiter);
        let name = cell(&cells, 0);
        if name.is_empty() {
            continue;
        }
        let quantity = cell(&cells, 1);

        if looks_like_equipment(name) {
            sheet.push_equipment(name, quantity, "");
        }
        if looks_like_menu(name) {
            sheet.push_menu(SectionType::General, extract_time(line), name, quantity, "");
        }
        if looks_like_beverage(name) {
            sheet.push_beverage(name, quantity, "");
        }
    }

    sheet
}

fn find_schedule<S: AsRef<str>>(lines: &[S], patterns: &[&str]) -> Option<(usize, String)> {
    lines.iter().enumerate().find_map(|(idx, line)| {
        let lower = line.as_ref().to_lowercase();
        if lower.contains("hora") && patterns.iter().any(|p| lower.contains(p)) {
            loose_time(&lower).map(|time| (idx, time))
        } else {
            None
        }
    })
}

/// Convenience wrapper: detect then process.
pub fn parse_flexible<S: AsRef<str>>(lines: &[S]) -> (FormatDescriptor, ServiceSheet) {
    let format = detect_format(lines);
    let sheet = process_with_format(lines, &format);
    (format, sheet)
}
