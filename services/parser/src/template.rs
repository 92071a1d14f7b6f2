//! Column layout of the company's standard spreadsheet template.
//!
//! The strict extractor is driven entirely by a [`Template`]: labelled rows
//! map to document fields through `{label, label_column, value_column,
//! target}` entries, so adjusting a layout means editing this table (or a
//! JSON override loaded with [`Template::from_json`]) rather than the
//! extraction code.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::document::{ScheduleSlot, SheetField};
use crate::error::IngestError;

/// A labelled row whose value lands in a header field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub label: String,
    #[serde(default)]
    pub label_column: usize,
    pub value_column: usize,
    pub target: SheetField,
}

/// A labelled row whose value is a schedule time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleMapping {
    pub label: String,
    #[serde(default)]
    pub label_column: usize,
    pub value_column: usize,
    pub slot: ScheduleSlot,
}

/// Columns for the repeated item rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemColumns {
    pub equipment_name: usize,
    pub equipment_quantity: usize,
    pub equipment_note: usize,
    pub menu_name: usize,
    pub menu_time: usize,
    pub menu_quantity: usize,
    pub menu_supplier: usize,
    pub beverage_name: usize,
    pub beverage_quantity: usize,
    pub beverage_unit: usize,
    /// Columns searched for the warning marker.
    pub note_columns: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub fields: Vec<FieldMapping>,
    pub schedule: Vec<ScheduleMapping>,
    pub items: ItemColumns,
    /// Cells containing this substring become notes.
    pub warning_marker: String,
}

fn field(label: &str, value_column: usize, target: SheetField) -> FieldMapping {
    FieldMapping {
        label: label.to_string(),
        label_column: 0,
        value_column,
        target,
    }
}

fn slot(label: &str, slot: ScheduleSlot) -> ScheduleMapping {
    ScheduleMapping {
        label: label.to_string(),
        label_column: 0,
        value_column: 3,
        slot,
    }
}

impl Template {
    /// The layout produced by the company's usual spreadsheet template.
    pub fn standard() -> Self {
        Self {
            name: "standard".to_string(),
            fields: vec![
                field("Fecha", 3, SheetField::ServiceDate),
                field("Cliente", 3, SheetField::Client),
                field("Contacto y Mobil", 3, SheetField::Contact),
                field("Direccion", 3, SheetField::Address),
                field("Dirección", 3, SheetField::Address),
                field("Transportista", 3, SheetField::Transporter),
                field("PERSONAL", 3, SheetField::StaffText),
                field("RESPONSABLE", 1, SheetField::ResponsiblePerson),
                field("Nº de personas", 1, SheetField::PersonCount),
            ],
            schedule: vec![
                slot("Hora de montaje", ScheduleSlot::Setup),
                slot("HORA WELCOME", ScheduleSlot::Welcome),
                slot("HORA DESAYUNO", ScheduleSlot::Breakfast),
                slot("HORA COMIDA", ScheduleSlot::Lunch),
                slot("Hora de recogida", ScheduleSlot::Pickup),
            ],
            items: ItemColumns {
                equipment_name: 0,
                equipment_quantity: 1,
                equipment_note: 2,
                menu_name: 3,
                menu_time: 4,
                menu_quantity: 5,
                menu_supplier: 6,
                beverage_name: 0,
                beverage_quantity: 1,
                beverage_unit: 2,
                note_columns: vec![2, 3],
            },
            warning_marker: "OJO!".to_string(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, IngestError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, IngestError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Field mapping whose label matches the row, compared case-insensitively.
    pub fn field_for(&self, cells: &[String]) -> Option<&FieldMapping> {
        self.fields
            .iter()
            .find(|m| label_matches(cells, m.label_column, &m.label))
    }

    pub fn schedule_for(&self, cells: &[String]) -> Option<&ScheduleMapping> {
        self.schedule
            .iter()
            .find(|m| label_matches(cells, m.label_column, &m.label))
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::standard()
    }
}

fn label_matches(cells: &[String], column: usize, label: &str) -> bool {
    cells
        .get(column)
        .is_some_and(|cell| cell.trim().to_lowercase() == label.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn test_standard_field_lookup() {
        let template = Template::standard();
        let cells = tokenize("RESPONSABLE,Juan Perez,,");
        let mapping = template.field_for(&cells).unwrap();
        assert_eq!(mapping.target, SheetField::ResponsiblePerson);
        assert_eq!(mapping.value_column, 1);
    }

    #[test]
    fn test_label_lookup_ignores_case() {
        let template = Template::standard();
        let cells = tokenize("cliente,,,Acme");
        assert_eq!(template.field_for(&cells).unwrap().target, SheetField::Client);
    }

    #[test]
    fn test_schedule_lookup() {
        let template = Template::standard();
        let cells = tokenize("HORA COMIDA,,,14:00");
        assert_eq!(template.schedule_for(&cells).unwrap().slot, ScheduleSlot::Lunch);
        assert!(template.field_for(&cells).is_none());
    }

    #[test]
    fn test_template_json_override() {
        let json = r#"{
            "name": "sala-norte",
            "fields": [
                {"label": "Empresa", "value_column": 1, "target": "client"},
                {"label": "Jefe de sala", "value_column": 1, "target": "responsiblePerson"}
            ],
            "schedule": [
                {"label": "Montaje", "value_column": 1, "slot": "setup"}
            ],
            "items": {
                "equipment_name": 0, "equipment_quantity": 1, "equipment_note": 2,
                "menu_name": 3, "menu_time": 4, "menu_quantity": 5, "menu_supplier": 6,
                "beverage_name": 0, "beverage_quantity": 1, "beverage_unit": 2,
                "note_columns": [1]
            },
            "warning_marker": "ATENCION"
        }"#;
        let template = Template::from_json(json).unwrap();
        assert_eq!(template.name, "sala-norte");
        assert_eq!(template.fields[0].label_column, 0);
        assert_eq!(template.schedule[0].slot, ScheduleSlot::Setup);
    }

    #[test]
    fn test_template_bad_json_is_error() {
        assert!(Template::from_json("{ not json").is_err());
    }
}
