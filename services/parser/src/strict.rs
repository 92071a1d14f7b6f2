//! Strict extractor for the company's standard template.
//!
//! Lines are folded into a [`StrictState`]; the only state carried between
//! lines besides the document is the currently open menu section.

use tracing::debug;

use crate::document::{SectionType, ServiceSheet};
use crate::rules;
use crate::template::Template;
use crate::tokenizer::{cell, tokenize};

#[derive(Debug, Default)]
pub struct StrictState {
    pub sheet: ServiceSheet,
    pub section: Option<SectionType>,
}

impl StrictState {
    /// Consume one line and return the updated state.
    pub fn consume(mut self, template: &Template, line: &str) -> Self {
        if line.trim().is_empty() {
            return self;
        }
        let cells = tokenize(line);
        let cols = &template.items;

        self.collect_note(template, &cells);

        if let Some(mapping) = template.field_for(&cells) {
            self.sheet.set_field(mapping.target, cell(&cells, mapping.value_column));
            return self;
        }
        if let Some(mapping) = template.schedule_for(&cells) {
            self.sheet
                .schedule
                .set(mapping.slot, cell(&cells, mapping.value_column).to_string());
            return self;
        }

        let menu_cell = cell(&cells, cols.menu_name);
        if rules::is_menu_section_title(menu_cell) {
            let section = rules::section_type_from_title(menu_cell);
            debug!(title = menu_cell, %section, "menu section opened");
            self.section = Some(section);
        }

        // Equipment wins over beverages so the two never claim the same row.
        let first = cell(&cells, cols.equipment_name);
        if rules::is_known_equipment_item(first) {
            self.sheet.push_equipment(
                first,
                cell(&cells, cols.equipment_quantity),
                cell(&cells, cols.equipment_note),
            );
        } else {
            let beverage = cell(&cells, cols.beverage_name);
            if rules::is_known_beverage_item(beverage) || rules::is_any_beverage_like(beverage) {
                self.sheet.push_beverage(
                    beverage,
                    cell(&cells, cols.beverage_quantity),
                    cell(&cells, cols.beverage_unit),
                );
            }
        }

        if let Some(section) = self.section {
            if !menu_cell.is_empty() && rules::is_menu_item_like(menu_cell) {
                let mut time = rules::extract_time(cell(&cells, cols.menu_time));
                if time.is_empty() {
                    time = rules::extract_time(menu_cell);
                }
                self.sheet.push_menu(
                    section,
                    time,
                    menu_cell,
                    cell(&cells, cols.menu_quantity),
                    cell(&cells, cols.menu_supplier),
                );
            }
        }

        self
    }

    fn collect_note(&mut self, template: &Template, cells: &[String]) {
        if template.warning_marker.is_empty() {
            return;
        }
        let marked = template
            .items
            .note_columns
            .iter()
            .map(|&i| cell(cells, i))
            .find(|text| text.contains(&template.warning_marker));
        if let Some(text) = marked {
            let label = cell(cells, 0);
            let label = if label.is_empty() { "Nota" } else { label };
            self.sheet.notes.push(format!("{}: {}", label, text));
        }
    }
}

/// Parse lines laid out in `template`. Unrecognized lines are skipped; the
/// result is always a document, whether or not it is usable.
pub fn parse_strict<S: AsRef<str>>(lines: &[S], template: &Template) -> ServiceSheet {
    lines
        .iter()
        .fold(StrictState::default(), |state, line| {
            state.consume(template, line.as_ref())
        })
        .sheet
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(lines: &[&str]) -> ServiceSheet {
        parse_strict(lines, &Template::standard())
    }

    // -------------------------------------------------------------------------
    // HEADER FIELDS
    // -------------------------------------------------------------------------

    #[test]
    fn test_minimal_valid_input() {
        let sheet = parse(&[
            "Fecha,,,MARTES 20.05.2025",
            "Cliente,,,Acme Corp",
            "RESPONSABLE,Juan Perez,,",
        ]);
        assert_eq!(sheet.service_date, "2025-05-20");
        assert_eq!(sheet.client, "Acme Corp");
        assert_eq!(sheet.responsible_person, "Juan Perez");
    }

    #[test]
    fn test_all_header_fields() {
        let sheet = parse(&[
            "Fecha,,,MARTES 20.05.2025",
            "Cliente,,,Acme Corp",
            "Contacto y Mobil,,,Laura 600123123",
            "Direccion,,,\"Carrer Major 1, Girona\"",
            "Transportista,,,Transportes Puig",
            "PERSONAL,,,\"Ana, Pere i Marta\"",
            "RESPONSABLE,Juan Perez,,",
            "Nº de personas,85,,",
        ]);
        assert_eq!(sheet.contact, "Laura 600123123");
        assert_eq!(sheet.address, "Carrer Major 1, Girona");
        assert_eq!(sheet.transporter, "Transportes Puig");
        assert_eq!(sheet.staff_text, "Ana, Pere i Marta");
        assert_eq!(sheet.person_count, 85);
        assert_eq!(sheet.staff_members(), vec!["Ana", "Pere", "Marta"]);
    }

    #[test]
    fn test_missing_value_column_defaults_empty() {
        let sheet = parse(&["Cliente", "Nº de personas"]);
        assert_eq!(sheet.client, "");
        assert_eq!(sheet.person_count, 0);
    }

    #[test]
    fn test_schedule_rows() {
        let sheet = parse(&[
            "Hora de montaje,,,8:00",
            "HORA WELCOME,,,9:00",
            "HORA DESAYUNO,,,9:30",
            "HORA COMIDA,,,14:00",
            "Hora de recogida,,,17:30",
        ]);
        assert_eq!(sheet.schedule.setup, "8:00");
        assert_eq!(sheet.schedule.welcome, "9:00");
        assert_eq!(sheet.schedule.breakfast, "9:30");
        assert_eq!(sheet.schedule.lunch, "14:00");
        assert_eq!(sheet.schedule.pickup, "17:30");
    }

    // -------------------------------------------------------------------------
    // ITEMS
    // -------------------------------------------------------------------------

    #[test]
    fn test_equipment_rows() {
        let sheet = parse(&["Mesas,10,redondas,", "Sillas,80,,", "Mesas para fuera,2,,"]);
        assert_eq!(sheet.equipment_items.len(), 2);
        assert_eq!(sheet.equipment_items[0].name, "Mesas");
        assert_eq!(sheet.equipment_items[0].quantity, "10");
        assert_eq!(sheet.equipment_items[0].note, "redondas");
        assert_eq!(sheet.equipment_items[1].order, 1);
    }

    #[test]
    fn test_beverage_rows_exact_and_fuzzy() {
        let sheet = parse(&["Cerveza,24,latas", "Suc de taronja,6,litros", "Sillas,80,,"]);
        assert_eq!(sheet.beverage_items.len(), 2);
        assert_eq!(sheet.beverage_items[0].unit, "latas");
        assert_eq!(sheet.beverage_items[1].name, "Suc de taronja");
        assert_eq!(sheet.beverage_items[1].order, 1);
    }

    #[test]
    fn test_equipment_and_beverage_never_share_a_row() {
        let lines: Vec<String> = crate::rules::KNOWN_EQUIPMENT_ITEMS
            .iter()
            .map(|item| format!("{},1,,", item))
            .collect();
        let sheet = parse_strict(&lines, &Template::standard());
        assert_eq!(sheet.equipment_items.len(), lines.len());
        assert!(sheet.beverage_items.is_empty());
    }

    #[test]
    fn test_menu_requires_open_section() {
        let sheet = parse(&[",,,Bocadillo de jamón,,40,Forn Vell"]);
        assert!(sheet.menu_items.is_empty());
    }

    #[test]
    fn test_menu_item_columns() {
        let sheet = parse(&[
            ",,,MENÚ WELCOME",
            ",,,Mini croissant,9:15,60,Forn Vell",
        ]);
        assert_eq!(sheet.menu_items.len(), 1);
        let item = &sheet.menu_items[0];
        assert_eq!(item.section_type, SectionType::Welcome);
        assert_eq!(item.time, "9:15");
        assert_eq!(item.quantity, "60");
        assert_eq!(item.supplier, "Forn Vell");
    }

    #[test]
    fn test_section_persists_across_unrelated_lines() {
        let sheet = parse(&[
            ",,,MENU COMIDA",
            ",,,Ensalada verde,,80,",
            "Sillas,80,,",
            "Cliente,,,Acme",
            "",
            ",,,Paella mixta,,80,",
            ",,,MENÚ DESAYUNO",
            ",,,Fruta variada,,20,",
        ]);
        let sections: Vec<SectionType> = sheet.menu_items.iter().map(|m| m.section_type).collect();
        assert_eq!(
            sections,
            vec![SectionType::Lunch, SectionType::Lunch, SectionType::Breakfast]
        );
        assert_eq!(sheet.menu_items[2].order, 2);
    }

    #[test]
    fn test_same_row_holds_equipment_and_menu() {
        let sheet = parse(&[",,,MENÚ COMIDA", "Bandejas,6,,Tarta de queso,,80,Pastisseria"]);
        assert_eq!(sheet.equipment_items.len(), 1);
        assert_eq!(sheet.menu_items.len(), 1);
        assert_eq!(sheet.menu_items[0].name, "Tarta de queso");
    }

    // -------------------------------------------------------------------------
    // NOTES
    // -------------------------------------------------------------------------

    #[test]
    fn test_warning_notes() {
        let sheet = parse(&[
            "Acceso,,OJO!!! parking solo hasta las 9,",
            ",,,OJO!!! cliente alérgico a frutos secos",
        ]);
        assert_eq!(
            sheet.notes,
            vec![
                "Acceso: OJO!!! parking solo hasta las 9",
                "Nota: OJO!!! cliente alérgico a frutos secos",
            ]
        );
    }

    #[test]
    fn test_narrative_lines_are_skipped() {
        let sheet = parse(&["Recordad llevar las llaves del almacén", ",,,,,,", "   "]);
        assert_eq!(sheet, ServiceSheet::default());
    }
}
