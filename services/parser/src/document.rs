//! The structured service sheet ("hoja de ruta") produced by the extractors.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::checklist::Checklist;

/// Menu section a line item belongs to, inferred from the last title row seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionType {
    Welcome,
    CoffeeBreak,
    Breakfast,
    Lunch,
    Brunch,
    Dinner,
    General,
}

impl SectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Welcome => "welcome",
            SectionType::CoffeeBreak => "coffee-break",
            SectionType::Breakfast => "breakfast",
            SectionType::Lunch => "lunch",
            SectionType::Brunch => "brunch",
            SectionType::Dinner => "dinner",
            SectionType::General => "general",
        }
    }

    /// Inverse of [`SectionType::as_str`]; unknown keys fall back to `General`.
    pub fn from_key(key: &str) -> Self {
        match key {
            "welcome" => SectionType::Welcome,
            "coffee-break" => SectionType::CoffeeBreak,
            "breakfast" => SectionType::Breakfast,
            "lunch" => SectionType::Lunch,
            "brunch" => SectionType::Brunch,
            "dinner" => SectionType::Dinner,
            _ => SectionType::General,
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named time slots of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleSlot {
    Setup,
    Welcome,
    Breakfast,
    Lunch,
    Pickup,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub setup: String,
    #[serde(default)]
    pub welcome: String,
    #[serde(default)]
    pub breakfast: String,
    #[serde(default)]
    pub lunch: String,
    #[serde(default)]
    pub pickup: String,
}

impl Schedule {
    pub fn get(&self, slot: ScheduleSlot) -> &str {
        match slot {
            ScheduleSlot::Setup => &self.setup,
            ScheduleSlot::Welcome => &self.welcome,
            ScheduleSlot::Breakfast => &self.breakfast,
            ScheduleSlot::Lunch => &self.lunch,
            ScheduleSlot::Pickup => &self.pickup,
        }
    }

    pub fn set(&mut self, slot: ScheduleSlot, value: String) {
        match slot {
            ScheduleSlot::Setup => self.setup = value,
            ScheduleSlot::Welcome => self.welcome = value,
            ScheduleSlot::Breakfast => self.breakfast = value,
            ScheduleSlot::Lunch => self.lunch = value,
            ScheduleSlot::Pickup => self.pickup = value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentItem {
    pub name: String,
    pub quantity: String,
    pub note: String,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub section_type: SectionType,
    pub time: String,
    pub name: String,
    pub quantity: String,
    pub supplier: String,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeverageItem {
    pub name: String,
    pub quantity: String,
    pub unit: String,
    pub order: u32,
}

/// Scalar header fields an extractor can fill from a labelled row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SheetField {
    ServiceDate,
    Client,
    Contact,
    Address,
    Transporter,
    StaffText,
    ResponsiblePerson,
    PersonCount,
}

/// One parsed service sheet.
///
/// `client` and `responsible_person` are the only fields the strict path
/// requires; every other field degrades to its default when missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSheet {
    /// `YYYY-MM-DD`, or the source text untouched when it is not a date.
    pub service_date: String,
    pub client: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub transporter: String,
    #[serde(default)]
    pub responsible_person: String,
    #[serde(default)]
    pub staff_text: String,
    #[serde(default)]
    pub person_count: u32,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub equipment_items: Vec<EquipmentItem>,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
    #[serde(default)]
    pub beverage_items: Vec<BeverageItem>,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub checklist: Checklist,
}

impl ServiceSheet {
    /// Assign a raw cell value to a header field. Dates go through the
    /// normalizer and person counts keep only their leading digits.
    pub fn set_field(&mut self, field: SheetField, raw: &str) {
        let value = raw.trim();
        match field {
            SheetField::ServiceDate => self.service_date = crate::date::normalize_date(value),
            SheetField::Client => self.client = value.to_string(),
            SheetField::Contact => self.contact = value.to_string(),
            SheetField::Address => self.address = value.to_string(),
            SheetField::Transporter => self.transporter = value.to_string(),
            SheetField::StaffText => self.staff_text = value.to_string(),
            SheetField::ResponsiblePerson => self.responsible_person = value.to_string(),
            SheetField::PersonCount => self.person_count = parse_count(value),
        }
    }

    pub fn push_equipment(&mut self, name: &str, quantity: &str, note: &str) {
        let order = self.equipment_items.len() as u32;
        self.equipment_items.push(EquipmentItem {
            name: name.trim().to_string(),
            quantity: quantity.trim().to_string(),
            note: note.trim().to_string(),
            order,
        });
    }

    pub fn push_menu(
        &mut self,
        section_type: SectionType,
        time: String,
        name: &str,
        quantity: &str,
        supplier: &str,
    ) {
        let order = self.menu_items.len() as u32;
        self.menu_items.push(MenuItem {
            section_type,
            time,
            name: name.trim().to_string(),
            quantity: quantity.trim().to_string(),
            supplier: supplier.trim().to_string(),
            order,
        });
    }

    pub fn push_beverage(&mut self, name: &str, quantity: &str, unit: &str) {
        let order = self.beverage_items.len() as u32;
        self.beverage_items.push(BeverageItem {
            name: name.trim().to_string(),
            quantity: quantity.trim().to_string(),
            unit: unit.trim().to_string(),
            order,
        });
    }

    /// Split the free-text staff list into individual names, in source order.
    pub fn staff_members(&self) -> Vec<String> {
        let mut text = self.staff_text.clone();
        for sep in [" y ", " Y ", " i ", " I "] {
            text = text.replace(sep, ",");
        }
        text.split([',', ';', '/', '+', '\n'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Leading run of digits, e.g. `"120 pax"` -> 120. Anything else is 0.
fn parse_count(value: &str) -> u32 {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_field_person_count_with_suffix() {
        let mut sheet = ServiceSheet::default();
        sheet.set_field(SheetField::PersonCount, " 120 pax ");
        assert_eq!(sheet.person_count, 120);
    }

    #[test]
    fn test_set_field_person_count_garbage_defaults_to_zero() {
        let mut sheet = ServiceSheet::default();
        sheet.set_field(SheetField::PersonCount, "unas cien");
        assert_eq!(sheet.person_count, 0);
    }

    #[test]
    fn test_set_field_date_is_normalized() {
        let mut sheet = ServiceSheet::default();
        sheet.set_field(SheetField::ServiceDate, "MARTES 20.05.2025");
        assert_eq!(sheet.service_date, "2025-05-20");
    }

    #[test]
    fn test_push_assigns_increasing_order() {
        let mut sheet = ServiceSheet::default();
        sheet.push_equipment("Mesas", "4", "");
        sheet.push_equipment("Sillas", "20", "");
        sheet.push_beverage("Agua", "12", "botellas");
        assert_eq!(sheet.equipment_items[0].order, 0);
        assert_eq!(sheet.equipment_items[1].order, 1);
        assert_eq!(sheet.beverage_items[0].order, 0);
    }

    #[test]
    fn test_staff_members_split() {
        let sheet = ServiceSheet {
            staff_text: "Ana, Pere i Marta / Luis y Carmen".to_string(),
            ..Default::default()
        };
        assert_eq!(
            sheet.staff_members(),
            vec!["Ana", "Pere", "Marta", "Luis", "Carmen"]
        );
    }

    #[test]
    fn test_staff_members_empty() {
        assert!(ServiceSheet::default().staff_members().is_empty());
    }

    #[test]
    fn test_section_type_key_round_trip() {
        assert_eq!(SectionType::from_key("coffee-break"), SectionType::CoffeeBreak);
        assert_eq!(SectionType::from_key("desconocido"), SectionType::General);
        assert_eq!(SectionType::Lunch.to_string(), "lunch");
    }

    #[test]
    fn test_serializes_camel_case() {
        let sheet = ServiceSheet {
            client: "Acme".to_string(),
            responsible_person: "Juan".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&sheet).unwrap();
        assert_eq!(json["responsiblePerson"], "Juan");
        assert_eq!(json["personCount"], 0);
    }
}
