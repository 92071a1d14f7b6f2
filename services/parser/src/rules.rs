//! Classifier rules for the company's standard template.
//!
//! Two kinds of rules live here and must stay distinct:
//! - exact membership (`is_known_equipment_item`, `is_known_beverage_item`),
//!   used where narrative text would otherwise produce false positives;
//! - keyword substring matching (`is_any_beverage_like`, `is_menu_section_title`,
//!   `is_menu_item_like`), used for fuzzier header and section content.
//!
//! The heuristic vocabulary used by the flexible extractor is kept apart in
//! `flexible::vocab`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::SectionType;

/// Equipment names exactly as the template lists them in the first column.
pub const KNOWN_EQUIPMENT_ITEMS: &[&str] = &[
    "Mesas",
    "Mesas redondas",
    "Mesas altas",
    "Mesas plegables",
    "Sillas",
    "Taburetes",
    "Manteles",
    "Manteles blancos",
    "Cubremesas",
    "Faldones",
    "Servilletas",
    "Servilletas de papel",
    "Platos",
    "Platos hondos",
    "Platos postre",
    "Cubiertos",
    "Tenedores",
    "Cuchillos",
    "Cucharas",
    "Cucharillas",
    "Vasos",
    "Copas",
    "Tazas",
    "Bandejas",
    "Fuentes",
    "Chafing dish",
    "Termos",
    "Cafeteras",
    "Hervidor",
    "Neveras",
    "Nevera portátil",
    "Hielo",
    "Cubiteras",
    "Carpa",
    "Generador",
    "Alargos",
    "Cubos de basura",
    "Bolsas de basura",
    "Papel film",
    "Papel de aluminio",
    "Pinzas",
    "Cazos",
];

/// Beverage names exactly as the template lists them in the first column.
pub const KNOWN_BEVERAGE_ITEMS: &[&str] = &[
    "Agua",
    "Agua con gas",
    "Aguas pequeñas",
    "Aguas grandes",
    "Refrescos",
    "Coca-Cola",
    "Coca-Cola Zero",
    "Fanta naranja",
    "Fanta limón",
    "Aquarius",
    "Nestea",
    "Tónica",
    "Zumos",
    "Zumo de naranja",
    "Cerveza",
    "Cerveza sin alcohol",
    "Vino blanco",
    "Vino tinto",
    "Cava",
    "Café",
    "Café descafeinado",
    "Leche",
    "Leche vegetal",
    "Infusiones",
    "Té",
];

/// Substrings that make a first-column value beverage-like. Checked after
/// exact equipment membership so it never reclassifies known equipment.
pub const BEVERAGE_KEYWORDS: &[&str] = &[
    "agua", "refresc", "zumo", "suc ", "cerveza", "cervesa", "vino", "cava", "leche", "llet",
    "infusi", "coca-cola", "fanta", "aquarius", "nestea", "tónica", "tonica",
];

/// Title rows that open a menu section.
pub const MENU_SECTION_TITLES: &[&str] = &[
    "MENÚ WELCOME",
    "MENU WELCOME",
    "MENÚ COFFEE BREAK",
    "MENU COFFEE BREAK",
    "COFFEE BREAK",
    "MENÚ DESAYUNO",
    "MENU DESAYUNO",
    "MENÚ COMIDA",
    "MENU COMIDA",
    "MENÚ ALMUERZO",
    "MENU ALMUERZO",
    "MENÚ BRUNCH",
    "MENU BRUNCH",
    "MENÚ CENA",
    "MENU CENA",
    "CAFETERAS",
];

/// Words that mark a cell as a dish or menu entry.
pub const MENU_KEYWORDS: &[&str] = &[
    "bocadillo",
    "bocata",
    "sandwich",
    "croissant",
    "bollería",
    "bolleria",
    "fruta",
    "ensalada",
    "pasta",
    "arroz",
    "paella",
    "pollo",
    "ternera",
    "cerdo",
    "pescado",
    "merluza",
    "salmón",
    "verdura",
    "crema",
    "sopa",
    "postre",
    "pastel",
    "tarta",
    "yogur",
    "queso",
    "embutido",
    "jamón",
    "tortilla",
    "canapé",
    "brocheta",
    "mini",
    "café",
    "zumo",
];

static TIME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{1,2}:\d{2}").expect("time pattern"));

fn is_exact_member(list: &[&str], text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && list.iter().any(|item| item.to_lowercase() == text.to_lowercase())
}

/// Exact (case-insensitive, trimmed) membership in [`KNOWN_EQUIPMENT_ITEMS`].
pub fn is_known_equipment_item(text: &str) -> bool {
    is_exact_member(KNOWN_EQUIPMENT_ITEMS, text)
}

/// Exact (case-insensitive, trimmed) membership in [`KNOWN_BEVERAGE_ITEMS`].
pub fn is_known_beverage_item(text: &str) -> bool {
    is_exact_member(KNOWN_BEVERAGE_ITEMS, text)
}

/// Looser secondary pass: any [`BEVERAGE_KEYWORDS`] substring.
pub fn is_any_beverage_like(text: &str) -> bool {
    let lower = format!("{} ", text.trim().to_lowercase());
    lower.trim().len() > 1 && BEVERAGE_KEYWORDS.iter().any(|k| lower.contains(k))
}

pub fn is_menu_section_title(text: &str) -> bool {
    let upper = text.trim().to_uppercase();
    !upper.is_empty() && MENU_SECTION_TITLES.iter().any(|t| upper.contains(t))
}

/// Map a recognized title to its section; unrecognized titles are `General`.
pub fn section_type_from_title(text: &str) -> SectionType {
    let upper = text.to_uppercase();
    if upper.contains("WELCOME") {
        SectionType::Welcome
    } else if upper.contains("COFFEE") {
        SectionType::CoffeeBreak
    } else if upper.contains("BRUNCH") {
        SectionType::Brunch
    } else if upper.contains("DESAYUNO") {
        SectionType::Breakfast
    } else if upper.contains("COMIDA") || upper.contains("ALMUERZO") {
        SectionType::Lunch
    } else if upper.contains("CENA") {
        SectionType::Dinner
    } else {
        SectionType::General
    }
}

pub fn is_menu_item_like(text: &str) -> bool {
    let lower = text.to_lowercase();
    MENU_KEYWORDS.iter().any(|k| lower.contains(k)) && !is_menu_section_title(text)
}

/// First `H:MM`/`HH:MM` in `text`, or `""`.
pub fn extract_time(text: &str) -> String {
    TIME_PATTERN
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
