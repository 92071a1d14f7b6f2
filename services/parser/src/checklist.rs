//! Default checklist attached to every parsed sheet.
//!
//! A fixed general checklist (before, during and after the event) plus one
//! task per equipment, menu and beverage item.

use serde::{Deserialize, Serialize};

use crate::document::ServiceSheet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChecklistPhase {
    PreEvent,
    DuringEvent,
    PostEvent,
    Equipment,
    Menu,
    Beverages,
}

impl ChecklistPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChecklistPhase::PreEvent => "pre-event",
            ChecklistPhase::DuringEvent => "during-event",
            ChecklistPhase::PostEvent => "post-event",
            ChecklistPhase::Equipment => "equipment",
            ChecklistPhase::Menu => "menu",
            ChecklistPhase::Beverages => "beverages",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "pre-event" => Some(ChecklistPhase::PreEvent),
            "during-event" => Some(ChecklistPhase::DuringEvent),
            "post-event" => Some(ChecklistPhase::PostEvent),
            "equipment" => Some(ChecklistPhase::Equipment),
            "menu" => Some(ChecklistPhase::Menu),
            "beverages" => Some(ChecklistPhase::Beverages),
            _ => None,
        }
    }
}

pub const PRE_EVENT_TASKS: &[&str] = &[
    "Revisar hoja de ruta con el responsable",
    "Cargar material en el vehículo",
    "Confirmar hora de llegada con el cliente",
    "Comprobar menú y alergias",
];

pub const DURING_EVENT_TASKS: &[&str] = &[
    "Montaje de mesas y menaje",
    "Control de temperatura de los alimentos",
    "Reposición de bebidas",
    "Atención a los invitados",
];

pub const POST_EVENT_TASKS: &[&str] = &[
    "Recogida de material",
    "Limpieza de la zona",
    "Inventario de sobrantes",
    "Firma del cliente",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistTask {
    pub label: String,
    pub completed: bool,
    pub order: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralChecklist {
    pub pre_event: Vec<ChecklistTask>,
    pub during_event: Vec<ChecklistTask>,
    pub post_event: Vec<ChecklistTask>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    pub general: GeneralChecklist,
    pub equipment: Vec<ChecklistTask>,
    pub menu: Vec<ChecklistTask>,
    pub beverages: Vec<ChecklistTask>,
}

fn tasks<I, S>(labels: I) -> Vec<ChecklistTask>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| ChecklistTask {
            label: label.into(),
            completed: false,
            order: i as u32,
        })
        .collect()
}

/// `"<name> (<quantity>)"`, or just the name when there is no quantity.
pub fn item_label(name: &str, quantity: &str) -> String {
    if quantity.trim().is_empty() {
        name.to_string()
    } else {
        format!("{} ({})", name, quantity.trim())
    }
}

impl Checklist {
    pub fn for_sheet(sheet: &ServiceSheet) -> Self {
        Self {
            general: GeneralChecklist {
                pre_event: tasks(PRE_EVENT_TASKS.iter().copied()),
                during_event: tasks(DURING_EVENT_TASKS.iter().copied()),
                post_event: tasks(POST_EVENT_TASKS.iter().copied()),
            },
            equipment: tasks(
                sheet
                    .equipment_items
                    .iter()
                    .map(|i| item_label(&i.name, &i.quantity)),
            ),
            menu: tasks(
                sheet
                    .menu_items
                    .iter()
                    .map(|i| item_label(&i.name, &i.quantity)),
            ),
            beverages: tasks(
                sheet
                    .beverage_items
                    .iter()
                    .map(|i| item_label(&i.name, &i.quantity)),
            ),
        }
    }

    /// Every task with its phase, in phase then task order.
    pub fn iter_tasks(&self) -> impl Iterator<Item = (ChecklistPhase, &ChecklistTask)> {
        [
            (ChecklistPhase::PreEvent, &self.general.pre_event),
            (ChecklistPhase::DuringEvent, &self.general.during_event),
            (ChecklistPhase::PostEvent, &self.general.post_event),
            (ChecklistPhase::Equipment, &self.equipment),
            (ChecklistPhase::Menu, &self.menu),
            (ChecklistPhase::Beverages, &self.beverages),
        ]
        .into_iter()
        .flat_map(|(phase, list)| list.iter().map(move |task| (phase, task)))
    }

    /// Append a stored task to its phase list.
    pub fn push(&mut self, phase: ChecklistPhase, task: ChecklistTask) {
        let list = match phase {
            ChecklistPhase::PreEvent => &mut self.general.pre_event,
            ChecklistPhase::DuringEvent => &mut self.general.during_event,
            ChecklistPhase::PostEvent => &mut self.general.post_event,
            ChecklistPhase::Equipment => &mut self.equipment,
            ChecklistPhase::Menu => &mut self.menu,
            ChecklistPhase::Beverages => &mut self.beverages,
        };
        list.push(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_label() {
        assert_eq!(item_label("Mesas", "4"), "Mesas (4)");
        assert_eq!(item_label("Mesas", "  "), "Mesas");
    }

    #[test]
    fn test_general_phases_are_fixed() {
        let checklist = Checklist::for_sheet(&ServiceSheet::default());
        assert_eq!(checklist.general.pre_event.len(), PRE_EVENT_TASKS.len());
        assert_eq!(checklist.general.during_event.len(), DURING_EVENT_TASKS.len());
        assert_eq!(checklist.general.post_event.len(), POST_EVENT_TASKS.len());
        assert!(checklist.equipment.is_empty());
        assert!(checklist.general.pre_event.iter().all(|t| !t.completed));
    }

    #[test]
    fn test_one_task_per_item() {
        let mut sheet = ServiceSheet::default();
        sheet.push_equipment("Mesas", "4", "");
        sheet.push_equipment("Carpa", "", "");
        sheet.push_beverage("Agua", "24", "botellas");
        let checklist = Checklist::for_sheet(&sheet);
        let labels: Vec<&str> = checklist.equipment.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["Mesas (4)", "Carpa"]);
        assert_eq!(checklist.beverages[0].label, "Agua (24)");
        assert_eq!(checklist.equipment[1].order, 1);
    }

    #[test]
    fn test_iter_and_push_rebuild_same_checklist() {
        let mut sheet = ServiceSheet::default();
        sheet.push_equipment("Mesas", "4", "");
        let original = Checklist::for_sheet(&sheet);

        let mut rebuilt = Checklist::default();
        for (phase, task) in original.iter_tasks() {
            rebuilt.push(phase, task.clone());
        }
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_phase_keys() {
        assert_eq!(ChecklistPhase::from_key("post-event"), Some(ChecklistPhase::PostEvent));
        assert_eq!(ChecklistPhase::from_key(ChecklistPhase::Menu.as_str()), Some(ChecklistPhase::Menu));
        assert_eq!(ChecklistPhase::from_key("otro"), None);
    }
}
