//! Postgres persistence for parsed sheets.
//!
//! A sheet is stored as one `hojas_ruta` row plus one child row per
//! equipment, menu, beverage, staff and checklist entry. Children carry
//! `item_order` so [`load_sheet`] can rebuild the document in source order.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::checklist::{Checklist, ChecklistPhase, ChecklistTask};
use crate::document::{BeverageItem, EquipmentItem, MenuItem, Schedule, SectionType, ServiceSheet};
use crate::error::IngestError;
use crate::pipeline::Extraction;

/// Listing row for stored sheets.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SheetSummary {
    pub hoja_id: Uuid,
    pub source_name: String,
    pub strategy: String,
    pub service_date: String,
    pub client: String,
    pub responsible_person: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct SheetRow {
    service_date: String,
    client: String,
    contact: String,
    address: String,
    transporter: String,
    responsible_person: String,
    staff_text: String,
    person_count: i32,
    schedule: Json<Schedule>,
    notes: Json<Vec<String>>,
}

/// Existing sheet imported from the same bytes, if any.
pub async fn find_by_hash(pool: &PgPool, content_hash: &str) -> Result<Option<Uuid>, IngestError> {
    let row: Option<(Uuid,)> =
        sqlx::query_as("SELECT hoja_id FROM hojas_ruta WHERE content_hash = $1 LIMIT 1")
            .bind(content_hash)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|r| r.0))
}

/// Store a sheet and all its child rows in one transaction.
pub async fn save_sheet(
    pool: &PgPool,
    source_name: &str,
    content_hash: &str,
    extraction: &Extraction,
) -> Result<Uuid, IngestError> {
    let sheet = &extraction.sheet;
    let hoja_id = Uuid::new_v4();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO hojas_ruta (
            hoja_id, source_name, content_hash, strategy, service_date, client, contact,
            address, transporter, responsible_person, staff_text, person_count, schedule, notes
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(hoja_id)
    .bind(source_name)
    .bind(content_hash)
    .bind(extraction.strategy.as_str())
    .bind(&sheet.service_date)
    .bind(&sheet.client)
    .bind(&sheet.contact)
    .bind(&sheet.address)
    .bind(&sheet.transporter)
    .bind(&sheet.responsible_person)
    .bind(&sheet.staff_text)
    .bind(int_column(sheet.person_count))
    .bind(Json(&sheet.schedule))
    .bind(Json(&sheet.notes))
    .execute(&mut *tx)
    .await?;

    for item in &sheet.equipment_items {
        sqlx::query(
            "INSERT INTO hoja_equipment (hoja_id, name, quantity, note, item_order) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(hoja_id)
        .bind(&item.name)
        .bind(&item.quantity)
        .bind(&item.note)
        .bind(int_column(item.order))
        .execute(&mut *tx)
        .await?;
    }

    for item in &sheet.menu_items {
        sqlx::query(
            r#"
            INSERT INTO hoja_menu (hoja_id, section_type, service_time, name, quantity, supplier, item_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(hoja_id)
        .bind(item.section_type.as_str())
        .bind(&item.time)
        .bind(&item.name)
        .bind(&item.quantity)
        .bind(&item.supplier)
        .bind(int_column(item.order))
        .execute(&mut *tx)
        .await?;
    }

    for item in &sheet.beverage_items {
        sqlx::query(
            "INSERT INTO hoja_beverages (hoja_id, name, quantity, unit, item_order) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(hoja_id)
        .bind(&item.name)
        .bind(&item.quantity)
        .bind(&item.unit)
        .bind(int_column(item.order))
        .execute(&mut *tx)
        .await?;
    }

    let staff = sheet.staff_members();
    for (order, name) in staff.iter().enumerate() {
        sqlx::query("INSERT INTO hoja_staff (hoja_id, name, item_order) VALUES ($1, $2, $3)")
            .bind(hoja_id)
            .bind(name)
            .bind(int_column(u32::try_from(order).unwrap_or(u32::MAX)))
            .execute(&mut *tx)
            .await?;
    }

    let mut checklist_rows = 0;
    for (phase, task) in sheet.checklist.iter_tasks() {
        sqlx::query(
            "INSERT INTO hoja_checklist (hoja_id, phase, label, completed, item_order) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(hoja_id)
        .bind(phase.as_str())
        .bind(&task.label)
        .bind(task.completed)
        .bind(int_column(task.order))
        .execute(&mut *tx)
        .await?;
        checklist_rows += 1;
    }

    tx.commit().await?;

    info!(
        %hoja_id,
        equipment = sheet.equipment_items.len(),
        menu = sheet.menu_items.len(),
        beverages = sheet.beverage_items.len(),
        staff = staff.len(),
        checklist = checklist_rows,
        "stored service sheet"
    );

    Ok(hoja_id)
}

/// Rebuild a stored sheet, children in their original order.
pub async fn load_sheet(pool: &PgPool, hoja_id: Uuid) -> Result<Option<ServiceSheet>, IngestError> {
    let row: Option<SheetRow> = sqlx::query_as(
        r#"
        SELECT service_date, client, contact, address, transporter, responsible_person,
               staff_text, person_count, schedule, notes
        FROM hojas_ruta
        WHERE hoja_id = $1
        "#,
    )
    .bind(hoja_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let equipment: Vec<(String, String, String, i32)> = sqlx::query_as(
        "SELECT name, quantity, note, item_order FROM hoja_equipment WHERE hoja_id = $1 ORDER BY item_order",
    )
    .bind(hoja_id)
    .fetch_all(pool)
    .await?;

    let menu: Vec<(String, String, String, String, String, i32)> = sqlx::query_as(
        r#"
        SELECT section_type, service_time, name, quantity, supplier, item_order
        FROM hoja_menu WHERE hoja_id = $1 ORDER BY item_order
        "#,
    )
    .bind(hoja_id)
    .fetch_all(pool)
    .await?;

    let beverages: Vec<(String, String, String, i32)> = sqlx::query_as(
        "SELECT name, quantity, unit, item_order FROM hoja_beverages WHERE hoja_id = $1 ORDER BY item_order",
    )
    .bind(hoja_id)
    .fetch_all(pool)
    .await?;

    let tasks: Vec<(String, String, bool, i32)> = sqlx::query_as(
        "SELECT phase, label, completed, item_order FROM hoja_checklist WHERE hoja_id = $1 ORDER BY item_order",
    )
    .bind(hoja_id)
    .fetch_all(pool)
    .await?;

    let mut checklist = Checklist::default();
    for (phase, label, completed, order) in tasks {
        if let Some(phase) = ChecklistPhase::from_key(&phase) {
            checklist.push(
                phase,
                ChecklistTask {
                    label,
                    completed,
                    order: order as u32,
                },
            );
        }
    }

    Ok(Some(ServiceSheet {
        service_date: row.service_date,
        client: row.client,
        contact: row.contact,
        address: row.address,
        transporter: row.transporter,
        responsible_person: row.responsible_person,
        staff_text: row.staff_text,
        person_count: row.person_count.max(0) as u32,
        schedule: row.schedule.0,
        equipment_items: equipment
            .into_iter()
            .map(|(name, quantity, note, order)| EquipmentItem {
                name,
                quantity,
                note,
                order: order as u32,
            })
            .collect(),
        menu_items: menu
            .into_iter()
            .map(|(section, time, name, quantity, supplier, order)| MenuItem {
                section_type: SectionType::from_key(&section),
                time,
                name,
                quantity,
                supplier,
                order: order as u32,
            })
            .collect(),
        beverage_items: beverages
            .into_iter()
            .map(|(name, quantity, unit, order)| BeverageItem {
                name,
                quantity,
                unit,
                order: order as u32,
            })
            .collect(),
        notes: row.notes.0,
        checklist,
    }))
}

/// Postgres `INTEGER` for a count or order, saturating instead of wrapping.
fn int_column(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

pub async fn list_sheets(pool: &PgPool, limit: i64) -> Result<Vec<SheetSummary>, IngestError> {
    let rows = sqlx::query_as(
        r#"
        SELECT hoja_id, source_name, strategy, service_date, client, responsible_person, created_at
        FROM hojas_ruta
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_column_saturates() {
        assert_eq!(int_column(85), 85);
        assert_eq!(int_column(i32::MAX as u32), i32::MAX);
        assert_eq!(int_column(u32::MAX), i32::MAX);
    }
}
