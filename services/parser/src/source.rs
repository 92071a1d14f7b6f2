//! Loading raw sheet text from uploaded files.
//!
//! Excel workbooks are flattened to CSV (first worksheet only); text files are
//! decoded as UTF-8, falling back to Windows-1252 for legacy exports.

use calamine::{open_workbook_auto, Data, Reader};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, info};

use crate::error::IngestError;

/// Sheet text ready for the pipeline, with where it came from.
#[derive(Debug, Clone)]
pub struct SheetSource {
    /// File name as uploaded, used for placeholders and provenance.
    pub name: String,
    pub text: String,
    /// Hex SHA-256 of the original bytes.
    pub content_hash: String,
    pub from_workbook: bool,
}

/// Detect if file is XLS/XLSX/ODS based on its extension.
pub fn is_excel_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_lowercase().as_str(), "xls" | "xlsx" | "xlsm" | "xlsb" | "ods"))
        .unwrap_or(false)
}

pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Decode file bytes. A UTF-8 BOM is dropped; bytes that are not valid UTF-8
/// are read as Windows-1252.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            debug!("decoded sheet as windows-1252");
            text.into_owned()
        }
    }
}

/// Render one cell the way the sheet shows it.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|datetime| datetime.format("%d.%m.%Y").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

/// Flatten the first worksheet of a workbook into CSV text.
pub fn workbook_to_csv(path: &Path) -> Result<String, IngestError> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = sheet_names.first().ok_or(IngestError::EmptyWorkbook)?;
    let range = workbook.worksheet_range(sheet_name)?;

    let (rows, cols) = range.get_size();
    info!(sheet = %sheet_name, rows, cols, "flattening worksheet");

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for row in range.rows() {
        writer.write_record(row.iter().map(cell_text))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| IngestError::Other(format!("failed to flush csv: {}", e)))?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Load any supported file as sheet text.
pub async fn load_source(path: &Path) -> Result<SheetSource, IngestError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let bytes = tokio::fs::read(path).await?;
    let content_hash = content_hash(&bytes);

    if is_excel_file(path) {
        let text = workbook_to_csv(path)?;
        return Ok(SheetSource {
            name,
            text,
            content_hash,
            from_workbook: true,
        });
    }

    Ok(SheetSource {
        name,
        text: decode_text(&bytes),
        content_hash,
        from_workbook: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_excel_file() {
        assert!(is_excel_file(Path::new("hoja.xlsx")));
        assert!(is_excel_file(Path::new("HOJA.XLS")));
        assert!(is_excel_file(Path::new("hoja.ods")));
        assert!(!is_excel_file(Path::new("hoja.csv")));
        assert!(!is_excel_file(Path::new("hoja")));
    }

    #[test]
    fn test_decode_utf8_with_bom() {
        assert_eq!(decode_text("\u{feff}Dirección,x".as_bytes()), "Dirección,x");
    }

    #[test]
    fn test_decode_windows_1252() {
        // "Nº de personas" and "Dirección" as exported by legacy Excel.
        let bytes = b"N\xBA de personas,Direcci\xF3n";
        assert_eq!(decode_text(bytes), "Nº de personas,Dirección");
    }

    #[test]
    fn test_content_hash_is_stable() {
        let a = content_hash(b"Cliente,,,Acme");
        assert_eq!(a, content_hash(b"Cliente,,,Acme"));
        assert_ne!(a, content_hash(b"Cliente,,,Acme "));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Float(85.0)), "85");
        assert_eq!(cell_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_text(&Data::Int(12)), "12");
        assert_eq!(cell_text(&Data::String("  Acme ".to_string())), "Acme");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[tokio::test]
    async fn test_load_csv_source() {
        let dir = std::env::temp_dir().join(format!("hoja-parser-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("boda_puig.csv");
        std::fs::write(&path, "Cliente,,,Acme\n").unwrap();

        let source = load_source(&path).await.unwrap();
        assert_eq!(source.name, "boda_puig.csv");
        assert_eq!(source.text, "Cliente,,,Acme\n");
        assert!(!source.from_workbook);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
