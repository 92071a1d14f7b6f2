//! Pipeline coordinator: strict extraction first, flexible fallback second.

use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::checklist::Checklist;
use crate::document::ServiceSheet;
use crate::flexible::{self, FormatDescriptor};
use crate::strict::parse_strict;
use crate::template::Template;

/// Which extractor produced the final document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Strict,
    Flexible,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Strict => "strict",
            Strategy::Flexible => "flexible",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a strict result was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SheetRejection {
    MissingClient,
    MissingResponsiblePerson,
}

impl fmt::Display for SheetRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetRejection::MissingClient => f.write_str("client is empty"),
            SheetRejection::MissingResponsiblePerson => f.write_str("responsible person is empty"),
        }
    }
}

/// Validity gate for strict output: client and responsible person must be
/// non-empty.
pub fn validate(sheet: &ServiceSheet) -> Result<(), SheetRejection> {
    if sheet.client.trim().is_empty() {
        return Err(SheetRejection::MissingClient);
    }
    if sheet.responsible_person.trim().is_empty() {
        return Err(SheetRejection::MissingResponsiblePerson);
    }
    Ok(())
}

/// A parsed sheet plus how it was obtained.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    pub sheet: ServiceSheet,
    pub strategy: Strategy,
    /// Set when the strict pass ran but its result failed the validity gate.
    pub strict_rejection: Option<SheetRejection>,
    /// Set when the flexible extractor ran.
    pub format: Option<FormatDescriptor>,
}

/// Split raw text into lines, dropping a UTF-8 BOM. Accepts `\n`, `\r\n`
/// and the lone `\r` of old Mac exports.
pub fn split_lines(raw: &str) -> Vec<&str> {
    let mut rest = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut lines = Vec::new();
    while !rest.is_empty() {
        match rest.find(['\r', '\n']) {
            Some(pos) => {
                lines.push(&rest[..pos]);
                let skip = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[pos + skip..];
            }
            None => {
                lines.push(rest);
                break;
            }
        }
    }
    lines
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    template: Template,
}

impl Pipeline {
    pub fn new(template: Template) -> Self {
        Self { template }
    }

    /// Parse a whole sheet. Always yields a document; the flexible result is
    /// returned as-is, even when it would not pass [`validate`].
    pub fn process_text(&self, raw: &str) -> Extraction {
        let lines = split_lines(raw);

        let strict = parse_strict(&lines, &self.template);
        let strict_rejection = match validate(&strict) {
            Ok(()) => {
                info!(
                    template = %self.template.name,
                    client = %strict.client,
                    "strict extraction accepted"
                );
                return finish(strict, Strategy::Strict, None, None);
            }
            Err(rejection) => rejection,
        };

        warn!(reason = %strict_rejection, "strict extraction rejected, falling back to flexible");
        let (format, sheet) = flexible::parse_flexible(&lines);
        if let Err(gap) = validate(&sheet) {
            warn!(reason = %gap, "flexible extraction accepted without required fields");
        }
        finish(sheet, Strategy::Flexible, Some(strict_rejection), Some(format))
    }
}

fn finish(
    mut sheet: ServiceSheet,
    strategy: Strategy,
    strict_rejection: Option<SheetRejection>,
    format: Option<FormatDescriptor>,
) -> Extraction {
    sheet.checklist = Checklist::for_sheet(&sheet);
    Extraction {
        sheet,
        strategy,
        strict_rejection,
        format,
    }
}

/// Parse with the standard template.
pub fn process_text(raw: &str) -> Extraction {
    Pipeline::default().process_text(raw)
}

/// Placeholder client name derived from a file name, used by callers when
/// neither extractor found one.
pub fn placeholder_client(source_name: &str) -> String {
    let stem = std::path::Path::new(source_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source_name);
    let name = stem
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        "Cliente sin nombre".to_string()
    } else {
        name
    }
}
