//! Spreadsheet-driven batch generation
//!
//! One workbook row becomes one version-1 document. The runner reads the
//! first worksheet, treats row 1 as variable names, and keeps going when a
//! row fails so one bad row cannot sink the rest of the batch. It also
//! produces the fill-in workbook users start from, with one column per
//! template placeholder.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use chrono::Utc;
use rust_xlsxwriter::{Workbook, XlsxError};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::EngineError;
use crate::generate::DocumentGenerator;
use crate::naming;
use crate::render::context::{business_offset, ContextDefaults, RenderContext};
use crate::render::TemplateRenderer;
use crate::store::{DocumentId, DocumentStore, NewDocument, OwnerId, Template, TemplateId};

/// Reserved header: this column names the output file instead of feeding a
/// template variable.
pub const OUTPUT_FILENAME_COLUMN: &str = "output_filename";

/// Sheet name used in generated fill-in workbooks.
pub const TEMPLATE_SHEET: &str = "Data Input";

const TEMPLATE_COLUMN_WIDTH: f64 = 20.0;

/// One successfully generated batch document.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedRef {
    /// Spreadsheet row the document came from; the header is row 1.
    pub row: u32,
    pub id: DocumentId,
    pub title: String,
}

/// One failed batch row.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRowError {
    pub row: u32,
    pub message: String,
}

/// Outcome of a batch run. `total` always equals `success + failed`;
/// skipped blank rows are never counted.
#[derive(Debug, Default, Serialize)]
pub struct BatchResult {
    pub total: u32,
    pub success: u32,
    pub failed: u32,
    pub generated: Vec<GeneratedRef>,
    pub errors: Vec<BatchRowError>,
}

/// A fill-in workbook ready to hand to the user.
#[derive(Debug, Clone)]
pub struct BatchTemplate {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub struct BatchRunner<'a> {
    generator: &'a DocumentGenerator,
}

impl<'a> BatchRunner<'a> {
    pub fn new(generator: &'a DocumentGenerator) -> BatchRunner<'a> {
        BatchRunner { generator }
    }

    /// Builds the fill-in workbook for a template: the reserved filename
    /// column followed by one column per extracted placeholder.
    pub fn template_workbook(&self, template_id: TemplateId) -> Result<BatchTemplate, EngineError> {
        let template = self.generator.template(template_id)?;
        let variables = lexdraft_docx::extract_from_path(&template.file_path);
        let bytes = template_workbook(&variables)?;
        let filename = format!(
            "Batch_Template_{}.xlsx",
            naming::sanitize_title(&template.title)
        );
        Ok(BatchTemplate { filename, bytes })
    }

    /// Generates one document per data row of the workbook's first sheet.
    ///
    /// An unreadable workbook fails the whole run; a failing row is
    /// recorded in the result and the run continues.
    pub fn run(
        &self,
        template_id: TemplateId,
        owner_id: OwnerId,
        workbook: &[u8],
    ) -> Result<BatchResult, EngineError> {
        let template = self.generator.template(template_id)?;
        let safe_title = naming::sanitize_title(&template.title);

        let mut xlsx = Xlsx::new(Cursor::new(workbook))
            .map_err(|e| EngineError::Validation(format!("unreadable workbook: {e}")))?;
        let range = xlsx
            .worksheet_range_at(0)
            .ok_or_else(|| EngineError::Validation("workbook has no worksheets".into()))?
            .map_err(|e| EngineError::Validation(format!("unreadable worksheet: {e}")))?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(row) => row.iter().map(cell_text).collect(),
            None => {
                return Err(EngineError::Validation("workbook has no header row".into()));
            }
        };

        let mut result = BatchResult::default();
        for (row_index, row) in rows.enumerate() {
            // The header occupies spreadsheet row 1, so data starts at 2.
            let row_number = row_index as u32 + 2;
            if row.iter().all(is_empty_cell) {
                continue;
            }
            result.total += 1;
            match self.generate_row(&template, owner_id, &headers, row, row_number, &safe_title) {
                Ok(generated) => {
                    result.success += 1;
                    result.generated.push(generated);
                }
                Err(e) => {
                    warn!("batch row {} failed: {}", row_number, e);
                    result.failed += 1;
                    result.errors.push(BatchRowError {
                        row: row_number,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            "batch for template {} finished: {} succeeded, {} failed",
            template_id, result.success, result.failed
        );
        Ok(result)
    }

    fn generate_row(
        &self,
        template: &Template,
        owner_id: OwnerId,
        headers: &[String],
        row: &[Data],
        row_number: u32,
        safe_title: &str,
    ) -> Result<GeneratedRef, EngineError> {
        let mut vars = HashMap::new();
        let mut output_name: Option<String> = None;

        for (header, cell) in headers.iter().zip(row) {
            // Columns without a header cannot be variables.
            if header.is_empty() {
                continue;
            }
            if header == OUTPUT_FILENAME_COLUMN {
                let text = cell_text(cell);
                if !text.is_empty() {
                    output_name = Some(text);
                }
                continue;
            }
            if let Some(value) = cell_value(cell) {
                vars.insert(header.clone(), value);
            }
        }

        let name = output_name.unwrap_or_else(|| {
            let stamp = Utc::now()
                .with_timezone(&business_offset())
                .format("%Y%m%d%H%M%S");
            format!("{safe_title}_{stamp}_{row_number}")
        });
        let title = name.strip_suffix(".docx").unwrap_or(&name).to_string();
        let filename = naming::batch_filename(owner_id, template.id, &name);

        let mut context = RenderContext::from_vars(vars);
        context.apply_defaults(&ContextDefaults::for_batch());

        let rendered = self
            .generator
            .renderer
            .render(&template.file_path, &context)?;
        let path = self.generator.storage.write(&filename, &rendered)?;

        let document = self.generator.documents.create(NewDocument {
            title: title.clone(),
            template_id: template.id,
            owner_id,
            file_path: path,
            version: 1,
            parent_id: None,
        })?;

        Ok(GeneratedRef {
            row: row_number,
            id: document.id,
            title,
        })
    }
}

/// Writes a fill-in workbook with the given variable columns.
pub fn template_workbook(variables: &[String]) -> Result<Vec<u8>, EngineError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(TEMPLATE_SHEET).map_err(wb_err)?;
    sheet
        .write_string(0, 0, OUTPUT_FILENAME_COLUMN)
        .map_err(wb_err)?;
    sheet.set_column_width(0, TEMPLATE_COLUMN_WIDTH).map_err(wb_err)?;
    for (index, variable) in variables.iter().enumerate() {
        let col = (index + 1) as u16;
        sheet.write_string(0, col, variable.as_str()).map_err(wb_err)?;
        sheet.set_column_width(col, TEMPLATE_COLUMN_WIDTH).map_err(wb_err)?;
    }
    workbook.save_to_buffer().map_err(wb_err)
}

fn wb_err(e: XlsxError) -> EngineError {
    EngineError::Workbook(e.to_string())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn is_empty_cell(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Converts a cell into a template value, keeping spreadsheet types where
/// JSON has an equivalent. Blank and error cells carry no value.
fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            if s.trim().is_empty() {
                None
            } else {
                Some(Value::String(s.clone()))
            }
        }
        Data::Float(f) => Some(Value::from(*f)),
        Data::Int(i) => Some(Value::from(*i)),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| Value::String(d.format("%Y-%m-%d %H:%M:%S").to_string())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::String(s.clone())),
        Data::Error(_) => None,
    }
}
