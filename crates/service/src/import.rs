//! Bulk client import from spreadsheet or CSV uploads.
//!
//! Rows are processed sequentially and independently: a bad row is
//! reported and skipped, the rest still land. Error rows are keyed by
//! their 1-based spreadsheet row number (header row included), so row 2
//! is the first data row.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{info, instrument, warn};

use models::validation::status_or_active;

use crate::client::{create_client, CreateClientInput};
use crate::errors::ServiceError;
use crate::provider::upsert_by_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Excel,
    Csv,
}

impl ImportFormat {
    pub fn from_filename(name: &str) -> Option<Self> {
        match name.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
            Some("xlsx") | Some("xls") => Some(Self::Excel),
            Some("csv") => Some(Self::Csv),
            _ => None,
        }
    }
}

/// One data row as read from the upload, before validation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportRow {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: Option<String>,
    pub provider: Option<String>,
    pub price: Option<String>,
    pub date: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
}

impl ImportRow {
    fn from_cells(headers: &[String], cells: &[String]) -> Self {
        let mut row = Self::default();
        for (header, cell) in headers.iter().zip(cells) {
            let value = cell.trim();
            if value.is_empty() {
                continue;
            }
            let value = Some(value.to_string());
            match header.as_str() {
                "name" | "client name" => row.name = value,
                "email" | "e-mail" => row.email = value,
                "phone" | "telephone" => row.phone = value,
                "company" => row.company = value,
                "status" => row.status = value,
                "provider" | "provider name" => row.provider = value,
                "price" | "amount" => row.price = value,
                "date" => row.date = value,
                "address" => row.address = value,
                "city" => row.city = value,
                "country" => row.country = value,
                "notes" => row.notes = value,
                _ => {}
            }
        }
        row
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

#[derive(Debug, Serialize)]
pub struct RowError {
    pub row: usize,
    pub error: String,
    pub data: ImportRow,
}

#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub message: String,
    pub success: u64,
    pub total: u64,
    pub errors: Vec<RowError>,
}

fn normalize_header(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

fn read_csv(bytes: &[u8]) -> Result<Vec<ImportRow>, ServiceError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ServiceError::Validation(format!("unreadable CSV header: {}", e)))?
        .iter()
        .map(normalize_header)
        .collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| ServiceError::Validation(format!("unreadable CSV row: {}", e)))?;
        let cells: Vec<String> = record.iter().map(str::to_owned).collect();
        rows.push(ImportRow::from_cells(&headers, &cells));
    }
    Ok(rows)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

fn read_excel(bytes: Vec<u8>) -> Result<Vec<ImportRow>, ServiceError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ServiceError::Validation(format!("unreadable workbook: {}", e)))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ServiceError::Validation("workbook has no sheets".into()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ServiceError::Validation(format!("unreadable sheet: {}", e)))?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row
            .iter()
            .map(|c| normalize_header(&cell_to_string(c)))
            .collect(),
        None => return Ok(Vec::new()),
    };
    Ok(rows_iter
        .map(|cells| {
            let cells: Vec<String> = cells.iter().map(cell_to_string).collect();
            ImportRow::from_cells(&headers, &cells)
        })
        .collect())
}

pub fn read_rows(format: ImportFormat, bytes: Vec<u8>) -> Result<Vec<ImportRow>, ServiceError> {
    match format {
        ImportFormat::Csv => read_csv(&bytes),
        ImportFormat::Excel => read_excel(bytes),
    }
}

/// Import clients from an uploaded file. Providers named in the file are
/// created on first sight and reused afterwards.
#[instrument(skip(db, bytes), fields(filename = %filename, size = bytes.len()))]
pub async fn import_clients(
    db: &DatabaseConnection,
    filename: &str,
    bytes: Vec<u8>,
) -> Result<ImportReport, ServiceError> {
    let format = ImportFormat::from_filename(filename).ok_or_else(|| {
        ServiceError::Validation("unsupported file type, expected .xlsx, .xls or .csv".into())
    })?;
    let rows = read_rows(format, bytes)?;
    if rows.iter().all(ImportRow::is_empty) {
        return Err(ServiceError::Validation("file contains no data rows".into()));
    }

    let mut success = 0u64;
    let mut errors = Vec::new();
    // Providers resolved once per distinct name within this upload.
    let mut provider_cache: HashMap<String, uuid::Uuid> = HashMap::new();

    for (index, row) in rows.into_iter().enumerate() {
        // Header occupies row 1 of the sheet.
        let row_number = index + 2;
        if row.is_empty() {
            continue;
        }
        match import_row(db, &row, &mut provider_cache).await {
            Ok(()) => success += 1,
            Err(e) => {
                warn!(row = row_number, error = %e, "import row rejected");
                errors.push(RowError { row: row_number, error: e.to_string(), data: row });
            }
        }
    }

    let total = success + errors.len() as u64;
    info!(success, failed = errors.len(), total, "import finished");
    Ok(ImportReport {
        message: format!("imported {} of {} row(s)", success, total),
        success,
        total,
        errors,
    })
}

async fn import_row(
    db: &DatabaseConnection,
    row: &ImportRow,
    provider_cache: &mut HashMap<String, uuid::Uuid>,
) -> Result<(), ServiceError> {
    let name = row
        .name
        .as_deref()
        .ok_or_else(|| ServiceError::Validation("name is required".into()))?;
    let email = row
        .email
        .as_deref()
        .ok_or_else(|| ServiceError::Validation("email is required".into()))?;
    let provider_name = row
        .provider
        .as_deref()
        .ok_or_else(|| ServiceError::Validation("provider is required".into()))?;

    let provider_id = match provider_cache.get(provider_name) {
        Some(id) => *id,
        None => {
            let provider = upsert_by_name(db, provider_name).await?;
            provider_cache.insert(provider_name.to_string(), provider.id);
            provider.id
        }
    };

    let price = row.price.as_deref().and_then(|p| p.trim().parse::<f64>().ok());
    let status = status_or_active(row.status.as_deref());

    create_client(
        db,
        CreateClientInput {
            name: name.to_string(),
            email: email.to_string(),
            phone: row.phone.clone(),
            company: row.company.clone(),
            status: Some(status.to_string()),
            provider_id,
            price,
            date: row.date.clone(),
            address: row.address.clone(),
            city: row.city.clone(),
            country: row.country.clone(),
            notes: row.notes.clone(),
        },
    )
    .await?;
    Ok(())
}
