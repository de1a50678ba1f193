//! Bulk export of filtered client sets.
//!
//! Excel and CSV are produced directly; the `pdf` format renders a
//! print-ready HTML report instead of driving a headless renderer.

use chrono::Utc;
use csv::WriterBuilder;
use rust_xlsxwriter::{Format, Workbook};
use sea_orm::DatabaseConnection;
use tracing::instrument;

use crate::client::{find_filtered, ClientFilter, ClientWithProvider};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Excel,
    Csv,
    Pdf,
}

impl ExportFormat {
    /// Unknown format strings fall back to Excel.
    pub fn parse(input: Option<&str>) -> Self {
        match input.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
            Some("csv") => Self::Csv,
            Some("pdf") => Self::Pdf,
            _ => Self::Excel,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Excel => "xlsx",
            Self::Csv => "csv",
            Self::Pdf => "html",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv",
            Self::Pdf => "text/html; charset=utf-8",
        }
    }
}

/// One exportable column: request key, header label, value projection.
pub struct ExportField {
    pub key: &'static str,
    pub label: &'static str,
    extract: fn(&ClientWithProvider) -> String,
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

pub const FIELDS: &[ExportField] = &[
    ExportField { key: "name", label: "Name", extract: |c| c.client.name.clone() },
    ExportField { key: "email", label: "Email", extract: |c| c.client.email.clone() },
    ExportField { key: "phone", label: "Phone", extract: |c| opt(&c.client.phone) },
    ExportField { key: "company", label: "Company", extract: |c| opt(&c.client.company) },
    ExportField { key: "status", label: "Status", extract: |c| c.client.status.clone() },
    ExportField {
        key: "provider",
        label: "Provider",
        extract: |c| c.provider.as_ref().map(|p| p.name.clone()).unwrap_or_default(),
    },
    ExportField { key: "price", label: "Price", extract: |c| format!("{:.2}", c.client.price) },
    ExportField {
        key: "date",
        label: "Date",
        extract: |c| c.client.date.format("%Y-%m-%d").to_string(),
    },
    ExportField { key: "address", label: "Address", extract: |c| opt(&c.client.address) },
    ExportField { key: "city", label: "City", extract: |c| opt(&c.client.city) },
    ExportField { key: "country", label: "Country", extract: |c| opt(&c.client.country) },
    ExportField { key: "notes", label: "Notes", extract: |c| opt(&c.client.notes) },
    ExportField {
        key: "createdAt",
        label: "Created At",
        extract: |c| c.client.created_at.format("%Y-%m-%d %H:%M").to_string(),
    },
];

/// Resolve a comma-separated field selection against the registry.
/// Unknown keys are dropped; an empty or absent selection means all
/// fields, in registry order.
pub fn select_fields(requested: Option<&str>) -> Vec<&'static ExportField> {
    let Some(requested) = requested else {
        return FIELDS.iter().collect();
    };
    let selected: Vec<&'static ExportField> = requested
        .split(',')
        .map(str::trim)
        .filter_map(|key| FIELDS.iter().find(|f| f.key == key))
        .collect();
    if selected.is_empty() {
        FIELDS.iter().collect()
    } else {
        selected
    }
}

/// Ready-to-send export document.
pub struct ExportPayload {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

/// Export every client matching `filter` in the requested format.
#[instrument(skip(db, filter, fields))]
pub async fn export_clients(
    db: &DatabaseConnection,
    filter: &ClientFilter,
    format: ExportFormat,
    fields: Option<&str>,
) -> Result<ExportPayload, ServiceError> {
    let rows = find_filtered(db, filter).await?;
    let fields = select_fields(fields);
    let bytes = match format {
        ExportFormat::Excel => to_xlsx(&rows, &fields)?,
        ExportFormat::Csv => to_csv(&rows, &fields)?,
        ExportFormat::Pdf => to_html(&rows, &fields).into_bytes(),
    };
    Ok(ExportPayload {
        bytes,
        content_type: format.mime_type(),
        filename: format!("clients_{}.{}", Utc::now().format("%Y-%m-%d"), format.extension()),
    })
}

fn to_xlsx(rows: &[ClientWithProvider], fields: &[&ExportField]) -> Result<Vec<u8>, ServiceError> {
    let render = |e: rust_xlsxwriter::XlsxError| ServiceError::Render(e.to_string());
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Clients").map_err(render)?;

    let header = Format::new().set_bold();
    for (col, field) in fields.iter().enumerate() {
        let col = col as u16;
        sheet.write_with_format(0, col, field.label, &header).map_err(render)?;
        sheet.set_column_width(col, 18).map_err(render)?;
    }
    for (row, client) in rows.iter().enumerate() {
        for (col, field) in fields.iter().enumerate() {
            sheet
                .write_string(row as u32 + 1, col as u16, (field.extract)(client))
                .map_err(render)?;
        }
    }
    workbook.save_to_buffer().map_err(render)
}

fn to_csv(rows: &[ClientWithProvider], fields: &[&ExportField]) -> Result<Vec<u8>, ServiceError> {
    let render = |e: csv::Error| ServiceError::Render(e.to_string());
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(fields.iter().map(|f| f.label)).map_err(render)?;
    for client in rows {
        writer
            .write_record(fields.iter().map(|f| (f.extract)(client)))
            .map_err(render)?;
    }
    writer
        .into_inner()
        .map_err(|e| ServiceError::Render(e.to_string()))
}

fn to_html(rows: &[ClientWithProvider], fields: &[&ExportField]) -> String {
    let mut out = String::with_capacity(1024 + rows.len() * 128);
    out.push_str(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Clients Report</title>\n\
         <style>\nbody { font-family: sans-serif; margin: 2em; }\n\
         table { border-collapse: collapse; width: 100%; }\n\
         th, td { border: 1px solid #ccc; padding: 6px 10px; text-align: left; }\n\
         th { background: #f0f0f0; }\n@media print { body { margin: 0; } }\n</style>\n</head>\n<body>\n",
    );
    out.push_str(&format!(
        "<h1>Clients Report</h1>\n<p>Generated {} &mdash; {} record(s)</p>\n<table>\n<tr>",
        Utc::now().format("%Y-%m-%d %H:%M UTC"),
        rows.len()
    ));
    for field in fields {
        out.push_str(&format!("<th>{}</th>", escape_html(field.label)));
    }
    out.push_str("</tr>\n");
    for client in rows {
        out.push_str("<tr>");
        for field in fields {
            out.push_str(&format!("<td>{}</td>", escape_html(&(field.extract)(client))));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n</body>\n</html>\n");
    out
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{client, provider};
    use uuid::Uuid;

    fn fixture(name: &str, company: Option<&str>) -> ClientWithProvider {
        let now = Utc::now();
        ClientWithProvider {
            client: client::Model {
                id: Uuid::new_v4(),
                name: name.to_string(),
                email: "c@example.com".into(),
                phone: None,
                company: company.map(str::to_owned),
                status: client::STATUS_ACTIVE.to_string(),
                price: 99.5,
                date: now.into(),
                address: None,
                city: None,
                country: None,
                notes: None,
                provider_id: Uuid::new_v4(),
                created_at: now.into(),
                updated_at: now.into(),
            },
            provider: Some(provider::Model {
                id: Uuid::new_v4(),
                name: "Tech Corp".into(),
                created_at: now.into(),
            }),
        }
    }

    #[test]
    fn format_parse_defaults_to_excel() {
        assert_eq!(ExportFormat::parse(None), ExportFormat::Excel);
        assert_eq!(ExportFormat::parse(Some("CSV")), ExportFormat::Csv);
        assert_eq!(ExportFormat::parse(Some("pdf")), ExportFormat::Pdf);
        assert_eq!(ExportFormat::parse(Some("docx")), ExportFormat::Excel);
    }

    #[test]
    fn unknown_field_keys_are_dropped() {
        let fields = select_fields(Some("name,bogus,email"));
        let keys: Vec<_> = fields.iter().map(|f| f.key).collect();
        assert_eq!(keys, vec!["name", "email"]);
    }

    #[test]
    fn all_unknown_selection_falls_back_to_all_fields() {
        assert_eq!(select_fields(Some("bogus,nope")).len(), FIELDS.len());
        assert_eq!(select_fields(None).len(), FIELDS.len());
    }

    #[test]
    fn csv_has_header_and_quotes_embedded_commas() {
        let rows = vec![fixture("Doe, Jane", Some("Acme"))];
        let fields = select_fields(Some("name,company,price"));
        let bytes = to_csv(&rows, &fields).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Name,Company,Price"));
        assert_eq!(lines.next(), Some("\"Doe, Jane\",Acme,99.50"));
    }

    #[test]
    fn xlsx_output_is_a_zip_container() {
        let rows = vec![fixture("A", None)];
        let fields = select_fields(None);
        let bytes = to_xlsx(&rows, &fields).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn html_report_escapes_cell_content() {
        let rows = vec![fixture("<script>alert(1)</script>", None)];
        let fields = select_fields(Some("name,provider"));
        let html = to_html(&rows, &fields);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("<th>Provider</th>"));
        assert!(html.contains("Tech Corp"));
    }
}
