//! CSV export and all-or-nothing CSV import of assets

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use validator::Validate;

use super::tags::TagSequencer;
use crate::{
    error::{AppError, AppResult},
    inventory::{lifecycle, tag::AssetTag},
    models::{
        asset::CreateAsset,
        enums::AssetStatus,
        import_report::{ImportReport, EXPORT_HEADERS, REQUIRED_IMPORT_HEADERS},
    },
    repository::Repository,
};

/// One data row of an import file, parsed but not yet resolved
#[derive(Debug, Clone, PartialEq)]
struct ImportRow {
    /// 1-based data row number (the header is not counted)
    row: usize,
    asset_tag: Option<String>,
    name: String,
    status: AssetStatus,
    category_code: String,
    subcategory_name: Option<String>,
    location_code: String,
    vendor_name: Option<String>,
    serial_number: Option<String>,
    purchase_date: Option<NaiveDate>,
    warranty_expiry_date: Option<NaiveDate>,
    cost: Option<Decimal>,
    description: Option<String>,
    notes: Option<String>,
}

fn row_error(row: usize, msg: impl std::fmt::Display) -> AppError {
    AppError::Validation(format!("Row {}: {}", row, msg))
}

fn parse_date(row: usize, column: &str, value: Option<String>) -> AppResult<Option<NaiveDate>> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                .map_err(|_| row_error(row, format!("{} '{}' is not a YYYY-MM-DD date", column, v)))
        })
        .transpose()
}

fn parse_rows(body: &str) -> AppResult<Vec<ImportRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::Validation(format!("Unreadable CSV header: {}", e)))?
        .clone();
    let columns: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim_start_matches('\u{feff}').trim().to_lowercase(), i))
        .collect();

    let missing: Vec<&str> = REQUIRED_IMPORT_HEADERS
        .iter()
        .copied()
        .filter(|h| !columns.contains_key(*h))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required columns: {}",
            missing.join(", ")
        )));
    }

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let row = i + 1;
        let record = record.map_err(|e| row_error(row, e))?;
        let field = |name: &str| -> Option<String> {
            columns
                .get(name)
                .and_then(|&idx| record.get(idx))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let name = field("name").ok_or_else(|| row_error(row, "name is required"))?;
        let status = field("status")
            .map(|s| s.parse::<AssetStatus>())
            .transpose()
            .map_err(|e| row_error(row, e))?
            .unwrap_or(AssetStatus::InStock);
        let category_code =
            field("category_code").ok_or_else(|| row_error(row, "category_code is required"))?;
        let location_code =
            field("location_code").ok_or_else(|| row_error(row, "location_code is required"))?;
        let cost = field("cost")
            .map(|c| {
                Decimal::from_str(&c)
                    .ok()
                    .filter(|d| !d.is_sign_negative())
                    .ok_or_else(|| row_error(row, format!("cost '{}' is not a valid amount", c)))
            })
            .transpose()?;

        rows.push(ImportRow {
            row,
            asset_tag: field("asset_tag").map(|t| t.to_uppercase()),
            name,
            status,
            category_code,
            subcategory_name: field("subcategory_name"),
            location_code,
            vendor_name: field("vendor_name"),
            serial_number: field("serial_number"),
            purchase_date: parse_date(row, "purchase_date", field("purchase_date"))?,
            warranty_expiry_date: parse_date(row, "warranty_expiry_date", field("warranty_expiry_date"))?,
            cost,
            description: field("description"),
            notes: field("notes"),
        });
    }

    if rows.is_empty() {
        return Err(AppError::Validation("The file contains no data rows".to_string()));
    }
    Ok(rows)
}

#[derive(Clone)]
pub struct TransferService {
    repository: Repository,
    tags: TagSequencer,
}

impl TransferService {
    pub fn new(repository: Repository, tags: TagSequencer) -> Self {
        Self { repository, tags }
    }

    /// Render every asset as CSV
    pub async fn export_csv(&self) -> AppResult<String> {
        let rows = self.repository.assets.list_for_export().await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        let csv_err = |e: csv::Error| AppError::Internal(format!("CSV export failed: {}", e));
        writer.write_record(EXPORT_HEADERS).map_err(csv_err)?;

        for r in &rows {
            let text = |v: &Option<String>| v.clone().unwrap_or_default();
            let date = |v: &Option<NaiveDate>| v.map(|d| d.to_string()).unwrap_or_default();
            writer
                .write_record([
                    r.asset_tag.clone(),
                    r.name.clone(),
                    r.status.as_str().to_string(),
                    text(&r.category_code),
                    text(&r.subcategory_name),
                    text(&r.location_code),
                    text(&r.vendor_name),
                    text(&r.serial_number),
                    date(&r.purchase_date),
                    date(&r.warranty_expiry_date),
                    r.cost.map(|c| c.to_string()).unwrap_or_default(),
                    text(&r.description),
                    text(&r.notes),
                ])
                .map_err(csv_err)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))?;
        tracing::info!(rows = rows.len(), "Exported assets");
        String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))
    }

    /// Import assets from CSV text. Either every row is created or none is.
    pub async fn import_csv(&self, body: &str, performed_by: Option<i32>) -> AppResult<ImportReport> {
        let rows = parse_rows(body)?;
        let year = Utc::now().year();

        let mut tx = self.repository.begin().await?;
        let mut report = ImportReport::default();
        let mut seen_tags = HashSet::new();

        for row in &rows {
            let tag = self.import_row(&mut tx, row, year, &mut seen_tags, performed_by).await?;
            if row.asset_tag.is_some() {
                report.kept_tags.push(tag);
            } else {
                report.minted_tags.push(tag);
            }
            report.imported += 1;
        }

        tx.commit().await?;
        tracing::info!(
            imported = report.imported,
            minted = report.minted_tags.len(),
            kept = report.kept_tags.len(),
            "CSV import committed"
        );
        Ok(report)
    }

    async fn import_row(
        &self,
        conn: &mut PgConnection,
        row: &ImportRow,
        year: i32,
        seen_tags: &mut HashSet<String>,
        performed_by: Option<i32>,
    ) -> AppResult<String> {
        let category = self
            .repository
            .categories
            .find_by_code(conn, &row.category_code)
            .await?
            .ok_or_else(|| row_error(row.row, format!("unknown category code '{}'", row.category_code)))?;
        let location = self
            .repository
            .locations
            .find_by_code(conn, &row.location_code)
            .await?
            .ok_or_else(|| row_error(row.row, format!("unknown location code '{}'", row.location_code)))?;

        let subcategory_id = match &row.subcategory_name {
            Some(name) => Some(
                self.repository
                    .categories
                    .find_subcategory_by_name(conn, category.id, name)
                    .await?
                    .ok_or_else(|| {
                        row_error(row.row, format!("unknown sub-category '{}' in {}", name, category.name))
                    })?
                    .id,
            ),
            None => None,
        };
        let vendor_id = match &row.vendor_name {
            Some(name) => Some(
                self.repository
                    .vendors
                    .find_by_name(conn, name)
                    .await?
                    .ok_or_else(|| row_error(row.row, format!("unknown vendor '{}'", name)))?
                    .id,
            ),
            None => None,
        };

        let data = CreateAsset {
            name: row.name.clone(),
            description: row.description.clone(),
            serial_number: row.serial_number.clone(),
            status: Some(row.status),
            location_id: location.id,
            category_id: category.id,
            subcategory_id,
            vendor_id,
            purchase_date: row.purchase_date,
            warranty_expiry_date: row.warranty_expiry_date,
            cost: row.cost,
            notes: row.notes.clone(),
        };
        data.validate().map_err(|e| row_error(row.row, e))?;

        let tag = match &row.asset_tag {
            Some(raw) => {
                let parsed = AssetTag::parse(raw)
                    .ok_or_else(|| row_error(row.row, format!("asset tag '{}' is not well formed", raw)))?;
                if !seen_tags.insert(raw.clone()) || self.repository.assets.tag_exists(conn, raw).await? {
                    return Err(row_error(row.row, format!("asset tag '{}' already exists", raw)));
                }
                self.tags.reserve(conn, &parsed).await?;
                raw.clone()
            }
            None => {
                let minted = self.tags.next_tag(conn, &location, &category, year).await?.to_string();
                seen_tags.insert(minted.clone());
                minted
            }
        };

        let asset = self.repository.assets.insert(conn, &tag, row.status, &data).await?;
        let event = lifecycle::creation_event(&asset.asset_tag, asset.status, asset.location_id);
        self.repository
            .asset_events
            .insert(conn, asset.id, &event, performed_by)
            .await?;
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_file() {
        let body = "name,status,category_code,location_code\nLaptop,in_use,comp,m\n";
        let rows = parse_rows(body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row, 1);
        assert_eq!(rows[0].status, AssetStatus::Assigned);
        assert_eq!(rows[0].category_code, "comp");
        assert_eq!(rows[0].asset_tag, None);
    }

    #[test]
    fn test_missing_required_header() {
        let err = parse_rows("name,status,category_code\nLaptop,in_stock,COMP\n").unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("location_code")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_bad_row_is_named() {
        let body = "name,status,category_code,location_code,cost\n\
                    Laptop,in_stock,COMP,M,10.50\n\
                    Monitor,in_stock,MONI,M,ten\n";
        let err = parse_rows(body).unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.starts_with("Row 2:"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_blank_status_defaults_to_in_stock() {
        let body = "asset_tag,name,status,category_code,location_code,purchase_date\n\
                    ess-m-comp-2024-0007,Laptop,,COMP,M,2024-03-01\n";
        let rows = parse_rows(body).unwrap();
        assert_eq!(rows[0].status, AssetStatus::InStock);
        assert_eq!(rows[0].asset_tag.as_deref(), Some("ESS-M-COMP-2024-0007"));
        assert_eq!(rows[0].purchase_date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_unknown_status_and_bad_date_rejected() {
        assert!(parse_rows("name,status,category_code,location_code\nX,lost,COMP,M\n").is_err());
        assert!(parse_rows(
            "name,status,category_code,location_code,purchase_date\nX,in_stock,COMP,M,03/01/2024\n"
        )
        .is_err());
    }

    #[test]
    fn test_empty_file_rejected() {
        assert!(parse_rows("name,status,category_code,location_code\n").is_err());
    }
}
