//! CSV export of report rows

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV writer error: {0}")]
    Writer(String),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A row type with a fixed column layout
pub trait CsvRecord: Serialize {
    /// Column names, in field order
    const HEADERS: &'static [&'static str];
}

/// Serialize rows to CSV. The header line is always written, so an empty
/// slice yields a header-only file.
pub fn to_csv<T: CsvRecord>(rows: &[T]) -> Result<String, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);
    wtr.write_record(T::HEADERS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| ExportError::Writer(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InventoryCsvRow, Product, SummaryCsvRow, SummaryRow};

    #[test]
    fn test_summary_csv_headers() {
        let rows = vec![SummaryRow {
            product_code: "SKU-1".to_string(),
            initial_quantity: 30,
            scanned_in: 0,
            scanned_out: 0,
            returns: 5,
            current_closing_stock: 35,
        }];
        let csv_rows: Vec<SummaryCsvRow> = rows.iter().map(SummaryCsvRow::from).collect();
        let csv = to_csv(&csv_rows).unwrap();

        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Product Code,Initial Quantity,Scanned IN,Scanned Out,Returns,Current Closing Stock")
        );
        assert_eq!(lines.next(), Some("SKU-1,30,0,0,5,35"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        #[derive(Serialize)]
        struct Row {
            name: &'static str,
        }
        impl CsvRecord for Row {
            const HEADERS: &'static [&'static str] = &["name"];
        }
        let csv = to_csv(&[Row { name: "Shirt, large" }]).unwrap();
        assert_eq!(csv, "name\n\"Shirt, large\"\n");
    }

    #[test]
    fn test_empty_export_keeps_header() {
        let rows: Vec<SummaryCsvRow> = Vec::new();
        assert_eq!(
            to_csv(&rows).unwrap(),
            "Product Code,Initial Quantity,Scanned IN,Scanned Out,Returns,Current Closing Stock\n"
        );
    }

    #[test]
    fn test_inventory_header_matches_fields() {
        let product = Product {
            id: 1,
            sku: "SKU-1".to_string(),
            name: "Widget".to_string(),
            category: "Parts".to_string(),
            attributes: Default::default(),
            min_stock: 2,
            current_stock: 7,
        };
        let csv = to_csv(&[InventoryCsvRow::from(&product)]).unwrap();
        assert_eq!(csv, "SKU,Name,Category,Current Stock,Min Stock\nSKU-1,Widget,Parts,7,2\n");
    }
}
