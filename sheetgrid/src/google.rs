//! Google Sheets backend.

use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use google_sheets4::{
    api::{
        BatchUpdateSpreadsheetRequest, Border, GridRange, Request, Scope, UpdateBordersRequest,
        ValueRange,
    },
    hyper::{self, client::HttpConnector},
    hyper_rustls::{self, HttpsConnector},
    oauth2, Sheets,
};

use crate::{
    a1::CellRange,
    error::GridError,
    grid::{BorderStyle, Borders, CellValue, GridBackend},
    workbook::{Workbook, WorkbookProvider},
};

type Hub = Sheets<HttpsConnector<HttpConnector>>;

/// Worksheet positions inside every registered spreadsheet.
pub const JOURNAL_WORKSHEET: usize = 0;
pub const SETTINGS_WORKSHEET: usize = 1;

/// Authenticated client for the Sheets API.
#[derive(Clone)]
pub struct GoogleSheets {
    hub: Arc<Hub>,
}

impl GoogleSheets {
    /// Authenticate as the service account whose key is stored at `path`.
    /// Users share their spreadsheet with that account's e-mail.
    pub async fn from_service_account(path: impl AsRef<Path>) -> Result<Self, GridError> {
        let key = oauth2::read_service_account_key(path).await?;
        log::info!("Authenticating as {}", key.client_email);
        let auth = oauth2::ServiceAccountAuthenticator::builder(key)
            .build()
            .await?;
        let hub = Sheets::new(
            hyper::Client::builder().build(
                hyper_rustls::HttpsConnectorBuilder::new()
                    .with_native_roots()
                    .https_or_http()
                    .enable_http1()
                    .build(),
            ),
            auth,
        );
        Ok(Self { hub: Arc::new(hub) })
    }

    /// Tabs of a spreadsheet ordered by position.
    async fn worksheets(&self, spreadsheet_id: &str) -> Result<Vec<(i32, String)>, GridError> {
        let (_, spreadsheet) = self
            .hub
            .spreadsheets()
            .get(spreadsheet_id)
            .add_scope(Scope::Spreadsheet)
            .doit()
            .await?;
        let mut sheets: Vec<(i32, i32, String)> = spreadsheet
            .sheets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|sheet| {
                let properties = sheet.properties?;
                Some((
                    properties.index.unwrap_or_default(),
                    properties.sheet_id?,
                    properties.title?,
                ))
            })
            .collect();
        sheets.sort_by_key(|(index, _, _)| *index);
        Ok(sheets
            .into_iter()
            .map(|(_, sheet_id, title)| (sheet_id, title))
            .collect())
    }

    fn worksheet(
        &self,
        spreadsheet_id: &str,
        sheets: &[(i32, String)],
        index: usize,
    ) -> Result<GoogleWorksheet, GridError> {
        let (sheet_id, title) = sheets
            .get(index)
            .ok_or(GridError::MissingWorksheet(index))?;
        Ok(GoogleWorksheet {
            hub: self.hub.clone(),
            spreadsheet_id: spreadsheet_id.to_string(),
            sheet_id: *sheet_id,
            title: title.clone(),
        })
    }
}

#[async_trait]
impl WorkbookProvider for GoogleSheets {
    async fn open(&self, spreadsheet_id: &str) -> Result<Workbook, GridError> {
        let sheets = self.worksheets(spreadsheet_id).await?;
        let journal = self.worksheet(spreadsheet_id, &sheets, JOURNAL_WORKSHEET)?;
        let settings = self.worksheet(spreadsheet_id, &sheets, SETTINGS_WORKSHEET)?;
        Ok(Workbook::new(Arc::new(journal), Arc::new(settings)))
    }

    async fn check_access(&self, spreadsheet_id: &str) -> bool {
        match self.worksheets(spreadsheet_id).await {
            Ok(sheets) if sheets.len() > SETTINGS_WORKSHEET => true,
            Ok(sheets) => {
                log::warn!(
                    "Spreadsheet {} has {} worksheets, need {}",
                    spreadsheet_id,
                    sheets.len(),
                    SETTINGS_WORKSHEET + 1
                );
                false
            }
            Err(err) => {
                log::warn!("Spreadsheet {} is not accessible: {}", spreadsheet_id, err);
                false
            }
        }
    }
}

/// One tab of a spreadsheet.
pub struct GoogleWorksheet {
    hub: Arc<Hub>,
    spreadsheet_id: String,
    sheet_id: i32,
    title: String,
}

impl GoogleWorksheet {
    /// `'Tab name'!E4:G`
    fn a1(&self, range: &CellRange) -> String {
        format!("'{}'!{}", self.title.replace('\'', "''"), range)
    }

    fn grid_range(&self, range: &CellRange) -> GridRange {
        GridRange {
            sheet_id: Some(self.sheet_id),
            start_row_index: Some(range.start_row as i32 - 1),
            end_row_index: range.end_row.map(|row| row as i32),
            start_column_index: Some(range.start_column as i32),
            end_column_index: Some(range.end_column as i32 + 1),
        }
    }
}

/// Wire value for a `USER_ENTERED` write. Plain text gets a leading
/// apostrophe so the sheet stores it literally instead of parsing it as a
/// number, date or formula; the apostrophe itself is not kept.
fn entered(value: &CellValue) -> serde_json::Value {
    match value {
        CellValue::Text(text) if !text.is_empty() => {
            serde_json::Value::String(format!("'{}", text))
        }
        other => other.to_json(),
    }
}

/// Merge the two renderings of a range into copyable contents. A cell is a
/// formula when its `FORMULA` rendering starts with `=` and differs from the
/// computed value; literal text that starts with `=` renders the same both
/// ways.
fn merge_formulas(
    values: Vec<Vec<CellValue>>,
    formulas: Vec<Vec<CellValue>>,
) -> Vec<Vec<CellValue>> {
    let height = values.len().max(formulas.len());
    (0..height)
        .map(|i| {
            let value_row = values.get(i).map(Vec::as_slice).unwrap_or_default();
            let formula_row = formulas.get(i).map(Vec::as_slice).unwrap_or_default();
            let width = value_row.len().max(formula_row.len());
            (0..width)
                .map(|j| {
                    let value = value_row.get(j).cloned().unwrap_or(CellValue::Empty);
                    match formula_row.get(j) {
                        Some(CellValue::Text(source))
                            if source.starts_with('=')
                                && value != CellValue::Text(source.clone()) =>
                        {
                            CellValue::Formula(source.clone())
                        }
                        _ => value,
                    }
                })
                .collect()
        })
        .collect()
}

fn border(style: Option<BorderStyle>) -> Option<Border> {
    style.map(|style| Border {
        style: Some(style.api_name().to_string()),
        ..Default::default()
    })
}

impl GoogleWorksheet {
    async fn fetch(
        &self,
        range: &CellRange,
        render: &str,
    ) -> Result<Vec<Vec<CellValue>>, GridError> {
        let a1 = self.a1(range);
        log::debug!("values.get {} {} {}", self.spreadsheet_id, a1, render);
        let (_, values) = self
            .hub
            .spreadsheets()
            .values_get(&self.spreadsheet_id, &a1)
            .value_render_option(render)
            .major_dimension("ROWS")
            .add_scope(Scope::Spreadsheet)
            .doit()
            .await?;
        Ok(values
            .values
            .unwrap_or_default()
            .iter()
            .map(|row| row.iter().map(CellValue::from_json).collect())
            .collect())
    }
}

#[async_trait]
impl GridBackend for GoogleWorksheet {
    async fn read(&self, range: &CellRange) -> Result<Vec<Vec<CellValue>>, GridError> {
        self.fetch(range, "UNFORMATTED_VALUE").await
    }

    async fn read_formulas(&self, range: &CellRange) -> Result<Vec<Vec<CellValue>>, GridError> {
        let values = self.fetch(range, "UNFORMATTED_VALUE").await?;
        let formulas = self.fetch(range, "FORMULA").await?;
        Ok(merge_formulas(values, formulas))
    }

    async fn write(&self, range: &CellRange, values: Vec<Vec<CellValue>>) -> Result<(), GridError> {
        let a1 = self.a1(range);
        log::debug!("values.update {} {}", self.spreadsheet_id, a1);
        let request = ValueRange {
            major_dimension: Some("ROWS".to_string()),
            range: Some(a1.clone()),
            values: Some(
                values
                    .iter()
                    .map(|row| row.iter().map(entered).collect())
                    .collect(),
            ),
        };
        self.hub
            .spreadsheets()
            .values_update(request, &self.spreadsheet_id, &a1)
            .value_input_option("USER_ENTERED")
            .add_scope(Scope::Spreadsheet)
            .doit()
            .await?;
        Ok(())
    }

    async fn set_borders(&self, range: &CellRange, borders: Borders) -> Result<(), GridError> {
        if range.end_row.is_none() {
            return Err(GridError::Invalid(format!(
                "borders need a closed range, got {}",
                range
            )));
        }
        log::debug!("updateBorders {} {}", self.spreadsheet_id, self.a1(range));
        let request = BatchUpdateSpreadsheetRequest {
            requests: Some(vec![Request {
                update_borders: Some(UpdateBordersRequest {
                    range: Some(self.grid_range(range)),
                    top: border(borders.top),
                    bottom: border(borders.bottom),
                    left: border(borders.left),
                    right: border(borders.right),
                    inner_horizontal: border(borders.inner_horizontal),
                    inner_vertical: border(borders.inner_vertical),
                }),
                ..Default::default()
            }]),
            ..Default::default()
        };
        self.hub
            .spreadsheets()
            .batch_update(request, &self.spreadsheet_id)
            .add_scope(Scope::Spreadsheet)
            .doit()
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_entered_text_stays_literal() {
        assert_eq!(entered(&CellValue::from("=IMPORTDATA(\"x\")")), json!("'=IMPORTDATA(\"x\")"));
        assert_eq!(entered(&CellValue::from("Mar 5")), json!("'Mar 5"));
        assert_eq!(entered(&CellValue::from("+100")), json!("'+100"));
        assert_eq!(
            entered(&CellValue::Formula("=DATE(2024, 3, 5)".to_string())),
            json!("=DATE(2024, 3, 5)")
        );
        assert_eq!(entered(&CellValue::Number(12.5)), json!(12.5));
        assert_eq!(entered(&CellValue::Bool(true)), json!(true));
        assert_eq!(entered(&CellValue::Empty), json!(""));
    }

    #[test]
    fn test_merge_formulas() {
        let values = vec![
            vec![
                CellValue::Number(45356.0),
                CellValue::from("=not a formula"),
                CellValue::Number(10.0),
            ],
            vec![CellValue::Number(45355.0)],
        ];
        let formulas = vec![
            vec![
                CellValue::from("=DATE(2024, 3, 5)"),
                CellValue::from("=not a formula"),
                CellValue::Number(10.0),
            ],
            vec![CellValue::from("=DATE(2024, 3, 4)")],
        ];
        assert_eq!(
            merge_formulas(values, formulas),
            vec![
                vec![
                    CellValue::Formula("=DATE(2024, 3, 5)".to_string()),
                    CellValue::from("=not a formula"),
                    CellValue::Number(10.0),
                ],
                vec![CellValue::Formula("=DATE(2024, 3, 4)".to_string())],
            ]
        );
    }

    #[test]
    fn test_border_mapping() {
        assert!(border(None).is_none());
        assert_eq!(
            border(Some(BorderStyle::Dotted)).and_then(|b| b.style),
            Some("DOTTED".to_string())
        );
        assert_eq!(
            border(Some(BorderStyle::None)).and_then(|b| b.style),
            Some("NONE".to_string())
        );
    }
}
