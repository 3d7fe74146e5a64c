use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    // -- Transport
    #[error("Google Sheets request failed: {0}")]
    Api(String),

    #[error("Failed to read credentials: {0}")]
    Io(#[from] std::io::Error),

    // -- Workbook shape
    #[error("Worksheet {0} not found in the spreadsheet")]
    MissingWorksheet(usize),

    // -- Table content
    #[error("{0} does not exist")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("Invalid value: {0}")]
    Invalid(String),
}

impl From<google_sheets4::Error> for GridError {
    fn from(err: google_sheets4::Error) -> Self {
        GridError::Api(err.to_string())
    }
}
