pub mod parse_amount;
pub mod sheet_link;
