use regex::Regex;

/// Extract a spreadsheet id from a share link such as
/// `https://docs.google.com/spreadsheets/d/<id>/edit#gid=0`, or accept the
/// id itself.
pub fn extract_spreadsheet_id(text: &str) -> Option<String> {
    let text = text.trim();
    let link = Regex::new(r"docs\.google\.com/spreadsheets/(?:u/\d+/)?d/([A-Za-z0-9_-]+)").ok()?;
    if let Some(captures) = link.captures(text) {
        return Some(captures[1].to_string());
    }
    let bare_id = Regex::new(r"^[A-Za-z0-9_-]{20,}$").ok()?;
    bare_id.is_match(text).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms";

    #[test]
    fn test_share_link() {
        let link = format!("https://docs.google.com/spreadsheets/d/{}/edit#gid=0", ID);
        assert_eq!(extract_spreadsheet_id(&link), Some(ID.to_string()));
        let link = format!("docs.google.com/spreadsheets/u/1/d/{}", ID);
        assert_eq!(extract_spreadsheet_id(&link), Some(ID.to_string()));
    }

    #[test]
    fn test_bare_id() {
        assert_eq!(extract_spreadsheet_id(&format!(" {} ", ID)), Some(ID.to_string()));
    }

    #[test]
    fn test_not_a_spreadsheet() {
        assert_eq!(extract_spreadsheet_id("hello"), None);
        assert_eq!(
            extract_spreadsheet_id("https://docs.google.com/document/d/abc/edit"),
            None
        );
        assert_eq!(extract_spreadsheet_id(""), None);
    }
}
