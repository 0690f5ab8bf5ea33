//! Tabular export of stored contacts

use super::record::ContactRecord;

pub const CSV_HEADER: [&str; 8] = [
    "ID",
    "Full Name",
    "Email",
    "Phone",
    "Description",
    "Timestamp",
    "Status",
    "Source",
];

/// Quote a field when it contains the delimiter, a quote or a line break
pub fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Header line plus one line per record, joined by `\n`
pub fn export_csv(records: &[ContactRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADER.join(","));
    for record in records {
        let fields = [
            record.id.to_string(),
            record.full_name.clone(),
            record.email.clone(),
            record.phone.clone().unwrap_or_default(),
            record.description.clone(),
            record.timestamp_text(),
            record.status.to_string(),
            record.source.clone(),
        ];
        let row: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
        lines.push(row.join(","));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::validation::FormValues;
    use chrono::DateTime;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_header_only_when_empty() {
        assert_eq!(
            export_csv(&[]),
            "ID,Full Name,Email,Phone,Description,Timestamp,Status,Source"
        );
    }

    #[test]
    fn test_row_layout() {
        let values = FormValues {
            full_name: "Ana Ruiz".into(),
            email: "ana@example.com".into(),
            phone: String::new(),
            description: "Roof, gutters and \"the usual\"".into(),
        };
        let at = DateTime::from_timestamp_millis(1_760_000_000_123).unwrap();
        let record = ContactRecord::from_submission(42, &values, at).unwrap();
        let csv = export_csv(&[record]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "42,Ana Ruiz,ana@example.com,,\"Roof, gutters and \"\"the usual\"\"\",2025-10-09T08:53:20.123Z,new,website"
        );
    }
}
