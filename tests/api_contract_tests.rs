/// Tests for API wire contracts
///
/// Note: These are unit tests that verify the wire-level conventions are
/// correct. The workflow itself is tested against in-memory databases in
/// the module test suites.

#[cfg(test)]
mod tests {
    #[test]
    fn test_authorization_header_parsing() {
        let auth_header = "Bearer abc123token";
        let token = auth_header.strip_prefix("Bearer ");
        assert_eq!(token, Some("abc123token"));

        let invalid_header = "abc123token";
        let token = invalid_header.strip_prefix("Bearer ");
        assert_eq!(token, None);
    }

    #[test]
    fn test_draft_snapshots_carry_a_type_tag() {
        // Queued snapshots are self-describing: the type tag travels
        // inside the JSON document
        let snapshot: serde_json::Value = serde_json::from_str(
            r#"{"type":"JOB","company":"Acme","status":"OPEN","title":"Engineer"}"#,
        )
        .unwrap();

        assert_eq!(snapshot["type"], "JOB");
        assert_eq!(snapshot["company"], "Acme");
    }

    #[test]
    fn test_dates_are_iso_calendar_dates() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(date.to_string(), "2024-01-01");

        let parsed = chrono::NaiveDate::parse_from_str("2024-02-01", "%Y-%m-%d").unwrap();
        assert_eq!(parsed, chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn test_timestamps_are_rfc3339() {
        let now = chrono::Utc::now();
        let encoded = now.to_rfc3339();

        let decoded = chrono::DateTime::parse_from_rfc3339(&encoded).unwrap();
        assert_eq!(decoded.with_timezone(&chrono::Utc), now);
    }

    #[test]
    fn test_error_body_shape() {
        let body: serde_json::Value = serde_json::from_str(
            r#"{"error":"AdminNotApproved","message":"Admin 7 is not approved. Please wait for approval."}"#,
        )
        .unwrap();

        // Clients branch on the machine-readable code, not the message
        assert_eq!(body["error"], "AdminNotApproved");
        assert!(body["message"].as_str().unwrap().contains("not approved"));
    }
}
