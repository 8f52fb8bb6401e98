use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AuditError, Result};
use crate::models::{AppData, Company};

pub const BACKUP_VERSION: &str = "1.0";
pub const BACKUP_EXTENSION: &str = "dawg";

/// The on-disk backup document: the full data set plus provenance. For a
/// company-scoped backup the company record rides along so a restore can
/// detect that the file belongs to a different workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupEnvelope {
    #[serde(flatten)]
    pub data: AppData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
    pub timestamp: String,
    pub version: String,
}

pub fn create_backup(data: &AppData, company: Option<&Company>, timestamp: &str) -> String {
    let envelope = BackupEnvelope {
        data: data.clone(),
        company: company.cloned(),
        timestamp: timestamp.to_string(),
        version: BACKUP_VERSION.to_string(),
    };
    // Indented output; these files are meant to be inspectable.
    serde_json::to_string_pretty(&envelope).expect("backup envelope always serializes")
}

/// `<slug>-backup-<date>.dawg`, slug = lowercased name with each
/// non-alphanumeric character replaced by a dash.
pub fn backup_filename(company_name: &str, date: &str) -> String {
    let slug: String = company_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    format!("{slug}-backup-{date}.{BACKUP_EXTENSION}")
}

/// Decode and validate a backup. Malformed JSON and a parseable-but-wrong
/// shape produce the two distinct user-facing errors; either way nothing
/// has been applied and existing data is untouched.
pub fn restore_backup(raw: &str) -> Result<BackupEnvelope> {
    let value: Value = serde_json::from_str(raw).map_err(|_| AuditError::BackupParse)?;
    for field in ["settings", "income", "expenses"] {
        if value.get(field).map_or(true, Value::is_null) {
            return Err(AuditError::InvalidBackup);
        }
    }
    serde_json::from_value(value).map_err(|_| AuditError::InvalidBackup)
}

/// A company-scoped restore additionally requires the embedded company
/// record.
pub fn restore_company_backup(raw: &str) -> Result<(Company, AppData)> {
    let envelope = restore_backup(raw)?;
    match envelope.company {
        Some(company) => Ok((company, envelope.data)),
        None => Err(AuditError::InvalidBackup),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{add_entry, NewEntry};
    use crate::models::AppSettings;

    fn sample_data() -> AppData {
        let mut data = AppData::default();
        data.settings.add_income_stream("Hair Services").unwrap();
        data.settings.currency = "€".to_string();
        add_entry(
            &mut data.income,
            NewEntry {
                date: "2025-01-17".to_string(),
                category: "Hair Services".to_string(),
                gross: 2800.0,
                tax: 170.0,
                ..Default::default()
            },
        )
        .unwrap();
        add_entry(
            &mut data.expenses,
            NewEntry {
                date: "2025-01-06".to_string(),
                category: "Color Tubes".to_string(),
                gross: 120.0,
                tax: 7.8,
                vendor: Some("CosmoProf".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        data
    }

    #[test]
    fn test_roundtrip_preserves_data() {
        let data = sample_data();
        let raw = create_backup(&data, None, "2025-02-01T10:00:00Z");
        let restored = restore_backup(&raw).unwrap();
        assert_eq!(restored.data, data);
        assert_eq!(restored.version, BACKUP_VERSION);
        assert_eq!(restored.timestamp, "2025-02-01T10:00:00Z");
        assert!(restored.company.is_none());
    }

    #[test]
    fn test_envelope_is_flattened() {
        let raw = create_backup(&sample_data(), None, "t");
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert!(value.get("settings").is_some());
        assert!(value.get("income").is_some());
        assert!(value.get("data").is_none(), "data fields sit at the top level");
        assert_eq!(value["version"], "1.0");
    }

    #[test]
    fn test_company_backup_roundtrip() {
        let company = Company {
            id: "company-1".to_string(),
            name: "Salon Nine".to_string(),
            created_at: "2025-01-01T00:00:00Z".to_string(),
            is_active: true,
        };
        let raw = create_backup(&sample_data(), Some(&company), "t");
        let (restored_company, data) = restore_company_backup(&raw).unwrap();
        assert_eq!(restored_company, company);
        assert_eq!(data, sample_data());
    }

    #[test]
    fn test_company_restore_requires_company_record() {
        let raw = create_backup(&sample_data(), None, "t");
        let err = restore_company_backup(&raw).unwrap_err();
        assert_eq!(err.to_string(), "Invalid backup file format");
    }

    #[test]
    fn test_missing_section_is_invalid_format() {
        let raw = r#"{"settings": {}, "income": [], "timestamp": "t", "version": "1.0"}"#;
        let err = restore_backup(raw).unwrap_err();
        assert_eq!(err.to_string(), "Invalid backup file format");

        let raw = r#"{"settings": null, "income": [], "expenses": [], "timestamp": "t", "version": "1.0"}"#;
        assert_eq!(restore_backup(raw).unwrap_err().to_string(), "Invalid backup file format");
    }

    #[test]
    fn test_malformed_json_is_parse_failure() {
        let err = restore_backup("{this is not json").unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse backup file");
    }

    #[test]
    fn test_backup_filename_slug() {
        assert_eq!(
            backup_filename("Denise's Salon & Spa", "2025-02-01"),
            "denise-s-salon---spa-backup-2025-02-01.dawg"
        );
        assert_eq!(backup_filename("Acme", "2025-02-01"), "acme-backup-2025-02-01.dawg");
    }
}
