//! Resource payload types
//!
//! Field names follow the backend's snake_case attributes. Server-assigned
//! fields (`uuid`, timestamps) are optional and omitted when absent, so the
//! same struct works for create bodies and fetched records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Document attached to an employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeDocument {
    pub uuid: String,
    pub filename: String,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub full_name: String,
    pub nik: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nip: Option<String>,
    #[serde(
        default,
        rename = "employeeDocuments",
        skip_serializing_if = "Option::is_none"
    )]
    pub employee_documents: Option<Vec<EmployeeDocument>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub name: String,
    /// Logo URL as returned by the server; uploads go through multipart
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub pic_name: String,
    pub pic_phone: String,
    pub pic_email: String,
}

/// External person-in-charge contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PicExternal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub name: String,
    pub position: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub name: String,
    pub description: String,
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractClient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub placement_id: String,
    pub contract_value: f64,
    pub start_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub project_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub status: String,
    pub notes: String,
    pub contract_client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractEmployee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub nip: String,
    pub start_on: NaiveDate,
    pub ends_on: NaiveDate,
    /// Take-home pay
    pub thp: f64,
    pub daily_wages: f64,
    pub account_number: String,
    pub bank_id: String,
    pub account_holder_name: String,
    pub no_bpjstk: String,
    pub no_bpjskes: String,
    pub employee_id: String,
    pub placement_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_body_omits_server_fields() {
        let placement = Placement {
            uuid: None,
            name: "Jakarta HQ".to_string(),
            description: "Head office".to_string(),
            client_id: "c-1".to_string(),
            created_at: None,
            updated_at: None,
        };
        let json = serde_json::to_value(&placement).unwrap();

        assert!(json.get("uuid").is_none());
        assert!(json.get("created_at").is_none());
        assert_eq!(json["client_id"], "c-1");
    }

    #[test]
    fn test_invoice_dates_and_timestamps() {
        let invoice: Invoice = serde_json::from_str(
            r#"{
                "uuid": "inv-1",
                "invoice_number": "INV/2024/001",
                "invoice_date": "2024-03-01",
                "due_date": "2024-03-31",
                "subtotal": 1000.0,
                "tax": 110.0,
                "total": 1110.0,
                "status": "unpaid",
                "notes": "",
                "contract_client_id": "cc-1",
                "created_at": "2024-03-01T08:00:00.000000Z"
            }"#,
        )
        .unwrap();

        assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert!(invoice.created_at.is_some());
        assert!(invoice.updated_at.is_none());
    }

    #[test]
    fn test_employee_documents_key() {
        let employee: Employee = serde_json::from_str(
            r#"{
                "uuid": "e-1",
                "full_name": "Siti",
                "nik": "3171",
                "employeeDocuments": [
                    {"uuid": "d-1", "filename": "ktp.pdf", "file": "docs/ktp.pdf", "size": 2048}
                ]
            }"#,
        )
        .unwrap();

        let docs = employee.employee_documents.unwrap();
        assert_eq!(docs[0].size, Some(2048));
        assert!(employee.nip.is_none());
    }
}
