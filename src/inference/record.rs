//! The 19-field customer record accepted by both consumers

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One customer, named and typed as in the training data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub gender: String,
    #[serde(rename = "SeniorCitizen")]
    pub senior_citizen: i64,
    #[serde(rename = "Partner")]
    pub partner: String,
    #[serde(rename = "Dependents")]
    pub dependents: String,
    pub tenure: i64,
    #[serde(rename = "PhoneService")]
    pub phone_service: String,
    #[serde(rename = "MultipleLines")]
    pub multiple_lines: String,
    #[serde(rename = "InternetService")]
    pub internet_service: String,
    #[serde(rename = "OnlineSecurity")]
    pub online_security: String,
    #[serde(rename = "OnlineBackup")]
    pub online_backup: String,
    #[serde(rename = "DeviceProtection")]
    pub device_protection: String,
    #[serde(rename = "TechSupport")]
    pub tech_support: String,
    #[serde(rename = "StreamingTV")]
    pub streaming_tv: String,
    #[serde(rename = "StreamingMovies")]
    pub streaming_movies: String,
    #[serde(rename = "Contract")]
    pub contract: String,
    #[serde(rename = "PaperlessBilling")]
    pub paperless_billing: String,
    #[serde(rename = "PaymentMethod")]
    pub payment_method: String,
    #[serde(rename = "MonthlyCharges")]
    pub monthly_charges: f64,
    #[serde(rename = "TotalCharges")]
    pub total_charges: f64,
}

impl Default for CustomerRecord {
    /// The dashboard form's initial values
    fn default() -> Self {
        Self {
            gender: "Male".to_string(),
            senior_citizen: 0,
            partner: "Yes".to_string(),
            dependents: "Yes".to_string(),
            tenure: 12,
            phone_service: "Yes".to_string(),
            multiple_lines: "No".to_string(),
            internet_service: "DSL".to_string(),
            online_security: "No".to_string(),
            online_backup: "No".to_string(),
            device_protection: "No".to_string(),
            tech_support: "No".to_string(),
            streaming_tv: "No".to_string(),
            streaming_movies: "No".to_string(),
            contract: "Month-to-month".to_string(),
            paperless_billing: "Yes".to_string(),
            payment_method: "Electronic check".to_string(),
            monthly_charges: 65.0,
            total_charges: 1500.0,
        }
    }
}

impl CustomerRecord {
    /// One-row frame with the training schema's column names and dtypes
    pub fn to_frame(&self) -> Result<DataFrame> {
        Self::records_to_frame(std::slice::from_ref(self))
    }

    pub fn records_to_frame(records: &[CustomerRecord]) -> Result<DataFrame> {
        let df = df! {
            "gender" => text_column(records, |r| r.gender.as_str()),
            "SeniorCitizen" => records.iter().map(|r| r.senior_citizen).collect::<Vec<i64>>(),
            "Partner" => text_column(records, |r| r.partner.as_str()),
            "Dependents" => text_column(records, |r| r.dependents.as_str()),
            "tenure" => records.iter().map(|r| r.tenure).collect::<Vec<i64>>(),
            "PhoneService" => text_column(records, |r| r.phone_service.as_str()),
            "MultipleLines" => text_column(records, |r| r.multiple_lines.as_str()),
            "InternetService" => text_column(records, |r| r.internet_service.as_str()),
            "OnlineSecurity" => text_column(records, |r| r.online_security.as_str()),
            "OnlineBackup" => text_column(records, |r| r.online_backup.as_str()),
            "DeviceProtection" => text_column(records, |r| r.device_protection.as_str()),
            "TechSupport" => text_column(records, |r| r.tech_support.as_str()),
            "StreamingTV" => text_column(records, |r| r.streaming_tv.as_str()),
            "StreamingMovies" => text_column(records, |r| r.streaming_movies.as_str()),
            "Contract" => text_column(records, |r| r.contract.as_str()),
            "PaperlessBilling" => text_column(records, |r| r.paperless_billing.as_str()),
            "PaymentMethod" => text_column(records, |r| r.payment_method.as_str()),
            "MonthlyCharges" => records.iter().map(|r| r.monthly_charges).collect::<Vec<f64>>(),
            "TotalCharges" => records.iter().map(|r| r.total_charges).collect::<Vec<f64>>(),
        }?;
        Ok(df)
    }
}

fn text_column<'a>(
    records: &'a [CustomerRecord],
    field: impl Fn(&'a CustomerRecord) -> &'a str,
) -> Vec<&'a str> {
    records.iter().map(field).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_uses_training_column_names() {
        let value = serde_json::to_value(CustomerRecord::default()).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 19);
        assert_eq!(value["SeniorCitizen"], 0);
        assert_eq!(value["Contract"], "Month-to-month");
        assert_eq!(value["MonthlyCharges"], 65.0);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let mut value = serde_json::to_value(CustomerRecord::default()).unwrap();
        value.as_object_mut().unwrap().remove("tenure");
        assert!(serde_json::from_value::<CustomerRecord>(value).is_err());
    }

    #[test]
    fn test_frame_dtypes() {
        let df = CustomerRecord::default().to_frame().unwrap();
        assert_eq!(df.shape(), (1, 19));
        assert_eq!(df.column("tenure").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("TotalCharges").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("gender").unwrap().dtype(), &DataType::String);
    }
}
