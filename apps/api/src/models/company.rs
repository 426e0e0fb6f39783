use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "company_size", rename_all = "lowercase")]
pub enum CompanySize {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "company_status", rename_all = "lowercase")]
pub enum CompanyStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub industry: String,
    pub description: String,
    #[serde(rename = "companyType")]
    pub company_type: String,
    pub founder: String,
    pub founded: NaiveDate,
    pub location: String,
    pub headquarter: Vec<String>,
    pub contact_email: String,
    pub contact_phone: String,
    pub website: String,
    pub logo: String,
    pub size: CompanySize,
    #[serde(rename = "createdBy")]
    pub created_by: Uuid,
    pub status: CompanyStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
