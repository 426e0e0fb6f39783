use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Placeholder written into unset location parts. A location made only of
/// placeholders counts as not provided.
pub const LOCATION_NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "gender", rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "availability_status", rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Immediately,
    WithinAMonth,
    #[serde(rename = "3_months")]
    #[sqlx(rename = "3_months")]
    ThreeMonths,
    NotAvailable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "employment_type", rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Freelance,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ExperienceType {
    Internship,
    FullTime,
    PartTime,
    Freelance,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Fresher,
    Experienced,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    HighSchool,
    Intermediate,
    Diploma,
    Bachelor,
    Master,
    Phd,
    Other,
}

fn not_specified() -> String {
    LOCATION_NOT_SPECIFIED.to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    #[serde(default = "not_specified")]
    pub city: String,
    #[serde(default = "not_specified")]
    pub state: String,
    #[serde(default = "not_specified")]
    pub country: String,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            city: not_specified(),
            state: not_specified(),
            country: not_specified(),
        }
    }
}

impl Location {
    pub fn is_specified(&self) -> bool {
        [&self.city, &self.state, &self.country]
            .iter()
            .any(|part| part.as_str() != LOCATION_NOT_SPECIFIED)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreferredLocation {
    pub city: String,
    pub state: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpectedSalary {
    pub min: Option<f64>,
    pub max: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkExperience {
    #[serde(rename = "type")]
    pub kind: ExperienceType,
    pub level: ExperienceLevel,
    pub company: String,
    pub role: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Education {
    pub level: EducationLevel,
    pub institution: String,
    pub field_of_study: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Certification {
    pub name: String,
    pub issuing_organization: String,
    pub issue_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
}

/// One profile per user. Created with whatever the seeker provides and filled in over time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobSeekerProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub gender: Option<Gender>,
    pub dob: Option<NaiveDate>,
    pub resume: Option<String>,
    pub photo: Option<String>,
    pub languages: Vec<String>,
    pub work_experience: Json<Vec<WorkExperience>>,
    pub education: Json<Vec<Education>>,
    pub certifications: Json<Vec<Certification>>,
    pub skills: Vec<String>,
    pub years_of_experience: Option<f64>,
    pub location: Option<Json<Location>>,
    pub preferred_locations: Json<Vec<PreferredLocation>>,
    pub expected_salary: Option<Json<ExpectedSalary>>,
    pub availability_status: Option<AvailabilityStatus>,
    pub job_type: Option<EmploymentType>,
    pub applied_jobs: Vec<Uuid>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl JobSeekerProfile {
    pub fn empty(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            gender: None,
            dob: None,
            resume: None,
            photo: None,
            languages: Vec::new(),
            work_experience: Json(Vec::new()),
            education: Json(Vec::new()),
            certifications: Json(Vec::new()),
            skills: Vec::new(),
            years_of_experience: None,
            location: None,
            preferred_locations: Json(Vec::new()),
            expected_salary: None,
            availability_status: None,
            job_type: None,
            applied_jobs: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
