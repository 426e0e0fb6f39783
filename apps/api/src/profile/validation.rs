use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::types::Json;
use validator::{Validate, ValidationError};

use crate::models::job_seeker::{
    AvailabilityStatus, Certification, Education, EmploymentType, ExpectedSalary, Gender,
    JobSeekerProfile, Location, PreferredLocation, WorkExperience,
};

const RESUME_EXTENSIONS: &[&str] = &[".pdf", ".docx", ".txt"];
const PHOTO_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif"];

fn is_http_url_with_extension(value: &str, extensions: &[&str]) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(rest) if !rest.is_empty() && !rest.contains(char::is_whitespace) => {
            let lower = rest.to_lowercase();
            extensions.iter().any(|ext| lower.ends_with(ext))
        }
        _ => false,
    }
}

fn validate_resume_url(value: &str) -> Result<(), ValidationError> {
    if is_http_url_with_extension(value, RESUME_EXTENSIONS) {
        return Ok(());
    }
    Err(ValidationError::new("resume_url").with_message(
        "Resume must be a valid URL pointing to pdf, docx, or txt file".into(),
    ))
}

fn validate_photo_url(value: &str) -> Result<(), ValidationError> {
    if is_http_url_with_extension(value, PHOTO_EXTENSIONS) {
        return Ok(());
    }
    Err(ValidationError::new("photo_url").with_message(
        "Photo must be a valid URL pointing to jpg, jpeg, png, or gif file".into(),
    ))
}

fn validate_expected_salary(salary: &ExpectedSalary) -> Result<(), ValidationError> {
    let negative = [salary.min, salary.max]
        .into_iter()
        .flatten()
        .any(|bound| bound < 0.0);
    if negative {
        return Err(ValidationError::new("range")
            .with_message("Expected salary bounds must not be negative".into()));
    }
    Ok(())
}

/// Body of `POST /job-seeker/create` and `PUT /job-seeker/{id}`. Every field is optional;
/// an update only touches the fields it carries.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProfileInput {
    pub gender: Option<Gender>,
    pub dob: Option<NaiveDate>,
    #[validate(custom(function = "validate_resume_url"))]
    pub resume: Option<String>,
    #[validate(custom(function = "validate_photo_url"))]
    pub photo: Option<String>,
    pub languages: Option<Vec<String>>,
    pub work_experience: Option<Vec<WorkExperience>>,
    pub education: Option<Vec<Education>>,
    pub certifications: Option<Vec<Certification>>,
    pub skills: Option<Vec<String>>,
    #[validate(range(min = 0.0))]
    pub years_of_experience: Option<f64>,
    pub location: Option<Location>,
    pub preferred_locations: Option<Vec<PreferredLocation>>,
    #[validate(custom(function = "validate_expected_salary"))]
    pub expected_salary: Option<ExpectedSalary>,
    pub availability_status: Option<AvailabilityStatus>,
    pub job_type: Option<EmploymentType>,
}

impl ProfileInput {
    pub fn apply_to(self, profile: &mut JobSeekerProfile) {
        if let Some(gender) = self.gender {
            profile.gender = Some(gender);
        }
        if let Some(dob) = self.dob {
            profile.dob = Some(dob);
        }
        if let Some(resume) = self.resume {
            profile.resume = Some(resume);
        }
        if let Some(photo) = self.photo {
            profile.photo = Some(photo);
        }
        if let Some(languages) = self.languages {
            profile.languages = languages;
        }
        if let Some(work_experience) = self.work_experience {
            profile.work_experience = Json(work_experience);
        }
        if let Some(education) = self.education {
            profile.education = Json(education);
        }
        if let Some(certifications) = self.certifications {
            profile.certifications = Json(certifications);
        }
        if let Some(skills) = self.skills {
            profile.skills = skills;
        }
        if let Some(years) = self.years_of_experience {
            profile.years_of_experience = Some(years);
        }
        if let Some(location) = self.location {
            profile.location = Some(Json(location));
        }
        if let Some(preferred) = self.preferred_locations {
            profile.preferred_locations = Json(preferred);
        }
        if let Some(salary) = self.expected_salary {
            profile.expected_salary = Some(Json(salary));
        }
        if let Some(availability) = self.availability_status {
            profile.availability_status = Some(availability);
        }
        if let Some(job_type) = self.job_type {
            profile.job_type = Some(job_type);
        }
        profile.updated_at = Utc::now();
    }
}
