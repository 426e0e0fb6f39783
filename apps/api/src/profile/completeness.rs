use serde::{Deserialize, Serialize};

use crate::models::job_seeker::JobSeekerProfile;

/// Essential completion a seeker needs before applying to a posting.
pub const MIN_ESSENTIAL_COMPLETION_TO_APPLY: f64 = 80.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Resume,
    Photo,
    Skills,
    YearsOfExperience,
    JobType,
    Location,
    PreferredLocations,
    ExpectedSalary,
    AvailabilityStatus,
    WorkExperience,
    Education,
    Certifications,
    Languages,
    Gender,
    Dob,
}

impl ProfileField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileField::Resume => "resume",
            ProfileField::Photo => "photo",
            ProfileField::Skills => "skills",
            ProfileField::YearsOfExperience => "years_of_experience",
            ProfileField::JobType => "job_type",
            ProfileField::Location => "location",
            ProfileField::PreferredLocations => "preferred_locations",
            ProfileField::ExpectedSalary => "expected_salary",
            ProfileField::AvailabilityStatus => "availability_status",
            ProfileField::WorkExperience => "work_experience",
            ProfileField::Education => "education",
            ProfileField::Certifications => "certifications",
            ProfileField::Languages => "languages",
            ProfileField::Gender => "gender",
            ProfileField::Dob => "dob",
        }
    }
}

pub const ESSENTIAL_FIELDS: [ProfileField; 5] = [
    ProfileField::Resume,
    ProfileField::Photo,
    ProfileField::Skills,
    ProfileField::YearsOfExperience,
    ProfileField::JobType,
];

pub const ENHANCEMENT_FIELDS: [ProfileField; 10] = [
    ProfileField::Location,
    ProfileField::PreferredLocations,
    ProfileField::ExpectedSalary,
    ProfileField::AvailabilityStatus,
    ProfileField::WorkExperience,
    ProfileField::Education,
    ProfileField::Certifications,
    ProfileField::Languages,
    ProfileField::Gender,
    ProfileField::Dob,
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CompletionLabel {
    #[serde(rename = "Complete")]
    Complete,
    #[serde(rename = "Essential Complete")]
    EssentialComplete,
    #[serde(rename = "Mostly Complete")]
    MostlyComplete,
    #[serde(rename = "Partially Complete")]
    PartiallyComplete,
    #[serde(rename = "Incomplete")]
    Incomplete,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStatus {
    pub completed_essential_fields: Vec<ProfileField>,
    pub completed_enhancement_fields: Vec<ProfileField>,
    pub missing_essential_fields: Vec<ProfileField>,
    pub missing_enhancement_fields: Vec<ProfileField>,
    pub essential_completion_percentage: f64,
    pub overall_completion_percentage: f64,
    pub profile_status: CompletionLabel,
    pub recommendations: Vec<String>,
    pub is_profile_complete: bool,
}

impl ProfileStatus {
    pub fn can_apply(&self) -> bool {
        self.essential_completion_percentage >= MIN_ESSENTIAL_COMPLETION_TO_APPLY
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}

fn is_field_complete(profile: &JobSeekerProfile, field: ProfileField) -> bool {
    match field {
        ProfileField::Resume => has_text(&profile.resume),
        ProfileField::Photo => has_text(&profile.photo),
        ProfileField::Skills => !profile.skills.is_empty(),
        ProfileField::YearsOfExperience => profile.years_of_experience.is_some(),
        ProfileField::JobType => profile.job_type.is_some(),
        ProfileField::Location => profile
            .location
            .as_ref()
            .is_some_and(|location| location.is_specified()),
        ProfileField::PreferredLocations => !profile.preferred_locations.is_empty(),
        ProfileField::ExpectedSalary => profile
            .expected_salary
            .as_ref()
            .is_some_and(|salary| salary.min.is_some() || salary.max.is_some()),
        ProfileField::AvailabilityStatus => profile.availability_status.is_some(),
        ProfileField::WorkExperience => !profile.work_experience.is_empty(),
        ProfileField::Education => !profile.education.is_empty(),
        ProfileField::Certifications => !profile.certifications.is_empty(),
        ProfileField::Languages => !profile.languages.is_empty(),
        ProfileField::Gender => profile.gender.is_some(),
        ProfileField::Dob => profile.dob.is_some(),
    }
}

fn join_fields(fields: &[ProfileField]) -> String {
    fields
        .iter()
        .map(ProfileField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Scores how complete a job-seeker profile is.
///
/// Every response that carries a profile status is built from this function, including the
/// eligibility gate of the apply workflow.
pub fn score(profile: &JobSeekerProfile) -> ProfileStatus {
    let (completed_essential_fields, missing_essential_fields): (Vec<_>, Vec<_>) = ESSENTIAL_FIELDS
        .iter()
        .partition(|field| is_field_complete(profile, **field));
    let (completed_enhancement_fields, missing_enhancement_fields): (Vec<_>, Vec<_>) =
        ENHANCEMENT_FIELDS
            .iter()
            .partition(|field| is_field_complete(profile, **field));

    // Multiply before dividing so whole-field steps stay exact (3 of 5 is 60.0, not 60.000...01).
    let essential_completion_percentage =
        100.0 * completed_essential_fields.len() as f64 / ESSENTIAL_FIELDS.len() as f64;
    let overall_completion_percentage = 100.0
        * (completed_essential_fields.len() + completed_enhancement_fields.len()) as f64
        / (ESSENTIAL_FIELDS.len() + ENHANCEMENT_FIELDS.len()) as f64;

    let profile_status = match essential_completion_percentage {
        p if p >= 100.0 && missing_enhancement_fields.is_empty() => CompletionLabel::Complete,
        p if p >= 100.0 => CompletionLabel::EssentialComplete,
        p if p >= 60.0 => CompletionLabel::MostlyComplete,
        p if p >= 20.0 => CompletionLabel::PartiallyComplete,
        _ => CompletionLabel::Incomplete,
    };

    let mut recommendations = Vec::new();
    if !missing_essential_fields.is_empty() {
        recommendations.push(format!(
            "Complete these essential fields to improve your profile: {}",
            join_fields(&missing_essential_fields)
        ));
    } else if !missing_enhancement_fields.is_empty() {
        recommendations.push(format!(
            "Enhance your profile by adding: {}",
            join_fields(&missing_enhancement_fields)
        ));
    }

    ProfileStatus {
        is_profile_complete: missing_essential_fields.is_empty(),
        completed_essential_fields,
        completed_enhancement_fields,
        missing_essential_fields,
        missing_enhancement_fields,
        essential_completion_percentage,
        overall_completion_percentage,
        profile_status,
        recommendations,
    }
}


#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use sqlx::types::Json;
    use uuid::Uuid;

    use super::fixtures::essential_profile;
    use super::*;
    use crate::models::job_seeker::{
        AvailabilityStatus, Certification, Education, EducationLevel, ExpectedSalary,
        ExperienceLevel, ExperienceType, Gender, Location, PreferredLocation, WorkExperience,
    };

    fn full_profile() -> JobSeekerProfile {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let mut profile = essential_profile(Uuid::new_v4());
        profile.location = Some(Json(Location {
            city: "Austin".to_string(),
            ..Location::default()
        }));
        profile.preferred_locations = Json(vec![PreferredLocation {
            city: "Denver".to_string(),
            state: "CO".to_string(),
            country: "US".to_string(),
        }]);
        profile.expected_salary = Some(Json(ExpectedSalary {
            min: Some(50_000.0),
            max: None,
            currency: "USD".to_string(),
        }));
        profile.availability_status = Some(AvailabilityStatus::Immediately);
        profile.work_experience = Json(vec![WorkExperience {
            kind: ExperienceType::FullTime,
            level: ExperienceLevel::Experienced,
            company: "Acme".to_string(),
            role: "Engineer".to_string(),
            start_date: date,
            end_date: None,
            current: true,
            description: None,
        }]);
        profile.education = Json(vec![Education {
            level: EducationLevel::Bachelor,
            institution: "State U".to_string(),
            field_of_study: "CS".to_string(),
            start_date: date,
            end_date: None,
            current: false,
            grade: None,
        }]);
        profile.certifications = Json(vec![Certification {
            name: "CKA".to_string(),
            issuing_organization: "CNCF".to_string(),
            issue_date: date,
            expiry_date: None,
            credential_id: None,
            credential_url: None,
        }]);
        profile.languages = vec!["English".to_string()];
        profile.gender = Some(Gender::PreferNotToSay);
        profile.dob = Some(date);
        profile
    }

    #[test]
    fn test_empty_profile_is_incomplete() {
        let status = score(&JobSeekerProfile::empty(Uuid::new_v4()));
        assert_eq!(status.essential_completion_percentage, 0.0);
        assert_eq!(status.overall_completion_percentage, 0.0);
        assert_eq!(status.profile_status, CompletionLabel::Incomplete);
        assert!(!status.is_profile_complete);
        assert_eq!(status.missing_essential_fields, ESSENTIAL_FIELDS.to_vec());
        assert_eq!(
            status.recommendations,
            vec![
                "Complete these essential fields to improve your profile: resume, photo, skills, years_of_experience, job_type"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_essential_only_profile() {
        let status = score(&essential_profile(Uuid::new_v4()));
        assert_eq!(status.essential_completion_percentage, 100.0);
        assert_eq!(status.profile_status, CompletionLabel::EssentialComplete);
        assert!(status.is_profile_complete);
        assert!(status.can_apply());
        assert_eq!(status.missing_enhancement_fields.len(), 10);
        assert!(status.recommendations[0].starts_with("Enhance your profile by adding: location"));
    }

    #[test]
    fn test_full_profile_is_complete() {
        let status = score(&full_profile());
        assert_eq!(status.profile_status, CompletionLabel::Complete);
        assert_eq!(status.overall_completion_percentage, 100.0);
        assert!(status.recommendations.is_empty());
    }

    #[test]
    fn test_essential_percentage_steps_by_twenty() {
        let mut profile = JobSeekerProfile::empty(Uuid::new_v4());
        let expected = [
            (20.0, CompletionLabel::PartiallyComplete),
            (40.0, CompletionLabel::PartiallyComplete),
            (60.0, CompletionLabel::MostlyComplete),
            (80.0, CompletionLabel::MostlyComplete),
            (100.0, CompletionLabel::EssentialComplete),
        ];
        let setters: [fn(&mut JobSeekerProfile); 5] = [
            |p| p.resume = Some("https://x.io/cv.pdf".to_string()),
            |p| p.photo = Some("https://x.io/me.jpg".to_string()),
            |p| p.skills = vec!["sql".to_string()],
            |p| p.years_of_experience = Some(0.0),
            |p| p.job_type = Some(crate::models::job_seeker::EmploymentType::Contract),
        ];
        for (set, (pct, label)) in setters.iter().zip(expected) {
            set(&mut profile);
            let status = score(&profile);
            assert_eq!(status.essential_completion_percentage, pct);
            assert_eq!(status.profile_status, label);
            assert_eq!(status.can_apply(), pct >= 80.0);
        }
    }

    #[test]
    fn test_empty_strings_and_placeholder_location_do_not_count() {
        let mut profile = JobSeekerProfile::empty(Uuid::new_v4());
        profile.resume = Some(String::new());
        profile.location = Some(Json(Location::default()));
        profile.expected_salary = Some(Json(ExpectedSalary {
            min: None,
            max: None,
            currency: "USD".to_string(),
        }));
        let status = score(&profile);
        assert!(status.missing_essential_fields.contains(&ProfileField::Resume));
        assert!(status.missing_enhancement_fields.contains(&ProfileField::Location));
        assert!(status
            .missing_enhancement_fields
            .contains(&ProfileField::ExpectedSalary));
    }

    #[test]
    fn test_overall_counts_all_fifteen_fields() {
        let mut profile = essential_profile(Uuid::new_v4());
        profile.languages = vec!["Hindi".to_string()];
        let status = score(&profile);
        assert!((status.overall_completion_percentage - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_status_serializes_with_wire_names() {
        let json = serde_json::to_value(score(&essential_profile(Uuid::new_v4()))).unwrap();
        assert_eq!(json["profileStatus"], "Essential Complete");
        assert_eq!(json["essentialCompletionPercentage"], 100.0);
        assert_eq!(json["isProfileComplete"], true);
        assert_eq!(json["completedEssentialFields"][3], "years_of_experience");
    }
}
