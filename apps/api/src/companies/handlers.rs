use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::auth::{roles, AuthUser};
use crate::errors::{parse_id, AppError};
use crate::models::company::{Company, CompanySize, CompanyStatus};
use crate::pagination::{PageParams, PageRequest, Pagination};
use crate::state::AppState;

const DUPLICATE_COMPANY: &str =
    "A company with this contact email or name and website already exists";

/// `+?[1-9][0-9]{1,14}`
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let well_formed = (2..=15).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0');
    if !well_formed {
        return Err(ValidationError::new("phone")
            .with_message("Please provide a valid contact phone number".into()));
    }
    Ok(())
}

fn validate_headquarter(headquarter: &[String]) -> Result<(), ValidationError> {
    if headquarter.iter().any(|hq| hq.trim().is_empty()) {
        return Err(ValidationError::new("headquarter")
            .with_message("Headquarter entries must not be empty".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Industry is required"))]
    pub industry: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[serde(rename = "companyType")]
    #[validate(length(min = 1, message = "Company type is required"))]
    pub company_type: String,
    #[validate(length(min = 1, message = "Founder is required"))]
    pub founder: String,
    pub founded: NaiveDate,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[validate(
        length(min = 1, message = "At least one headquarter is required"),
        custom(function = "validate_headquarter")
    )]
    pub headquarter: Vec<String>,
    #[validate(email(message = "Please provide a valid contact email"))]
    pub contact_email: String,
    #[validate(custom(function = "validate_phone"))]
    pub contact_phone: String,
    #[validate(length(min = 1, message = "Website is required"))]
    pub website: String,
    #[validate(length(min = 1, message = "Logo is required"))]
    pub logo: String,
    pub size: CompanySize,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub industry: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[serde(rename = "companyType")]
    #[validate(length(min = 1))]
    pub company_type: Option<String>,
    #[validate(length(min = 1))]
    pub founder: Option<String>,
    pub founded: Option<NaiveDate>,
    #[validate(length(min = 1))]
    pub location: Option<String>,
    #[validate(length(min = 1), custom(function = "validate_headquarter"))]
    pub headquarter: Option<Vec<String>>,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub contact_phone: Option<String>,
    #[validate(length(min = 1))]
    pub website: Option<String>,
    #[validate(length(min = 1))]
    pub logo: Option<String>,
    pub size: Option<CompanySize>,
}

impl UpdateCompanyRequest {
    fn apply_to(self, company: &mut Company) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field {
                    company.$field = value;
                })*
            };
        }
        merge!(
            name,
            industry,
            description,
            company_type,
            founder,
            founded,
            location,
            headquarter,
            contact_email,
            contact_phone,
            website,
            logo,
            size
        );
        company.updated_at = Utc::now();
    }
}

#[derive(Debug, Serialize)]
pub struct CompanyEnvelope {
    pub message: &'static str,
    pub company: Company,
}

#[derive(Debug, Serialize)]
pub struct CompanyPage {
    pub message: &'static str,
    pub companies: Vec<Company>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

async fn fetch_company(db: &PgPool, id: Uuid) -> Result<Company, AppError> {
    sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".to_string()))
}

/// POST /api/company/create
pub async fn handle_create_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<CompanyEnvelope>), AppError> {
    auth.require(roles::RECRUITER_OR_ADMIN)?;
    req.validate()?;

    let company = sqlx::query_as::<_, Company>(
        r#"
        INSERT INTO companies
            (id, name, industry, description, company_type, founder, founded, location,
             headquarter, contact_email, contact_phone, website, logo, size, created_by, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&req.name)
    .bind(&req.industry)
    .bind(&req.description)
    .bind(&req.company_type)
    .bind(&req.founder)
    .bind(req.founded)
    .bind(&req.location)
    .bind(&req.headquarter)
    .bind(req.contact_email.trim().to_lowercase())
    .bind(&req.contact_phone)
    .bind(&req.website)
    .bind(&req.logo)
    .bind(req.size)
    .bind(auth.id)
    .bind(CompanyStatus::Active)
    .fetch_one(&state.db)
    .await
    .map_err(|e| AppError::on_unique_violation(e, DUPLICATE_COMPANY))?;

    info!(company_id = %company.id, created_by = %auth.id, "Company created");
    Ok((
        StatusCode::CREATED,
        Json(CompanyEnvelope {
            message: "Company created successfully",
            company,
        }),
    ))
}

/// GET /api/company/:id
pub async fn handle_get_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<CompanyEnvelope>, AppError> {
    auth.require(roles::RECRUITER_OR_ADMIN)?;
    let company = fetch_company(&state.db, parse_id(&id)?).await?;
    Ok(Json(CompanyEnvelope {
        message: "Company found",
        company,
    }))
}

/// GET /api/companies
pub async fn handle_list_companies(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PageParams>,
) -> Result<Json<CompanyPage>, AppError> {
    auth.require(roles::RECRUITER_OR_ADMIN)?;
    let page = PageRequest::from_params(&params, state.config.page_limits())?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies")
        .fetch_one(&state.db)
        .await?;
    let companies = sqlx::query_as::<_, Company>(
        "SELECT * FROM companies ORDER BY created_at DESC, id LIMIT $1 OFFSET $2",
    )
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(CompanyPage {
        message: "Companies found",
        companies,
        pagination: page.describe(total),
    }))
}

/// PUT /api/company/:id
pub async fn handle_update_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateCompanyRequest>,
) -> Result<Json<CompanyEnvelope>, AppError> {
    auth.require(roles::RECRUITER_OR_ADMIN)?;
    req.validate()?;
    let mut company = fetch_company(&state.db, parse_id(&id)?).await?;
    req.apply_to(&mut company);

    let company = sqlx::query_as::<_, Company>(
        r#"
        UPDATE companies SET
            name = $2, industry = $3, description = $4, company_type = $5, founder = $6,
            founded = $7, location = $8, headquarter = $9, contact_email = $10,
            contact_phone = $11, website = $12, logo = $13, size = $14, updated_at = $15
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(company.id)
    .bind(&company.name)
    .bind(&company.industry)
    .bind(&company.description)
    .bind(&company.company_type)
    .bind(&company.founder)
    .bind(company.founded)
    .bind(&company.location)
    .bind(&company.headquarter)
    .bind(company.contact_email.trim().to_lowercase())
    .bind(&company.contact_phone)
    .bind(&company.website)
    .bind(&company.logo)
    .bind(company.size)
    .bind(company.updated_at)
    .fetch_one(&state.db)
    .await
    .map_err(|e| AppError::on_unique_violation(e, DUPLICATE_COMPANY))?;

    Ok(Json(CompanyEnvelope {
        message: "Company updated",
        company,
    }))
}

/// POST /api/company/:id/delete
pub async fn handle_delete_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.require(roles::RECRUITER_OR_ADMIN)?;
    let id = parse_id(&id)?;

    let result =
        sqlx::query("UPDATE companies SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(CompanyStatus::Inactive)
            .execute(&state.db)
            .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Company not found".to_string()));
    }

    info!(company_id = %id, deleted_by = %auth.id, "Company deactivated");
    Ok(Json(MessageResponse {
        message: "Company deleted",
    }))
}
