use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{JobPosting, JobStatus};
use crate::pagination::{PageLimits, PageRequest};
use crate::store::JobBoardStore;

/// Query string accepted by `GET /jobs` and `GET /jobs/not-applied`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListJobsParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub title: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub status: Option<JobStatus>,
    pub company_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    PostedDate,
    UpdatedAt,
    Title,
    MinSalary,
    MaxSalary,
    Applicants,
    ApplicationDeadline,
    Openings,
}

impl SortField {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        Ok(match value {
            "createdAt" | "created_at" => SortField::CreatedAt,
            "postedDate" | "posted_date" => SortField::PostedDate,
            "updatedAt" | "updated_at" => SortField::UpdatedAt,
            "title" => SortField::Title,
            "min_salary" | "minSalary" => SortField::MinSalary,
            "max_salary" | "maxSalary" => SortField::MaxSalary,
            "applicants" => SortField::Applicants,
            "applicationDeadline" | "application_deadline" => SortField::ApplicationDeadline,
            "openings" => SortField::Openings,
            other => {
                return Err(AppError::Validation(format!(
                    "Cannot sort jobs by '{other}'"
                )))
            }
        })
    }

    /// Column name; only ever one of these literals reaches SQL.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::PostedDate => "posted_date",
            SortField::UpdatedAt => "updated_at",
            SortField::Title => "title",
            SortField::MinSalary => "min_salary",
            SortField::MaxSalary => "max_salary",
            SortField::Applicants => "applicants",
            SortField::ApplicationDeadline => "application_deadline",
            SortField::Openings => "openings",
        }
    }

    fn compare(&self, a: &JobPosting, b: &JobPosting) -> Ordering {
        match self {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::PostedDate => a.posted_date.cmp(&b.posted_date),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Title => a.title.cmp(&b.title),
            SortField::MinSalary => a.min_salary.cmp(&b.min_salary),
            SortField::MaxSalary => a.max_salary.cmp(&b.max_salary),
            SortField::Applicants => a.applicants.cmp(&b.applicants),
            SortField::ApplicationDeadline => a.application_deadline.cmp(&b.application_deadline),
            SortField::Openings => a.openings.cmp(&b.openings),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl SortSpec {
    pub fn compare(&self, a: &JobPosting, b: &JobPosting) -> Ordering {
        let ordering = self.field.compare(a, b);
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Optional conjunctive predicates over live postings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    pub title: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub company_id: Option<Uuid>,
    /// Matches postings whose `max_salary` reaches this value.
    pub min_salary: Option<i64>,
    /// Matches postings whose `min_salary` does not exceed this value.
    pub max_salary: Option<i64>,
    pub status: Option<JobStatus>,
}

fn contains_ignore_case(haystack: &str, needle: &Option<String>) -> bool {
    needle
        .as_ref()
        .map_or(true, |needle| haystack.to_lowercase().contains(&needle.to_lowercase()))
}

impl JobFilter {
    pub fn matches(&self, job: &JobPosting) -> bool {
        !job.is_deleted()
            && contains_ignore_case(&job.title, &self.title)
            && contains_ignore_case(&job.location.city, &self.city)
            && contains_ignore_case(&job.location.state, &self.state)
            && contains_ignore_case(&job.location.country, &self.country)
            && self.company_id.map_or(true, |id| job.company_id == id)
            && self.min_salary.map_or(true, |min| job.max_salary >= min)
            && self.max_salary.map_or(true, |max| job.min_salary <= max)
            && self.status.map_or(true, |status| job.status == status)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobQuery {
    pub filter: JobFilter,
    pub exclude_ids: Vec<Uuid>,
    pub sort: SortSpec,
    pub page: PageRequest,
}

impl JobQuery {
    pub fn matches(&self, job: &JobPosting) -> bool {
        self.filter.matches(job) && !self.exclude_ids.contains(&job.id)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ListJobsParams {
    pub fn into_query(self, limits: PageLimits) -> Result<JobQuery, AppError> {
        let page = PageRequest::resolve(self.page, self.limit, limits)?;
        let field = match non_empty(self.sort) {
            Some(sort) => SortField::parse(&sort)?,
            None => SortField::CreatedAt,
        };
        let direction = match self.order.as_deref() {
            Some("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        };
        let company_id = non_empty(self.company_id)
            .map(|id| {
                Uuid::parse_str(&id)
                    .map_err(|_| AppError::Validation(format!("Invalid companyId '{id}'")))
            })
            .transpose()?;

        Ok(JobQuery {
            filter: JobFilter {
                title: non_empty(self.title),
                city: non_empty(self.city),
                state: non_empty(self.state),
                country: non_empty(self.country),
                company_id,
                min_salary: self.min_salary,
                max_salary: self.max_salary,
                status: self.status,
            },
            exclude_ids: Vec::new(),
            sort: SortSpec { field, direction },
            page,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobListing {
    #[serde(flatten)]
    pub job: JobPosting,
    #[serde(rename = "hasApplied")]
    pub has_applied: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobPagination {
    pub current_page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub total_jobs: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobListPage {
    pub jobs: Vec<JobListing>,
    pub pagination: JobPagination,
}

fn page_of(
    jobs: Vec<JobPosting>,
    total: i64,
    page: PageRequest,
    has_applied: impl Fn(&JobPosting) -> bool,
) -> JobListPage {
    JobListPage {
        jobs: jobs
            .into_iter()
            .map(|job| JobListing {
                has_applied: has_applied(&job),
                job,
            })
            .collect(),
        pagination: JobPagination {
            current_page: page.page,
            page_size: page.limit,
            total_pages: page.total_pages(total),
            total_jobs: total,
        },
    }
}

/// Lists live postings, flagging the ones the caller already applied to.
///
/// Callers without a user record (admins) see every posting as not applied.
pub async fn list_jobs(
    store: &dyn JobBoardStore,
    caller_id: Uuid,
    query: JobQuery,
) -> Result<JobListPage, AppError> {
    let applied = store
        .find_user(caller_id)
        .await?
        .map(|user| user.applied_jobs)
        .unwrap_or_default();

    let (jobs, total) = store.list_jobs(&query).await?;
    Ok(page_of(jobs, total, query.page, |job| applied.contains(&job.id)))
}

/// Lists live postings the caller has not applied to.
pub async fn list_not_applied(
    store: &dyn JobBoardStore,
    caller_id: Uuid,
    mut query: JobQuery,
) -> Result<JobListPage, AppError> {
    let user = store
        .find_user(caller_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    query.exclude_ids = user.applied_jobs;

    let (jobs, total) = store.list_jobs(&query).await?;
    Ok(page_of(jobs, total, query.page, |_| false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::fixtures::job_posting;
    use crate::models::job::SoftDelete;
    use crate::models::user::{fixtures::user, Role};
    use crate::store::memory::MemoryStore;

    const LIMITS: PageLimits = PageLimits {
        default_size: 10,
        max_size: 100,
    };

    fn query(params: ListJobsParams) -> JobQuery {
        params.into_query(LIMITS).unwrap()
    }

    #[test]
    fn test_filter_salary_overlap() {
        let job = job_posting("Data Engineer"); // 50k..90k
        let overlap = |min, max| JobFilter {
            min_salary: min,
            max_salary: max,
            ..JobFilter::default()
        };
        assert!(overlap(Some(90_000), None).matches(&job));
        assert!(!overlap(Some(90_001), None).matches(&job));
        assert!(overlap(None, Some(50_000)).matches(&job));
        assert!(!overlap(None, Some(49_999)).matches(&job));
    }

    #[test]
    fn test_filter_text_is_case_insensitive_substring() {
        let job = job_posting("Senior Rust Engineer");
        let filter = JobFilter {
            title: Some("rust eng".to_string()),
            city: Some("PUN".to_string()),
            ..JobFilter::default()
        };
        assert!(filter.matches(&job));
        let miss = JobFilter {
            country: Some("Germany".to_string()),
            ..JobFilter::default()
        };
        assert!(!miss.matches(&job));
    }

    #[test]
    fn test_filter_never_matches_soft_deleted() {
        let mut job = job_posting("Designer");
        job.is_delete = SoftDelete::Yes;
        assert!(!JobFilter::default().matches(&job));
    }

    #[test]
    fn test_params_defaults_and_validation() {
        let q = query(ListJobsParams::default());
        assert_eq!(q.sort, SortSpec::default());
        assert_eq!(q.page, PageRequest { page: 1, limit: 10 });

        let q = query(ListJobsParams {
            sort: Some("max_salary".to_string()),
            order: Some("asc".to_string()),
            title: Some("   ".to_string()),
            ..ListJobsParams::default()
        });
        assert_eq!(q.sort.field, SortField::MaxSalary);
        assert_eq!(q.sort.direction, SortDirection::Asc);
        assert_eq!(q.filter.title, None);

        let bad_sort = ListJobsParams {
            sort: Some("password".to_string()),
            ..ListJobsParams::default()
        };
        assert!(matches!(
            bad_sort.into_query(LIMITS),
            Err(AppError::Validation(_))
        ));
        let bad_company = ListJobsParams {
            company_id: Some("not-a-uuid".to_string()),
            ..ListJobsParams::default()
        };
        assert!(bad_company.into_query(LIMITS).is_err());
    }

    #[tokio::test]
    async fn test_list_jobs_excludes_deleted_and_flags_applied() {
        let store = MemoryStore::new();
        let applied = job_posting("Backend");
        let other = job_posting("Frontend");
        let mut deleted = job_posting("Gone");
        deleted.is_delete = SoftDelete::Yes;
        let mut seeker = user(Role::JobSeeker);
        seeker.applied_jobs.push(applied.id);
        for job in [&applied, &other, &deleted] {
            store.insert_job(job.clone());
        }
        store.insert_user(seeker.clone());

        let page = list_jobs(&store, seeker.id, query(ListJobsParams::default()))
            .await
            .unwrap();
        assert_eq!(page.pagination.total_jobs, 2);
        assert!(page.jobs.iter().all(|listing| listing.job.id != deleted.id));
        for listing in &page.jobs {
            assert_eq!(listing.has_applied, listing.job.id == applied.id);
        }
    }

    #[tokio::test]
    async fn test_list_not_applied_excludes_applied_set() {
        let store = MemoryStore::new();
        let applied = job_posting("Backend");
        let open = job_posting("Frontend");
        let mut seeker = user(Role::JobSeeker);
        seeker.applied_jobs.push(applied.id);
        store.insert_job(applied.clone());
        store.insert_job(open.clone());
        store.insert_user(seeker.clone());

        let page = list_not_applied(&store, seeker.id, query(ListJobsParams::default()))
            .await
            .unwrap();
        assert_eq!(page.jobs.len(), 1);
        assert_eq!(page.jobs[0].job.id, open.id);
        assert!(!page.jobs[0].has_applied);

        let unknown = list_not_applied(&store, Uuid::new_v4(), query(ListJobsParams::default())).await;
        assert!(matches!(unknown, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_jobs_sorts_and_paginates() {
        let store = MemoryStore::new();
        for (i, salary) in [70_000, 10_000, 40_000].into_iter().enumerate() {
            let mut job = job_posting(&format!("Job {i}"));
            job.min_salary = salary;
            job.max_salary = salary;
            store.insert_job(job);
        }
        let q = query(ListJobsParams {
            sort: Some("min_salary".to_string()),
            order: Some("asc".to_string()),
            limit: Some(2),
            page: Some(2),
            ..ListJobsParams::default()
        });
        let page = list_jobs(&store, Uuid::new_v4(), q).await.unwrap();
        assert_eq!(page.jobs.len(), 1);
        assert_eq!(page.jobs[0].job.min_salary, 70_000);
        assert_eq!(
            page.pagination,
            JobPagination {
                current_page: 2,
                page_size: 2,
                total_pages: 2,
                total_jobs: 3,
            }
        );
    }

    #[test]
    fn test_listing_serializes_flat_with_has_applied() {
        let listing = JobListing {
            job: job_posting("Backend"),
            has_applied: true,
        };
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["hasApplied"], true);
        assert_eq!(json["title"], "Backend");
    }
}
