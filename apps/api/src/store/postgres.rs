use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use super::{ApplicationCommit, JobBoardStore, StoreError};
use crate::jobs::listing::JobQuery;
use crate::models::admin::Admin;
use crate::models::application::Application;
use crate::models::job::JobPosting;
use crate::models::job_seeker::JobSeekerProfile;
use crate::models::user::User;
use crate::pagination::PageRequest;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapes `%`, `_` and `\` so user text matches literally inside ILIKE.
fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn push_job_conditions(builder: &mut QueryBuilder<'_, Postgres>, query: &JobQuery) {
    let filter = &query.filter;
    builder.push(" WHERE is_delete = 'No'");

    let text_filters = [
        ("title", &filter.title),
        ("city", &filter.city),
        ("state", &filter.state),
        ("country", &filter.country),
    ];
    for (column, value) in text_filters {
        if let Some(value) = value {
            builder
                .push(" AND ")
                .push(column)
                .push(" ILIKE ")
                .push_bind(like_pattern(value));
        }
    }
    if let Some(company_id) = filter.company_id {
        builder.push(" AND company_id = ").push_bind(company_id);
    }
    if let Some(min) = filter.min_salary {
        builder.push(" AND max_salary >= ").push_bind(min);
    }
    if let Some(max) = filter.max_salary {
        builder.push(" AND min_salary <= ").push_bind(max);
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if !query.exclude_ids.is_empty() {
        builder
            .push(" AND NOT (id = ANY(")
            .push_bind(query.exclude_ids.clone())
            .push("))");
    }
}

#[async_trait]
impl JobBoardStore for PgStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_admin(&self, id: Uuid) -> Result<Option<Admin>, StoreError> {
        Ok(sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError> {
        Ok(sqlx::query_as::<_, JobPosting>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_profile_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<JobSeekerProfile>, StoreError> {
        Ok(
            sqlx::query_as::<_, JobSeekerProfile>("SELECT * FROM job_seekers WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_application(
        &self,
        job_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Application>, StoreError> {
        Ok(sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE job_id = $1 AND user_id = $2",
        )
        .bind(job_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn record_application(&self, commit: &ApplicationCommit) -> Result<(), StoreError> {
        let application = &commit.application;
        let mut tx = self.pool.begin().await?;

        // The unique (job_id, user_id) index decides races; losing one returns no row.
        let inserted: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO applications (id, user_id, job_id, application_date, status)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (job_id, user_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(application.id)
        .bind(application.user_id)
        .bind(application.job_id)
        .bind(application.application_date)
        .bind(application.status)
        .fetch_optional(&mut *tx)
        .await?;
        if inserted.is_none() {
            return Err(StoreError::Duplicate("application"));
        }

        let job = sqlx::query(
            r#"
            UPDATE jobs
            SET applicants = applicants + 1,
                applicants_list = array_append(applicants_list, $2),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(application.job_id)
        .bind(commit.profile_id)
        .execute(&mut *tx)
        .await?;
        if job.rows_affected() == 0 {
            return Err(StoreError::Missing("job"));
        }

        let profile = sqlx::query(
            "UPDATE job_seekers SET applied_jobs = array_append(applied_jobs, $2), updated_at = now() WHERE id = $1",
        )
        .bind(commit.profile_id)
        .bind(application.job_id)
        .execute(&mut *tx)
        .await?;
        if profile.rows_affected() == 0 {
            return Err(StoreError::Missing("job-seeker profile"));
        }

        let user = sqlx::query(
            "UPDATE users SET applied_jobs = array_append(applied_jobs, $2), updated_at = now() WHERE id = $1",
        )
        .bind(application.user_id)
        .bind(application.job_id)
        .execute(&mut *tx)
        .await?;
        if user.rows_affected() == 0 {
            debug!(user_id = %application.user_id, "No user row to record the application on");
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_profiles_among(
        &self,
        ids: &[Uuid],
        page: PageRequest,
    ) -> Result<(Vec<JobSeekerProfile>, i64), StoreError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM job_seekers WHERE id = ANY($1)")
                .bind(ids)
                .fetch_one(&self.pool)
                .await?;
        let profiles = sqlx::query_as::<_, JobSeekerProfile>(
            r#"
            SELECT * FROM job_seekers
            WHERE id = ANY($1)
            ORDER BY created_at, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(ids)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok((profiles, total))
    }

    async fn list_jobs(&self, query: &JobQuery) -> Result<(Vec<JobPosting>, i64), StoreError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM jobs");
        push_job_conditions(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM jobs");
        push_job_conditions(&mut select, query);
        select
            .push(" ORDER BY ")
            .push(query.sort.field.column())
            .push(" ")
            .push(query.sort.direction.sql())
            .push(", id LIMIT ")
            .push_bind(query.page.limit)
            .push(" OFFSET ")
            .push_bind(query.page.offset());
        let jobs = select
            .build_query_as::<JobPosting>()
            .fetch_all(&self.pool)
            .await?;

        Ok((jobs, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%_off\\"), "%100\\%\\_off\\\\%");
    }
}
