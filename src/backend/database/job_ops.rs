//! Job repository operations

use async_trait::async_trait;
use tracing::{debug, info};

use super::dialect::SqlDialect;
use super::filter::{job_filter_clause, WhereClause};
use super::update_clause::{sql_for_partial_update, SqlValue, UpdateClause};
use crate::error::{constraint_violation, map_database_error, AppError, AppResult, ConstraintViolation};
use crate::models::{Job, JobFilter, JobUpdate, NewJob};
use crate::parser::{JobSortField, SortSpec};
use crate::schema::normalize_equity;

/// Insert data with equity already in canonical form
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedJob {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<String>,
    pub company_handle: String,
}

/// Database-specific adapter for job statements
#[async_trait]
pub trait JobStore: Send + Sync {
    fn dialect(&self) -> &'static dyn SqlDialect;

    async fn insert_job(&self, job: &PreparedJob) -> Result<Job, sqlx::Error>;

    /// All jobs; `order_by` is built from validated identifiers only
    async fn fetch_jobs(&self, order_by: &str) -> Result<Vec<Job>, sqlx::Error>;

    async fn fetch_job(&self, id: i32) -> Result<Option<Job>, sqlx::Error>;

    /// Jobs matching the predicate; `order_by` as for `fetch_jobs`
    async fn find_jobs(
        &self,
        clause: &WhereClause,
        order_by: &str,
    ) -> Result<Vec<Job>, sqlx::Error>;

    async fn update_job(&self, id: i32, clause: &UpdateClause)
        -> Result<Option<Job>, sqlx::Error>;

    async fn delete_job(&self, id: i32) -> Result<u64, sqlx::Error>;
}

/// Shared business logic for job operations
pub struct JobProcessor;

impl JobProcessor {
    pub const RENAMES: &'static [(&'static str, &'static str)] =
        &[("companyHandle", "company_handle")];

    pub fn prepare(job: &NewJob) -> AppResult<PreparedJob> {
        Ok(PreparedJob {
            title: job.title.clone(),
            salary: job.salary,
            equity: job.equity.as_deref().map(normalize_equity).transpose()?,
            company_handle: job.company_handle.clone(),
        })
    }

    pub fn update_fields(update: &JobUpdate) -> AppResult<Vec<(&'static str, SqlValue)>> {
        let mut fields = Vec::new();
        if let Some(title) = &update.title {
            fields.push(("title", SqlValue::Text(Some(title.clone()))));
        }
        if let Some(salary) = update.salary {
            fields.push(("salary", SqlValue::Int(salary)));
        }
        if let Some(equity) = &update.equity {
            let equity = equity.as_deref().map(normalize_equity).transpose()?;
            fields.push(("equity", SqlValue::Decimal(equity)));
        }
        if let Some(handle) = &update.company_handle {
            fields.push(("companyHandle", SqlValue::Text(Some(handle.clone()))));
        }
        Ok(fields)
    }

    /// Select list with equity read back as canonical text
    pub fn columns(dialect: &dyn SqlDialect) -> String {
        format!(
            "id, title, salary, {} AS equity, company_handle",
            dialect.decimal_select("equity")
        )
    }

    /// ORDER BY body for a validated sort, ties broken by id
    pub fn order_by(sort: &SortSpec, dialect: &dyn SqlDialect) -> String {
        let direction = sort.order.as_sql();
        match sort.field {
            JobSortField::Id => format!("id {}", direction),
            JobSortField::Equity => {
                format!("{} {}, id", dialect.numeric_column("equity"), direction)
            }
            field => format!("{} {}, id", field.column(), direction),
        }
    }

    pub fn map_write_error(err: sqlx::Error, company_handle: Option<&str>, action: &str) -> AppError {
        match constraint_violation(&err) {
            Some(ConstraintViolation::ForeignKey) => AppError::NotFound(format!(
                "No company: {}",
                company_handle.unwrap_or_default()
            )),
            Some(ConstraintViolation::Check) => {
                AppError::BadRequest("Invalid job data: salary must be >= 0 and equity <= 1".to_string())
            }
            _ => map_database_error(err, action),
        }
    }

    fn no_job(id: i32) -> AppError {
        AppError::NotFound(format!("No job: {}", id))
    }
}

/// Unified job operations using the adapter pattern
pub struct UnifiedJobOps<T: JobStore> {
    store: T,
}

impl<T: JobStore> UnifiedJobOps<T> {
    pub fn new(store: T) -> Self {
        Self { store }
    }

    pub async fn create(&self, job: &NewJob) -> AppResult<Job> {
        let prepared = JobProcessor::prepare(job)?;

        let created = self
            .store
            .insert_job(&prepared)
            .await
            .map_err(|e| {
                JobProcessor::map_write_error(e, Some(&prepared.company_handle), "insert job")
            })?;

        info!("Created job {} for {}", created.id, created.company_handle);
        Ok(created)
    }

    pub async fn find_all(&self, sort: &SortSpec) -> AppResult<Vec<Job>> {
        let order_by = JobProcessor::order_by(sort, self.store.dialect());
        debug!("Listing jobs ORDER BY {}", order_by);
        self.store
            .fetch_jobs(&order_by)
            .await
            .map_err(|e| map_database_error(e, "list jobs"))
    }

    pub async fn get(&self, id: i32) -> AppResult<Job> {
        self.store
            .fetch_job(id)
            .await
            .map_err(|e| map_database_error(e, "fetch job"))?
            .ok_or_else(|| JobProcessor::no_job(id))
    }

    /// Jobs matching every supplied filter, by id unless a sort is given
    pub async fn find(&self, filter: &JobFilter, sort: Option<&SortSpec>) -> AppResult<Vec<Job>> {
        let dialect = self.store.dialect();
        let clause = job_filter_clause(filter, dialect);
        let order_by = sort
            .map(|s| JobProcessor::order_by(s, dialect))
            .unwrap_or_else(|| "id".to_string());
        debug!("Searching jobs WHERE {} ORDER BY {}", clause.sql, order_by);
        self.store
            .find_jobs(&clause, &order_by)
            .await
            .map_err(|e| map_database_error(e, "search jobs"))
    }

    pub async fn update(&self, id: i32, update: &JobUpdate) -> AppResult<Job> {
        let clause = sql_for_partial_update(
            JobProcessor::update_fields(update)?,
            JobProcessor::RENAMES,
            self.store.dialect(),
        )?;

        let job = self
            .store
            .update_job(id, &clause)
            .await
            .map_err(|e| {
                JobProcessor::map_write_error(e, update.company_handle.as_deref(), "update job")
            })?
            .ok_or_else(|| JobProcessor::no_job(id))?;

        info!("Updated job {}", id);
        Ok(job)
    }

    pub async fn remove(&self, id: i32) -> AppResult<()> {
        let deleted = self
            .store
            .delete_job(id)
            .await
            .map_err(|e| map_database_error(e, "delete job"))?;

        if deleted == 0 {
            return Err(JobProcessor::no_job(id));
        }

        info!("Removed job {}", id);
        Ok(())
    }
}
