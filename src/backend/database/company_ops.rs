//! Company repository operations

use async_trait::async_trait;
use tracing::{debug, info};

use super::dialect::SqlDialect;
use super::filter::{company_filter_clause, WhereClause};
use super::update_clause::{sql_for_partial_update, SqlValue, UpdateClause};
use crate::error::{constraint_violation, map_database_error, AppError, AppResult, ConstraintViolation};
use crate::models::{Company, CompanyFilter, CompanyJob, CompanyUpdate, CompanyWithJobs, NewCompany};

/// Database-specific adapter for company statements
#[async_trait]
pub trait CompanyStore: Send + Sync {
    fn dialect(&self) -> &'static dyn SqlDialect;

    async fn insert_company(&self, company: &NewCompany) -> Result<Company, sqlx::Error>;

    /// Companies matching the predicate, ordered by name
    async fn find_companies(&self, clause: &WhereClause) -> Result<Vec<Company>, sqlx::Error>;

    async fn fetch_company(&self, handle: &str) -> Result<Option<Company>, sqlx::Error>;

    /// Jobs posted by a company, ordered by id
    async fn fetch_company_jobs(&self, handle: &str) -> Result<Vec<CompanyJob>, sqlx::Error>;

    async fn update_company(
        &self,
        handle: &str,
        clause: &UpdateClause,
    ) -> Result<Option<Company>, sqlx::Error>;

    async fn delete_company(&self, handle: &str) -> Result<u64, sqlx::Error>;
}

/// Shared business logic for company operations
pub struct CompanyProcessor;

impl CompanyProcessor {
    pub const RENAMES: &'static [(&'static str, &'static str)] = &[
        ("numEmployees", "num_employees"),
        ("logoUrl", "logo_url"),
    ];

    pub fn update_fields(update: &CompanyUpdate) -> Vec<(&'static str, SqlValue)> {
        let mut fields = Vec::new();
        if let Some(name) = &update.name {
            fields.push(("name", SqlValue::Text(Some(name.clone()))));
        }
        if let Some(description) = &update.description {
            fields.push(("description", SqlValue::Text(Some(description.clone()))));
        }
        if let Some(num_employees) = update.num_employees {
            fields.push(("numEmployees", SqlValue::Int(num_employees)));
        }
        if let Some(logo_url) = &update.logo_url {
            fields.push(("logoUrl", SqlValue::Text(logo_url.clone())));
        }
        fields
    }

    pub fn map_write_error(err: sqlx::Error, handle: &str, action: &str) -> AppError {
        match constraint_violation(&err) {
            Some(ConstraintViolation::Unique) => {
                AppError::BadRequest(format!("Duplicate company: {}", handle))
            }
            Some(ConstraintViolation::Check) => AppError::BadRequest(
                "Invalid company data: numEmployees must be >= 0".to_string(),
            ),
            _ => map_database_error(err, action),
        }
    }

    fn no_company(handle: &str) -> AppError {
        AppError::NotFound(format!("No company: {}", handle))
    }
}

/// Unified company operations using the adapter pattern
pub struct UnifiedCompanyOps<T: CompanyStore> {
    store: T,
}

impl<T: CompanyStore> UnifiedCompanyOps<T> {
    pub fn new(store: T) -> Self {
        Self { store }
    }

    pub async fn create(&self, company: &NewCompany) -> AppResult<Company> {
        let created = self
            .store
            .insert_company(company)
            .await
            .map_err(|e| CompanyProcessor::map_write_error(e, &company.handle, "insert company"))?;

        info!("Created company {}", created.handle);
        Ok(created)
    }

    pub async fn find(&self, filter: &CompanyFilter) -> AppResult<Vec<Company>> {
        let clause = company_filter_clause(filter, self.store.dialect())?;
        debug!("Searching companies WHERE {}", clause.sql);
        self.store
            .find_companies(&clause)
            .await
            .map_err(|e| map_database_error(e, "search companies"))
    }

    pub async fn get(&self, handle: &str) -> AppResult<CompanyWithJobs> {
        let company = self
            .store
            .fetch_company(handle)
            .await
            .map_err(|e| map_database_error(e, "fetch company"))?
            .ok_or_else(|| CompanyProcessor::no_company(handle))?;

        let jobs = self
            .store
            .fetch_company_jobs(handle)
            .await
            .map_err(|e| map_database_error(e, "fetch company jobs"))?;

        Ok(CompanyWithJobs { company, jobs })
    }

    pub async fn update(&self, handle: &str, update: &CompanyUpdate) -> AppResult<Company> {
        let clause = sql_for_partial_update(
            CompanyProcessor::update_fields(update),
            CompanyProcessor::RENAMES,
            self.store.dialect(),
        )?;

        let company = self
            .store
            .update_company(handle, &clause)
            .await
            .map_err(|e| CompanyProcessor::map_write_error(e, handle, "update company"))?
            .ok_or_else(|| CompanyProcessor::no_company(handle))?;

        info!("Updated company {}", handle);
        Ok(company)
    }

    pub async fn remove(&self, handle: &str) -> AppResult<()> {
        let deleted = self
            .store
            .delete_company(handle)
            .await
            .map_err(|e| map_database_error(e, "delete company"))?;

        if deleted == 0 {
            return Err(CompanyProcessor::no_company(handle));
        }

        info!("Removed company {}", handle);
        Ok(())
    }
}
