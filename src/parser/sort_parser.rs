use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn parse(s: &str) -> AppResult<SortOrder> {
        match s.to_lowercase().as_str() {
            "ascending" | "asc" => Ok(SortOrder::Ascending),
            "descending" | "desc" => Ok(SortOrder::Descending),
            _ => Err(AppError::BadRequest(format!(
                "Invalid sortOrder: {}. Must be asc or desc",
                s
            ))),
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// Columns a job listing may be sorted by
///
/// ORDER BY cannot be parameterized, so only these names ever reach the SQL.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JobSortField {
    Id,
    Title,
    Salary,
    Equity,
    CompanyHandle,
}

impl JobSortField {
    pub fn parse(s: &str) -> AppResult<JobSortField> {
        match s {
            "id" => Ok(JobSortField::Id),
            "title" => Ok(JobSortField::Title),
            "salary" => Ok(JobSortField::Salary),
            "equity" => Ok(JobSortField::Equity),
            "companyHandle" => Ok(JobSortField::CompanyHandle),
            other => Err(AppError::BadRequest(format!(
                "Invalid sortBy: {}. Must be one of id, title, salary, equity, companyHandle",
                other
            ))),
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            JobSortField::Id => "id",
            JobSortField::Title => "title",
            JobSortField::Salary => "salary",
            JobSortField::Equity => "equity",
            JobSortField::CompanyHandle => "company_handle",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    pub field: JobSortField,
    pub order: SortOrder,
}

impl Default for SortSpec {
    fn default() -> Self {
        SortSpec::new(JobSortField::Title, SortOrder::Ascending)
    }
}

impl SortSpec {
    pub fn new(field: JobSortField, order: SortOrder) -> Self {
        SortSpec { field, order }
    }

    /// Parse sortBy and sortOrder query parameters
    ///
    /// `None` when neither was given; a missing half falls back to title or
    /// ascending.
    pub fn from_params(
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> AppResult<Option<SortSpec>> {
        if sort_by.is_none() && sort_order.is_none() {
            return Ok(None);
        }
        let field = match sort_by {
            Some(attr) => JobSortField::parse(attr)?,
            None => JobSortField::Title,
        };
        let order = match sort_order {
            Some(order) => SortOrder::parse(order)?,
            None => SortOrder::Ascending,
        };
        Ok(Some(SortSpec::new(field, order)))
    }
}
