//! Query string parsing for job and company searches

use std::collections::HashMap;

use super::sort_parser::SortSpec;
use crate::error::{AppError, AppResult};
use crate::models::{CompanyFilter, JobFilter};

const JOB_QUERY_KEYS: &[&str] = &[
    "title",
    "minSalary",
    "hasEquity",
    "companyHandle",
    "sortBy",
    "sortOrder",
];

const COMPANY_QUERY_KEYS: &[&str] = &["nameLike", "minEmployees", "maxEmployees"];

/// Parsed `GET /jobs` query
#[derive(Debug, Clone, PartialEq)]
pub struct JobQuery {
    pub filter: JobFilter,
    /// `None` when neither `sortBy` nor `sortOrder` was given
    pub sort: Option<SortSpec>,
}

pub fn parse_job_query(params: &HashMap<String, String>) -> AppResult<JobQuery> {
    reject_unknown_keys(params, JOB_QUERY_KEYS)?;

    let filter = JobFilter {
        title: non_empty(params.get("title")),
        min_salary: params
            .get("minSalary")
            .map(|v| parse_non_negative("minSalary", v))
            .transpose()?,
        has_equity: params
            .get("hasEquity")
            .map(|v| parse_bool("hasEquity", v))
            .transpose()?,
        company_handle: non_empty(params.get("companyHandle")),
    };

    let sort = SortSpec::from_params(
        params.get("sortBy").map(String::as_str),
        params.get("sortOrder").map(String::as_str),
    )?;

    Ok(JobQuery { filter, sort })
}

pub fn parse_company_query(params: &HashMap<String, String>) -> AppResult<CompanyFilter> {
    reject_unknown_keys(params, COMPANY_QUERY_KEYS)?;

    Ok(CompanyFilter {
        name_like: non_empty(params.get("nameLike")),
        min_employees: params
            .get("minEmployees")
            .map(|v| parse_non_negative("minEmployees", v))
            .transpose()?,
        max_employees: params
            .get("maxEmployees")
            .map(|v| parse_non_negative("maxEmployees", v))
            .transpose()?,
    })
}

fn reject_unknown_keys(params: &HashMap<String, String>, allowed: &[&str]) -> AppResult<()> {
    let mut unknown: Vec<&str> = params
        .keys()
        .map(String::as_str)
        .filter(|key| !allowed.contains(key))
        .collect();

    if unknown.is_empty() {
        return Ok(());
    }

    unknown.sort_unstable();
    Err(AppError::BadRequest(format!(
        "Unknown query parameter(s): {}",
        unknown.join(", ")
    )))
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

fn parse_non_negative(name: &str, value: &str) -> AppResult<i32> {
    match value.trim().parse::<i32>() {
        Ok(n) if n >= 0 => Ok(n),
        _ => Err(AppError::BadRequest(format!(
            "{} must be a non-negative integer",
            name
        ))),
    }
}

fn parse_bool(name: &str, value: &str) -> AppResult<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(AppError::BadRequest(format!(
            "{} must be true or false",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{JobSortField, SortOrder};

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_job_query() {
        let query = parse_job_query(&HashMap::new()).unwrap();
        assert!(query.filter.is_empty());
        assert_eq!(query.sort, None);
    }

    #[test]
    fn test_full_job_query() {
        let query = parse_job_query(&params(&[
            ("title", "eng"),
            ("minSalary", "20"),
            ("hasEquity", "true"),
            ("companyHandle", "c1"),
            ("sortBy", "salary"),
            ("sortOrder", "desc"),
        ]))
        .unwrap();

        assert_eq!(query.filter.title.as_deref(), Some("eng"));
        assert_eq!(query.filter.min_salary, Some(20));
        assert_eq!(query.filter.has_equity, Some(true));
        assert_eq!(query.filter.company_handle.as_deref(), Some("c1"));
        assert_eq!(
            query.sort,
            Some(SortSpec::new(JobSortField::Salary, SortOrder::Descending))
        );
    }

    #[test]
    fn test_invalid_job_query_values() {
        assert!(parse_job_query(&params(&[("minSalary", "-1")])).is_err());
        assert!(parse_job_query(&params(&[("minSalary", "lots")])).is_err());
        assert!(parse_job_query(&params(&[("hasEquity", "yes")])).is_err());
        assert!(parse_job_query(&params(&[("sortBy", "password")])).is_err());
        assert!(parse_job_query(&params(&[("sortOrder", "banana")])).is_err());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        match parse_job_query(&params(&[("title", "a"), ("salary", "1")])) {
            Err(AppError::BadRequest(message)) => assert!(message.contains("salary")),
            other => panic!("Expected BadRequest, got {:?}", other),
        }
        assert!(parse_company_query(&params(&[("name", "x")])).is_err());
    }

    #[test]
    fn test_company_query() {
        let filter = parse_company_query(&params(&[
            ("nameLike", "net"),
            ("minEmployees", "1"),
            ("maxEmployees", "100"),
        ]))
        .unwrap();

        assert_eq!(filter.name_like.as_deref(), Some("net"));
        assert_eq!(filter.min_employees, Some(1));
        assert_eq!(filter.max_employees, Some(100));
    }
}
