use email_address::EmailAddress;

use crate::error::{AppError, AppResult};
use crate::models::{CompanyUpdate, JobUpdate, NewCompany, NewJob, NewUser, UserUpdate};

/// Validates email format according to RFC 5322
pub fn validate_email(email: &str) -> bool {
    EmailAddress::is_valid(email)
}

/// Validates an absolute URL such as a company logo
pub fn validate_url(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some(),
        Err(_) => false,
    }
}

/// Validates a company handle: lowercase letters, digits and hyphens
pub fn validate_handle(handle: &str) -> bool {
    !handle.is_empty()
        && handle
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> AppResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(AppError::BadRequest(format!(
            "{} must be between {} and {} characters",
            field, min, max
        )));
    }
    Ok(())
}

fn check_non_empty(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} is required", field)));
    }
    Ok(())
}

fn check_non_negative(field: &str, value: Option<i32>) -> AppResult<()> {
    match value {
        Some(n) if n < 0 => Err(AppError::BadRequest(format!(
            "{} must be greater than or equal to 0",
            field
        ))),
        _ => Ok(()),
    }
}

fn check_email(email: &str) -> AppResult<()> {
    check_length("email", email, 6, 60)?;
    if !validate_email(email) {
        return Err(AppError::BadRequest(format!(
            "Invalid email format: {}",
            email
        )));
    }
    Ok(())
}

fn check_logo_url(logo_url: Option<&str>) -> AppResult<()> {
    match logo_url {
        Some(url) if !validate_url(url) => Err(AppError::BadRequest(format!(
            "Invalid logoUrl format: {}",
            url
        ))),
        _ => Ok(()),
    }
}

pub fn validate_new_user(user: &NewUser) -> AppResult<()> {
    check_length("username", &user.username, 1, 25)?;
    check_length("password", &user.password, 5, 20)?;
    check_length("firstName", &user.first_name, 1, 25)?;
    check_length("lastName", &user.last_name, 1, 25)?;
    check_email(&user.email)
}

pub fn validate_user_update(update: &UserUpdate) -> AppResult<()> {
    if update.is_empty() {
        return Err(AppError::BadRequest("No data".to_string()));
    }
    if let Some(password) = &update.password {
        check_length("password", password, 5, 20)?;
    }
    if let Some(first_name) = &update.first_name {
        check_length("firstName", first_name, 1, 25)?;
    }
    if let Some(last_name) = &update.last_name {
        check_length("lastName", last_name, 1, 25)?;
    }
    if let Some(email) = &update.email {
        check_email(email)?;
    }
    Ok(())
}

pub fn validate_new_job(job: &NewJob) -> AppResult<()> {
    check_non_empty("title", &job.title)?;
    check_non_negative("salary", job.salary)?;
    if let Some(equity) = &job.equity {
        normalize_equity(equity)?;
    }
    check_non_empty("companyHandle", &job.company_handle)
}

pub fn validate_job_update(update: &JobUpdate) -> AppResult<()> {
    if update.is_empty() {
        return Err(AppError::BadRequest("No data".to_string()));
    }
    if let Some(title) = &update.title {
        check_non_empty("title", title)?;
    }
    if let Some(salary) = update.salary {
        check_non_negative("salary", salary)?;
    }
    if let Some(Some(equity)) = &update.equity {
        normalize_equity(equity)?;
    }
    if let Some(handle) = &update.company_handle {
        check_non_empty("companyHandle", handle)?;
    }
    Ok(())
}

pub fn validate_new_company(company: &NewCompany) -> AppResult<()> {
    check_length("handle", &company.handle, 1, 25)?;
    if !validate_handle(&company.handle) {
        return Err(AppError::BadRequest(
            "handle may only contain lowercase letters, digits and hyphens".to_string(),
        ));
    }
    check_non_empty("name", &company.name)?;
    check_non_negative("numEmployees", company.num_employees)?;
    check_logo_url(company.logo_url.as_deref())
}

pub fn validate_company_update(update: &CompanyUpdate) -> AppResult<()> {
    if update.is_empty() {
        return Err(AppError::BadRequest("No data".to_string()));
    }
    if let Some(name) = &update.name {
        check_non_empty("name", name)?;
    }
    if let Some(num_employees) = update.num_employees {
        check_non_negative("numEmployees", num_employees)?;
    }
    if let Some(logo_url) = &update.logo_url {
        check_logo_url(logo_url.as_deref())?;
    }
    Ok(())
}

/// Canonical text for an equity fraction in `[0, 1]`
///
/// Leading zeros of the integer part and trailing zeros of the fraction are
/// dropped, so `0.50` becomes `0.5`, `0.0` becomes `0` and `.25` becomes
/// `0.25`. Works on the digits directly to avoid float rounding.
pub fn normalize_equity(raw: &str) -> AppResult<String> {
    let invalid = || AppError::BadRequest(format!("Invalid equity: {}", raw));
    let out_of_range =
        || AppError::BadRequest(format!("equity must be between 0 and 1, got {}", raw));

    let value = raw.trim();
    let value = value.strip_prefix('+').unwrap_or(value);
    if value.starts_with('-') {
        return Err(out_of_range());
    }

    let (int_part, frac_part) = match value.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (value, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let int_part = int_part.trim_start_matches('0');
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let frac_part = frac_part.trim_end_matches('0');

    match (int_part, frac_part) {
        ("0", "") => Ok("0".to_string()),
        ("0", frac) => Ok(format!("0.{}", frac)),
        ("1", "") => Ok("1".to_string()),
        _ => Err(out_of_range()),
    }
}
