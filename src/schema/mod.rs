pub mod validation;

pub use validation::{
    normalize_equity, validate_company_update, validate_job_update, validate_new_company,
    validate_new_job, validate_new_user, validate_user_update,
};
