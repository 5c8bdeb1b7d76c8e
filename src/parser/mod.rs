pub mod search_parser;
pub mod sort_parser;

pub use search_parser::{parse_company_query, parse_job_query, JobQuery};
pub use sort_parser::{JobSortField, SortOrder, SortSpec};
