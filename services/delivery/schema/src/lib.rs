pub mod deleted_job_copies;
pub mod job_copies;
