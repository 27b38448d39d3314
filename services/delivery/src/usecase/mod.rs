pub mod dispatch;
pub mod ingest;
pub mod retention;
pub mod site_check;
pub mod softdelete;
