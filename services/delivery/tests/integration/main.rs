
mod dispatch_test;
mod ingest_test;
mod retention_test;
mod site_check_test;
