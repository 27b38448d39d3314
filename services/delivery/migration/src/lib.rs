use sea_orm_migration::prelude::*;

mod m20260410_000001_create_job_copies;
mod m20260410_000002_create_deleted_job_copies;
mod m20260412_000003_add_site_check_fields;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260410_000001_create_job_copies::Migration),
            Box::new(m20260410_000002_create_deleted_job_copies::Migration),
            Box::new(m20260412_000003_add_site_check_fields::Migration),
        ]
    }
}
