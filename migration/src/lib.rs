pub use sea_orm_migration::prelude::*;

mod m20250301_000001_baseline_documents;
mod m20250315_000002_add_collection_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_baseline_documents::Migration),
            Box::new(m20250315_000002_add_collection_index::Migration),
        ]
    }
}
