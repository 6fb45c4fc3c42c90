pub use sea_orm_migration::prelude::*;

mod m20240201_000001_create_swap_requests_table;
mod m20240201_000002_create_inventory_log_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240201_000001_create_swap_requests_table::Migration),
            Box::new(m20240201_000002_create_inventory_log_table::Migration),
        ]
    }
}
