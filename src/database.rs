use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Connect and bring the schema up to date.
///
/// With `reset` every table is dropped and recreated first, discarding all data.
pub async fn init_db(db_url: &str, reset: bool) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    opt.max_connections(20)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;

    if reset {
        tracing::warn!("Resetting database schema, all existing data is dropped");
        Migrator::fresh(&db).await?;
    } else {
        Migrator::up(&db, None).await?;
    }

    Ok(db)
}
