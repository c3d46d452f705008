// backend/services/catalog/workers/outbox-dispatcher/src/main.rs

use std::sync::Arc;
use commerce_kernel::errors::AppResult;
use commerce_kernel::infrastructure::bootstrap::run_outbox_dispatcher;
use commerce_kernel::infrastructure::postgres::PostgresInboxGuard;

mod projection;

use projection::CatalogProjectionHandler;

#[tokio::main]
async fn main() -> AppResult<()> {
    run_outbox_dispatcher("Catalog", "catalog.integration-events", |pool| {
        // La projection est gardée par la table inbox : un message re-livré
        // après un succès partiel ne rejoue pas le read model.
        Arc::new(PostgresInboxGuard::new(
            pool.clone(),
            Arc::new(CatalogProjectionHandler::new(pool)),
        ))
    })
    .await
}
