// backend/services/catalog/workers/outbox-dispatcher/src/projection.rs

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use uuid::Uuid;
use commerce_kernel::application::ports::IntegrationEventHandler;
use commerce_kernel::domain::events::IntegrationEvent;
use commerce_kernel::errors::{DomainError, Result};

/// Projette les événements produit dans le read model du catalogue.
/// Les upserts sont rejouables : la garde inbox évite le travail en double,
/// mais un rejeu accidentel doit rester sans effet visible.
pub struct CatalogProjectionHandler {
    pool: PgPool,
}

impl CatalogProjectionHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IntegrationEventHandler for CatalogProjectionHandler {
    async fn handle(&self, event: &IntegrationEvent) -> Result<()> {
        let Some(catalog_event) = CatalogEvent::decode(event)? else {
            // Événement d'un autre agrégat (ou sans nom exploitable) : rien
            // à projeter ici
            tracing::debug!(
                "Ignoring event {:?} ({:?})",
                event.event_id,
                event.event_name
            );
            return Ok(());
        };

        match catalog_event {
            CatalogEvent::ProductCreated(p) => {
                sqlx::query(
                    r#"
                    INSERT INTO catalog_products (id, name, description, price_cents, currency)
                    VALUES ($1, $2, $3, $4, $5)
                    ON CONFLICT (id) DO UPDATE
                    SET name = EXCLUDED.name,
                        description = EXCLUDED.description,
                        price_cents = EXCLUDED.price_cents,
                        currency = EXCLUDED.currency
                    "#,
                )
                .bind(p.product_id)
                .bind(&p.name)
                .bind(&p.description)
                .bind(p.price_cents)
                .bind(&p.currency)
                .execute(&self.pool)
                .await
                .map_err(infra("Failed to project product creation"))?;
            }

            CatalogEvent::ProductVariantCreated(v) => {
                sqlx::query(
                    r#"
                    INSERT INTO catalog_product_variants (id, product_id, sku, price_cents)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (id) DO NOTHING
                    "#,
                )
                .bind(v.variant_id)
                .bind(v.product_id)
                .bind(&v.sku)
                .bind(v.price_cents)
                .execute(&self.pool)
                .await
                .map_err(infra("Failed to project variant creation"))?;
            }

            CatalogEvent::ProductPriceChanged(p) => {
                sqlx::query("UPDATE catalog_products SET price_cents = $2 WHERE id = $1")
                    .bind(p.product_id)
                    .bind(p.price_cents)
                    .execute(&self.pool)
                    .await
                    .map_err(infra("Failed to project price change"))?;
            }

            CatalogEvent::ProductArchived(p) => {
                sqlx::query("UPDATE catalog_products SET archived = TRUE WHERE id = $1")
                    .bind(p.product_id)
                    .execute(&self.pool)
                    .await
                    .map_err(infra("Failed to project product archival"))?;
            }
        }

        Ok(())
    }
}

/// Union discriminée des événements produit, dispatchée sur `event_name`.
enum CatalogEvent {
    ProductCreated(ProductCreatedPayload),
    ProductVariantCreated(ProductVariantCreatedPayload),
    ProductPriceChanged(ProductPriceChangedPayload),
    ProductArchived(ProductArchivedPayload),
}

impl CatalogEvent {
    /// None pour un événement qui ne concerne pas le catalogue ; Err si le
    /// payload d'un événement catalogue est inexploitable (le message suivra
    /// le circuit retry / dead-letter).
    fn decode(event: &IntegrationEvent) -> Result<Option<Self>> {
        let decoded = match event.event_name.as_deref() {
            Some("product.created") => Some(Self::ProductCreated(parse_payload(event)?)),
            Some("product.variant.created") => {
                Some(Self::ProductVariantCreated(parse_payload(event)?))
            }
            Some("product.price.changed") => {
                Some(Self::ProductPriceChanged(parse_payload(event)?))
            }
            Some("product.archived") => Some(Self::ProductArchived(parse_payload(event)?)),
            _ => None,
        };

        Ok(decoded)
    }
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductCreatedPayload {
    product_id: Uuid,
    name: String,
    description: Option<String>,
    price_cents: i64,
    currency: String,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductVariantCreatedPayload {
    variant_id: Uuid,
    product_id: Uuid,
    sku: String,
    price_cents: i64,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductPriceChangedPayload {
    product_id: Uuid,
    price_cents: i64,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductArchivedPayload {
    product_id: Uuid,
}

fn parse_payload<T: DeserializeOwned>(event: &IntegrationEvent) -> Result<T> {
    serde_json::from_value(event.payload.clone()).map_err(|e| {
        DomainError::MalformedEvent(format!(
            "Invalid payload for {}: {}",
            event.event_name.as_deref().unwrap_or("unknown"),
            e
        ))
    })
}

fn infra(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::Infrastructure(format!("{}: {}", context, e))
}
