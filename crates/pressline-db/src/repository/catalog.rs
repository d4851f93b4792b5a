//! # Catalog Repository
//!
//! The pricing catalog: garments with priced variants, the modifier
//! tables (colors, patterns, textures, upcharges, discounts), and
//! ticket types with their offering links.

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use pressline_core::{
    Color, Discount, Garment, GarmentVariant, OfferedModifiers, Pattern, Texture, TicketType,
    Upcharge,
};

/// Offering links for a new ticket type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketTypeLinks {
    #[serde(default)]
    pub garment_ids: Vec<i64>,
    #[serde(default)]
    pub color_ids: Vec<i64>,
    #[serde(default)]
    pub pattern_ids: Vec<i64>,
    #[serde(default)]
    pub texture_ids: Vec<i64>,
    #[serde(default)]
    pub upcharge_ids: Vec<i64>,
}

/// Repository for the pricing catalog.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Garments & Variants
    // =========================================================================

    pub async fn create_garment(&self, name: &str) -> DbResult<Garment> {
        let result = sqlx::query("INSERT INTO garments (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(Garment {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub async fn list_garments(&self) -> DbResult<Vec<Garment>> {
        Ok(
            sqlx::query_as::<_, Garment>("SELECT id, name FROM garments ORDER BY name")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn create_variant(
        &self,
        garment_id: i64,
        name: &str,
        price_cents: i64,
    ) -> DbResult<GarmentVariant> {
        let result = sqlx::query(
            "INSERT INTO garment_variants (garment_id, name, price_cents) VALUES (?1, ?2, ?3)",
        )
        .bind(garment_id)
        .bind(name)
        .bind(price_cents)
        .execute(&self.pool)
        .await?;

        Ok(GarmentVariant {
            id: result.last_insert_rowid(),
            garment_id,
            name: name.to_string(),
            price_cents,
        })
    }

    pub async fn get_variant(&self, id: i64) -> DbResult<Option<GarmentVariant>> {
        Ok(sqlx::query_as::<_, GarmentVariant>(
            "SELECT id, garment_id, name, price_cents FROM garment_variants WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn variants_for_garment(&self, garment_id: i64) -> DbResult<Vec<GarmentVariant>> {
        Ok(sqlx::query_as::<_, GarmentVariant>(
            r#"
            SELECT id, garment_id, name, price_cents
            FROM garment_variants
            WHERE garment_id = ?1
            ORDER BY name
            "#,
        )
        .bind(garment_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Re-prices a variant. Existing ticket lines keep their frozen price.
    pub async fn set_variant_price(&self, variant_id: i64, price_cents: i64) -> DbResult<()> {
        debug!(variant_id, price_cents, "Updating variant price");

        let result = sqlx::query("UPDATE garment_variants SET price_cents = ?2 WHERE id = ?1")
            .bind(variant_id)
            .bind(price_cents)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("GarmentVariant", variant_id));
        }

        Ok(())
    }

    /// Garments (with variants) offered by a ticket type.
    pub async fn garments_for_ticket_type(
        &self,
        ticket_type_id: i64,
    ) -> DbResult<Vec<(Garment, Vec<GarmentVariant>)>> {
        let garments = sqlx::query_as::<_, Garment>(
            r#"
            SELECT g.id, g.name
            FROM garments g
            JOIN ticket_type_garments ttg ON ttg.garment_id = g.id
            WHERE ttg.ticket_type_id = ?1
            ORDER BY g.name
            "#,
        )
        .bind(ticket_type_id)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(garments.len());
        for garment in garments {
            let variants = self.variants_for_garment(garment.id).await?;
            out.push((garment, variants));
        }
        Ok(out)
    }

    // =========================================================================
    // Modifier Tables
    // =========================================================================

    pub async fn create_color(&self, name: &str, value: &str) -> DbResult<Color> {
        let result = sqlx::query("INSERT INTO colors (name, value) VALUES (?1, ?2)")
            .bind(name)
            .bind(value)
            .execute(&self.pool)
            .await?;

        Ok(Color {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    pub async fn list_colors(&self) -> DbResult<Vec<Color>> {
        Ok(
            sqlx::query_as::<_, Color>("SELECT id, name, value FROM colors ORDER BY name")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn create_pattern(&self, name: &str) -> DbResult<Pattern> {
        let result = sqlx::query("INSERT INTO patterns (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(Pattern {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub async fn list_patterns(&self) -> DbResult<Vec<Pattern>> {
        Ok(
            sqlx::query_as::<_, Pattern>("SELECT id, name FROM patterns ORDER BY name")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn create_texture(&self, name: &str) -> DbResult<Texture> {
        let result = sqlx::query("INSERT INTO textures (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(Texture {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub async fn list_textures(&self) -> DbResult<Vec<Texture>> {
        Ok(
            sqlx::query_as::<_, Texture>("SELECT id, name FROM textures ORDER BY name")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn create_upcharge(&self, description: &str, price_cents: i64) -> DbResult<Upcharge> {
        let result =
            sqlx::query("INSERT INTO upcharges (description, price_cents) VALUES (?1, ?2)")
                .bind(description)
                .bind(price_cents)
                .execute(&self.pool)
                .await?;

        Ok(Upcharge {
            id: result.last_insert_rowid(),
            description: description.to_string(),
            price_cents,
        })
    }

    pub async fn list_upcharges(&self) -> DbResult<Vec<Upcharge>> {
        Ok(sqlx::query_as::<_, Upcharge>(
            "SELECT id, description, price_cents FROM upcharges ORDER BY description",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn create_discount(
        &self,
        name: &str,
        percent_bps: Option<i64>,
        amount_cents: Option<i64>,
    ) -> DbResult<Discount> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO discounts (name, percent_bps, amount_cents, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(name)
        .bind(percent_bps)
        .bind(amount_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Discount {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            percent_bps,
            amount_cents,
            created_at: now,
        })
    }

    pub async fn list_discounts(&self) -> DbResult<Vec<Discount>> {
        Ok(sqlx::query_as::<_, Discount>(
            "SELECT id, name, percent_bps, amount_cents, created_at FROM discounts ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    // =========================================================================
    // Ticket Types
    // =========================================================================

    /// Creates a ticket type with its offering links in one transaction.
    pub async fn create_ticket_type(
        &self,
        name: &str,
        links: &TicketTypeLinks,
    ) -> DbResult<TicketType> {
        debug!(name, "Creating ticket type");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("INSERT INTO ticket_types (name) VALUES (?1)")
            .bind(name)
            .execute(&mut *tx)
            .await?;
        let ticket_type_id = result.last_insert_rowid();

        for garment_id in &links.garment_ids {
            sqlx::query(
                "INSERT INTO ticket_type_garments (ticket_type_id, garment_id) VALUES (?1, ?2)",
            )
            .bind(ticket_type_id)
            .bind(garment_id)
            .execute(&mut *tx)
            .await?;
        }
        for color_id in &links.color_ids {
            sqlx::query(
                "INSERT INTO ticket_type_colors (ticket_type_id, color_id) VALUES (?1, ?2)",
            )
            .bind(ticket_type_id)
            .bind(color_id)
            .execute(&mut *tx)
            .await?;
        }
        for pattern_id in &links.pattern_ids {
            sqlx::query(
                "INSERT INTO ticket_type_patterns (ticket_type_id, pattern_id) VALUES (?1, ?2)",
            )
            .bind(ticket_type_id)
            .bind(pattern_id)
            .execute(&mut *tx)
            .await?;
        }
        for texture_id in &links.texture_ids {
            sqlx::query(
                "INSERT INTO ticket_type_textures (ticket_type_id, texture_id) VALUES (?1, ?2)",
            )
            .bind(ticket_type_id)
            .bind(texture_id)
            .execute(&mut *tx)
            .await?;
        }
        for upcharge_id in &links.upcharge_ids {
            sqlx::query(
                "INSERT INTO ticket_type_upcharges (ticket_type_id, upcharge_id) VALUES (?1, ?2)",
            )
            .bind(ticket_type_id)
            .bind(upcharge_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(TicketType {
            id: ticket_type_id,
            name: name.to_string(),
        })
    }

    pub async fn list_ticket_types(&self) -> DbResult<Vec<TicketType>> {
        Ok(
            sqlx::query_as::<_, TicketType>("SELECT id, name FROM ticket_types ORDER BY name")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn get_ticket_type(&self, id: i64) -> DbResult<Option<TicketType>> {
        Ok(
            sqlx::query_as::<_, TicketType>("SELECT id, name FROM ticket_types WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Deletes a ticket type; offering links cascade.
    pub async fn delete_ticket_type(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM ticket_types WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TicketType", id));
        }

        Ok(())
    }

    /// The modifier catalog a ticket type offers, for the composition
    /// screen.
    pub async fn offered_modifiers(&self, ticket_type_id: i64) -> DbResult<OfferedModifiers> {
        let colors = sqlx::query_as::<_, Color>(
            r#"
            SELECT c.id, c.name, c.value
            FROM colors c
            JOIN ticket_type_colors ttc ON ttc.color_id = c.id
            WHERE ttc.ticket_type_id = ?1
            ORDER BY c.name
            "#,
        )
        .bind(ticket_type_id)
        .fetch_all(&self.pool)
        .await?;

        let patterns = sqlx::query_as::<_, Pattern>(
            r#"
            SELECT p.id, p.name
            FROM patterns p
            JOIN ticket_type_patterns ttp ON ttp.pattern_id = p.id
            WHERE ttp.ticket_type_id = ?1
            ORDER BY p.name
            "#,
        )
        .bind(ticket_type_id)
        .fetch_all(&self.pool)
        .await?;

        let textures = sqlx::query_as::<_, Texture>(
            r#"
            SELECT t.id, t.name
            FROM textures t
            JOIN ticket_type_textures ttt ON ttt.texture_id = t.id
            WHERE ttt.ticket_type_id = ?1
            ORDER BY t.name
            "#,
        )
        .bind(ticket_type_id)
        .fetch_all(&self.pool)
        .await?;

        let upcharges = sqlx::query_as::<_, Upcharge>(
            r#"
            SELECT u.id, u.description, u.price_cents
            FROM upcharges u
            JOIN ticket_type_upcharges ttu ON ttu.upcharge_id = u.id
            WHERE ttu.ticket_type_id = ?1
            ORDER BY u.description
            "#,
        )
        .bind(ticket_type_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(OfferedModifiers {
            colors,
            patterns,
            textures,
            upcharges,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_garment_variants_and_pricing() {
        let db = test_db().await;
        let catalog = db.catalog();

        let shirt = catalog.create_garment("Shirt").await.unwrap();
        let variant = catalog
            .create_variant(shirt.id, "Long Sleeve", 299)
            .await
            .unwrap();

        catalog.set_variant_price(variant.id, 325).await.unwrap();
        let fetched = catalog.get_variant(variant.id).await.unwrap().unwrap();
        assert_eq!(fetched.price_cents, 325);
    }

    #[tokio::test]
    async fn test_ticket_type_offerings() {
        let db = test_db().await;
        let catalog = db.catalog();

        let shirt = catalog.create_garment("Shirt").await.unwrap();
        catalog
            .create_variant(shirt.id, "Long Sleeve", 299)
            .await
            .unwrap();
        let white = catalog.create_color("White", "#ffffff").await.unwrap();
        let starch = catalog.create_upcharge("Heavy starch", 150).await.unwrap();

        let dry_clean = catalog
            .create_ticket_type(
                "Dry Clean",
                &TicketTypeLinks {
                    garment_ids: vec![shirt.id],
                    color_ids: vec![white.id],
                    upcharge_ids: vec![starch.id],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let garments = catalog
            .garments_for_ticket_type(dry_clean.id)
            .await
            .unwrap();
        assert_eq!(garments.len(), 1);
        assert_eq!(garments[0].1.len(), 1);

        let offered = catalog.offered_modifiers(dry_clean.id).await.unwrap();
        assert_eq!(offered.colors.len(), 1);
        assert_eq!(offered.upcharges.len(), 1);
        assert!(offered.patterns.is_empty());
    }

    #[tokio::test]
    async fn test_delete_ticket_type() {
        let db = test_db().await;
        let catalog = db.catalog();

        let tt = catalog
            .create_ticket_type("Wash & Fold", &TicketTypeLinks::default())
            .await
            .unwrap();
        catalog.delete_ticket_type(tt.id).await.unwrap();

        assert!(catalog.get_ticket_type(tt.id).await.unwrap().is_none());
        assert!(matches!(
            catalog.delete_ticket_type(tt.id).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
