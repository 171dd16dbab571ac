use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dorsal_edition::{BusDeparture, Edition, PriceTable};
use dorsal_registration::repository::EditionRepository;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

pub struct StoreEditionRepository {
    pool: PgPool,
}

impl StoreEditionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct EditionRow {
    id: Uuid,
    year: i32,
    event_date: NaiveDate,
    registration_opens_at: Option<DateTime<Utc>>,
    early_cutoff: DateTime<Utc>,
    capacity: i32,
    paid_registrations: i32,
    is_active: bool,
    late_tier_locked: bool,
    buses: Json<Vec<BusDeparture>>,
    inscription_member_early: Option<i32>,
    inscription_member_late: Option<i32>,
    inscription_public_early: Option<i32>,
    inscription_public_late: Option<i32>,
    license_member: Option<i32>,
    license_public: Option<i32>,
    bus_early: Option<i32>,
    bus_late: Option<i32>,
    insurance: Option<i32>,
}

impl From<EditionRow> for Edition {
    fn from(row: EditionRow) -> Self {
        Edition {
            id: row.id,
            year: row.year,
            event_date: row.event_date,
            registration_opens_at: row.registration_opens_at,
            early_cutoff: row.early_cutoff,
            capacity: row.capacity,
            paid_registrations: row.paid_registrations,
            is_active: row.is_active,
            late_tier_locked: row.late_tier_locked,
            buses: row.buses.0,
            prices: PriceTable {
                inscription_member_early: row.inscription_member_early,
                inscription_member_late: row.inscription_member_late,
                inscription_public_early: row.inscription_public_early,
                inscription_public_late: row.inscription_public_late,
                license_member: row.license_member,
                license_public: row.license_public,
                bus_early: row.bus_early,
                bus_late: row.bus_late,
                insurance: row.insurance,
            },
        }
    }
}

const EDITION_COLUMNS: &str = "id, year, event_date, registration_opens_at, early_cutoff, \
     capacity, paid_registrations, is_active, late_tier_locked, buses, \
     inscription_member_early, inscription_member_late, inscription_public_early, \
     inscription_public_late, license_member, license_public, bus_early, bus_late, insurance";

#[async_trait]
impl EditionRepository for StoreEditionRepository {
    async fn find_active(
        &self,
    ) -> Result<Option<Edition>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, EditionRow>(&format!(
            "SELECT {EDITION_COLUMNS} FROM editions WHERE is_active ORDER BY year DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Edition::from))
    }

    async fn get_edition(
        &self,
        id: Uuid,
    ) -> Result<Option<Edition>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, EditionRow>(&format!(
            "SELECT {EDITION_COLUMNS} FROM editions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Edition::from))
    }

    async fn save_edition(
        &self,
        edition: &Edition,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO editions (id, year, event_date, registration_opens_at, early_cutoff,
                capacity, paid_registrations, is_active, late_tier_locked, buses,
                inscription_member_early, inscription_member_late, inscription_public_early,
                inscription_public_late, license_member, license_public, bus_early, bus_late,
                insurance)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            ON CONFLICT (id) DO UPDATE SET
                event_date = EXCLUDED.event_date,
                registration_opens_at = EXCLUDED.registration_opens_at,
                early_cutoff = EXCLUDED.early_cutoff,
                capacity = EXCLUDED.capacity,
                buses = EXCLUDED.buses,
                inscription_member_early = EXCLUDED.inscription_member_early,
                inscription_member_late = EXCLUDED.inscription_member_late,
                inscription_public_early = EXCLUDED.inscription_public_early,
                inscription_public_late = EXCLUDED.inscription_public_late,
                license_member = EXCLUDED.license_member,
                license_public = EXCLUDED.license_public,
                bus_early = EXCLUDED.bus_early,
                bus_late = EXCLUDED.bus_late,
                insurance = EXCLUDED.insurance
            "#,
        )
        .bind(edition.id)
        .bind(edition.year)
        .bind(edition.event_date)
        .bind(edition.registration_opens_at)
        .bind(edition.early_cutoff)
        .bind(edition.capacity)
        .bind(edition.paid_registrations)
        .bind(edition.is_active)
        .bind(edition.late_tier_locked)
        .bind(Json(&edition.buses))
        .bind(edition.prices.inscription_member_early)
        .bind(edition.prices.inscription_member_late)
        .bind(edition.prices.inscription_public_early)
        .bind(edition.prices.inscription_public_late)
        .bind(edition.prices.license_member)
        .bind(edition.prices.license_public)
        .bind(edition.prices.bus_early)
        .bind(edition.prices.bus_late)
        .bind(edition.prices.insurance)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn activate_edition(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM editions WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(Box::new(StoreError::EditionNotFound(id.to_string())));
        }

        // Deactivate-all-then-activate-one in a single statement, so the
        // at-most-one-active invariant holds under concurrent activations.
        sqlx::query("UPDATE editions SET is_active = (id = $1)")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(edition_id = %id, "edition activated");
        Ok(())
    }

    async fn set_capacity(
        &self,
        id: Uuid,
        capacity: i32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let result =
            sqlx::query("UPDATE editions SET capacity = $2 WHERE id = $1 AND paid_registrations <= $2")
                .bind(id)
                .bind(capacity)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(Box::new(StoreError::CapacityBelowSold));
        }
        Ok(())
    }
}
