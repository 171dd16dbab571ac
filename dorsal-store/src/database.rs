use dorsal_pricing::DiscountPolicy;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    /// The deployed coupon policy, read from the settings table with the
    /// configured value as fallback. Unknown names fall back too, with a
    /// warning, so a typo in the back office cannot break pricing.
    pub async fn fetch_discount_policy(
        &self,
        default: DiscountPolicy,
    ) -> Result<DiscountPolicy, sqlx::Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM settings WHERE key = 'discount_policy'")
                .fetch_optional(&self.pool)
                .await?;

        let policy = match row.as_ref().map(|(v,)| v.as_str()) {
            None => default,
            Some("full_waiver") => DiscountPolicy::FullWaiver,
            Some("inscription_only") => DiscountPolicy::InscriptionOnly,
            Some("fee_difference") => DiscountPolicy::FeeDifference,
            Some("flat_non_federated") => DiscountPolicy::FlatNonFederated,
            Some(other) => {
                warn!(value = other, "unknown discount_policy setting, using default");
                default
            }
        };

        Ok(policy)
    }
}
