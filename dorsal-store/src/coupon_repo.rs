use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dorsal_edition::Coupon;
use dorsal_registration::repository::CouponRepository;
use sqlx::PgPool;
use uuid::Uuid;

pub struct StoreCouponRepository {
    pool: PgPool,
}

impl StoreCouponRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct CouponRow {
    id: Uuid,
    code: String,
    description: Option<String>,
    edition_id: Uuid,
    max_uses: i32,
    current_uses: i32,
    includes_bus: bool,
    includes_license: bool,
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
}

impl From<CouponRow> for Coupon {
    fn from(row: CouponRow) -> Self {
        Coupon {
            id: row.id,
            code: row.code,
            description: row.description,
            edition_id: row.edition_id,
            max_uses: row.max_uses,
            current_uses: row.current_uses,
            includes_bus: row.includes_bus,
            includes_license: row.includes_license,
            is_active: row.is_active,
            expires_at: row.expires_at,
        }
    }
}

#[async_trait]
impl CouponRepository for StoreCouponRepository {
    async fn find_by_code(
        &self,
        edition_id: Uuid,
        code: &str,
    ) -> Result<Option<Coupon>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, CouponRow>(
            "SELECT id, code, description, edition_id, max_uses, current_uses, includes_bus, \
             includes_license, is_active, expires_at \
             FROM coupons WHERE edition_id = $1 AND code = UPPER($2)",
        )
        .bind(edition_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Coupon::from))
    }

    async fn save_coupon(
        &self,
        coupon: &Coupon,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO coupons (id, code, description, edition_id, max_uses, current_uses,
                includes_bus, includes_license, is_active, expires_at)
            VALUES ($1, UPPER($2), $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                code = UPPER(EXCLUDED.code),
                description = EXCLUDED.description,
                max_uses = EXCLUDED.max_uses,
                includes_bus = EXCLUDED.includes_bus,
                includes_license = EXCLUDED.includes_license,
                is_active = EXCLUDED.is_active,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(coupon.id)
        .bind(&coupon.code)
        .bind(&coupon.description)
        .bind(coupon.edition_id)
        .bind(coupon.max_uses)
        .bind(coupon.current_uses)
        .bind(coupon.includes_bus)
        .bind(coupon.includes_license)
        .bind(coupon.is_active)
        .bind(coupon.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn redeem(&self, id: Uuid) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        // Guarded single-statement increment: availability is re-checked at
        // the row so two concurrent redemptions cannot overrun the cap.
        let result = sqlx::query(
            "UPDATE coupons SET current_uses = current_uses + 1 \
             WHERE id = $1 AND is_active AND current_uses < max_uses \
               AND (expires_at IS NULL OR expires_at >= NOW())",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        let redeemed = result.rows_affected() > 0;
        if redeemed {
            tracing::info!(coupon_id = %id, "coupon use registered");
        }
        Ok(redeemed)
    }

    async fn release(&self, id: Uuid) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            "UPDATE coupons SET current_uses = current_uses - 1 \
             WHERE id = $1 AND current_uses > 0",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_coupon(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        // A coupon referenced by any registration is kept forever
        let result = sqlx::query(
            "DELETE FROM coupons WHERE id = $1 \
             AND NOT EXISTS (SELECT 1 FROM registrations WHERE coupon_id = $1)",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
