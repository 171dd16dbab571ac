use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dorsal_pricing::{RegistrantProfile, TariffLabel};
use dorsal_registration::models::{PaymentStatus, Registration};
use dorsal_registration::repository::RegistrationRepository;
use sqlx::PgPool;
use uuid::Uuid;

pub struct StoreRegistrationRepository {
    pool: PgPool,
}

impl StoreRegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn status_str(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Pending => "PENDING",
        PaymentStatus::Paid => "PAID",
        PaymentStatus::Rejected => "REJECTED",
        PaymentStatus::Refunded => "REFUNDED",
        PaymentStatus::Invited => "INVITED",
    }
}

fn status_from_str(s: &str) -> Result<PaymentStatus, StoreError> {
    match s {
        "PENDING" => Ok(PaymentStatus::Pending),
        "PAID" => Ok(PaymentStatus::Paid),
        "REJECTED" => Ok(PaymentStatus::Rejected),
        "REFUNDED" => Ok(PaymentStatus::Refunded),
        "INVITED" => Ok(PaymentStatus::Invited),
        other => Err(StoreError::UnknownPaymentStatus(other.to_string())),
    }
}

fn label_str(label: TariffLabel) -> &'static str {
    match label {
        TariffLabel::MemberFederated => "MEMBER_FEDERATED",
        TariffLabel::Member => "MEMBER",
        TariffLabel::Federated => "FEDERATED",
        TariffLabel::General => "GENERAL",
        TariffLabel::Invited => "INVITED",
    }
}

fn label_from_str(s: &str) -> TariffLabel {
    match s {
        "MEMBER_FEDERATED" => TariffLabel::MemberFederated,
        "MEMBER" => TariffLabel::Member,
        "FEDERATED" => TariffLabel::Federated,
        "INVITED" => TariffLabel::Invited,
        _ => TariffLabel::General,
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct RegistrationRow {
    id: Uuid,
    participant_id: Uuid,
    edition_id: Uuid,
    coupon_id: Option<Uuid>,
    is_member: bool,
    is_federated: bool,
    wants_bus: bool,
    wants_insurance: bool,
    license_number: Option<String>,
    club: Option<String>,
    bus_stop: Option<String>,
    pending_bus_stop: Option<String>,
    tariff_label: String,
    total_cents: i32,
    coupon_discount_cents: i32,
    late_tier: bool,
    status: String,
    order_number: Option<String>,
    authorization_code: Option<String>,
    paid_at: Option<DateTime<Utc>>,
    refunded_at: Option<DateTime<Utc>>,
    refund_cents: Option<i32>,
    created_at: DateTime<Utc>,
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = StoreError;

    fn try_from(row: RegistrationRow) -> Result<Self, Self::Error> {
        Ok(Registration {
            id: row.id,
            participant_id: row.participant_id,
            edition_id: row.edition_id,
            coupon_id: row.coupon_id,
            profile: RegistrantProfile {
                is_member: row.is_member,
                is_federated: row.is_federated,
                wants_bus: row.wants_bus,
                wants_insurance: row.wants_insurance,
            },
            license_number: row.license_number,
            club: row.club,
            bus_stop: row.bus_stop,
            pending_bus_stop: row.pending_bus_stop,
            tariff_label: label_from_str(&row.tariff_label),
            total_cents: row.total_cents,
            coupon_discount_cents: row.coupon_discount_cents,
            late_tier: row.late_tier,
            status: status_from_str(&row.status)?,
            order_number: row.order_number,
            authorization_code: row.authorization_code,
            paid_at: row.paid_at,
            refunded_at: row.refunded_at,
            refund_cents: row.refund_cents,
            created_at: row.created_at,
        })
    }
}

const REGISTRATION_COLUMNS: &str = "id, participant_id, edition_id, coupon_id, is_member, \
     is_federated, wants_bus, wants_insurance, license_number, club, bus_stop, pending_bus_stop, \
     tariff_label, total_cents, coupon_discount_cents, late_tier, status, order_number, \
     authorization_code, paid_at, refunded_at, refund_cents, created_at";

#[async_trait]
impl RegistrationRepository for StoreRegistrationRepository {
    async fn create_registration(
        &self,
        registration: &Registration,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO registrations (id, participant_id, edition_id, coupon_id, is_member,
                is_federated, wants_bus, wants_insurance, license_number, club, bus_stop,
                pending_bus_stop, tariff_label, total_cents, coupon_discount_cents, late_tier,
                status, order_number, authorization_code, paid_at, refunded_at, refund_cents,
                created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23)
            "#,
        )
        .bind(registration.id)
        .bind(registration.participant_id)
        .bind(registration.edition_id)
        .bind(registration.coupon_id)
        .bind(registration.profile.is_member)
        .bind(registration.profile.is_federated)
        .bind(registration.profile.wants_bus)
        .bind(registration.profile.wants_insurance)
        .bind(&registration.license_number)
        .bind(&registration.club)
        .bind(&registration.bus_stop)
        .bind(&registration.pending_bus_stop)
        .bind(label_str(registration.tariff_label))
        .bind(registration.total_cents)
        .bind(registration.coupon_discount_cents)
        .bind(registration.late_tier)
        .bind(status_str(registration.status))
        .bind(&registration.order_number)
        .bind(&registration.authorization_code)
        .bind(registration.paid_at)
        .bind(registration.refunded_at)
        .bind(registration.refund_cents)
        .bind(registration.created_at)
        .execute(&self.pool)
        .await?;

        Ok(registration.id)
    }

    async fn get_registration(
        &self,
        id: Uuid,
    ) -> Result<Option<Registration>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, RegistrationRow>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Registration::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn mark_paid(
        &self,
        id: Uuid,
        order_number: &str,
        authorization_code: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        // Consume a capacity slot first; the guard on paid_registrations makes
        // the edition's capacity invariant hold under concurrent payments, and
        // once the count reaches capacity the late-tier latch stays set.
        let slot = sqlx::query(
            r#"
            UPDATE editions SET
                paid_registrations = paid_registrations + 1,
                late_tier_locked = late_tier_locked OR (paid_registrations + 1 >= capacity)
            WHERE id = (SELECT edition_id FROM registrations WHERE id = $1)
              AND paid_registrations < capacity
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if slot.rows_affected() == 0 {
            return Err(Box::new(StoreError::EditionFull));
        }

        let updated = sqlx::query(
            "UPDATE registrations SET status = 'PAID', order_number = $2, \
             authorization_code = $3, paid_at = NOW() \
             WHERE id = $1 AND status = 'PENDING'",
        )
        .bind(id)
        .bind(order_number)
        .bind(authorization_code)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(Box::new(StoreError::RegistrationStateConflict(
                id.to_string(),
            )));
        }

        tx.commit().await?;
        tracing::info!(registration_id = %id, order_number, "payment confirmed");
        Ok(())
    }

    async fn refund(
        &self,
        id: Uuid,
        refund_cents: i32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE registrations SET status = 'REFUNDED', refunded_at = NOW(), \
             refund_cents = $2 \
             WHERE id = $1 AND status = 'PAID'",
        )
        .bind(id)
        .bind(refund_cents)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(Box::new(StoreError::RegistrationStateConflict(
                id.to_string(),
            )));
        }

        // The slot opens again but late_tier_locked is left alone: a sell-out
        // never reopens the early tier.
        sqlx::query(
            "UPDATE editions SET paid_registrations = GREATEST(paid_registrations - 1, 0) \
             WHERE id = (SELECT edition_id FROM registrations WHERE id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE coupons SET current_uses = GREATEST(current_uses - 1, 0) \
             WHERE id = (SELECT coupon_id FROM registrations WHERE id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(registration_id = %id, refund_cents, "registration refunded");
        Ok(())
    }

    async fn count_paid(
        &self,
        edition_id: Uuid,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
        // Invited guests never went through mark_paid and hold no capacity
        // slot, so they stay out of this count too.
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM registrations \
             WHERE edition_id = $1 AND status = 'PAID'",
        )
        .bind(edition_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
