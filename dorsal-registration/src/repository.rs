use crate::models::Registration;
use async_trait::async_trait;
use dorsal_edition::{Coupon, Edition};
use uuid::Uuid;

/// Repository trait for edition access
#[async_trait]
pub trait EditionRepository: Send + Sync {
    async fn find_active(
        &self,
    ) -> Result<Option<Edition>, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_edition(
        &self,
        id: Uuid,
    ) -> Result<Option<Edition>, Box<dyn std::error::Error + Send + Sync>>;

    async fn save_edition(
        &self,
        edition: &Edition,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Make one edition the single active one, atomically
    async fn activate_edition(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn set_capacity(
        &self,
        id: Uuid,
        capacity: i32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for coupon access
#[async_trait]
pub trait CouponRepository: Send + Sync {
    async fn find_by_code(
        &self,
        edition_id: Uuid,
        code: &str,
    ) -> Result<Option<Coupon>, Box<dyn std::error::Error + Send + Sync>>;

    async fn save_coupon(
        &self,
        coupon: &Coupon,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Consume one use if the coupon is still available; false if not
    async fn redeem(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Give a use back on refund
    async fn release(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Delete a coupon; false when registrations reference it
    async fn delete_coupon(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for registration access
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    async fn create_registration(
        &self,
        registration: &Registration,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_registration(
        &self,
        id: Uuid,
    ) -> Result<Option<Registration>, Box<dyn std::error::Error + Send + Sync>>;

    /// Flip a pending registration to paid, consuming one capacity slot of
    /// its edition in the same transaction
    async fn mark_paid(
        &self,
        id: Uuid,
        order_number: &str,
        authorization_code: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn refund(
        &self,
        id: Uuid,
        refund_cents: i32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn count_paid(
        &self,
        edition_id: Uuid,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>>;
}
