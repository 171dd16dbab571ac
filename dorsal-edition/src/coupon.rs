use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A discount code scoped to one edition, with a use-count cap and an
/// optional expiry date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub edition_id: Uuid,
    pub max_uses: i32,
    pub current_uses: i32,
    /// The coupon also waives the bus add-on
    pub includes_bus: bool,
    /// The coupon also covers the federation license fee
    pub includes_license: bool,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Coupon {
    /// Codes are stored and matched uppercase
    pub fn new(code: &str, edition_id: Uuid, max_uses: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.to_uppercase(),
            description: None,
            edition_id,
            max_uses,
            current_uses: 0,
            includes_bus: false,
            includes_license: false,
            is_active: true,
            expires_at: None,
        }
    }

    /// Available while active, unexhausted and unexpired. Callers must check
    /// this before applying the coupon; the discount calculator does not.
    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }

        if self.current_uses >= self.max_uses {
            return false;
        }

        if let Some(expires_at) = self.expires_at {
            if now > expires_at {
                return false;
            }
        }

        true
    }

    pub fn uses_remaining(&self) -> i32 {
        (self.max_uses - self.current_uses).max(0)
    }

    /// Consume one use; fails once the cap is reached
    pub fn register_use(&mut self) -> Result<(), CouponError> {
        if self.current_uses >= self.max_uses {
            return Err(CouponError::Exhausted(self.code.clone()));
        }
        self.current_uses += 1;
        Ok(())
    }

    /// Give a use back on refund; never drops below zero
    pub fn release_use(&mut self) {
        self.current_uses = (self.current_uses - 1).max(0);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CouponError {
    #[error("Coupon not found: {0}")]
    NotFound(String),

    #[error("Coupon has no uses left: {0}")]
    Exhausted(String),

    #[error("Coupon is not available: {0}")]
    NotAvailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_code_uppercased() {
        let coupon = Coupon::new("club2026", Uuid::new_v4(), 10);
        assert_eq!(coupon.code, "CLUB2026");
    }

    #[test]
    fn test_availability_conditions() {
        let now = Utc::now();
        let mut coupon = Coupon::new("CARO", Uuid::new_v4(), 2);
        assert!(coupon.is_available(now));

        coupon.is_active = false;
        assert!(!coupon.is_available(now));
        coupon.is_active = true;

        coupon.current_uses = 2;
        assert!(!coupon.is_available(now));
        coupon.current_uses = 0;

        coupon.expires_at = Some(now - Duration::days(1));
        assert!(!coupon.is_available(now));

        coupon.expires_at = Some(now + Duration::days(1));
        assert!(coupon.is_available(now));
    }

    #[test]
    fn test_use_counting() {
        let mut coupon = Coupon::new("CARO", Uuid::new_v4(), 1);
        coupon.register_use().unwrap();
        assert_eq!(coupon.uses_remaining(), 0);
        assert!(coupon.register_use().is_err());

        // Refund path gives the use back
        coupon.release_use();
        assert_eq!(coupon.uses_remaining(), 1);

        // Releasing an unused coupon stays at zero
        coupon.release_use();
        coupon.release_use();
        assert_eq!(coupon.current_uses, 0);
    }
}
