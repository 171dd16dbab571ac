use chrono::{DateTime, NaiveDate, Utc};
use dorsal_pricing::{PriceQuote, RegistrantProfile, TariffLabel};
use dorsal_shared::pii::Masked;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment lifecycle of a registration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Rejected,
    Refunded,
    /// Guest of the organisation; never charged
    Invited,
}

/// A person who has registered at least once. Identity fields are masked so
/// they stay out of Debug-formatted log output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub national_id: Masked<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: Masked<String>,
    pub birth_date: NaiveDate,
    pub town: Option<String>,
}

impl Participant {
    pub fn new(national_id: &str, first_name: &str, last_name: &str, email: &str, birth_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            national_id: Masked::new(national_id.to_uppercase()),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: Masked::new(email.to_string()),
            birth_date,
            town: None,
        }
    }
}

/// The priced outcome of a sign-up. Stores the resolved tariff label, the
/// computed total and the coupon discount; it is derived data, never the
/// source of truth for pricing rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub id: Uuid,
    pub participant_id: Uuid,
    pub edition_id: Uuid,
    pub coupon_id: Option<Uuid>,
    pub profile: RegistrantProfile,
    pub license_number: Option<String>,
    pub club: Option<String>,
    pub bus_stop: Option<String>,
    /// Stop chosen for a bus contracted after the fact, awaiting payment
    pub pending_bus_stop: Option<String>,
    pub tariff_label: TariffLabel,
    pub total_cents: i32,
    pub coupon_discount_cents: i32,
    pub late_tier: bool,
    pub status: PaymentStatus,
    pub order_number: Option<String>,
    pub authorization_code: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub refund_cents: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Registration {
    /// A pending registration carrying the composed quote
    pub fn from_quote(
        participant_id: Uuid,
        edition_id: Uuid,
        coupon_id: Option<Uuid>,
        profile: RegistrantProfile,
        quote: &PriceQuote,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            participant_id,
            edition_id,
            coupon_id,
            profile,
            license_number: None,
            club: None,
            bus_stop: None,
            pending_bus_stop: None,
            tariff_label: quote.label,
            total_cents: quote.total_cents,
            coupon_discount_cents: quote.discount_cents,
            late_tier: quote.late_tier,
            status: if quote.label == TariffLabel::Invited {
                PaymentStatus::Invited
            } else {
                PaymentStatus::Pending
            },
            order_number: None,
            authorization_code: None,
            paid_at: None,
            refunded_at: None,
            refund_cents: None,
            created_at: Utc::now(),
        }
    }

    pub fn mark_paid(&mut self, order_number: &str, authorization_code: &str) {
        self.status = PaymentStatus::Paid;
        self.order_number = Some(order_number.to_string());
        self.authorization_code = Some(authorization_code.to_string());
        self.paid_at = Some(Utc::now());
    }

    pub fn mark_rejected(&mut self) {
        self.status = PaymentStatus::Rejected;
    }

    pub fn mark_refunded(&mut self, refund_cents: i32) {
        self.status = PaymentStatus::Refunded;
        self.refunded_at = Some(Utc::now());
        self.refund_cents = Some(refund_cents);
    }

    /// Paid and invited registrations both hold a slot at the start line
    pub fn is_confirmed(&self) -> bool {
        matches!(self.status, PaymentStatus::Paid | PaymentStatus::Invited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_from_quote() {
        let quote = PriceQuote {
            label: TariffLabel::Member,
            base_cents: 3500,
            bus_cents: 1200,
            insurance_cents: 0,
            discount_cents: 0,
            total_cents: 4700,
            late_tier: false,
        };

        let registration = Registration::from_quote(
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            RegistrantProfile::new(true, false).with_bus(),
            &quote,
        );

        assert_eq!(registration.status, PaymentStatus::Pending);
        assert_eq!(registration.total_cents, 4700);
        assert_eq!(registration.tariff_label, TariffLabel::Member);
    }

    #[test]
    fn test_invited_quote_creates_invited_registration() {
        let registration = Registration::from_quote(
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            RegistrantProfile::default(),
            &PriceQuote::invited(),
        );

        assert_eq!(registration.status, PaymentStatus::Invited);
        assert_eq!(registration.total_cents, 0);
        assert!(registration.is_confirmed());
    }

    #[test]
    fn test_participant_identity_masked_in_debug() {
        let participant = Participant::new(
            "12345678z",
            "Laia",
            "Ferré",
            "laia@example.com",
            NaiveDate::from_ymd_opt(1991, 6, 2).unwrap(),
        );

        let debug = format!("{:?}", participant);
        assert!(!debug.contains("12345678"));
        assert!(!debug.contains("laia@example.com"));
        assert_eq!(participant.national_id.expose(), "12345678Z");
    }
}
