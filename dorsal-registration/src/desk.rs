use crate::models::{PaymentStatus, Registration};
use chrono::{DateTime, Utc};
use dorsal_edition::{Coupon, Edition, EditionError};
use dorsal_pricing::{DiscountPolicy, PriceComposer, RegistrantProfile};
use dorsal_shared::models::events::{RegistrationPaidEvent, RegistrationRefundedEvent};
use std::collections::HashMap;
use uuid::Uuid;

/// Orchestrates the registration lifecycle around the pricing engine.
///
/// This is the in-memory counterpart of the store's transactional flow: the
/// same checks (duplicate sign-up, coupon availability, the paid-count
/// capacity invariant) in the same order.
pub struct RegistrationDesk {
    composer: PriceComposer,
    registrations: HashMap<Uuid, Registration>,
}

impl RegistrationDesk {
    pub fn new(policy: DiscountPolicy) -> Self {
        Self {
            composer: PriceComposer::new(policy),
            registrations: HashMap::new(),
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<&Registration> {
        self.registrations.get(id)
    }

    /// Quote and create a pending registration. An unavailable coupon is a
    /// hard error here (unlike in the composer, which quotes around it): the
    /// registrant typed a code and deserves to know it did not apply.
    pub fn register(
        &mut self,
        edition: &Edition,
        participant_id: Uuid,
        profile: RegistrantProfile,
        coupon: Option<&Coupon>,
        now: DateTime<Utc>,
    ) -> Result<Registration, RegistrationError> {
        if self.has_confirmed_registration(participant_id, edition.id) {
            return Err(RegistrationError::AlreadyRegistered {
                participant_id,
                year: edition.year,
            });
        }

        if let Some(coupon) = coupon {
            if !coupon.is_available(now) {
                return Err(RegistrationError::CouponUnavailable(coupon.code.clone()));
            }
        }

        let quote = self.composer.quote(edition, &profile, coupon, false, now);
        let registration = Registration::from_quote(
            participant_id,
            edition.id,
            coupon.map(|c| c.id),
            profile,
            &quote,
        );

        tracing::info!(
            registration_id = %registration.id,
            tariff = %registration.tariff_label,
            total_cents = registration.total_cents,
            late_tier = registration.late_tier,
            "registration created"
        );

        self.registrations.insert(registration.id, registration.clone());
        Ok(registration)
    }

    /// Create a guest registration: zero total, fixed Invited label, no
    /// payment step
    pub fn invite(
        &mut self,
        edition: &Edition,
        participant_id: Uuid,
    ) -> Result<Registration, RegistrationError> {
        if self.has_confirmed_registration(participant_id, edition.id) {
            return Err(RegistrationError::AlreadyRegistered {
                participant_id,
                year: edition.year,
            });
        }

        let quote = self.composer.quote(
            edition,
            &RegistrantProfile::default(),
            None,
            true,
            Utc::now(),
        );
        let registration =
            Registration::from_quote(participant_id, edition.id, None, RegistrantProfile::default(), &quote);
        self.registrations.insert(registration.id, registration.clone());
        Ok(registration)
    }

    /// Confirm the gateway payment. Consumes one capacity slot (the count of
    /// paid registrations must never exceed capacity) and one coupon use.
    pub fn confirm_payment(
        &mut self,
        id: &Uuid,
        edition: &mut Edition,
        coupon: Option<&mut Coupon>,
        order_number: &str,
        authorization_code: &str,
    ) -> Result<RegistrationPaidEvent, RegistrationError> {
        let registration = self
            .registrations
            .get_mut(id)
            .ok_or_else(|| RegistrationError::NotFound(id.to_string()))?;

        if registration.status != PaymentStatus::Pending {
            return Err(RegistrationError::InvalidTransition {
                from: format!("{:?}", registration.status),
                to: "PAID".to_string(),
            });
        }

        let latch_before = edition.late_tier_locked;
        edition.record_paid_registration()?;

        if let Some(coupon) = coupon {
            if let Err(err) = coupon.register_use() {
                // Undo the slot and any latch it set; the edition never
                // actually sold out, and the registration stays pending
                edition.record_refund();
                edition.late_tier_locked = latch_before;
                return Err(err.into());
            }
        }

        registration.mark_paid(order_number, authorization_code);

        Ok(RegistrationPaidEvent {
            registration_id: registration.id,
            edition_id: edition.id,
            participant_id: registration.participant_id,
            total_cents: registration.total_cents,
            late_tier: registration.late_tier,
            timestamp: Utc::now().timestamp(),
        })
    }

    /// The gateway declined; the slot was never taken
    pub fn reject_payment(&mut self, id: &Uuid) -> Result<(), RegistrationError> {
        let registration = self
            .registrations
            .get_mut(id)
            .ok_or_else(|| RegistrationError::NotFound(id.to_string()))?;

        if registration.status != PaymentStatus::Pending {
            return Err(RegistrationError::InvalidTransition {
                from: format!("{:?}", registration.status),
                to: "REJECTED".to_string(),
            });
        }

        registration.mark_rejected();
        Ok(())
    }

    /// Refund a paid registration: frees the capacity slot (the late-tier
    /// latch stays) and gives the coupon use back.
    pub fn refund(
        &mut self,
        id: &Uuid,
        edition: &mut Edition,
        coupon: Option<&mut Coupon>,
        refund_cents: i32,
    ) -> Result<RegistrationRefundedEvent, RegistrationError> {
        let registration = self
            .registrations
            .get_mut(id)
            .ok_or_else(|| RegistrationError::NotFound(id.to_string()))?;

        if registration.status != PaymentStatus::Paid {
            return Err(RegistrationError::InvalidTransition {
                from: format!("{:?}", registration.status),
                to: "REFUNDED".to_string(),
            });
        }

        registration.mark_refunded(refund_cents);
        edition.record_refund();

        if let Some(coupon) = coupon {
            coupon.release_use();
        }

        Ok(RegistrationRefundedEvent {
            registration_id: registration.id,
            edition_id: edition.id,
            refund_cents,
            timestamp: Utc::now().timestamp(),
        })
    }

    fn has_confirmed_registration(&self, participant_id: Uuid, edition_id: Uuid) -> bool {
        self.registrations.values().any(|r| {
            r.participant_id == participant_id && r.edition_id == edition_id && r.is_confirmed()
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Registration not found: {0}")]
    NotFound(String),

    #[error("Participant {participant_id} is already registered for the {year} edition")]
    AlreadyRegistered { participant_id: Uuid, year: i32 },

    #[error("Coupon is not available: {0}")]
    CouponUnavailable(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error(transparent)]
    Edition(#[from] EditionError),

    #[error(transparent)]
    Coupon(#[from] dorsal_edition::CouponError),
}
