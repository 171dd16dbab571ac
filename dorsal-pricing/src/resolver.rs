use crate::models::{RegistrantProfile, TariffLabel, TariffResolution};
use chrono::{DateTime, Utc};
use dorsal_edition::Edition;

/// Maps (edition, registrant profile) to a named base price plus add-ons.
///
/// Total over all inputs: booleans are pre-validated and a missing
/// price-table field reads as zero rather than faulting, so a pricing
/// misconfiguration can never halt the registration flow.
pub struct TariffResolver;

impl TariffResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(
        &self,
        edition: &Edition,
        profile: &RegistrantProfile,
        now: DateTime<Utc>,
    ) -> TariffResolution {
        let late_tier = edition.is_late_tier(now);
        let tier = edition.tier(now);

        let inscription = price_or_zero(
            edition.prices.inscription(profile.is_member, tier),
            "inscription",
        );

        // Paying the license fee is what federates the registrant for this
        // event, so already-federated registrants skip it.
        let license = if profile.is_federated {
            0
        } else {
            price_or_zero(edition.prices.license(profile.is_member), "license")
        };

        let base_cents = inscription + license;

        let bus_cents = if profile.wants_bus {
            price_or_zero(edition.prices.bus(tier), "bus")
        } else {
            0
        };

        let insurance_cents = if profile.wants_insurance {
            price_or_zero(edition.prices.insurance, "insurance")
        } else {
            0
        };

        TariffResolution {
            label: TariffLabel::for_profile(profile.is_member, profile.is_federated),
            base_cents,
            bus_cents,
            insurance_cents,
            total_cents: base_cents + bus_cents + insurance_cents,
            late_tier,
        }
    }
}

impl Default for TariffResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn price_or_zero(value: Option<i32>, field: &str) -> i32 {
    match value {
        Some(cents) => cents,
        None => {
            tracing::warn!(field, "price table field missing, charging zero");
            0
        }
    }
}
