use crate::discount::{DiscountCalculator, DiscountPolicy};
use crate::models::{PriceQuote, RegistrantProfile};
use crate::resolver::TariffResolver;
use chrono::{DateTime, Utc};
use dorsal_edition::{Coupon, Edition};

/// Combines the tariff resolution and the optional coupon discount into the
/// final price stored on a registration. Pure calculation, no side effects;
/// persistence and use-count bookkeeping stay with the caller.
pub struct PriceComposer {
    resolver: TariffResolver,
    discounts: DiscountCalculator,
}

impl PriceComposer {
    pub fn new(policy: DiscountPolicy) -> Self {
        Self {
            resolver: TariffResolver::new(),
            discounts: DiscountCalculator::new(policy),
        }
    }

    pub fn policy(&self) -> DiscountPolicy {
        self.discounts.policy()
    }

    /// Quote a registration. Guest registrations short-circuit to the fixed
    /// zero quote; an unavailable coupon is ignored rather than rejected.
    pub fn quote(
        &self,
        edition: &Edition,
        profile: &RegistrantProfile,
        coupon: Option<&Coupon>,
        is_invited: bool,
        now: DateTime<Utc>,
    ) -> PriceQuote {
        if is_invited {
            return PriceQuote::invited();
        }

        let resolved = self.resolver.resolve(edition, profile, now);

        let discount_cents = coupon
            .filter(|c| c.is_available(now))
            .map(|c| self.discounts.calculate(c, edition, profile, now))
            .unwrap_or(0);

        PriceQuote {
            label: resolved.label,
            base_cents: resolved.base_cents,
            bus_cents: resolved.bus_cents,
            insurance_cents: resolved.insurance_cents,
            discount_cents,
            total_cents: (resolved.total_cents - discount_cents).max(0),
            late_tier: resolved.late_tier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TariffLabel;
    use chrono::{Duration, NaiveDate};
    use dorsal_edition::PriceTable;

    fn test_edition() -> Edition {
        let mut edition = Edition::new(
            2026,
            NaiveDate::from_ymd_opt(2026, 4, 19).unwrap(),
            Utc::now() + Duration::days(30),
            650,
        );
        edition.prices = PriceTable {
            inscription_member_early: Some(3000),
            inscription_member_late: Some(3500),
            inscription_public_early: Some(3500),
            inscription_public_late: Some(4000),
            license_member: Some(500),
            license_public: Some(500),
            bus_early: Some(1200),
            bus_late: Some(1400),
            insurance: Some(900),
        };
        edition
    }

    #[test]
    fn test_quote_without_coupon() {
        let composer = PriceComposer::new(DiscountPolicy::FullWaiver);
        let quote = composer.quote(
            &test_edition(),
            &RegistrantProfile::new(true, false).with_bus(),
            None,
            false,
            Utc::now(),
        );

        assert_eq!(quote.base_cents, 3500);
        assert_eq!(quote.bus_cents, 1200);
        assert_eq!(quote.discount_cents, 0);
        assert_eq!(quote.total_cents, 4700);
    }

    #[test]
    fn test_invited_bypasses_resolver() {
        let composer = PriceComposer::new(DiscountPolicy::FullWaiver);
        let quote = composer.quote(
            &test_edition(),
            &RegistrantProfile::new(false, true).with_bus().with_insurance(),
            None,
            true,
            Utc::now(),
        );

        assert_eq!(quote.total_cents, 0);
        assert_eq!(quote.label, TariffLabel::Invited);
    }

    #[test]
    fn test_coupon_with_bus_supplement() {
        // Policy B, non-member early: 35€ inscription discount + 12€ bus
        // against a 52€ total (35 + 5 license + 12 bus) leaves 5€.
        let edition = test_edition();
        let mut coupon = Coupon::new("BUS-FREE", edition.id, 5);
        coupon.includes_bus = true;

        let composer = PriceComposer::new(DiscountPolicy::InscriptionOnly);
        let quote = composer.quote(
            &edition,
            &RegistrantProfile::new(false, false).with_bus(),
            Some(&coupon),
            false,
            Utc::now(),
        );

        assert_eq!(quote.base_cents, 4000);
        assert_eq!(quote.bus_cents, 1200);
        assert_eq!(quote.discount_cents, 4700);
        assert_eq!(quote.total_cents, 500);
    }

    #[test]
    fn test_discount_larger_than_total_clamps_to_zero() {
        let edition = test_edition();
        let coupon = Coupon::new("GRATIS", edition.id, 5);

        let composer = PriceComposer::new(DiscountPolicy::FlatNonFederated);
        let quote = composer.quote(
            &edition,
            &RegistrantProfile::new(true, true),
            Some(&coupon),
            false,
            Utc::now(),
        );

        // Federated member base is 30€; the flat non-federated discount is
        // 35€, so the total clamps at zero instead of going negative.
        assert_eq!(quote.base_cents, 3000);
        assert_eq!(quote.discount_cents, 3500);
        assert_eq!(quote.total_cents, 0);
    }

    #[test]
    fn test_unavailable_coupon_ignored() {
        let edition = test_edition();
        let mut coupon = Coupon::new("DEAD", edition.id, 5);
        coupon.is_active = false;

        let composer = PriceComposer::new(DiscountPolicy::FullWaiver);
        let quote = composer.quote(
            &edition,
            &RegistrantProfile::new(true, false),
            Some(&coupon),
            false,
            Utc::now(),
        );

        assert_eq!(quote.discount_cents, 0);
        assert_eq!(quote.total_cents, 3500);
    }
}
