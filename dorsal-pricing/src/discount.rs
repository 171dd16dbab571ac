use crate::models::RegistrantProfile;
use chrono::{DateTime, Utc};
use dorsal_edition::{Coupon, Edition};
use serde::{Deserialize, Serialize};

/// What a coupon discounts. The revision history of this business rule holds
/// four mutually exclusive readings, so the rule is a tagged strategy picked
/// per deployment and never hard-coded.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiscountPolicy {
    /// Waive the federated-tier base price: a federated registrant pays no
    /// base at all, a non-federated one is left paying only the license fee
    #[default]
    FullWaiver,
    /// Waive the inscription-fee component only; the license fee is never
    /// touched
    InscriptionOnly,
    /// Waive the non-federated/federated tariff difference, i.e. exactly the
    /// license fee, regardless of federation status
    FeeDifference,
    /// Waive the full non-federated tariff for the membership class
    FlatNonFederated,
}

/// Computes the monetary discount a coupon grants.
///
/// Availability is the caller's precondition (`Coupon::is_available`); the
/// calculator only prices the discount. Output is always non-negative and
/// the composer clamps the final total at zero.
pub struct DiscountCalculator {
    policy: DiscountPolicy,
}

impl DiscountCalculator {
    pub fn new(policy: DiscountPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DiscountPolicy {
        self.policy
    }

    pub fn calculate(
        &self,
        coupon: &Coupon,
        edition: &Edition,
        profile: &RegistrantProfile,
        now: DateTime<Utc>,
    ) -> i32 {
        let tier = edition.tier(now);
        let inscription = edition
            .prices
            .inscription(profile.is_member, tier)
            .unwrap_or(0);
        let license = edition.prices.license(profile.is_member).unwrap_or(0);

        let mut discount = match self.policy {
            DiscountPolicy::FullWaiver => inscription,
            DiscountPolicy::InscriptionOnly => inscription,
            DiscountPolicy::FeeDifference => license,
            DiscountPolicy::FlatNonFederated => inscription + license,
        };

        if coupon.includes_bus && profile.wants_bus {
            discount += edition.prices.bus(tier).unwrap_or(0);
        }

        // FeeDifference and FlatNonFederated already carry the license
        // component; adding it again would double-count.
        if coupon.includes_license
            && !profile.is_federated
            && matches!(
                self.policy,
                DiscountPolicy::FullWaiver | DiscountPolicy::InscriptionOnly
            )
        {
            discount += license;
        }

        discount.max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use dorsal_edition::PriceTable;
    use uuid::Uuid;

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

    fn plain_coupon(edition: &Edition) -> Coupon {
        Coupon::new("CLUB2026", edition.id, 10)
    }

    #[test]
    fn test_policy_amounts_member_early() {
        let edition = test_edition();
        let coupon = plain_coupon(&edition);
        let profile = RegistrantProfile::new(true, false);
        let now = Utc::now();

        let amount = |policy| {
            DiscountCalculator::new(policy).calculate(&coupon, &edition, &profile, now)
        };

        assert_eq!(amount(DiscountPolicy::FullWaiver), 3000);
        assert_eq!(amount(DiscountPolicy::InscriptionOnly), 3000);
        assert_eq!(amount(DiscountPolicy::FeeDifference), 500);
        assert_eq!(amount(DiscountPolicy::FlatNonFederated), 3500);
    }

    #[test]
    fn test_includes_bus_adds_tier_bus_price() {
        let edition = test_edition();
        let mut coupon = plain_coupon(&edition);
        coupon.includes_bus = true;

        let calculator = DiscountCalculator::new(DiscountPolicy::InscriptionOnly);
        let profile = RegistrantProfile::new(false, false).with_bus();

        // 35€ inscription + 12€ bus
        assert_eq!(
            calculator.calculate(&coupon, &edition, &profile, Utc::now()),
            4700
        );

        // No bus requested, no bus in the discount
        let no_bus = RegistrantProfile::new(false, false);
        assert_eq!(
            calculator.calculate(&coupon, &edition, &no_bus, Utc::now()),
            3500
        );
    }

    #[test]
    fn test_includes_license_only_for_non_federated() {
        let edition = test_edition();
        let mut coupon = plain_coupon(&edition);
        coupon.includes_license = true;

        let calculator = DiscountCalculator::new(DiscountPolicy::FullWaiver);

        let non_federated = RegistrantProfile::new(true, false);
        assert_eq!(
            calculator.calculate(&coupon, &edition, &non_federated, Utc::now()),
            3500
        );

        let federated = RegistrantProfile::new(true, true);
        assert_eq!(
            calculator.calculate(&coupon, &edition, &federated, Utc::now()),
            3000
        );
    }

    #[test]
    fn test_includes_license_never_double_counted() {
        let edition = test_edition();
        let mut coupon = plain_coupon(&edition);
        coupon.includes_license = true;

        let profile = RegistrantProfile::new(true, false);
        let flat = DiscountCalculator::new(DiscountPolicy::FlatNonFederated);

        // FlatNonFederated already covers the license; the flag adds nothing
        assert_eq!(flat.calculate(&coupon, &edition, &profile, Utc::now()), 3500);
    }

    #[test]
    fn test_discount_never_negative() {
        let mut edition = test_edition();
        edition.prices = PriceTable::default();
        let coupon = plain_coupon(&edition);

        for policy in [
            DiscountPolicy::FullWaiver,
            DiscountPolicy::InscriptionOnly,
            DiscountPolicy::FeeDifference,
            DiscountPolicy::FlatNonFederated,
        ] {
            let amount = DiscountCalculator::new(policy).calculate(
                &coupon,
                &edition,
                &RegistrantProfile::new(false, false),
                Utc::now(),
            );
            assert!(amount >= 0);
        }
    }
}
