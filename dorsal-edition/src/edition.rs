use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pricing bracket in effect for a registration moment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TariffTier {
    Early,
    Late,
}

/// A chartered bus leaving from one stop, with its own seat count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BusDeparture {
    pub name: String,
    pub stop: String,
    pub seats: i32,
}

/// Per-edition price configuration in euro cents.
///
/// Prices live on the edition row, never in code constants. Every field is
/// optional: a field left unset reads as zero so a misconfigured edition can
/// still quote a price (the resolver logs the gap).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceTable {
    pub inscription_member_early: Option<i32>,
    pub inscription_member_late: Option<i32>,
    pub inscription_public_early: Option<i32>,
    pub inscription_public_late: Option<i32>,
    pub license_member: Option<i32>,
    pub license_public: Option<i32>,
    pub bus_early: Option<i32>,
    pub bus_late: Option<i32>,
    pub insurance: Option<i32>,
}

impl PriceTable {
    /// Inscription fee for a membership class and tier
    pub fn inscription(&self, is_member: bool, tier: TariffTier) -> Option<i32> {
        match (is_member, tier) {
            (true, TariffTier::Early) => self.inscription_member_early,
            (true, TariffTier::Late) => self.inscription_member_late,
            (false, TariffTier::Early) => self.inscription_public_early,
            (false, TariffTier::Late) => self.inscription_public_late,
        }
    }

    /// Federation license fee for a membership class. Paying this fee is what
    /// federates a registrant for the event, so it only applies to
    /// non-federated registrants.
    pub fn license(&self, is_member: bool) -> Option<i32> {
        if is_member {
            self.license_member
        } else {
            self.license_public
        }
    }

    /// Bus add-on price for a tier
    pub fn bus(&self, tier: TariffTier) -> Option<i32> {
        match tier {
            TariffTier::Early => self.bus_early,
            TariffTier::Late => self.bus_late,
        }
    }
}

/// One year's instance of the event, owning its dates, capacity and prices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edition {
    pub id: Uuid,
    pub year: i32,
    pub event_date: NaiveDate,
    pub registration_opens_at: Option<DateTime<Utc>>,
    pub early_cutoff: DateTime<Utc>,
    pub capacity: i32,
    pub paid_registrations: i32,
    pub is_active: bool,
    /// One-way latch: set the moment paid registrations reach capacity and
    /// never cleared, so later refunds cannot reopen the early tier.
    pub late_tier_locked: bool,
    pub buses: Vec<BusDeparture>,
    pub prices: PriceTable,
}

impl Edition {
    pub fn new(year: i32, event_date: NaiveDate, early_cutoff: DateTime<Utc>, capacity: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            year,
            event_date,
            registration_opens_at: None,
            early_cutoff,
            capacity,
            paid_registrations: 0,
            is_active: false,
            late_tier_locked: false,
            buses: Vec::new(),
            prices: PriceTable::default(),
        }
    }

    /// Whether the registration window is open at `now`
    pub fn registration_open(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self
                .registration_opens_at
                .map(|opens| now >= opens)
                .unwrap_or(true)
    }

    /// Late tier applies past the early-cutoff instant or once paid
    /// registrations have reached capacity, whichever comes first. The
    /// decision is monotonic: the cutoff never reverses, and the capacity
    /// condition is pinned by `late_tier_locked`.
    pub fn is_late_tier(&self, now: DateTime<Utc>) -> bool {
        self.late_tier_locked
            || now > self.early_cutoff
            || self.paid_registrations >= self.capacity
    }

    /// Tier in effect at `now`
    pub fn tier(&self, now: DateTime<Utc>) -> TariffTier {
        if self.is_late_tier(now) {
            TariffTier::Late
        } else {
            TariffTier::Early
        }
    }

    /// Account for one paid registration. The paid count must never exceed
    /// capacity; reaching capacity sets the late-tier latch.
    pub fn record_paid_registration(&mut self) -> Result<(), EditionError> {
        if self.paid_registrations >= self.capacity {
            return Err(EditionError::CapacityReached {
                capacity: self.capacity,
            });
        }

        self.paid_registrations += 1;
        if self.paid_registrations >= self.capacity {
            self.late_tier_locked = true;
        }
        Ok(())
    }

    /// Account for a refunded registration. Frees a slot but never clears
    /// the late-tier latch.
    pub fn record_refund(&mut self) {
        self.paid_registrations = (self.paid_registrations - 1).max(0);
    }

    /// Adjust capacity; rejected when it would drop below slots already sold
    pub fn set_capacity(&mut self, capacity: i32) -> Result<(), EditionError> {
        if capacity < self.paid_registrations {
            return Err(EditionError::CapacityBelowSold {
                sold: self.paid_registrations,
                requested: capacity,
            });
        }
        self.capacity = capacity;
        Ok(())
    }

    pub fn slots_remaining(&self) -> i32 {
        (self.capacity - self.paid_registrations).max(0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EditionError {
    #[error("Edition capacity of {capacity} reached")]
    CapacityReached { capacity: i32 },

    #[error("Capacity {requested} is below the {sold} registrations already sold")]
    CapacityBelowSold { sold: i32, requested: i32 },

    #[error("Edition not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_edition(capacity: i32) -> Edition {
        Edition::new(
            2026,
            NaiveDate::from_ymd_opt(2026, 4, 19).unwrap(),
            Utc::now() + Duration::days(30),
            capacity,
        )
    }

    #[test]
    fn test_early_tier_before_cutoff() {
        let edition = test_edition(650);
        assert!(!edition.is_late_tier(Utc::now()));
        assert_eq!(edition.tier(Utc::now()), TariffTier::Early);
    }

    #[test]
    fn test_late_tier_after_cutoff() {
        let mut edition = test_edition(650);
        edition.early_cutoff = Utc::now() - Duration::days(1);
        assert!(edition.is_late_tier(Utc::now()));
    }

    #[test]
    fn test_capacity_latch_survives_refund() {
        let mut edition = test_edition(2);
        edition.record_paid_registration().unwrap();
        assert!(!edition.is_late_tier(Utc::now()));

        edition.record_paid_registration().unwrap();
        assert!(edition.late_tier_locked);
        assert!(edition.is_late_tier(Utc::now()));

        // A refund frees the slot but the tier stays late
        edition.record_refund();
        assert_eq!(edition.slots_remaining(), 1);
        assert!(edition.is_late_tier(Utc::now()));
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let mut edition = test_edition(1);
        edition.record_paid_registration().unwrap();
        let err = edition.record_paid_registration().unwrap_err();
        assert!(matches!(err, EditionError::CapacityReached { capacity: 1 }));
        assert_eq!(edition.paid_registrations, 1);
    }

    #[test]
    fn test_capacity_cannot_drop_below_sold() {
        let mut edition = test_edition(10);
        edition.record_paid_registration().unwrap();
        edition.record_paid_registration().unwrap();

        assert!(edition.set_capacity(1).is_err());
        assert!(edition.set_capacity(2).is_ok());
        assert_eq!(edition.capacity, 2);
    }

    #[test]
    fn test_registration_window() {
        let mut edition = test_edition(650);
        assert!(!edition.registration_open(Utc::now()));

        edition.is_active = true;
        assert!(edition.registration_open(Utc::now()));

        edition.registration_opens_at = Some(Utc::now() + Duration::days(1));
        assert!(!edition.registration_open(Utc::now()));
    }

    #[test]
    fn test_price_table_lookup() {
        let prices = PriceTable {
            inscription_member_early: Some(3000),
            inscription_public_early: Some(3500),
            license_member: Some(500),
            bus_early: Some(1200),
            ..Default::default()
        };

        assert_eq!(prices.inscription(true, TariffTier::Early), Some(3000));
        assert_eq!(prices.inscription(false, TariffTier::Early), Some(3500));
        assert_eq!(prices.inscription(true, TariffTier::Late), None);
        assert_eq!(prices.license(true), Some(500));
        assert_eq!(prices.license(false), None);
        assert_eq!(prices.bus(TariffTier::Early), Some(1200));
    }
}
