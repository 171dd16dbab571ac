use serde::{Deserialize, Serialize};
use std::fmt;

/// The registrant attributes that drive pricing
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrantProfile {
    pub is_member: bool,
    pub is_federated: bool,
    pub wants_bus: bool,
    pub wants_insurance: bool,
}

impl RegistrantProfile {
    pub fn new(is_member: bool, is_federated: bool) -> Self {
        Self {
            is_member,
            is_federated,
            wants_bus: false,
            wants_insurance: false,
        }
    }

    pub fn with_bus(mut self) -> Self {
        self.wants_bus = true;
        self
    }

    pub fn with_insurance(mut self) -> Self {
        self.wants_insurance = true;
        self
    }
}

/// Human-readable tariff name stored on the registration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TariffLabel {
    MemberFederated,
    Member,
    Federated,
    General,
    /// Guest registrations: forced to zero, bypassing the resolver
    Invited,
}

impl TariffLabel {
    pub fn for_profile(is_member: bool, is_federated: bool) -> Self {
        match (is_member, is_federated) {
            (true, true) => TariffLabel::MemberFederated,
            (true, false) => TariffLabel::Member,
            (false, true) => TariffLabel::Federated,
            (false, false) => TariffLabel::General,
        }
    }
}

impl fmt::Display for TariffLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TariffLabel::MemberFederated => "Member+Federated",
            TariffLabel::Member => "Member",
            TariffLabel::Federated => "Federated",
            TariffLabel::General => "General",
            TariffLabel::Invited => "Invited",
        };
        write!(f, "{name}")
    }
}

/// Output of the tariff resolver: the base charge plus add-ons, before any
/// coupon discount. All amounts in euro cents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffResolution {
    pub label: TariffLabel,
    pub base_cents: i32,
    pub bus_cents: i32,
    pub insurance_cents: i32,
    pub total_cents: i32,
    pub late_tier: bool,
}

/// The final composed price stored on a registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    pub label: TariffLabel,
    pub base_cents: i32,
    pub bus_cents: i32,
    pub insurance_cents: i32,
    pub discount_cents: i32,
    pub total_cents: i32,
    pub late_tier: bool,
}

impl PriceQuote {
    /// The fixed zero quote for guest registrations
    pub fn invited() -> Self {
        Self {
            label: TariffLabel::Invited,
            base_cents: 0,
            bus_cents: 0,
            insurance_cents: 0,
            discount_cents: 0,
            total_cents: 0,
            late_tier: false,
        }
    }
}
