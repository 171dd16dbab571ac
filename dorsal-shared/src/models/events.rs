use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct EditionActivatedEvent {
    pub edition_id: Uuid,
    pub year: i32,
    pub activated_at: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct RegistrationPaidEvent {
    pub registration_id: Uuid,
    pub edition_id: Uuid,
    pub participant_id: Uuid,
    pub total_cents: i32,
    pub late_tier: bool,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct RegistrationRefundedEvent {
    pub registration_id: Uuid,
    pub edition_id: Uuid,
    pub refund_cents: i32,
    pub timestamp: i64,
}
