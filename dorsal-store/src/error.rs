/// Domain failures surfaced by the store, distinct from transport-level
/// `sqlx::Error`s
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Edition not found: {0}")]
    EditionNotFound(String),

    #[error("Edition is full, the paid-registration count reached capacity")]
    EditionFull,

    #[error("Capacity cannot drop below registrations already sold")]
    CapacityBelowSold,

    #[error("Registration {0} is not in the required payment state")]
    RegistrationStateConflict(String),

    #[error("Unknown payment status stored for a registration: {0}")]
    UnknownPaymentStatus(String),
}
