pub mod desk;
pub mod models;
pub mod repository;

pub use desk::{RegistrationDesk, RegistrationError};
pub use models::{Participant, PaymentStatus, Registration};
