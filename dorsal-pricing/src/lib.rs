pub mod composer;
pub mod discount;
pub mod models;
pub mod resolver;

pub use composer::PriceComposer;
pub use discount::{DiscountCalculator, DiscountPolicy};
pub use models::{PriceQuote, RegistrantProfile, TariffLabel, TariffResolution};
pub use resolver::TariffResolver;
