pub mod coupon;
pub mod edition;
pub mod registry;
pub mod seats;

pub use coupon::{Coupon, CouponError};
pub use edition::{BusDeparture, Edition, EditionError, PriceTable, TariffTier};
pub use registry::EditionRegistry;
pub use seats::{BusSeatManager, SeatError, StopSeats};
