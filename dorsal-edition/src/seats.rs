use crate::edition::Edition;
use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Seat bookkeeping for one bus stop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopSeats {
    pub stop: String,
    pub available: i32,
    pub total: i32,
    pub reserved: i32,
}

/// In-memory seat tracker for the bus add-on, keyed by departure stop.
///
/// A seat is reserved when the registration is created, confirmed when the
/// payment clears and released when it is rejected or refunded.
pub struct BusSeatManager {
    stops: HashMap<String, StopSeats>,
}

impl BusSeatManager {
    pub fn new() -> Self {
        Self {
            stops: HashMap::new(),
        }
    }

    /// Build the tracker from an edition's bus departures, pooling seats of
    /// buses that leave from the same stop
    pub fn for_edition(edition: &Edition) -> Self {
        let mut manager = Self::new();
        for bus in &edition.buses {
            let entry = manager
                .stops
                .entry(bus.stop.clone())
                .or_insert_with(|| StopSeats {
                    stop: bus.stop.clone(),
                    available: 0,
                    total: 0,
                    reserved: 0,
                });
            entry.available += bus.seats;
            entry.total += bus.seats;
        }
        manager
    }

    pub fn get(&self, stop: &str) -> Option<&StopSeats> {
        self.stops.get(stop)
    }

    /// Hold one seat while the payment is pending
    pub fn reserve(&mut self, stop: &str) -> Result<(), SeatError> {
        let seats = self
            .stops
            .get_mut(stop)
            .ok_or_else(|| SeatError::UnknownStop(stop.to_string()))?;

        if seats.available < 1 {
            return Err(SeatError::SoldOut {
                stop: stop.to_string(),
            });
        }

        seats.available -= 1;
        seats.reserved += 1;
        Ok(())
    }

    /// Free a held seat (payment rejected, or refund)
    pub fn release(&mut self, stop: &str) -> Result<(), SeatError> {
        let seats = self
            .stops
            .get_mut(stop)
            .ok_or_else(|| SeatError::UnknownStop(stop.to_string()))?;

        if seats.reserved > 0 {
            seats.reserved -= 1;
            seats.available = (seats.available + 1).min(seats.total);
        }
        Ok(())
    }

    /// Turn a held seat into a sold one (payment confirmed)
    pub fn confirm(&mut self, stop: &str) -> Result<(), SeatError> {
        let seats = self
            .stops
            .get_mut(stop)
            .ok_or_else(|| SeatError::UnknownStop(stop.to_string()))?;

        if seats.reserved < 1 {
            return Err(SeatError::NothingReserved {
                stop: stop.to_string(),
            });
        }

        seats.reserved -= 1;
        Ok(())
    }

    /// Put a sold seat back on sale (refund after a confirmed payment)
    pub fn return_seat(&mut self, stop: &str) -> Result<(), SeatError> {
        let seats = self
            .stops
            .get_mut(stop)
            .ok_or_else(|| SeatError::UnknownStop(stop.to_string()))?;

        seats.available = (seats.available + 1).min(seats.total - seats.reserved);
        Ok(())
    }

    /// Seats still sellable at a stop
    pub fn seats_remaining(&self, stop: &str) -> Option<i32> {
        self.stops.get(stop).map(|s| s.available)
    }
}

impl Default for BusSeatManager {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeatError {
    #[error("No bus departs from stop: {0}")]
    UnknownStop(String),

    #[error("No bus seats left at stop {stop}")]
    SoldOut { stop: String },

    #[error("No reserved seat to confirm at stop {stop}")]
    NothingReserved { stop: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edition::BusDeparture;
    use chrono::Utc;

    fn edition_with_buses() -> Edition {
        let mut edition = Edition::new(
            2026,
            chrono::NaiveDate::from_ymd_opt(2026, 4, 19).unwrap(),
            Utc::now(),
            650,
        );
        edition.buses = vec![
            BusDeparture {
                name: "Bus 1".to_string(),
                stop: "tortosa".to_string(),
                seats: 55,
            },
            BusDeparture {
                name: "Bus 2".to_string(),
                stop: "tortosa".to_string(),
                seats: 55,
            },
            BusDeparture {
                name: "Bus 3".to_string(),
                stop: "pauls".to_string(),
                seats: 1,
            },
        ];
        edition
    }

    #[test]
    fn test_seats_pooled_by_stop() {
        let manager = BusSeatManager::for_edition(&edition_with_buses());
        assert_eq!(manager.seats_remaining("tortosa"), Some(110));
        assert_eq!(manager.seats_remaining("pauls"), Some(1));
        assert_eq!(manager.seats_remaining("roquetes"), None);
    }

    #[test]
    fn test_reserve_confirm_release() {
        let mut manager = BusSeatManager::for_edition(&edition_with_buses());

        manager.reserve("pauls").unwrap();
        assert_eq!(manager.seats_remaining("pauls"), Some(0));
        assert!(matches!(
            manager.reserve("pauls"),
            Err(SeatError::SoldOut { .. })
        ));

        manager.confirm("pauls").unwrap();
        assert_eq!(manager.get("pauls").unwrap().reserved, 0);

        // Refund of the sold seat puts it back on sale
        manager.return_seat("pauls").unwrap();
        assert_eq!(manager.seats_remaining("pauls"), Some(1));

        // A pending hold can be released back into availability
        manager.reserve("tortosa").unwrap();
        manager.release("tortosa").unwrap();
        assert_eq!(manager.seats_remaining("tortosa"), Some(110));
    }

    #[test]
    fn test_unknown_stop_rejected() {
        let mut manager = BusSeatManager::new();
        assert!(matches!(
            manager.reserve("tortosa"),
            Err(SeatError::UnknownStop(_))
        ));
    }
}
