//! Currency and purchase rules
//!
//! Every purchase goes through [`Wallet::spend`], which either deducts the full
//! cost or fails without touching the balance.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::planet::PlanetId;

/// Why a purchase was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("costs {cost}, only {balance} available")]
    InsufficientFunds { cost: u64, balance: u64 },
    #[error("no planet with id {0}")]
    UnknownPlanet(PlanetId),
    #[error("gravity is already at its maximum level")]
    MaxLevel,
    #[error("clone orbit is already active")]
    AlreadyActive,
    #[error("not available for this planet class")]
    NotAvailable,
    #[error("wall endpoints must differ")]
    DegenerateWall,
}

/// Player currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub balance: u64,
    /// Lifetime total credited from collections
    pub earned: u64,
}

impl Wallet {
    pub fn new(starting_money: u64) -> Self {
        Self {
            balance: starting_money,
            earned: 0,
        }
    }

    pub fn credit(&mut self, amount: u64) {
        self.balance = self.balance.saturating_add(amount);
        self.earned = self.earned.saturating_add(amount);
    }

    pub fn can_afford(&self, cost: u64) -> bool {
        self.balance >= cost
    }

    pub fn spend(&mut self, cost: u64) -> Result<(), PurchaseError> {
        if !self.can_afford(cost) {
            return Err(PurchaseError::InsufficientFunds {
                cost,
                balance: self.balance,
            });
        }
        self.balance -= cost;
        Ok(())
    }
}

/// Price of a wall, rounded up to a whole unit of currency
pub fn wall_cost(length: f64, cost_per_unit: f64) -> u64 {
    (length * cost_per_unit).ceil().max(0.0) as u64
}

/// Next price after a purchase with compounding `growth`
pub fn grown_cost(cost: u64, growth: f64) -> u64 {
    (cost as f64 * growth).ceil() as u64
}
