//! Order execution — the order → fill boundary.
//!
//! The trait is the contract a live brokerage adapter would also satisfy;
//! the portfolio and strategies never know whether fills are simulated or
//! real.

pub mod commission;

pub use commission::{CommissionModel, PerShareCommission, PerTradeCommission};

use crate::events::{EventError, FillEvent, OrderEvent};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Venue identifier stamped on simulated fills.
const SIMULATED_VENUE: &str = "SIMEX";

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("constructed an invalid fill: {0}")]
    InvalidFill(#[from] EventError),
}

/// Turns orders into fills.
///
/// `now` is the caller's notion of current time: the dispatch loop passes
/// simulation time (the current bar's timestamp); a live adapter would pass
/// wall-clock time.
pub trait ExecutionHandler {
    fn execute_order(
        &mut self,
        order: &OrderEvent,
        now: DateTime<Utc>,
    ) -> Result<FillEvent, ExecutionError>;
}

/// Perfect, infinitely liquid market: every order fills immediately, in
/// full, with no price impact or rejection.
///
/// This is the deliberate simplification that keeps the engine backtestable
/// without a matching-engine model. Commission comes from the configured
/// model; with no model the fill carries `None` and the portfolio's
/// fallback policy decides.
pub struct SimulatedExecutionHandler {
    venue: String,
    commission_model: Option<Box<dyn CommissionModel + Send + Sync>>,
}

impl SimulatedExecutionHandler {
    pub fn new() -> Self {
        Self {
            venue: SIMULATED_VENUE.to_string(),
            commission_model: None,
        }
    }

    pub fn with_commission_model(
        mut self,
        model: Box<dyn CommissionModel + Send + Sync>,
    ) -> Self {
        self.commission_model = Some(model);
        self
    }

    pub fn venue(&self) -> &str {
        &self.venue
    }
}

impl Default for SimulatedExecutionHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionHandler for SimulatedExecutionHandler {
    fn execute_order(
        &mut self,
        order: &OrderEvent,
        now: DateTime<Utc>,
    ) -> Result<FillEvent, ExecutionError> {
        let commission = self
            .commission_model
            .as_ref()
            .map(|model| model.commission(order));
        let fill = FillEvent::new(
            now,
            order.symbol(),
            self.venue.clone(),
            order.quantity(),
            order.side(),
            commission,
        )?;
        Ok(fill)
    }
}
