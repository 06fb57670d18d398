//! The four-variant event union exchanged between components.
//!
//! Illegal event shapes are unrepresentable: directions, order types, and
//! sides are closed enums, and the numeric fields (quantity, strength,
//! commission) are validated at construction. Nothing malformed can ever
//! reach the queue, so dispatch never needs to re-check.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Construction-time validation failures for events.
///
/// These are the only way an event can "go wrong" — once constructed, an
/// event is valid for the lifetime of the run.
#[derive(Debug, Error, PartialEq)]
pub enum EventError {
    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("quantity must be positive")]
    ZeroQuantity,

    #[error("signal strength {0} outside [0.0, 1.0]")]
    StrengthOutOfRange(f64),

    #[error("commission {0} must be non-negative")]
    NegativeCommission(f64),
}

/// Directional stance a strategy recommends for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SignalDirection {
    Long,
    Short,
    /// Close whatever position exists, long or short.
    Exit,
}

/// What kind of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderType {
    Market,
    Limit,
}

/// Which side of the book an order or fill is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Signed position multiplier: Buy → +1, Sell → −1.
    pub fn multiplier(&self) -> i64 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }
}

/// A strategy's directional recommendation with a strength weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalEvent {
    symbol: String,
    direction: SignalDirection,
    strength: f64,
}

impl SignalEvent {
    /// Build a signal; strength must lie in [0.0, 1.0].
    pub fn new(
        symbol: impl Into<String>,
        direction: SignalDirection,
        strength: f64,
    ) -> Result<Self, EventError> {
        let symbol = symbol.into();
        if symbol.is_empty() {
            return Err(EventError::EmptySymbol);
        }
        if !(0.0..=1.0).contains(&strength) {
            return Err(EventError::StrengthOutOfRange(strength));
        }
        Ok(Self {
            symbol,
            direction,
            strength,
        })
    }

    /// Full-strength signal. Infallible: 1.0 is always in range, and the
    /// symbol comes from the fixed universe the caller was constructed with.
    pub fn full(symbol: impl Into<String>, direction: SignalDirection) -> Self {
        Self {
            symbol: symbol.into(),
            direction,
            strength: 1.0,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn direction(&self) -> SignalDirection {
        self.direction
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }
}

/// An instruction to trade, produced only by the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderEvent {
    symbol: String,
    order_type: OrderType,
    quantity: u64,
    side: Side,
}

impl OrderEvent {
    /// Build an order; zero quantity is rejected here and can therefore
    /// never appear on the queue.
    pub fn new(
        symbol: impl Into<String>,
        order_type: OrderType,
        quantity: u64,
        side: Side,
    ) -> Result<Self, EventError> {
        let symbol = symbol.into();
        if symbol.is_empty() {
            return Err(EventError::EmptySymbol);
        }
        if quantity == 0 {
            return Err(EventError::ZeroQuantity);
        }
        Ok(Self {
            symbol,
            order_type,
            quantity,
            side,
        })
    }

    /// Market order shorthand — the only order type the naive sizing
    /// policy emits.
    pub fn market(symbol: impl Into<String>, quantity: u64, side: Side) -> Result<Self, EventError> {
        Self::new(symbol, OrderType::Market, quantity, side)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn side(&self) -> Side {
        self.side
    }
}

/// The realized outcome of an order.
///
/// `commission: None` means "not computed" — the portfolio resolves it
/// through its configured fallback policy, never by silently assuming zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillEvent {
    timestamp: DateTime<Utc>,
    symbol: String,
    exchange: String,
    quantity: u64,
    side: Side,
    commission: Option<f64>,
}

impl FillEvent {
    pub fn new(
        timestamp: DateTime<Utc>,
        symbol: impl Into<String>,
        exchange: impl Into<String>,
        quantity: u64,
        side: Side,
        commission: Option<f64>,
    ) -> Result<Self, EventError> {
        let symbol = symbol.into();
        if symbol.is_empty() {
            return Err(EventError::EmptySymbol);
        }
        if quantity == 0 {
            return Err(EventError::ZeroQuantity);
        }
        if let Some(c) = commission {
            if c < 0.0 || c.is_nan() {
                return Err(EventError::NegativeCommission(c));
            }
        }
        Ok(Self {
            timestamp,
            symbol,
            exchange: exchange.into(),
            quantity,
            side,
            commission,
        })
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn commission(&self) -> Option<f64> {
        self.commission
    }
}

/// The message unit exchanged between components.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Event {
    /// New bar data is available.
    Market,
    Signal(SignalEvent),
    Order(OrderEvent),
    Fill(FillEvent),
}

impl Event {
    /// Short tag for trace summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Market => "MARKET",
            Event::Signal(_) => "SIGNAL",
            Event::Order(_) => "ORDER",
            Event::Fill(_) => "FILL",
        }
    }
}
