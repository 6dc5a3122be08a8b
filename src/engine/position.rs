use crate::domain::{Decimal, MarketEvent, PositionSide, PriceObservation, TimeMs, TradeFill};
use crate::error::CurveError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::{LogEntry, LogMessage};

/// How a price observation is treated while no position is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlatMarkPolicy {
    /// Reject it with `IllegalState`.
    #[default]
    Strict,
    /// Log it as `MTM` with the flat accounting unchanged.
    Carry,
}

/// Accounting state of the single instrument.
///
/// `size == 0`, `side == Flat` and `avg_price == None` always hold together,
/// and `equity` always equals
/// `base_capital + realized_pnl + unrealized_pnl - total_commission`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionState {
    pub side: PositionSide,
    /// Absolute open quantity.
    pub size: Decimal,
    /// Volume-weighted entry price of the open quantity.
    pub avg_price: Option<Decimal>,
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
    pub total_commission: Decimal,
    pub base_capital: Decimal,
    pub equity: Decimal,
}

impl PositionState {
    /// Flat state holding only the base capital.
    pub fn flat(base_capital: Decimal) -> Self {
        Self {
            side: PositionSide::Flat,
            size: Decimal::ZERO,
            avg_price: None,
            realized_pnl: Decimal::ZERO,
            unrealized_pnl: Decimal::ZERO,
            total_commission: Decimal::ZERO,
            base_capital,
            equity: base_capital,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.side == PositionSide::Flat
    }

    pub fn is_long(&self) -> bool {
        self.side == PositionSide::Long
    }

    pub fn is_short(&self) -> bool {
        self.side == PositionSide::Short
    }

    fn recompute_equity(&mut self) -> Result<(), CurveError> {
        let gross = add(self.base_capital, self.realized_pnl, "equity")?;
        let gross = add(gross, self.unrealized_pnl, "equity")?;
        self.equity = sub(gross, self.total_commission, "equity")?;
        Ok(())
    }

    fn go_flat(&mut self) {
        self.side = PositionSide::Flat;
        self.size = Decimal::ZERO;
        self.avg_price = None;
        self.unrealized_pnl = Decimal::ZERO;
    }
}

/// Applies trades and marks to one [`PositionState`] and reports every step.
#[derive(Debug)]
pub struct PositionStateMachine {
    state: PositionState,
    timestamp: TimeMs,
    flat_marks: FlatMarkPolicy,
}

impl PositionStateMachine {
    /// Start a flat machine at `start` and return the `INITIALIZATION` entry.
    pub fn new(start: TimeMs, base_capital: Decimal) -> (Self, LogEntry) {
        Self::with_policy(start, base_capital, FlatMarkPolicy::default())
    }

    pub fn with_policy(
        start: TimeMs,
        base_capital: Decimal,
        flat_marks: FlatMarkPolicy,
    ) -> (Self, LogEntry) {
        let machine = Self {
            state: PositionState::flat(base_capital),
            timestamp: start,
            flat_marks,
        };
        let entry = machine.snapshot(LogMessage::Initialization);
        (machine, entry)
    }

    pub fn state(&self) -> &PositionState {
        &self.state
    }

    pub fn timestamp(&self) -> TimeMs {
        self.timestamp
    }

    /// Dispatch a merged event to the matching transition.
    pub fn apply(&mut self, event: &MarketEvent) -> Result<LogEntry, CurveError> {
        match event {
            MarketEvent::Trade(fill) => self.apply_trade(fill),
            MarketEvent::Mark(obs) => self.apply_mark_to_market(obs),
        }
    }

    /// Apply one fill: OPEN, INCREASE, DECREASE, FLAT or REVERSE.
    ///
    /// The commission is charged before the scenario logic runs, whatever the
    /// scenario turns out to be.
    pub fn apply_trade(&mut self, fill: &TradeFill) -> Result<LogEntry, CurveError> {
        fill.validate()?;
        self.advance_to(fill.timestamp)?;

        self.state.total_commission =
            add(self.state.total_commission, fill.commission, "total commission")?;

        let message = if self.state.is_flat() {
            self.open(fill);
            LogMessage::Open
        } else if self.state.side.is_same_direction(fill.side) {
            self.increase(fill)?;
            LogMessage::Increase
        } else {
            match fill.size.cmp(&self.state.size) {
                Ordering::Less => {
                    self.decrease(fill)?;
                    LogMessage::Decrease
                }
                Ordering::Equal => {
                    self.close(fill)?;
                    LogMessage::Flat
                }
                Ordering::Greater => {
                    self.reverse(fill)?;
                    LogMessage::Reverse
                }
            }
        };

        self.state.recompute_equity()?;
        Ok(self.snapshot(message))
    }

    /// Revalue the open position at an observed price.
    ///
    /// # Errors
    /// `IllegalState` when flat under [`FlatMarkPolicy::Strict`].
    pub fn apply_mark_to_market(&mut self, obs: &PriceObservation) -> Result<LogEntry, CurveError> {
        obs.validate()?;

        if self.state.is_flat() {
            match self.flat_marks {
                FlatMarkPolicy::Strict => {
                    return Err(CurveError::IllegalState(format!(
                        "mark-to-market at {} with no open position",
                        obs.timestamp
                    )))
                }
                FlatMarkPolicy::Carry => {
                    self.advance_to(obs.timestamp)?;
                    self.state.recompute_equity()?;
                    return Ok(self.snapshot(LogMessage::Mtm));
                }
            }
        }

        self.advance_to(obs.timestamp)?;
        let avg = self.avg_price()?;
        self.state.unrealized_pnl = pnl(obs.price, avg, self.state.size, self.state.side)?;
        self.state.recompute_equity()?;
        Ok(self.snapshot(LogMessage::Mtm))
    }

    fn open(&mut self, fill: &TradeFill) {
        self.state.side = fill.side.into();
        self.state.size = fill.size;
        self.state.avg_price = Some(fill.price);
    }

    fn increase(&mut self, fill: &TradeFill) -> Result<(), CurveError> {
        let avg = self.avg_price()?;
        let new_size = add(self.state.size, fill.size, "position size")?;
        let held = mul(avg, self.state.size, "average price")?;
        let added = mul(fill.size, fill.price, "average price")?;
        let notional = add(held, added, "average price")?;
        self.state.avg_price = Some(div(notional, new_size, "average price")?);
        self.state.size = new_size;
        Ok(())
    }

    fn decrease(&mut self, fill: &TradeFill) -> Result<(), CurveError> {
        let avg = self.avg_price()?;
        let realized = pnl(fill.price, avg, fill.size, self.state.side)?;
        self.state.realized_pnl = add(self.state.realized_pnl, realized, "realized pnl")?;
        self.state.size = sub(self.state.size, fill.size, "position size")?;
        self.state.unrealized_pnl = pnl(fill.price, avg, self.state.size, self.state.side)?;
        Ok(())
    }

    fn close(&mut self, fill: &TradeFill) -> Result<(), CurveError> {
        let avg = self.avg_price()?;
        let realized = pnl(fill.price, avg, self.state.size, self.state.side)?;
        self.state.realized_pnl = add(self.state.realized_pnl, realized, "realized pnl")?;
        self.state.go_flat();
        Ok(())
    }

    fn reverse(&mut self, fill: &TradeFill) -> Result<(), CurveError> {
        let avg = self.avg_price()?;
        let old_size = self.state.size;
        let realized = pnl(fill.price, avg, old_size, self.state.side)?;
        self.state.realized_pnl = add(self.state.realized_pnl, realized, "realized pnl")?;
        self.state.side = fill.side.into();
        self.state.size = sub(fill.size, old_size, "position size")?;
        self.state.avg_price = Some(fill.price);
        self.state.unrealized_pnl = Decimal::ZERO;
        Ok(())
    }

    fn avg_price(&self) -> Result<Decimal, CurveError> {
        self.state.avg_price.ok_or_else(|| {
            CurveError::IllegalState(format!(
                "{} position of size {} has no average price",
                self.state.side, self.state.size
            ))
        })
    }

    fn advance_to(&mut self, timestamp: TimeMs) -> Result<(), CurveError> {
        if timestamp < self.timestamp {
            return Err(CurveError::Ordering(format!(
                "event at {} arrived after {}",
                timestamp, self.timestamp
            )));
        }
        self.timestamp = timestamp;
        Ok(())
    }

    fn snapshot(&self, message: LogMessage) -> LogEntry {
        LogEntry {
            timestamp: self.timestamp,
            message,
            unrealized_pnl: self.state.unrealized_pnl,
            realized_pnl: self.state.realized_pnl,
            total_commission: self.state.total_commission,
            equity: self.state.equity,
            base_capital: self.state.base_capital,
        }
    }
}

fn overflow(quantity: &str) -> CurveError {
    CurveError::InvalidInput(format!("arithmetic overflow computing {quantity}"))
}

fn add(a: Decimal, b: Decimal, quantity: &str) -> Result<Decimal, CurveError> {
    a.checked_add(b).ok_or_else(|| overflow(quantity))
}

fn sub(a: Decimal, b: Decimal, quantity: &str) -> Result<Decimal, CurveError> {
    a.checked_sub(b).ok_or_else(|| overflow(quantity))
}

fn mul(a: Decimal, b: Decimal, quantity: &str) -> Result<Decimal, CurveError> {
    a.checked_mul(b).ok_or_else(|| overflow(quantity))
}

fn div(a: Decimal, b: Decimal, quantity: &str) -> Result<Decimal, CurveError> {
    a.checked_div(b).ok_or_else(|| overflow(quantity))
}

/// `(price - avg) * size * sign`, the P&L of `size` units held at `avg`.
fn pnl(
    price: Decimal,
    avg: Decimal,
    size: Decimal,
    side: PositionSide,
) -> Result<Decimal, CurveError> {
    let per_unit = sub(price, avg, "pnl")?;
    mul(mul(per_unit, size, "pnl")?, side.sign(), "pnl")
}
