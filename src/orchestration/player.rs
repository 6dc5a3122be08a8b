use crate::config::Config;
use crate::domain::{Decimal, Instrument, PriceObservation, TradeFill};
use crate::engine::merger::single_instrument;
use crate::engine::{EquityCurve, EquityLogger, EventMerger, FlatMarkPolicy, PositionStateMachine};
use crate::error::CurveError;
use crate::orchestration::Session;
use tracing::{debug, info};
use uuid::Uuid;

/// Default cap on trades + prices accepted for one run.
pub const DEFAULT_MAX_EVENTS: usize = 1_000_000;

/// Output of [`Player::play`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    pub session_id: Uuid,
    pub instrument: Instrument,
    pub curve: EquityCurve,
}

/// Drives merger -> state machine -> logger for one run at a time.
#[derive(Debug, Clone)]
pub struct Player {
    flat_marks: FlatMarkPolicy,
    max_events: usize,
}

impl Player {
    pub fn new() -> Self {
        Self {
            flat_marks: FlatMarkPolicy::default(),
            max_events: DEFAULT_MAX_EVENTS,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            flat_marks: config.flat_mark_policy,
            max_events: config.max_events,
        }
    }

    pub fn with_flat_mark_policy(mut self, policy: FlatMarkPolicy) -> Self {
        self.flat_marks = policy;
        self
    }

    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }

    /// Replay a session and tag the result with its id and instrument.
    pub fn play(&self, session: Session) -> Result<Replay, CurveError> {
        let span = tracing::info_span!("replay", session = %session.id);
        let _guard = span.enter();

        let session_id = session.id;
        let (instrument, curve) = self.replay(session)?;

        info!(
            instrument = %instrument,
            entries = curve.len(),
            "equity curve generated"
        );

        Ok(Replay {
            session_id,
            instrument,
            curve,
        })
    }

    /// Build the equity curve for one instrument.
    ///
    /// Price observations before the earliest fill are dropped; there is no
    /// position to value yet.
    ///
    /// # Errors
    /// `InvalidInput` for an empty or multi-instrument fill list, bad numbers,
    /// or more events than the configured cap. `IllegalState` when a mark
    /// lands while flat under the strict policy.
    pub fn generate_equity_curve(
        &self,
        trades: Vec<TradeFill>,
        prices: Vec<PriceObservation>,
        base_capital: Decimal,
    ) -> Result<EquityCurve, CurveError> {
        self.replay(Session::new(trades, prices, base_capital))
            .map(|(_, curve)| curve)
    }

    fn replay(&self, session: Session) -> Result<(Instrument, EquityCurve), CurveError> {
        let total = session.event_count();
        if total > self.max_events {
            return Err(CurveError::InvalidInput(format!(
                "{} events exceed the limit of {}",
                total, self.max_events
            )));
        }

        let Session {
            trades,
            mut prices,
            base_capital,
            ..
        } = session;

        for trade in &trades {
            trade.validate()?;
        }
        for price in &prices {
            price.validate()?;
        }

        let instrument = single_instrument(&trades)?
            .ok_or_else(|| CurveError::InvalidInput("no trade fills supplied".to_string()))?;
        let start = trades
            .iter()
            .map(|t| t.timestamp)
            .min()
            .ok_or_else(|| CurveError::InvalidInput("no trade fills supplied".to_string()))?;

        let observed = prices.len();
        prices.retain(|p| p.timestamp >= start);
        debug!(
            trades = trades.len(),
            prices = prices.len(),
            dropped = observed - prices.len(),
            "merging event streams"
        );

        let events = EventMerger::merge(trades, prices)?;
        let (mut machine, initialization) =
            PositionStateMachine::with_policy(start, base_capital, self.flat_marks);

        let mut logger = EquityLogger::with_capacity(events.size_hint().0 + 1);
        logger.record(initialization);
        for event in events {
            logger.record(machine.apply(&event)?);
        }

        Ok((instrument, logger.finish()))
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}
