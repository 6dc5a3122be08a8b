use crate::domain::ordering::sort_by_time_stable;
use crate::domain::{
    EventKind, EventOrderingKey, Instrument, MarketEvent, PriceObservation, TradeFill,
};
use crate::error::CurveError;
use std::iter::{Enumerate, Peekable};
use std::vec::IntoIter;

/// Merges trade fills and price observations into one causally ordered stream.
pub struct EventMerger;

impl EventMerger {
    /// Build the merged stream.
    ///
    /// Neither input needs to be sorted. Output follows [`EventOrderingKey`]:
    /// timestamp ascending, trades before marks at the same instant, input
    /// order among same-kind events at the same instant.
    ///
    /// # Errors
    /// `InvalidInput` if the fills name more than one instrument.
    pub fn merge(
        mut trades: Vec<TradeFill>,
        mut prices: Vec<PriceObservation>,
    ) -> Result<MergedEvents, CurveError> {
        single_instrument(&trades)?;

        sort_by_time_stable(&mut trades, |t| t.timestamp);
        sort_by_time_stable(&mut prices, |p| p.timestamp);

        Ok(MergedEvents {
            trades: trades.into_iter().enumerate().peekable(),
            marks: prices.into_iter().enumerate().peekable(),
        })
    }
}

/// The one instrument all fills share, or `None` for an empty list.
pub fn single_instrument(trades: &[TradeFill]) -> Result<Option<Instrument>, CurveError> {
    let Some(first) = trades.first() else {
        return Ok(None);
    };
    if let Some(other) = trades.iter().find(|t| t.instrument != first.instrument) {
        return Err(CurveError::InvalidInput(format!(
            "trade fills reference more than one instrument: {} and {}",
            first.instrument, other.instrument
        )));
    }
    Ok(Some(first.instrument.clone()))
}

/// Lazy two-way merge over the sorted inputs.
#[derive(Debug)]
pub struct MergedEvents {
    trades: Peekable<Enumerate<IntoIter<TradeFill>>>,
    marks: Peekable<Enumerate<IntoIter<PriceObservation>>>,
}

impl MergedEvents {
    fn next_trade_key(&mut self) -> Option<EventOrderingKey> {
        self.trades
            .peek()
            .map(|(seq, t)| EventOrderingKey::new(t.timestamp, EventKind::Trade, *seq))
    }

    fn next_mark_key(&mut self) -> Option<EventOrderingKey> {
        self.marks
            .peek()
            .map(|(seq, p)| EventOrderingKey::new(p.timestamp, EventKind::Mark, *seq))
    }
}

impl Iterator for MergedEvents {
    type Item = MarketEvent;

    fn next(&mut self) -> Option<MarketEvent> {
        let take_trade = match (self.next_trade_key(), self.next_mark_key()) {
            (None, None) => return None,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some(trade), Some(mark)) => trade < mark,
        };

        if take_trade {
            self.trades.next().map(|(_, t)| MarketEvent::Trade(t))
        } else {
            self.marks.next().map(|(_, p)| MarketEvent::Mark(p))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (t_lo, t_hi) = self.trades.size_hint();
        let (m_lo, m_hi) = self.marks.size_hint();
        let hi = match (t_hi, m_hi) {
            (Some(a), Some(b)) => a.checked_add(b),
            _ => None,
        };
        (t_lo.saturating_add(m_lo), hi)
    }
}
