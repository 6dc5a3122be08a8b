//! Tagged events flowing from the merger into the accounting machine.

use crate::domain::{PriceObservation, TradeFill};

/// Kind of a merged event.
///
/// Variant order is the tie-break priority: at equal timestamps a trade sorts
/// before a mark, so a same-instant mark values the post-trade position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    Trade,
    Mark,
}

/// One event of the merged stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketEvent {
    Trade(TradeFill),
    Mark(PriceObservation),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_kind_sorts_first() {
        assert!(EventKind::Trade < EventKind::Mark);
    }
}
