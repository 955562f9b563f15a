use proptest::prelude::*;

use auction_exchange::feed::RecordingTransport;
use auction_exchange::{EngineConfig, Exchange, Side, SubmitOutcome};

fn exchange() -> Exchange<RecordingTransport> {
    let mut config = EngineConfig::default();
    config.client_slippage_percent = 0.0;
    config.bot_slippage_percent = 0.0;
    config.max_daily_move_percent = 80.0;
    config.ter_percent = 80.0;
    Exchange::new(config, RecordingTransport::new())
}

fn side_strategy() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Buy), Just(Side::Sell)]
}

proptest! {
    /// The best bid never exceeds the best ask once both sides have resting
    /// orders: anything that would cross gets matched away immediately.
    #[test]
    fn book_never_crosses(
        submissions in prop::collection::vec((side_strategy(), 650.0f64..750.0, 1u32..10), 1..60)
    ) {
        let exchange = exchange();
        for (side, price, quantity) in submissions {
            if exchange.is_halted() {
                continue;
            }
            exchange.submit(side, price, quantity, None);
            if let (Some(bid), Some(ask)) = (exchange.best_bid(), exchange.best_ask()) {
                prop_assert!(bid < ask, "book crossed: bid {bid} >= ask {ask}");
            }
        }
    }

    /// Every trade conserves quantity: what the aggressor lost is exactly
    /// what the resting order gave up.
    #[test]
    fn trades_conserve_quantity(
        resting_qty in 1u32..40,
        aggressor_qty in 1u32..40,
    ) {
        let exchange = exchange();
        exchange.submit(Side::Sell, 700.0, resting_qty, None);
        let outcome = exchange.submit(Side::Buy, 700.0, aggressor_qty, None);
        let SubmitOutcome::Accepted { trades, resting_quantity, .. } = outcome else {
            prop_assert!(false, "expected acceptance");
            return Ok(());
        };
        let traded: u32 = trades.iter().map(|t| t.quantity).sum();
        let expected_traded = resting_qty.min(aggressor_qty);
        prop_assert_eq!(traded, expected_traded);
        if aggressor_qty > resting_qty {
            prop_assert_eq!(resting_quantity, aggressor_qty - resting_qty);
        } else {
            prop_assert_eq!(resting_quantity, 0);
        }
    }

    /// Resting prices always land on the tick grid, regardless of the
    /// precision a caller submits.
    #[test]
    fn resting_prices_are_always_quantised(price in 650.0f64..750.0) {
        let exchange = exchange();
        exchange.submit(Side::Buy, price, 1, None);
        if let Some(bid) = exchange.best_bid() {
            let ticks = (bid / 0.05).round();
            prop_assert!((bid - ticks * 0.05).abs() < 1e-6);
        }
    }
}
