//! The market trend indicator: a bounded rolling history of traded prices,
//! read two different ways depending on the caller.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Maximum number of traded prices retained.
const HISTORY_CAPACITY: usize = 200;
/// Window used for the "short" moving average.
const SHORT_WINDOW: usize = 20;
/// Window used for the "long" moving average.
const LONG_WINDOW: usize = 100;
/// Moving-average crossover thresholds: short/long ratio above this is "up",
/// below the reciprocal-ish lower threshold is "down".
const MA_UP_THRESHOLD: f64 = 1.001;
const MA_DOWN_THRESHOLD: f64 = 0.999;
/// Coarser open-vs-last-traded threshold, as a fraction (0.5%).
const SESSION_TREND_THRESHOLD: f64 = 0.005;

/// Direction implied by a price comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// Rolling history of traded prices plus the session's opening price.
pub struct TrendIndicator {
    history: Mutex<VecDeque<f64>>,
    session_open: Mutex<f64>,
}

impl TrendIndicator {
    pub fn new(session_open: f64) -> Self {
        TrendIndicator {
            history: Mutex::new(VecDeque::with_capacity(HISTORY_CAPACITY)),
            session_open: Mutex::new(session_open),
        }
    }

    /// Records a new traded price, evicting the oldest entry once the
    /// history is at capacity.
    pub fn record_trade(&self, price: f64) {
        let mut history = self.history.lock().expect("trend history mutex poisoned");
        if history.len() == HISTORY_CAPACITY {
            history.pop_front();
        }
        history.push_back(price);
    }

    /// Resets the indicator for a new session: clears the traded-price
    /// history and records the new opening price.
    pub fn reset_for_new_day(&self, new_open: f64) {
        self.history.lock().expect("trend history mutex poisoned").clear();
        *self.session_open.lock().expect("session open mutex poisoned") = new_open;
    }

    /// Short/long moving-average crossover trend, per `get_market_trend` in
    /// the reference implementation. The long average is taken over
    /// [`LONG_WINDOW`] entries, or every entry recorded so far if there are
    /// fewer than that — there is no minimum-history gate.
    pub fn market_trend(&self) -> Trend {
        let history = self.history.lock().expect("trend history mutex poisoned");
        let short_avg = average(history.iter().rev().take(SHORT_WINDOW));
        let long_avg = average(history.iter().rev().take(LONG_WINDOW));
        if long_avg == 0.0 {
            return Trend::Flat;
        }
        let ratio = short_avg / long_avg;
        if ratio > MA_UP_THRESHOLD {
            Trend::Up
        } else if ratio < MA_DOWN_THRESHOLD {
            Trend::Down
        } else {
            Trend::Flat
        }
    }

    /// Coarser session trend: compares the most recently traded price
    /// against the session's opening price, per `update_trend_indicator` in
    /// the reference implementation.
    pub fn session_trend(&self) -> Trend {
        let history = self.history.lock().expect("trend history mutex poisoned");
        let Some(&last) = history.back() else {
            return Trend::Flat;
        };
        let open = *self.session_open.lock().expect("session open mutex poisoned");
        if open == 0.0 {
            return Trend::Flat;
        }
        let change = (last - open) / open;
        if change > SESSION_TREND_THRESHOLD {
            Trend::Up
        } else if change < -SESSION_TREND_THRESHOLD {
            Trend::Down
        } else {
            Trend::Flat
        }
    }
}

fn average<'a>(values: impl Iterator<Item = &'a f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 { 0.0 } else { sum / count as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_when_short_and_long_windows_agree_even_with_short_history() {
        let trend = TrendIndicator::new(100.0);
        for _ in 0..10 {
            trend.record_trade(100.0);
        }
        assert_eq!(trend.market_trend(), Trend::Flat);
    }

    #[test]
    fn crossover_detected_with_fewer_than_long_window_entries() {
        let trend = TrendIndicator::new(100.0);
        for _ in 0..10 {
            trend.record_trade(100.0);
        }
        for _ in 0..20 {
            trend.record_trade(110.0);
        }
        assert_eq!(trend.market_trend(), Trend::Up);
    }

    #[test]
    fn detects_upward_crossover() {
        let trend = TrendIndicator::new(100.0);
        for _ in 0..80 {
            trend.record_trade(100.0);
        }
        for _ in 0..20 {
            trend.record_trade(110.0);
        }
        assert_eq!(trend.market_trend(), Trend::Up);
    }

    #[test]
    fn history_is_bounded() {
        let trend = TrendIndicator::new(100.0);
        for i in 0..(HISTORY_CAPACITY + 50) {
            trend.record_trade(i as f64);
        }
        let history = trend.history.lock().unwrap();
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(*history.front().unwrap(), 50.0);
    }

    #[test]
    fn session_trend_compares_against_open() {
        let trend = TrendIndicator::new(100.0);
        trend.record_trade(102.0);
        assert_eq!(trend.session_trend(), Trend::Up);
        trend.record_trade(97.0);
        assert_eq!(trend.session_trend(), Trend::Down);
    }

    #[test]
    fn reset_clears_history_and_rebases_open() {
        let trend = TrendIndicator::new(100.0);
        trend.record_trade(150.0);
        trend.reset_for_new_day(150.0);
        assert_eq!(trend.session_trend(), Trend::Flat);
    }
}
