//! Exchange configuration.
//!
//! A single [`EngineConfig`] carries every tunable named in the system
//! overview: daily band parameters, the trading execution range, circuit
//! breaker duration, slippage envelopes, and feed identifiers. It
//! `serde`-deserializes from TOML or JSON so a deployment can override the
//! [`Default`] values (which match the reference simulator's `config.py`)
//! without a code change.

use serde::{Deserialize, Serialize};

/// All tunables for an [`crate::Exchange`] instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Day-one opening price.
    pub initial_price: f64,

    /// Starting daily band, as a percentage of the open, in each direction.
    pub max_daily_move_percent: f64,

    /// Percentage added to the current band when a trade hits a band edge.
    pub band_expansion_increment: f64,

    /// Trading Execution Range: hard ± percentage of the open outside which
    /// submissions are rejected outright, independent of the (looser) band.
    pub ter_percent: f64,

    /// Seconds the circuit breaker remains active after it trips.
    pub circuit_breaker_duration_secs: f64,

    /// Maximum slippage, as a percentage of the trade price, applied to
    /// fills where the aggressor carries a non-null owner.
    pub client_slippage_percent: f64,

    /// Maximum slippage, as a percentage of the trade price, applied to
    /// fills where the aggressor has no owner (bot flow).
    pub bot_slippage_percent: f64,

    /// Integer scale applied to decimal prices on the wire (e.g. 100 for
    /// paise from rupees).
    pub price_multiplier: u32,

    /// Feed stream identifier, carried in every record header.
    pub stream_id: u16,

    /// Instrument token, carried in every order/trade record.
    pub token: u32,

    /// Multicast group address for the default UDP feed transport.
    pub udp_multicast_group: String,

    /// Multicast port for the default UDP feed transport.
    pub udp_multicast_port: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            initial_price: 700.0,
            max_daily_move_percent: 10.0,
            band_expansion_increment: 5.0,
            ter_percent: 5.0,
            circuit_breaker_duration_secs: 5.0,
            client_slippage_percent: 0.1,
            bot_slippage_percent: 0.05,
            price_multiplier: 100,
            stream_id: 1,
            token: 1001,
            udp_multicast_group: "224.1.1.1".to_string(),
            udp_multicast_port: 5007,
        }
    }
}

impl EngineConfig {
    /// Parses an [`EngineConfig`] from a JSON document, falling back to
    /// [`Default`] for any field the document omits.
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_simulator() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.initial_price, 700.0);
        assert_eq!(cfg.max_daily_move_percent, 10.0);
        assert_eq!(cfg.ter_percent, 5.0);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg = EngineConfig::from_json(r#"{"initial_price": 50.0}"#).unwrap();
        assert_eq!(cfg.initial_price, 50.0);
        assert_eq!(cfg.max_daily_move_percent, 10.0);
    }
}
