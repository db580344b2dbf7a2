//! Sniper Signals - Entry/Exit Signal Library
//!
//! Decides when a freshly launched Solana token is worth entering and when a
//! held position should be exited.
//!
//! # Modules
//!
//! - `domain`: Core value types (Instrument, Holding, IndicatorSnapshot, timing math)
//! - `ports`: Trait abstractions (PriceHistoryPort, IndicatorPort, QuotePort, NotifierPort)
//! - `signals`: BuySignalWaiter and SellSignalWaiter poll loops
//! - `adapters`: External implementations (price cache, Jupiter, alerts, CLI)
//! - `config`: Configuration loading and validation

pub mod domain;
pub mod ports;
pub mod signals;
pub mod adapters;
pub mod config;
