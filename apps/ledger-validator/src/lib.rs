// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_collect,
        clippy::items_after_statements
    )
)]

//! Ledger Validator - Rust Core Library
//!
//! Integrity gate for a portfolio ledger. Before a trade or daily valuation
//! is committed, the validator recomputes the ledger's arithmetic from
//! primitive fields, checks market prices for plausibility, and returns one
//! PASS/FAIL verdict with an itemized reason for every failure. Every run is
//! appended to an audit trail.
//!
//! # Layout
//!
//! - `models`: validated ledger and market-data types
//! - `validation`: the checkers, the report, and [`IntegrityValidator`]
//! - `audit`: append-only run records ([`JsonlAuditTrail`], [`InMemoryAuditTrail`])
//! - `market_data`: async [`RangeProvider`] port with timeout-bounded fetching
//! - `config`: YAML configuration with environment interpolation
//! - `observability` / `telemetry`: metrics and tracing setup
//!
//! # Example
//!
//! ```rust,ignore
//! use ledger_validator::{IntegrityValidator, InMemoryAuditTrail, ToleranceConfig, ValidationRequest};
//!
//! let validator = IntegrityValidator::new(&ToleranceConfig::default(), InMemoryAuditTrail::new());
//! let report = validator.validate(&ValidationRequest::new(snapshot))?;
//! if !report.passed() {
//!     // hard stop: do not persist
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod audit;
pub mod config;
pub mod error;
pub mod market_data;
pub mod models;
pub mod observability;
pub mod telemetry;
pub mod validation;

pub use audit::{AuditEntry, AuditError, AuditSink, InMemoryAuditTrail, JsonlAuditTrail, read_audit_trail};
pub use config::{Config, ConfigError, ToleranceConfig, load_config, load_config_or_default};
pub use error::ValidatorError;
pub use market_data::{
    MarketDataError, RangeProvider, StaticRangeProvider, attach_missing_ranges, fetch_ranges,
};
pub use models::{
    DailyBar, FailureKind, InstrumentQuote, ModelError, PortfolioSnapshot, PositionSnapshot,
    RecentRange, ReportedTotals, Severity, TradeAction, TradeRecord, ValidationOutcome,
};
pub use validation::{
    EquityConservationChecker, EquityContext, IntegrityValidator, PortfolioMathValidator,
    PreTradeChecker, PreTradeContext, PriceSanityChecker, RunKind, TradeContext,
    TradeExecutionValidator, ValidationReport, ValidationRequest,
};
