//! Ledger and market-data models.
//!
//! Every type validates its fields at construction and on deserialization;
//! anything that makes it into a check is a well-formed ledger fact.

mod error;
mod outcome;
mod portfolio;
mod quote;
mod trade;

pub use error::ModelError;
pub use outcome::{FailureKind, Severity, ValidationOutcome};
pub use portfolio::{PortfolioSnapshot, PositionBuilder, PositionSnapshot, ReportedTotals};
pub use quote::{DailyBar, InstrumentQuote, RecentRange};
pub use trade::{TradeAction, TradeRecord};
