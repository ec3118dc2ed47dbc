//! Integrity checks and the validator that runs them.
//!
//! Each checker is a pure function of its inputs. [`IntegrityValidator`]
//! runs them in a fixed order, aggregates the outcomes into a
//! [`ValidationReport`], and appends the run to the audit trail.
//!
//! # Check order
//!
//! 1. Price band (and close deviation) for every position
//! 2. Position and totals arithmetic
//! 3. Trade cash flow and share delta, when a trade context is supplied
//! 4. Equity conservation and continuity, when an equity context is supplied

mod equity;
mod math;
mod preconditions;
mod price;
mod report;
mod request;
mod trade;

use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::audit::{AuditEntry, AuditSink};
use crate::config::ToleranceConfig;
use crate::error::ValidatorError;
use crate::models::{FailureKind, InstrumentQuote, ValidationOutcome};
use crate::observability::{record_audit_failure, record_failed_check, record_validation_run};

pub use equity::{EQUITY_CONSERVATION, EQUITY_CONTINUITY, EquityConservationChecker};
pub use math::{
    POSITION_PNL, POSITION_VALUE, PortfolioMathValidator, TOTAL_EQUITY, TOTAL_PNL, TOTAL_VALUE,
};
pub use preconditions::{
    CONCENTRATION_LIMIT, PreTradeChecker, PreTradeContext, SUFFICIENT_CASH, SUFFICIENT_SHARES,
    TRADE_PRICE_IN_RANGE,
};
pub use price::{PRICE_BAND, PRICE_CLOSE_DEVIATION, PriceSanityChecker};
pub use report::{RunKind, ValidationReport};
pub use request::{EquityContext, TradeContext, ValidationRequest};
pub use trade::{CASH_FLOW, SHARE_DELTA, TradeExecutionValidator};

/// `|actual - expected|`, or `None` when the difference leaves decimal range.
pub(crate) fn difference(actual: Decimal, expected: Decimal) -> Option<Decimal> {
    actual.checked_sub(expected).map(|d| d.abs())
}

/// Whether `actual` is strictly closer to `expected` than `tolerance`.
pub(crate) fn within(actual: Decimal, expected: Decimal, tolerance: Decimal) -> bool {
    difference(actual, expected).is_some_and(|d| d < tolerance)
}

/// ERROR outcome for a check whose inputs cannot be combined in decimal range.
///
/// Values that large are not a real ledger, so the check fails rather than
/// passing unverified.
pub(crate) fn overflow(check_name: &str, subject: &str) -> ValidationOutcome {
    ValidationOutcome::fail(
        check_name,
        subject,
        FailureKind::ArithmeticMismatch,
        format!("{subject}: {check_name} inputs overflow decimal arithmetic"),
    )
}

/// Runs every check for a request and records the run.
#[derive(Debug)]
pub struct IntegrityValidator<A: AuditSink> {
    price: PriceSanityChecker,
    math: PortfolioMathValidator,
    trade: TradeExecutionValidator,
    equity: EquityConservationChecker,
    pre_trade: PreTradeChecker,
    audit: A,
}

impl<A: AuditSink> IntegrityValidator<A> {
    /// Create a validator writing to `audit`.
    pub fn new(tolerances: &ToleranceConfig, audit: A) -> Self {
        Self {
            price: PriceSanityChecker::from_tolerances(tolerances),
            math: PortfolioMathValidator::from_tolerances(tolerances),
            trade: TradeExecutionValidator::from_tolerances(tolerances),
            equity: EquityConservationChecker::from_tolerances(tolerances),
            pre_trade: PreTradeChecker::from_tolerances(tolerances),
            audit,
        }
    }

    /// The audit sink.
    pub const fn audit(&self) -> &A {
        &self.audit
    }

    /// Run every applicable check without recording anything.
    #[must_use]
    pub fn evaluate(&self, request: &ValidationRequest) -> Vec<ValidationOutcome> {
        let snapshot = &request.snapshot;
        let mut outcomes = Vec::new();

        for position in snapshot.positions() {
            let quote = InstrumentQuote::for_position(position, snapshot.timestamp());
            let range = request.range_for(position.ticker());

            outcomes.push(self.price.check(&quote, range));
            if let Some(deviation) = range.and_then(|r| self.price.check_close_deviation(&quote, r)) {
                outcomes.push(deviation);
            }
        }

        outcomes.extend(self.math.check(snapshot));

        if let Some(ctx) = &request.trade {
            outcomes.push(self.trade.check(&ctx.trade, ctx.cash_before, ctx.cash_after));
            if let (Some(before), Some(after)) = (ctx.shares_before, ctx.shares_after) {
                outcomes.push(self.trade.check_share_delta(&ctx.trade, before, after));
            }
        }

        if let Some(ctx) = &request.equity {
            outcomes.push(self.equity.check(ctx.equity_before, ctx.equity_after, ctx.fees));
            if let Some(continuity) = self.equity.check_continuity(ctx.equity_before, ctx.equity_after) {
                outcomes.push(continuity);
            }
        }

        outcomes
    }

    /// Validate a snapshot request, then append the run to the audit trail.
    ///
    /// A FAIL verdict is returned as `Ok`; `Err` means the run could not be
    /// recorded.
    pub fn validate(&self, request: &ValidationRequest) -> Result<ValidationReport, ValidatorError> {
        let started = Instant::now();
        let run_id = Uuid::new_v4();

        tracing::info!(
            %run_id,
            run_kind = RunKind::Snapshot.as_str(),
            positions = request.snapshot.positions().len(),
            has_trade = request.trade.is_some(),
            has_equity = request.equity.is_some(),
            "Starting validation run"
        );

        let outcomes = self.evaluate(request);
        self.finish(run_id, RunKind::Snapshot, outcomes, started)
    }

    /// Check a proposed trade's preconditions, then append the run to the audit trail.
    pub fn check_preconditions(
        &self,
        context: &PreTradeContext,
    ) -> Result<ValidationReport, ValidatorError> {
        let started = Instant::now();
        let run_id = Uuid::new_v4();

        tracing::info!(
            %run_id,
            run_kind = RunKind::PreTrade.as_str(),
            ticker = %context.trade.ticker(),
            action = %context.trade.action(),
            shares = %context.trade.shares(),
            price = %context.trade.price(),
            "Starting pre-trade validation"
        );

        let outcomes = self.pre_trade.check(context);
        self.finish(run_id, RunKind::PreTrade, outcomes, started)
    }

    fn finish(
        &self,
        run_id: Uuid,
        run_kind: RunKind,
        outcomes: Vec<ValidationOutcome>,
        started: Instant,
    ) -> Result<ValidationReport, ValidatorError> {
        for outcome in &outcomes {
            log_outcome(run_id, outcome);
        }

        let elapsed = started.elapsed();
        let report = ValidationReport::new(
            run_id,
            run_kind,
            outcomes,
            Utc::now(),
            u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        );

        record_validation_run(run_kind.as_str(), report.passed(), elapsed.as_secs_f64());

        if let Err(e) = self.audit.append(&AuditEntry::from(&report)) {
            record_audit_failure();
            tracing::error!(%run_id, error = %e, "Failed to record validation run");
            return Err(e.into());
        }

        tracing::info!(
            %run_id,
            run_kind = run_kind.as_str(),
            passed = report.passed(),
            checks = report.outcomes().len(),
            errors = report.errors().count(),
            warnings = report.warnings().count(),
            duration_ms = report.duration_ms(),
            "Validation run complete"
        );

        Ok(report)
    }
}

fn log_outcome(run_id: Uuid, outcome: &ValidationOutcome) {
    if outcome.passed {
        tracing::debug!(
            %run_id,
            check = %outcome.check_name,
            subject = %outcome.subject,
            "Check passed"
        );
        return;
    }

    record_failed_check(&outcome.check_name, outcome.severity.as_str());

    if outcome.is_blocking() {
        tracing::error!(
            %run_id,
            check = %outcome.check_name,
            subject = %outcome.subject,
            kind = ?outcome.kind,
            detail = %outcome.detail,
            "Check failed"
        );
    } else {
        tracing::warn!(
            %run_id,
            check = %outcome.check_name,
            subject = %outcome.subject,
            kind = ?outcome.kind,
            detail = %outcome.detail,
            "Check warning"
        );
    }
}
