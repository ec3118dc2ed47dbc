//! Pre-trade checks: run before a trade is executed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::overflow;
use crate::config::ToleranceConfig;
use crate::models::{
    FailureKind, RecentRange, Severity, TradeAction, TradeRecord, ValidationOutcome,
};

/// Check name for BUY cash sufficiency.
pub const SUFFICIENT_CASH: &str = "sufficient_cash";
/// Check name for SELL share sufficiency.
pub const SUFFICIENT_SHARES: &str = "sufficient_shares";
/// Check name for the day-range test.
pub const TRADE_PRICE_IN_RANGE: &str = "trade_price_in_range";
/// Check name for the single-position limit.
pub const CONCENTRATION_LIMIT: &str = "concentration_limit";

/// Everything the pre-trade checks need about a proposed trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreTradeContext {
    /// Proposed trade.
    pub trade: TradeRecord,
    /// Cash available before the trade.
    pub available_cash: Decimal,
    /// Shares of the ticker currently held.
    #[serde(default)]
    pub held_shares: Decimal,
    /// The session's recorded low/high.
    #[serde(default)]
    pub day_range: Option<RecentRange>,
    /// Total equity before the trade; enables the concentration check.
    #[serde(default)]
    pub portfolio_equity: Option<Decimal>,
}

/// Evaluates trade preconditions.
#[derive(Debug, Clone)]
pub struct PreTradeChecker {
    max_position_pct: Decimal,
}

impl PreTradeChecker {
    /// Create a checker with a concentration limit (0.35 = 35% of equity).
    #[must_use]
    pub const fn new(max_position_pct: Decimal) -> Self {
        Self { max_position_pct }
    }

    /// Create a checker from tolerance configuration.
    #[must_use]
    pub const fn from_tolerances(tolerances: &ToleranceConfig) -> Self {
        Self::new(tolerances.max_position_pct)
    }

    /// Run every applicable precondition.
    #[must_use]
    pub fn check(&self, context: &PreTradeContext) -> Vec<ValidationOutcome> {
        let mut outcomes = Vec::with_capacity(3);

        match context.trade.action() {
            TradeAction::Buy => outcomes.push(check_cash(context)),
            TradeAction::Sell => outcomes.push(check_shares(context)),
        }

        outcomes.push(check_day_range(context));

        let equity = context.portfolio_equity.filter(|e| *e > Decimal::ZERO);
        if let (TradeAction::Buy, Some(equity)) = (context.trade.action(), equity) {
            outcomes.push(self.check_concentration(context, equity));
        }

        outcomes
    }

    fn check_concentration(&self, context: &PreTradeContext, equity: Decimal) -> ValidationOutcome {
        let trade = &context.trade;
        let ticker = trade.ticker();
        let Some(projected) = context
            .held_shares
            .checked_add(trade.shares())
            .and_then(|shares| shares.checked_mul(trade.price()))
        else {
            return overflow(CONCENTRATION_LIMIT, ticker);
        };
        let equity_after_fee = equity - trade.fee();

        if equity_after_fee <= Decimal::ZERO {
            return ValidationOutcome::fail(
                CONCENTRATION_LIMIT,
                ticker,
                FailureKind::PreconditionViolation,
                format!("fee {} consumes equity {equity}", trade.fee()),
            );
        }

        let Some(pct) = projected.checked_div(equity_after_fee) else {
            return overflow(CONCENTRATION_LIMIT, ticker);
        };

        if pct <= self.max_position_pct {
            ValidationOutcome::pass(
                CONCENTRATION_LIMIT,
                ticker,
                Severity::Error,
                format!("projected position {} of equity", pct.round_dp(4)),
            )
        } else {
            ValidationOutcome::fail(
                CONCENTRATION_LIMIT,
                ticker,
                FailureKind::PreconditionViolation,
                format!(
                    "projected {ticker} position {projected} is {} of equity {equity_after_fee}, limit {}",
                    pct.round_dp(4),
                    self.max_position_pct
                ),
            )
        }
    }
}

impl Default for PreTradeChecker {
    fn default() -> Self {
        Self::from_tolerances(&ToleranceConfig::default())
    }
}

fn check_cash(context: &PreTradeContext) -> ValidationOutcome {
    let trade = &context.trade;
    let Some(required) = trade.notional().and_then(|n| n.checked_add(trade.fee())) else {
        return overflow(SUFFICIENT_CASH, trade.ticker());
    };
    let available = context.available_cash;

    if required <= available {
        ValidationOutcome::pass(
            SUFFICIENT_CASH,
            trade.ticker(),
            Severity::Error,
            format!("requires {required} of {available}"),
        )
    } else {
        ValidationOutcome::fail(
            SUFFICIENT_CASH,
            trade.ticker(),
            FailureKind::PreconditionViolation,
            format!(
                "BUY {} {} @ {} requires {required}, only {available} available",
                trade.shares(),
                trade.ticker(),
                trade.price()
            ),
        )
    }
}

fn check_shares(context: &PreTradeContext) -> ValidationOutcome {
    let trade = &context.trade;
    let held = context.held_shares;

    if trade.shares() <= held {
        ValidationOutcome::pass(
            SUFFICIENT_SHARES,
            trade.ticker(),
            Severity::Error,
            format!("selling {} of {held}", trade.shares()),
        )
    } else {
        ValidationOutcome::fail(
            SUFFICIENT_SHARES,
            trade.ticker(),
            FailureKind::PreconditionViolation,
            format!(
                "SELL {} {} exceeds {held} held",
                trade.shares(),
                trade.ticker()
            ),
        )
    }
}

fn check_day_range(context: &PreTradeContext) -> ValidationOutcome {
    let trade = &context.trade;
    let ticker = trade.ticker();
    let price = trade.price();

    let Some(range) = context
        .day_range
        .as_ref()
        .filter(|r| r.ticker().eq_ignore_ascii_case(ticker))
    else {
        return ValidationOutcome::fail(
            TRADE_PRICE_IN_RANGE,
            ticker,
            FailureKind::DataUnavailable,
            format!("no day range for {ticker}; price {price} unverified"),
        );
    };

    if price >= range.low() && price <= range.high() {
        ValidationOutcome::pass(
            TRADE_PRICE_IN_RANGE,
            ticker,
            Severity::Error,
            format!("price {price} within day range {}..{}", range.low(), range.high()),
        )
    } else {
        ValidationOutcome::fail(
            TRADE_PRICE_IN_RANGE,
            ticker,
            FailureKind::PreconditionViolation,
            format!(
                "price {price} outside day range {}..{}",
                range.low(),
                range.high()
            ),
        )
    }
}
