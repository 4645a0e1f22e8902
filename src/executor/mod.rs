//! Order application
//!
//! Turns accepted decisions into whole-unit orders and rolls each
//! strategy's current notional forward.


use crate::decision::Decision;
use crate::error::{AllocatorError, Result};
use crate::types::{round_half_up, to_currency, Order, Side, Strategy};
use tracing::info;

/// Apply every non-zero recommended delta to its strategy
///
/// `decisions` must line up with `strategies` one to one, in the same order.
pub fn apply_suggested(strategies: &mut [Strategy], decisions: &[Decision]) -> Result<Vec<Order>> {
    if strategies.len() != decisions.len() {
        return Err(AllocatorError::DimensionMismatch {
            expected: strategies.len(),
            actual: decisions.len(),
        });
    }
    if let Some((s, d)) = strategies
        .iter()
        .zip(decisions)
        .find(|(s, d)| s.code != d.strategy_code)
    {
        return Err(AllocatorError::strategy(
            &s.code,
            format!("decision belongs to {}", d.strategy_code),
        ));
    }

    let mut orders = Vec::new();
    for (strategy, decision) in strategies.iter_mut().zip(decisions) {
        let step = round_half_up(decision.recommended_delta);
        if step == 0.0 || !step.is_finite() {
            continue;
        }

        let side = if step > 0.0 { Side::Buy } else { Side::Sell };
        let new_notional = (strategy.current_notional + step).max(0.0);
        let order = Order {
            strategy_code: strategy.code.clone(),
            side,
            amount: to_currency(step.abs())?,
            new_notional: to_currency(new_notional)?,
        };

        info!(
            "{} {} {} -> notional {}",
            order.side, order.amount, order.strategy_code, order.new_notional
        );
        strategy.current_notional = new_notional;
        orders.push(order);
    }

    Ok(orders)
}
