//! Anomaly flagging and tiered coaching insights.

use std::time::{SystemTime, UNIX_EPOCH};

/// A single expense above 10% of the monthly ceiling is worth calling out.
/// Strict inequality: exactly 10% is not an anomaly.
pub fn is_anomaly(amount: f64, budget: f64) -> bool {
    amount > budget * 0.1
}

const OVER_BUDGET_MSG: &str = "🚨 Over budget! Essentials only from here";
const NEAR_LIMIT_MSG: &str = "🔥 90%+ of the budget is gone! Time to pause non-essentials";
const SLOW_DOWN_MSG: &str = "⚠️ You've passed 75% of the budget. Worth slowing down a little";

fn pool_for(category: &str) -> Option<&'static [&'static str]> {
    match category {
        "Dining Out" => Some(&[
            "Eating out again? 🍕 Maybe cook something tomorrow?",
            "A lot of restaurants this month! 🍔 A home-cooked meal could help",
            "Delicious... but the wallet is crying 😅",
        ]),
        "Shopping" => Some(&[
            "More shopping? 🛍️ Double-check it's really needed",
            "Before the next purchase, try waiting 24 hours 🤔",
        ]),
        "Transport" => Some(&["A lot of rides! 🚗 Maybe a monthly pass would pay off?"]),
        "Tech" => Some(&["Digital subscriptions add up! 💻 Worth checking what you actually use"]),
        "Leisure" => Some(&["You only live once! 🎉 But the budget is finite"]),
        _ => None,
    }
}

/// Tiered coaching message, or `None` when there is nothing to say.
///
/// Budget tiers short-circuit ahead of category flavor: ≥100%, then ≥90%,
/// then ≥75%. Below that, a category with a message pool gets one line drawn
/// by `pick` (called with the pool size, expected to return an index).
pub fn get_insight_with(
    category: &str,
    usage_percent: i64,
    pick: impl FnOnce(usize) -> usize,
) -> Option<String> {
    if usage_percent >= 100 {
        return Some(OVER_BUDGET_MSG.to_string());
    }
    if usage_percent >= 90 {
        return Some(NEAR_LIMIT_MSG.to_string());
    }
    if usage_percent >= 75 {
        return Some(SLOW_DOWN_MSG.to_string());
    }

    let pool = pool_for(category)?;
    let idx = pick(pool.len()) % pool.len();
    Some(pool[idx].to_string())
}

/// `get_insight_with` drawing from the subsecond clock; tests inject their
/// own picker instead.
pub fn get_insight(category: &str, usage_percent: i64) -> Option<String> {
    get_insight_with(category, usage_percent, |len| {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        nanos as usize % len
    })
}
