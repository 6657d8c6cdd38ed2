use serde::{Deserialize, Serialize};

use crate::Money;

/// Organization-wide summary.
///
/// An organization without any data yields all zeros.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// `total_income - total_expense`.
    pub current_balance: Money,
    pub total_income: Money,
    pub total_expense: Money,
    /// Still owed by the organization on unsettled `Give` obligations.
    pub pending_to_give: Money,
    /// Still owed to the organization on unsettled `Take` obligations.
    pub pending_to_take: Money,
}

impl Stats {
    pub fn new(
        total_income: Money,
        total_expense: Money,
        pending_to_give: Money,
        pending_to_take: Money,
    ) -> Self {
        Self {
            current_balance: total_income - total_expense,
            total_income,
            total_expense,
            pending_to_give,
            pending_to_take,
        }
    }
}
