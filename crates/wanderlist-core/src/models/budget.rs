use std::fmt::Display;

use prettytable::{row, Table};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BudgetCategory {
    Flight,
    Accommodation,
    Activities,
    Food,
    Misc,
}

impl BudgetCategory {
    pub const ALL: [BudgetCategory; 5] = [
        BudgetCategory::Flight,
        BudgetCategory::Accommodation,
        BudgetCategory::Activities,
        BudgetCategory::Food,
        BudgetCategory::Misc,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            BudgetCategory::Flight => "flight",
            BudgetCategory::Accommodation => "accommodation",
            BudgetCategory::Activities => "activities",
            BudgetCategory::Food => "food",
            BudgetCategory::Misc => "misc",
        }
    }

    /// Share of a lump-sum estimate assigned to this category, in percent.
    pub fn weight_percent(&self) -> u32 {
        match self {
            BudgetCategory::Flight | BudgetCategory::Accommodation => 30,
            BudgetCategory::Activities | BudgetCategory::Food => 15,
            BudgetCategory::Misc => 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BudgetLine {
    #[serde(with = "rust_decimal::serde::float")]
    pub estimated: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub actual: Option<Decimal>,
}

impl BudgetLine {
    pub fn estimated(estimated: Decimal) -> Self {
        Self { estimated, actual: None }
    }
}

/// Per-category estimates and actuals. `total` is derived; call
/// [`Budget::compute_totals`] after touching any category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Budget {
    pub flight: BudgetLine,
    pub accommodation: BudgetLine,
    pub activities: BudgetLine,
    pub food: BudgetLine,
    pub misc: BudgetLine,
    pub total: BudgetLine,
}

impl Budget {
    pub fn line(&self, category: BudgetCategory) -> &BudgetLine {
        match category {
            BudgetCategory::Flight => &self.flight,
            BudgetCategory::Accommodation => &self.accommodation,
            BudgetCategory::Activities => &self.activities,
            BudgetCategory::Food => &self.food,
            BudgetCategory::Misc => &self.misc,
        }
    }

    pub fn line_mut(&mut self, category: BudgetCategory) -> &mut BudgetLine {
        match category {
            BudgetCategory::Flight => &mut self.flight,
            BudgetCategory::Accommodation => &mut self.accommodation,
            BudgetCategory::Activities => &mut self.activities,
            BudgetCategory::Food => &mut self.food,
            BudgetCategory::Misc => &mut self.misc,
        }
    }

    /// Spreads a lump-sum estimate over the categories by their fixed weights,
    /// rounding each share to a whole amount. The total is the sum of the
    /// rounded shares.
    pub fn from_estimate(total: Decimal) -> Self {
        let mut budget = Budget::default();
        for category in BudgetCategory::ALL {
            let share = total / Decimal::ONE_HUNDRED * Decimal::from(category.weight_percent());
            budget.line_mut(category).estimated =
                share.round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
        }
        budget.compute_totals();
        budget
    }

    /// Recomputes `total` from the categories. Sums saturate at
    /// [`Decimal::MAX`].
    pub fn compute_totals(&mut self) -> &BudgetLine {
        let lines = BudgetCategory::ALL.map(|c| self.line(c).clone());

        let estimated = saturating_sum(lines.iter().map(|l| l.estimated));
        let actual = if lines.iter().any(|l| l.actual.is_some()) {
            Some(saturating_sum(lines.iter().map(|l| l.actual.unwrap_or(l.estimated))))
        } else {
            None
        };

        self.total = BudgetLine { estimated, actual };
        &self.total
    }
}

fn saturating_sum(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount).unwrap_or_else(|| {
            tracing::warn!("Budget total overflowed, saturating");
            Decimal::MAX
        })
    })
}

impl Display for Budget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut table = Table::new();
        table.add_row(row!["Category", "Estimated", "Actual"]);
        table.add_empty_row();

        let fmt_actual = |a: Option<Decimal>| a.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
        for category in BudgetCategory::ALL {
            let line = self.line(category);
            table.add_row(row![category.key(), line.estimated, fmt_actual(line.actual)]);
        }
        table.add_row(row!["total", self.total.estimated, fmt_actual(self.total.actual)]);

        write!(f, "{}", table)
    }
}
