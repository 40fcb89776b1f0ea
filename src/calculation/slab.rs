//! Slab table evaluation.
//!
//! Professional tax and income tax are both expressed as ordered slab
//! tables (see [`SlabTable`]); this module holds the single evaluator both
//! calculators share.

use rust_decimal::Decimal;

use crate::config::SlabTable;

/// The outcome of evaluating a slab table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlabEvaluation {
    /// The amount due, unrounded.
    pub amount: Decimal,
    /// Index of the slab that applied.
    pub slab_index: usize,
    /// Lower bound of that slab (the previous row's `up_to`, or zero).
    pub lower_bound: Decimal,
}

/// Evaluates `table` for `income`.
///
/// The first row whose `up_to` covers `income` applies, and the amount is
/// `base_amount + rate × (income − lower_bound)`. Income above every bound
/// of a table without an open row uses the last row. Income below zero is
/// evaluated against the first row with no excess.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::evaluate_slabs;
/// use payroll_engine::config::StatutoryConfig;
/// use rust_decimal::Decimal;
///
/// let config = StatutoryConfig::default();
/// let result = evaluate_slabs(&config.income_tax.slabs, Decimal::from(600_000));
/// assert_eq!(result.amount, Decimal::from(32_500));
/// assert_eq!(result.slab_index, 2);
/// ```
pub fn evaluate_slabs(table: &SlabTable, income: Decimal) -> SlabEvaluation {
    let mut lower_bound = Decimal::ZERO;
    let last = table.slabs.len().saturating_sub(1);

    for (index, slab) in table.slabs.iter().enumerate() {
        let covers = slab.up_to.is_none_or(|bound| income <= bound);
        if covers || index == last {
            let excess = (income - lower_bound).max(Decimal::ZERO);
            return SlabEvaluation {
                amount: slab.base_amount + slab.rate * excess,
                slab_index: index,
                lower_bound,
            };
        }
        if let Some(bound) = slab.up_to {
            lower_bound = bound;
        }
    }

    SlabEvaluation {
        amount: Decimal::ZERO,
        slab_index: 0,
        lower_bound: Decimal::ZERO,
    }
}
