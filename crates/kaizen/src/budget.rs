//! Budget ledger: transaction edits and the figures derived from them.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{date_of, iso_day, next_id, Transaction, TransactionKind};

/// Category used when none is given.
pub const DEFAULT_CATEGORY: &str = "Others";

/// Fields supplied when adding or editing a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    /// Description; must not be blank.
    pub title: String,
    /// Unsigned amount.
    pub amount: f64,
    /// Income or expense.
    pub kind: TransactionKind,
    /// Category; blank means [`DEFAULT_CATEGORY`].
    pub category: String,
    /// Day the transaction happened.
    pub date: NaiveDate,
}

impl TransactionDraft {
    fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::invalid_input("transaction title is required"));
        }
        if !self.amount.is_finite() {
            return Err(Error::invalid_input(format!(
                "transaction amount must be a number, got {}",
                self.amount
            )));
        }
        Ok(())
    }

    fn category(&self) -> String {
        let category = self.category.trim();
        if category.is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            category.to_string()
        }
    }
}

/// Parse a user-entered amount.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for empty or non-numeric input.
pub fn parse_amount(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_input("transaction amount is required"));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| Error::invalid_input(format!("not a valid amount: {trimmed}")))
}

/// Add a transaction at the front of the ledger and return its id.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the title is empty or the amount is
/// not finite.
pub fn add(
    transactions: &mut Vec<Transaction>,
    draft: &TransactionDraft,
    now: DateTime<Utc>,
) -> Result<String> {
    draft.validate()?;

    let id = next_id(now, transactions.iter().map(|t| t.id.as_str()));
    transactions.insert(
        0,
        Transaction {
            id: id.clone(),
            title: draft.title.trim().to_string(),
            amount: draft.amount,
            kind: draft.kind,
            category: draft.category(),
            date: iso_day(draft.date),
        },
    );
    debug!(id = %id, kind = %draft.kind, "Added transaction");
    Ok(id)
}

/// Replace the editable fields of transaction `id`.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for an unknown id and
/// [`Error::InvalidInput`] for an invalid draft.
pub fn edit(transactions: &mut [Transaction], id: &str, draft: &TransactionDraft) -> Result<()> {
    draft.validate()?;

    let tx = transactions
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| Error::not_found("transaction", id))?;
    tx.title = draft.title.trim().to_string();
    tx.amount = draft.amount;
    tx.kind = draft.kind;
    tx.category = draft.category();
    tx.date = iso_day(draft.date);
    Ok(())
}

/// Remove transaction `id`.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for an unknown id.
pub fn remove(transactions: &mut Vec<Transaction>, id: &str) -> Result<Transaction> {
    let index = transactions
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| Error::not_found("transaction", id))?;
    Ok(transactions.remove(index))
}

/// Net balance: income minus expenses.
#[must_use]
pub fn balance(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .fold(0.0, |acc, t| acc + t.signed_amount())
}

/// Budget health, from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BudgetHealth {
    /// Spending exceeds income.
    Critical,
    /// Saving less than 10% of income.
    Warning,
    /// Saving less than 25% of income.
    Fair,
    /// Saving at least 25% of income.
    Healthy,
}

impl BudgetHealth {
    /// Advice shown next to the status.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Critical => "Expenses exceed income. Review your budget.",
            Self::Warning => "Savings rate is low (<10%).",
            Self::Fair => "You are saving a moderate amount.",
            Self::Healthy => "Great job! High savings rate.",
        }
    }
}

impl std::fmt::Display for BudgetHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Critical => "Critical",
            Self::Warning => "Warning",
            Self::Fair => "Fair",
            Self::Healthy => "Healthy",
        })
    }
}

/// Totals and health for the whole ledger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetSummary {
    /// Sum of income.
    pub income: f64,
    /// Sum of expenses.
    pub expense: f64,
    /// Income minus expenses.
    pub balance: f64,
    /// Percentage of income kept; 0 without income.
    pub savings_rate: f64,
    /// Status derived from the savings rate.
    pub health: BudgetHealth,
}

impl BudgetSummary {
    /// Whether expenses exceed income.
    #[must_use]
    pub fn is_deficit(&self) -> bool {
        self.expense > self.income
    }
}

/// Summarize the ledger.
#[must_use]
pub fn summarize(transactions: &[Transaction]) -> BudgetSummary {
    let total = |kind: TransactionKind| -> f64 {
        transactions
            .iter()
            .filter(|t| t.kind == kind)
            .fold(0.0, |acc, t| acc + t.amount)
    };
    let income = total(TransactionKind::Income);
    let expense = total(TransactionKind::Expense);

    let savings_rate = if income > 0.0 {
        (income - expense) / income * 100.0
    } else {
        0.0
    };

    let health = if expense > income {
        BudgetHealth::Critical
    } else if savings_rate < 10.0 {
        BudgetHealth::Warning
    } else if savings_rate < 25.0 {
        BudgetHealth::Fair
    } else {
        BudgetHealth::Healthy
    };

    BudgetSummary {
        income,
        expense,
        balance: income - expense,
        savings_rate,
        health,
    }
}

/// Net amount for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyNet {
    /// Calendar day.
    pub date: NaiveDate,
    /// Income minus expenses on that day.
    pub amount: f64,
}

/// Net amount per day, oldest first. Undated transactions are skipped.
#[must_use]
pub fn daily_net(transactions: &[Transaction]) -> Vec<DailyNet> {
    let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for tx in transactions {
        let Some(day) = date_of(&tx.date) else {
            warn!(id = %tx.id, date = %tx.date, "Skipping transaction with unreadable date");
            continue;
        };
        *days.entry(day).or_default() += tx.signed_amount();
    }
    days.into_iter()
        .map(|(date, amount)| DailyNet { date, amount })
        .collect()
}

/// Spending in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// Category name.
    pub name: String,
    /// Total spent.
    pub value: f64,
}

/// Expense totals per category, largest first.
#[must_use]
pub fn expenses_by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for tx in transactions.iter().filter(|t| t.kind == TransactionKind::Expense) {
        *totals.entry(tx.category.as_str()).or_default() += tx.amount;
    }

    let mut categories: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(name, value)| CategoryTotal {
            name: name.to_string(),
            value,
        })
        .collect();
    categories.sort_by(|a, b| {
        b.value
            .total_cmp(&a.value)
            .then_with(|| a.name.cmp(&b.name))
    });
    categories
}
