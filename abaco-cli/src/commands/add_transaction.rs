//! Add-transaction command - create a transaction upstream.

use abaco_core::{Currency, ExternalId, Money, NewTransaction, TransactionKind};
use anyhow::{Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use tracing::info;

use super::{client_for, effective_settings, emit};
use crate::Cli;

/// Direction of the new transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum KindArg {
    /// Money out.
    #[default]
    Expense,
    /// Money in.
    Income,
    /// Between own accounts.
    Transfer,
}

impl From<KindArg> for TransactionKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Expense => TransactionKind::Expense,
            KindArg::Income => TransactionKind::Income,
            KindArg::Transfer => TransactionKind::Transfer,
        }
    }
}

/// Arguments for the add-transaction command.
#[derive(Args)]
pub struct AddTransactionArgs {
    /// Description.
    pub description: String,

    /// Amount, e.g. 12.50 (always positive; the kind sets the direction).
    pub amount: Decimal,

    /// Transaction kind.
    #[arg(long, short, value_enum, default_value_t = KindArg::Expense)]
    pub kind: KindArg,

    /// Booking date (YYYY-MM-DD, defaults to today).
    #[arg(long, short)]
    pub date: Option<NaiveDate>,

    /// Spending category.
    #[arg(long, short)]
    pub category: Option<String>,

    /// Account to book against.
    #[arg(long)]
    pub account: Option<String>,

    /// Currency (defaults to the configured default currency).
    #[arg(long)]
    pub currency: Option<Currency>,
}

impl AddTransactionArgs {
    /// Builds the request payload.
    pub fn to_new_transaction(&self, default_currency: Currency) -> Result<NewTransaction> {
        if self.description.trim().is_empty() {
            bail!("Description must not be empty");
        }
        if self.amount <= Decimal::ZERO {
            bail!("Amount must be greater than zero");
        }
        Ok(NewTransaction {
            description: self.description.trim().to_string(),
            amount: Money::new(self.amount, self.currency.unwrap_or(default_currency)),
            date: self.date.unwrap_or_else(|| Local::now().date_naive()),
            kind: self.kind.into(),
            category: self.category.clone().filter(|c| !c.trim().is_empty()),
            account_id: self.account.as_deref().map(ExternalId::new),
        })
    }
}

/// Runs the add-transaction command. The request is sent once.
pub async fn run(args: &AddTransactionArgs, cli: &Cli) -> Result<()> {
    let settings = effective_settings(cli).await?;
    let tx = args.to_new_transaction(settings.default_currency)?;
    let client = client_for(cli, &settings)?;

    let created = client.create_transaction(&tx).await?;
    info!(id = %created.id, "Transaction created");

    emit(cli, |f| f.format_transaction(&created), &created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn args(amount: Decimal) -> AddTransactionArgs {
        AddTransactionArgs {
            description: " Padaria ".to_string(),
            amount,
            kind: KindArg::Expense,
            date: NaiveDate::from_ymd_opt(2024, 3, 15),
            category: Some(String::new()),
            account: Some("12".to_string()),
            currency: None,
        }
    }

    #[test]
    fn test_builds_payload_with_defaults() {
        let tx = args(dec!(12.50)).to_new_transaction(Currency::BRL).unwrap();
        assert_eq!(tx.description, "Padaria");
        assert_eq!(tx.amount, Money::new(dec!(12.50), Currency::BRL));
        assert_eq!(tx.kind, TransactionKind::Expense);
        assert_eq!(tx.category, None);
        assert_eq!(tx.account_id, Some(ExternalId::new("12")));
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        assert!(args(dec!(0)).to_new_transaction(Currency::BRL).is_err());
        assert!(args(dec!(-5)).to_new_transaction(Currency::BRL).is_err());
    }
}
