//! Common types shared by the parser, the rate lookup and the CSV writer.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Debit/Credit indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitCredit {
    /// Debit transaction (outgoing).
    Debit,
    /// Credit transaction (incoming).
    Credit,
}

impl FromStr for DebitCredit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "D" => Ok(DebitCredit::Debit),
            "C" => Ok(DebitCredit::Credit),
            _ => Err(format!("Invalid debit/credit indicator: {}", s)),
        }
    }
}

impl DebitCredit {
    /// Single-letter MT940 mark.
    pub fn as_str(&self) -> &'static str {
        match self {
            DebitCredit::Debit => "D",
            DebitCredit::Credit => "C",
        }
    }

    /// Apply the mark to an unsigned magnitude. Zero stays unsigned.
    pub fn apply(&self, magnitude: Decimal) -> Decimal {
        if magnitude.is_zero() {
            return magnitude.abs();
        }
        match self {
            DebitCredit::Debit => -magnitude.abs(),
            DebitCredit::Credit => magnitude.abs(),
        }
    }
}

/// Account statement balance information.
#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    /// Balance type (opening, closing, etc.).
    pub balance_type: BalanceType,

    /// Balance amount.
    pub amount: Decimal,

    /// Currency code.
    pub currency: String,

    /// Debit/Credit indicator.
    pub debit_credit: DebitCredit,

    /// Date of the balance.
    pub date: NaiveDate,
}

impl Balance {
    /// Balance as a signed amount.
    pub fn signed_amount(&self) -> Decimal {
        self.debit_credit.apply(self.amount)
    }
}

/// Types of balance in a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceType {
    /// Opening balance (`:60F:` / `:60M:`).
    Opening,
    /// Closing booked balance (`:62F:` / `:62M:`).
    Closing,
    /// Closing available balance (`:64:`).
    ClosingAvailable,
}

/// One transaction decoded from a `:61:` line and its `:86:` narrative.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// Account identification of the owning statement.
    pub account: String,

    /// Value date of the transaction.
    pub transaction_date: NaiveDate,

    /// Booking (entry) date, when the bank supplied one.
    pub entry_date: Option<NaiveDate>,

    /// Signed amount: negative for debits.
    pub amount: Decimal,

    /// Debit (D) or Credit (C) indicator.
    pub debit_credit: DebitCredit,

    /// ISO 4217 currency code.
    pub currency: String,

    /// Transaction reference; empty when the bank omitted it.
    pub transaction_id: String,

    /// Transaction type identification code (e.g. `NTRF`).
    pub transaction_type: String,

    /// Reference of the account servicing institution.
    pub bank_reference: Option<String>,

    /// Cleaned narrative.
    pub title: String,
}

/// A record together with its exchange rate, exactly as written to CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct RatedTransactionRow {
    pub record: TransactionRecord,

    /// Rate to the base currency; `None` when the lookup failed.
    pub rate: Option<Decimal>,
}
