//! Typed values from extracted MT940 substrings.

use crate::error::{Error, Result};
use crate::mt940_format::{StatementHeader, StatementLineFields};
use crate::types::TransactionRecord;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::ops::RangeInclusive;
use std::str::FromStr;
use tracing::debug;

/// Two-digit years below this are 20xx, the rest 19xx.
pub const CENTURY_PIVOT: i32 = 70;

/// Title sub-fields of a `~`-structured narrative. `~26` onwards carry the
/// counterparty's name and address.
const TILDE_TITLE_SUBFIELDS: RangeInclusive<u8> = 20..=25;

/// Title sub-fields of a `?`-structured narrative.
const QUESTION_TITLE_SUBFIELDS: RangeInclusive<u8> = 20..=29;

/// Padding character some exports put into narrative sub-fields.
const PADDING: char = '˙';

/// Build a [`TransactionRecord`] from a sliced `:61:` line, its narrative and
/// the statement it belongs to.
///
/// Fails when date, amount or currency cannot be established.
pub fn normalize(
    fields: &StatementLineFields,
    narrative: Option<&str>,
    header: &StatementHeader,
) -> Result<TransactionRecord> {
    let transaction_date = parse_mt940_date(&fields.value_date)?;

    let entry_date = match fields.entry_date.as_deref() {
        Some(mmdd) => match parse_entry_date(mmdd, transaction_date) {
            Ok(date) => Some(date),
            Err(e) => {
                debug!(error = %e, "dropping unusable entry date");
                None
            }
        },
        None => None,
    };

    let amount = fields.debit_credit.apply(parse_amount(&fields.amount)?);

    let currency = fields
        .currency
        .as_deref()
        .or_else(|| header.currency())
        .ok_or_else(|| Error::MissingField("currency".to_string()))?;
    let currency = validate_currency(currency)?;

    let reference = fields.reference.trim();
    let transaction_id = if reference.is_empty() || reference.eq_ignore_ascii_case("NONREF") {
        narrative.and_then(narrative_id).unwrap_or_default()
    } else {
        reference.to_string()
    };

    let title = match narrative {
        Some(text) => normalize_title(text),
        None => fields
            .supplementary
            .as_deref()
            .map(normalize_title)
            .unwrap_or_default(),
    };

    Ok(TransactionRecord {
        account: normalize_account(&header.account),
        transaction_date,
        entry_date,
        amount,
        debit_credit: fields.debit_credit,
        currency,
        transaction_id,
        transaction_type: fields.transaction_type.clone(),
        bank_reference: fields.bank_reference.clone(),
        title,
    })
}

/// Parse MT940 date format (YYMMDD) to NaiveDate using [`CENTURY_PIVOT`].
pub fn parse_mt940_date(date_str: &str) -> Result<NaiveDate> {
    if date_str.len() != 6 || !date_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidDate(format!("Invalid MT940 date: {}", date_str)));
    }

    let year = date_str[0..2]
        .parse::<i32>()
        .map_err(|_| Error::InvalidDate(date_str.to_string()))?;
    let month = date_str[2..4]
        .parse::<u32>()
        .map_err(|_| Error::InvalidDate(date_str.to_string()))?;
    let day = date_str[4..6]
        .parse::<u32>()
        .map_err(|_| Error::InvalidDate(date_str.to_string()))?;

    let full_year = if year < CENTURY_PIVOT {
        2000 + year
    } else {
        1900 + year
    };

    NaiveDate::from_ymd_opt(full_year, month, day)
        .ok_or_else(|| Error::InvalidDate(format!("{}-{}-{}", full_year, month, day)))
}

/// Parse MT940 entry date (MMDD) relative to the value date.
///
/// The entry date may fall in the neighbouring year around New Year; the year
/// closest to the value date wins.
pub fn parse_entry_date(date_str: &str, value_date: NaiveDate) -> Result<NaiveDate> {
    if date_str.len() != 4 || !date_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidDate(format!("Invalid entry date: {}", date_str)));
    }

    let month = date_str[0..2]
        .parse::<u32>()
        .map_err(|_| Error::InvalidDate(date_str.to_string()))?;
    let day = date_str[2..4]
        .parse::<u32>()
        .map_err(|_| Error::InvalidDate(date_str.to_string()))?;

    let year = value_date.year();
    [year, year + 1, year - 1]
        .into_iter()
        .filter_map(|y| NaiveDate::from_ymd_opt(y, month, day))
        .min_by_key(|candidate| (*candidate - value_date).num_days().abs())
        .ok_or_else(|| Error::InvalidDate(format!("{}-{}-{}", year, month, day)))
}

/// Parse an unsigned amount written with `,` or `.` as decimal separator.
pub fn parse_amount(amount_str: &str) -> Result<Decimal> {
    let cleaned = amount_str.trim().replace(',', ".");
    let cleaned = cleaned.strip_suffix('.').unwrap_or(&cleaned);

    if cleaned.is_empty() || cleaned.matches('.').count() > 1 {
        return Err(Error::InvalidAmount(amount_str.to_string()));
    }

    let cleaned = if cleaned.starts_with('.') {
        format!("0{}", cleaned)
    } else {
        cleaned.to_string()
    };

    Decimal::from_str(&cleaned).map_err(|_| Error::InvalidAmount(amount_str.to_string()))
}

/// Accept exactly three uppercase ASCII letters.
pub fn validate_currency(code: &str) -> Result<String> {
    let code = code.trim();
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(code.to_string())
    } else {
        Err(Error::InvalidCurrency(code.to_string()))
    }
}

/// Tidy a `:25:` account: drop the leading slash and set an IBAN country
/// prefix apart (`/PL61…` → `PL 61…`).
pub fn normalize_account(raw: &str) -> String {
    let account = raw.lines().next().unwrap_or("").trim().trim_start_matches('/');
    let bytes = account.as_bytes();
    if bytes.len() > 2
        && bytes[0].is_ascii_alphabetic()
        && bytes[1].is_ascii_alphabetic()
        && bytes[2].is_ascii_digit()
    {
        format!("{} {}", &account[..2], &account[2..])
    } else {
        account.to_string()
    }
}

/// Clean a narrative into a one-line title.
///
/// Structured narratives contribute their purpose sub-fields in order:
/// `~20`-`~25` or `?20`-`?29`. Anything else is taken as free text.
pub fn normalize_title(narrative: &str) -> String {
    let title_range = match structured_marker(narrative) {
        Some('~') => TILDE_TITLE_SUBFIELDS,
        _ => QUESTION_TITLE_SUBFIELDS,
    };
    let text = match subfields(narrative) {
        Some(parts) => parts
            .into_iter()
            .filter(|(number, _)| title_range.contains(number))
            .map(|(_, content)| content)
            .collect::<String>(),
        None => narrative.replace('\n', " "),
    };

    text.replace(PADDING, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Transaction identifier carried in sub-field `00` of a `~`-structured
/// narrative (Polish bank exports). `?`-structured narratives use `00` for the
/// booking text instead, so they yield nothing.
fn narrative_id(narrative: &str) -> Option<String> {
    if structured_marker(narrative) != Some('~') {
        return None;
    }
    subfields(narrative)?
        .into_iter()
        .find(|(number, _)| *number == 0)
        .map(|(_, content)| content.trim().to_string())
        .filter(|id| !id.is_empty())
}

/// Marker of a structured narrative: three digits followed by `~` or `?`.
fn structured_marker(narrative: &str) -> Option<char> {
    let bytes = narrative.trim_start().as_bytes();
    if bytes.len() < 4 || !bytes[..3].iter().all(u8::is_ascii_digit) {
        return None;
    }
    match bytes[3] {
        b'~' => Some('~'),
        b'?' => Some('?'),
        _ => None,
    }
}

/// Split a structured narrative into numbered sub-fields, line wraps removed.
fn subfields(narrative: &str) -> Option<Vec<(u8, String)>> {
    let marker = structured_marker(narrative)?;
    let flat: String = narrative
        .trim_start()
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .collect();

    let mut parts: Vec<(u8, String)> = Vec::new();
    for piece in flat[4..].split(marker) {
        let bytes = piece.as_bytes();
        if bytes.len() >= 2 && bytes[0].is_ascii_digit() && bytes[1].is_ascii_digit() {
            let number = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
            parts.push((number, piece[2..].to_string()));
        } else if let Some((_, content)) = parts.last_mut() {
            // Marker character inside sub-field text.
            content.push(marker);
            content.push_str(piece);
        }
    }
    Some(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DebitCredit;
    use pretty_assertions::assert_eq;

    fn fields(mark: DebitCredit, amount: &str) -> StatementLineFields {
        StatementLineFields {
            value_date: "230510".to_string(),
            entry_date: None,
            debit_credit: mark,
            reversal: false,
            funds_code: None,
            currency: None,
            amount: amount.to_string(),
            transaction_type: "NTRF".to_string(),
            reference: "REF".to_string(),
            bank_reference: None,
            supplementary: None,
        }
    }

    fn header(currency: Option<&str>) -> StatementHeader {
        let mut header = StatementHeader {
            reference: "ST1".to_string(),
            account: "/PL61109010140000071219812874".to_string(),
            ..StatementHeader::default()
        };
        if let Some(code) = currency {
            header.opening_balance = Some(crate::types::Balance {
                balance_type: crate::types::BalanceType::Opening,
                amount: Decimal::ZERO,
                currency: code.to_string(),
                debit_credit: DebitCredit::Credit,
                date: NaiveDate::from_ymd_opt(2023, 5, 9).unwrap(),
            });
        }
        header
    }

    #[test]
    fn test_parse_mt940_date() {
        let date = parse_mt940_date("250218").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 2, 18).unwrap());
        assert!(parse_mt940_date("231332").is_err());
        assert!(parse_mt940_date("2305").is_err());
    }

    #[test]
    fn test_century_pivot_boundary() {
        assert_eq!(parse_mt940_date("000101").unwrap().year(), 2000);
        assert_eq!(parse_mt940_date("690101").unwrap().year(), 2069);
        assert_eq!(parse_mt940_date("700101").unwrap().year(), 1970);
        assert_eq!(parse_mt940_date("991231").unwrap().year(), 1999);
    }

    #[test]
    fn test_entry_date_across_new_year() {
        let value = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(
            parse_entry_date("0102", value).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
        let value = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(
            parse_entry_date("1231", value).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
        );
        assert_eq!(
            parse_entry_date("0103", value).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()
        );
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("100,50").unwrap().to_string(), "100.50");
        assert_eq!(parse_amount("1540.00").unwrap().to_string(), "1540.00");
        assert_eq!(parse_amount("12,").unwrap().to_string(), "12");
        assert_eq!(parse_amount(",5").unwrap().to_string(), "0.5");
        assert!(parse_amount("1,2,3").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn test_sign_follows_mark() {
        for amount in ["0,01", "1,00", "100,50", "999999999,99"] {
            let debit = normalize(&fields(DebitCredit::Debit, amount), None, &header(Some("EUR"))).unwrap();
            assert!(debit.amount < Decimal::ZERO, "D {amount}");
            let credit = normalize(&fields(DebitCredit::Credit, amount), None, &header(Some("EUR"))).unwrap();
            assert!(credit.amount >= Decimal::ZERO, "C {amount}");
            assert_eq!(debit.amount, -credit.amount);
        }
    }

    #[test]
    fn test_currency_from_line_wins_over_statement() {
        let mut f = fields(DebitCredit::Credit, "1,00");
        f.currency = Some("USD".to_string());
        let record = normalize(&f, None, &header(Some("EUR"))).unwrap();
        assert_eq!(record.currency, "USD");
    }

    #[test]
    fn test_missing_currency_is_a_validation_error() {
        let err = normalize(&fields(DebitCredit::Credit, "1,00"), None, &header(None)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ValidationSkip);

        let mut f = fields(DebitCredit::Credit, "1,00");
        f.currency = Some("eu1".to_string());
        assert!(matches!(
            normalize(&f, None, &header(None)),
            Err(Error::InvalidCurrency(_))
        ));
    }

    #[test]
    fn test_invalid_value_date_is_a_validation_error() {
        let mut f = fields(DebitCredit::Credit, "1,00");
        f.value_date = "231345".to_string();
        let err = normalize(&f, None, &header(Some("EUR"))).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ValidationSkip);
    }

    #[test]
    fn test_normalize_account() {
        assert_eq!(
            normalize_account("/PL61109010140000071219812874"),
            "PL 61109010140000071219812874"
        );
        assert_eq!(normalize_account(" 12345678/0001 "), "12345678/0001");
        assert_eq!(normalize_account("/DE"), "DE");
    }

    #[test]
    fn test_title_from_tilde_subfields() {
        let narrative = "020~00VOT001\n~20Payment for inv\n~21oice 17˙˙˙\n~30109010140\n~3200000712198128";
        assert_eq!(normalize_title(narrative), "Payment for invoice 17");
    }

    #[test]
    fn test_tilde_title_stops_before_counterparty() {
        let narrative = "641~00VOT123\n~20Faktura 17\n~21maj\n~27JAN KOWALSKI\n~28UL. DLUGA 1\n~29WARSZAWA\n~3010901014";
        assert_eq!(normalize_title(narrative), "Faktura 17maj");
    }

    #[test]
    fn test_question_mark_title_keeps_subfields_up_to_29() {
        let narrative = "166?20EREF+1?26SVWZ+Rent?29 May?32Max Muster";
        assert_eq!(normalize_title(narrative), "EREF+1SVWZ+Rent May");
    }

    #[test]
    fn test_title_from_question_mark_subfields() {
        let narrative = "166?00GUTSCHRIFT?109310?20EREF+ABC ?21SVWZ+Miete\n Mai?30DEUTDEFF?32Max Muster";
        assert_eq!(normalize_title(narrative), "EREF+ABC SVWZ+Miete Mai");
    }

    #[test]
    fn test_title_free_text() {
        assert_eq!(normalize_title("Card payment\n  SHOP   42 "), "Card payment SHOP 42");
    }

    #[test]
    fn test_transaction_id_falls_back_to_narrative() {
        let mut f = fields(DebitCredit::Debit, "5,00");
        f.reference = "NONREF".to_string();
        let record = normalize(&f, Some("020~00VOT001~20Title"), &header(Some("PLN"))).unwrap();
        assert_eq!(record.transaction_id, "VOT001");
        assert_eq!(record.title, "Title");

        let record = normalize(&f, Some("166?00GUTSCHRIFT?20Title"), &header(Some("PLN"))).unwrap();
        assert_eq!(record.transaction_id, "");

        f.reference = String::new();
        let record = normalize(&f, None, &header(Some("PLN"))).unwrap();
        assert_eq!(record.transaction_id, "");
    }

    #[test]
    fn test_title_from_supplementary_details_without_narrative() {
        let mut f = fields(DebitCredit::Debit, "5,00");
        f.supplementary = Some("ATM  WITHDRAWAL".to_string());
        let record = normalize(&f, None, &header(Some("PLN"))).unwrap();
        assert_eq!(record.title, "ATM WITHDRAWAL");
    }
}
