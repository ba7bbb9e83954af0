//! MT940 statement extraction.
//!
//! MT940 is a SWIFT format for electronic account statements. A file holds one
//! or more statements; every statement is a run of tagged fields such as
//! `:20:` (reference), `:25:` (account), `:60F:` (opening balance), `:61:`
//! (statement line) and `:86:` (information to account owner). Fields may wrap
//! onto untagged continuation lines.
//!
//! Extraction happens in three steps:
//!
//! 1. [`split_blocks`] cuts file text into [`RawStatementBlock`]s.
//! 2. [`tagged_fields`] runs a small state machine over a block's lines and
//!    joins continuation lines onto the field they belong to.
//! 3. [`StatementBlock::parse`] sorts those fields into a [`StatementHeader`]
//!    and a list of [`RawEntry`]s, and [`extract_fields`] slices each `:61:`
//!    payload into [`StatementLineFields`].
//!
//! Turning the sliced substrings into typed values is the job of
//! [`crate::normalize`].

use crate::error::{Error, Result};
use crate::normalize;
use crate::types::{Balance, BalanceType, DebitCredit, TransactionRecord};
use iso_currency::Currency;
use tracing::{trace, warn};

/// Shortest usable `:61:` payload: value date, mark and one amount digit.
pub const MIN_STATEMENT_LINE_LEN: usize = 8;

/// One line of a statement block together with its 1-based line number.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLine {
    pub number: usize,
    pub text: String,
}

/// The lines of one statement as found in a file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawStatementBlock {
    /// Line number where the block starts.
    pub start_line: usize,
    pub lines: Vec<BlockLine>,
}

impl RawStatementBlock {
    fn new(start_line: usize) -> Self {
        Self {
            start_line,
            lines: Vec::new(),
        }
    }

    fn push(&mut self, number: usize, text: &str) {
        self.lines.push(BlockLine {
            number,
            text: text.to_string(),
        });
    }

    fn has_reference(&self) -> bool {
        self.lines
            .iter()
            .any(|l| l.text.trim_start().starts_with(":20:"))
    }
}

/// A tag and its payload, continuation lines included.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedField {
    /// Tag without colons, e.g. `61` or `60F`.
    pub tag: String,
    /// Payload; continuation lines are joined with `\n`.
    pub payload: String,
    /// Line number of the tag line.
    pub line: usize,
}

/// The undivided payload of a `:61:` statement line.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTransactionLine {
    pub line: usize,
    pub payload: String,
}

/// A statement line and the narrative that follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub statement_line: RawTransactionLine,
    /// Payload of the `:86:` field, if any.
    pub narrative: Option<String>,
}

/// Statement-level fields of one block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatementHeader {
    /// Transaction reference number (`:20:`).
    pub reference: String,
    /// Account identification (`:25:`), as written in the file.
    pub account: String,
    /// Statement number (`:28C:`).
    pub statement_number: Option<String>,
    /// Sequence number (`:28C:` after the slash).
    pub sequence_number: Option<String>,
    pub opening_balance: Option<Balance>,
    pub closing_balance: Option<Balance>,
    pub closing_available_balance: Option<Balance>,
}

impl StatementHeader {
    /// Account currency, taken from the balances.
    pub fn currency(&self) -> Option<&str> {
        self.opening_balance
            .as_ref()
            .or(self.closing_balance.as_ref())
            .or(self.closing_available_balance.as_ref())
            .map(|b| b.currency.as_str())
    }
}

/// Substrings sliced out of a `:61:` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementLineFields {
    /// Value date, `YYMMDD`.
    pub value_date: String,
    /// Entry date, `MMDD`.
    pub entry_date: Option<String>,
    pub debit_credit: DebitCredit,
    /// `R` prefix on the mark (`RC`/`RD`). Recorded only: the sign of the
    /// entry still follows the `C`/`D` letter after it, so `RC` is positive.
    pub reversal: bool,
    pub funds_code: Option<char>,
    /// Currency written next to the amount, when the bank adds one.
    pub currency: Option<String>,
    /// Amount digits with the source decimal separator.
    pub amount: String,
    /// Transaction type identification code, e.g. `NTRF`.
    pub transaction_type: String,
    /// Reference for the account owner; may be empty.
    pub reference: String,
    /// Reference of the account servicing institution (after `//`).
    pub bank_reference: Option<String>,
    /// Supplementary details from the continuation line.
    pub supplementary: Option<String>,
}

/// A parsed statement: header plus raw entries.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementBlock {
    pub start_line: usize,
    pub header: StatementHeader,
    pub entries: Vec<RawEntry>,
}

impl StatementBlock {
    /// Sort the block's tagged fields into header and entries.
    ///
    /// Fails when the block has no `:20:` reference or no `:25:` account.
    /// A malformed balance is logged and left out; it never fails the block.
    pub fn parse(raw: &RawStatementBlock) -> Result<Self> {
        let mut header = StatementHeader::default();
        let mut entries: Vec<RawEntry> = Vec::new();
        // Entry that a following :86: belongs to.
        let mut open_entry: Option<usize> = None;

        for field in tagged_fields(raw) {
            match field.tag.as_str() {
                "20" => header.reference = field.payload.trim().to_string(),
                "25" => header.account = field.payload.trim().to_string(),
                "28" | "28C" => {
                    let value = field.payload.trim();
                    match value.split_once('/') {
                        Some((number, sequence)) => {
                            header.statement_number = Some(number.to_string());
                            header.sequence_number = Some(sequence.to_string());
                        }
                        None => header.statement_number = Some(value.to_string()),
                    }
                }
                "60F" | "60M" => {
                    header.opening_balance = parse_balance_field(&field, BalanceType::Opening);
                }
                "62F" | "62M" => {
                    header.closing_balance = parse_balance_field(&field, BalanceType::Closing);
                    open_entry = None;
                }
                "64" => {
                    header.closing_available_balance =
                        parse_balance_field(&field, BalanceType::ClosingAvailable);
                    open_entry = None;
                }
                "61" => {
                    entries.push(RawEntry {
                        statement_line: RawTransactionLine {
                            line: field.line,
                            payload: field.payload,
                        },
                        narrative: None,
                    });
                    open_entry = Some(entries.len() - 1);
                }
                "86" => match open_entry.and_then(|idx| entries.get_mut(idx)) {
                    Some(entry) if entry.narrative.is_none() => {
                        entry.narrative = Some(field.payload);
                    }
                    _ => trace!(line = field.line, "narrative without a statement line"),
                },
                other => trace!(tag = other, line = field.line, "ignoring tag"),
            }
        }

        if header.reference.is_empty() {
            return Err(Error::Mt940ParseError {
                line: raw.start_line,
                message: "statement has no :20: reference".to_string(),
            });
        }
        if header.account.is_empty() {
            return Err(Error::Mt940ParseError {
                line: raw.start_line,
                message: "statement has no :25: account identification".to_string(),
            });
        }

        Ok(StatementBlock {
            start_line: raw.start_line,
            header,
            entries,
        })
    }

    /// Decode every entry of the statement, in file order.
    ///
    /// Each item fails on its own: a bad line never hides the lines after it.
    pub fn transactions(&self) -> impl Iterator<Item = Result<TransactionRecord>> + '_ {
        self.entries.iter().map(move |entry| {
            let fields = extract_fields(&entry.statement_line)?;
            normalize::normalize(&fields, entry.narrative.as_deref(), &self.header)
        })
    }
}

/// Split file text into blocks and parse each of them.
pub fn parse_blocks(text: &str) -> Vec<Result<StatementBlock>> {
    split_blocks(text).iter().map(StatementBlock::parse).collect()
}

/// Cut file text into statement blocks.
///
/// A block opens at a SWIFT `{4:` text block or at a `:20:` line, and closes
/// at a `-}` / `-` trailer or where the next block opens. Anything outside a
/// block is dropped. Both LF and CRLF line endings are accepted.
pub fn split_blocks(text: &str) -> Vec<RawStatementBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<RawStatementBlock> = None;

    for (idx, raw_line) in text.lines().enumerate() {
        let number = idx + 1;
        let line = raw_line.trim_end_matches('\r');
        let trimmed = line.trim();

        if trimmed == "-" || trimmed.starts_with("-}") {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            continue;
        }

        if let Some(pos) = line.find("{4:") {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            let mut block = RawStatementBlock::new(number);
            let rest = &line[pos + 3..];
            if !rest.trim().is_empty() {
                block.push(number, rest);
            }
            current = Some(block);
            continue;
        }

        if trimmed.starts_with(":20:") {
            match current.as_mut() {
                Some(block) if !block.has_reference() => block.push(number, line),
                _ => {
                    if let Some(block) = current.take() {
                        blocks.push(block);
                    }
                    let mut block = RawStatementBlock::new(number);
                    block.push(number, line);
                    current = Some(block);
                }
            }
            continue;
        }

        if let Some(block) = current.as_mut() {
            block.push(number, line);
        }
    }

    if let Some(block) = current {
        blocks.push(block);
    }
    blocks
}

/// State of the field scanner.
enum ScanState {
    /// No field started yet.
    Idle,
    /// Accumulating the payload of a field.
    InField(TaggedField),
}

/// Group a block's lines into tagged fields.
///
/// A line starting with `:NN:` or `:NNa:` opens a field; any other non-blank
/// line extends the payload of the field being accumulated.
pub fn tagged_fields(block: &RawStatementBlock) -> Vec<TaggedField> {
    let mut fields = Vec::new();
    let mut state = ScanState::Idle;

    for line in &block.lines {
        if line.text.trim().is_empty() {
            continue;
        }

        state = match (split_tag(&line.text), state) {
            (Some((tag, payload)), ScanState::InField(done)) => {
                fields.push(done);
                ScanState::InField(TaggedField {
                    tag: tag.to_string(),
                    payload: payload.to_string(),
                    line: line.number,
                })
            }
            (Some((tag, payload)), ScanState::Idle) => ScanState::InField(TaggedField {
                tag: tag.to_string(),
                payload: payload.to_string(),
                line: line.number,
            }),
            (None, ScanState::InField(mut field)) => {
                field.payload.push('\n');
                field.payload.push_str(&line.text);
                ScanState::InField(field)
            }
            (None, ScanState::Idle) => {
                trace!(line = line.number, "continuation line before any tag");
                ScanState::Idle
            }
        };
    }

    if let ScanState::InField(field) = state {
        fields.push(field);
    }
    fields
}

/// Split `:61:payload` into `("61", "payload")`.
fn split_tag(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_start();
    let rest = line.strip_prefix(':')?;
    let end = rest.find(':')?;
    let tag = &rest[..end];
    let bytes = tag.as_bytes();
    let valid = match bytes.len() {
        2 => bytes.iter().all(u8::is_ascii_digit),
        3 => bytes[..2].iter().all(u8::is_ascii_digit) && bytes[2].is_ascii_uppercase(),
        _ => false,
    };
    if valid {
        Some((tag, &rest[end + 1..]))
    } else {
        None
    }
}

fn parse_balance_field(field: &TaggedField, balance_type: BalanceType) -> Option<Balance> {
    match parse_balance(field.payload.trim(), balance_type) {
        Ok(balance) => Some(balance),
        Err(e) => {
            warn!(line = field.line, tag = %field.tag, error = %e, "ignoring malformed balance");
            None
        }
    }
}

/// Parse a balance payload such as `C230510EUR1234,56`.
fn parse_balance(content: &str, balance_type: BalanceType) -> Result<Balance> {
    // Position 1: D/C indicator
    // Position 2-7: Date (YYMMDD)
    // Position 8-10: Currency
    // Position 11+: Amount
    if content.len() < 11 {
        return Err(Error::ParseError(format!("Balance too short: {}", content)));
    }

    let debit_credit = content
        .get(0..1)
        .unwrap_or("")
        .parse::<DebitCredit>()
        .map_err(Error::ParseError)?;

    let date_str = content
        .get(1..7)
        .ok_or_else(|| Error::ParseError(format!("Invalid date in balance: {}", content)))?;
    let date = normalize::parse_mt940_date(date_str)?;

    let currency = content
        .get(7..10)
        .ok_or_else(|| Error::ParseError(format!("Invalid currency in balance: {}", content)))?;
    let currency = normalize::validate_currency(currency)?;

    let amount_str = content
        .get(10..)
        .ok_or_else(|| Error::ParseError(format!("Missing amount in balance: {}", content)))?;
    let amount = normalize::parse_amount(amount_str)?;

    Ok(Balance {
        balance_type,
        amount,
        currency,
        debit_credit,
        date,
    })
}

/// Slice a `:61:` payload into its sub-fields.
///
/// Layout: `YYMMDD[MMDD][R]C|D[funds code|currency]amount[currency]TYPE
/// reference[//bank reference]`, optionally followed by a continuation line
/// with supplementary details.
pub fn extract_fields(line: &RawTransactionLine) -> Result<StatementLineFields> {
    let fail = |message: String| Error::Mt940ParseError {
        line: line.line,
        message,
    };

    let (first, supplementary) = match line.payload.split_once('\n') {
        Some((first, rest)) => {
            let rest = rest.split_whitespace().collect::<Vec<_>>().join(" ");
            (first, Some(rest).filter(|s| !s.is_empty()))
        }
        None => (line.payload.as_str(), None),
    };

    let chars: Vec<char> = first.trim().chars().collect();
    if chars.len() < MIN_STATEMENT_LINE_LEN {
        return Err(fail(format!(
            "statement line too short ({} characters)",
            chars.len()
        )));
    }

    if !chars[..6].iter().all(char::is_ascii_digit) {
        return Err(fail("value date is not YYMMDD".to_string()));
    }
    let value_date: String = chars[..6].iter().collect();
    let mut pos = 6;

    let entry_date = match chars.get(pos..pos + 4) {
        Some(digits) if digits.iter().all(char::is_ascii_digit) => {
            pos += 4;
            Some(digits.iter().collect::<String>())
        }
        _ => None,
    };

    let reversal = chars.get(pos) == Some(&'R');
    if reversal {
        pos += 1;
    }
    let debit_credit = match chars.get(pos) {
        Some('C') => DebitCredit::Credit,
        Some('D') => DebitCredit::Debit,
        Some(other) => return Err(fail(format!("invalid debit/credit mark {:?}", other))),
        None => return Err(fail("missing debit/credit mark".to_string())),
    };
    pos += 1;

    let mut currency = None;
    let mut funds_code = None;
    match currency_at(&chars, pos) {
        Some(code) if chars.get(pos + 3).is_some_and(char::is_ascii_digit) => {
            currency = Some(code);
            pos += 3;
        }
        _ => {
            if let Some(&c) = chars.get(pos).filter(|c| c.is_ascii_alphabetic()) {
                funds_code = Some(c);
                pos += 1;
            }
        }
    }

    let rest = chars.get(pos..).unwrap_or(&[]);
    let amount_len = rest
        .iter()
        .take_while(|c| c.is_ascii_digit() || **c == ',' || **c == '.')
        .count();
    let amount: String = rest[..amount_len].iter().collect();
    if !amount.chars().any(|c| c.is_ascii_digit()) {
        return Err(fail("missing amount".to_string()));
    }
    pos += amount_len;

    if currency.is_none() {
        if let Some(code) = currency_at(&chars, pos) {
            if is_type_code(chars.get(pos + 3..pos + 7)) {
                currency = Some(code);
                pos += 3;
            }
        }
    }

    let transaction_type = match chars.get(pos..pos + 4) {
        Some(code) if is_type_code(Some(code)) => {
            pos += 4;
            code.iter().collect()
        }
        _ => String::new(),
    };

    let remainder: String = chars.get(pos..).unwrap_or(&[]).iter().collect();
    let (reference, bank_reference) = match remainder.split_once("//") {
        Some((reference, bank)) => (
            reference.trim().to_string(),
            Some(bank.trim().to_string()).filter(|b| !b.is_empty()),
        ),
        None => (remainder.trim().to_string(), None),
    };

    Ok(StatementLineFields {
        value_date,
        entry_date,
        debit_credit,
        reversal,
        funds_code,
        currency,
        amount,
        transaction_type,
        reference,
        bank_reference,
        supplementary,
    })
}

/// Three uppercase letters at `pos` forming a known ISO 4217 code.
fn currency_at(chars: &[char], pos: usize) -> Option<String> {
    let candidate = chars.get(pos..pos + 3)?;
    if !candidate.iter().all(char::is_ascii_uppercase) {
        return None;
    }
    let code: String = candidate.iter().collect();
    Currency::from_code(&code).map(|_| code)
}

/// `[A-Z][A-Z0-9]{3}`, the shape of a transaction type code.
fn is_type_code(chars: Option<&[char]>) -> bool {
    match chars {
        Some([first, rest @ ..]) if rest.len() == 3 => {
            first.is_ascii_uppercase()
                && rest
                    .iter()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "{1:F01BPKOPLPWAXXX0000000000}{2:I940BPKOPLPWXXXXN}{4:\r\n\
:20:ST230510\r\n\
:25:/PL61109010140000071219812874\r\n\
:28C:00087/001\r\n\
:60F:C230509EUR1000,00\r\n\
:61:2305100510C100,50NTRFINV-2023-17//PKO123\r\n\
:86:020~00VOT001\r\n\
~20Invoice 17 \r\n\
~21May\r\n\
:61:230510D20,00NMSCNONREF\r\n\
:86:Card payment\r\n\
SHOP 42\r\n\
:62F:C230510EUR1080,50\r\n\
-}\r\n";

    fn line(payload: &str) -> RawTransactionLine {
        RawTransactionLine {
            line: 1,
            payload: payload.to_string(),
        }
    }

    #[test]
    fn test_split_blocks_swift_envelope() {
        let blocks = split_blocks(SAMPLE);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start_line, 1);
        assert_eq!(blocks[0].lines[0].text, ":20:ST230510");
        assert!(blocks[0].lines.iter().all(|l| !l.text.ends_with('\r')));
    }

    #[test]
    fn test_split_blocks_on_repeated_reference() {
        let text = ":20:A\n:25:/1\n:61:230510C1,00NTRF\n:20:B\n:25:/2\n-\nstray line\n:20:C\n";
        let blocks = split_blocks(text);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1].start_line, 4);
        assert_eq!(blocks[1].lines.len(), 2);
        assert_eq!(blocks[2].lines[0].text, ":20:C");
    }

    #[test]
    fn test_tagged_fields_joins_continuations() {
        let blocks = split_blocks(SAMPLE);
        let fields = tagged_fields(&blocks[0]);
        let tags: Vec<&str> = fields.iter().map(|f| f.tag.as_str()).collect();
        assert_eq!(tags, vec!["20", "25", "28C", "60F", "61", "86", "61", "86", "62F"]);
        assert_eq!(fields[5].payload, "020~00VOT001\n~20Invoice 17 \n~21May");
        assert_eq!(fields[7].payload, "Card payment\nSHOP 42");
        assert_eq!(fields[7].line, 11);
    }

    #[test]
    fn test_split_tag() {
        assert_eq!(split_tag(":61:2305"), Some(("61", "2305")));
        assert_eq!(split_tag(":28C:1/1"), Some(("28C", "1/1")));
        assert_eq!(split_tag(":NS:text"), None);
        assert_eq!(split_tag("~20:title"), None);
        assert_eq!(split_tag("://ref"), None);
    }

    #[test]
    fn test_parse_block_header_and_entries() {
        let blocks = split_blocks(SAMPLE);
        let block = StatementBlock::parse(&blocks[0]).unwrap();
        assert_eq!(block.header.reference, "ST230510");
        assert_eq!(block.header.account, "/PL61109010140000071219812874");
        assert_eq!(block.header.statement_number.as_deref(), Some("00087"));
        assert_eq!(block.header.sequence_number.as_deref(), Some("001"));
        assert_eq!(block.header.currency(), Some("EUR"));
        let closing = block.header.closing_balance.as_ref().unwrap();
        assert_eq!(closing.amount.to_string(), "1080.50");
        assert_eq!(block.entries.len(), 2);
        assert_eq!(block.entries[1].narrative.as_deref(), Some("Card payment\nSHOP 42"));
    }

    #[test]
    fn test_parse_block_requires_account() {
        let blocks = split_blocks(":20:REF\n:61:230510C1,00NTRF\n");
        let err = StatementBlock::parse(&blocks[0]).unwrap_err();
        assert!(matches!(err, Error::Mt940ParseError { line: 1, .. }));
    }

    #[test]
    fn test_narrative_after_closing_balance_is_ignored() {
        let text = ":20:R\n:25:/1\n:60F:C230510PLN0,00\n:61:230510C1,00NTRF\n:62F:C230510PLN1,00\n:86:statement info\n";
        let blocks = split_blocks(text);
        let block = StatementBlock::parse(&blocks[0]).unwrap();
        assert_eq!(block.entries[0].narrative, None);
    }

    #[test]
    fn test_malformed_balance_does_not_fail_block() {
        let text = ":20:R\n:25:/1\n:60F:C23\n:61:230510C1,00NTRF\n";
        let blocks = split_blocks(text);
        let block = StatementBlock::parse(&blocks[0]).unwrap();
        assert_eq!(block.header.opening_balance, None);
        assert_eq!(block.entries.len(), 1);
    }

    #[test]
    fn test_extract_fields_with_entry_date_and_bank_reference() {
        let fields = extract_fields(&line("2305100510C100,50NTRFINV-2023-17//PKO123")).unwrap();
        assert_eq!(fields.value_date, "230510");
        assert_eq!(fields.entry_date.as_deref(), Some("0510"));
        assert_eq!(fields.debit_credit, DebitCredit::Credit);
        assert!(!fields.reversal);
        assert_eq!(fields.amount, "100,50");
        assert_eq!(fields.currency, None);
        assert_eq!(fields.transaction_type, "NTRF");
        assert_eq!(fields.reference, "INV-2023-17");
        assert_eq!(fields.bank_reference.as_deref(), Some("PKO123"));
    }

    #[test]
    fn test_extract_fields_reversal_and_funds_code() {
        let fields = extract_fields(&line("230510RDR12,00NCHGREF1")).unwrap();
        assert!(fields.reversal);
        assert_eq!(fields.debit_credit, DebitCredit::Debit);
        assert_eq!(fields.funds_code, Some('R'));
        assert_eq!(fields.amount, "12,00");
        assert_eq!(fields.transaction_type, "NCHG");
        assert_eq!(fields.reference, "REF1");

        let fields = extract_fields(&line("230510RC3,00NTRFREF2")).unwrap();
        assert!(fields.reversal);
        assert_eq!(fields.debit_credit, DebitCredit::Credit);
    }

    #[test]
    fn test_extract_fields_currency_next_to_amount() {
        let before = extract_fields(&line("230510CEUR100,50NTRFREF")).unwrap();
        assert_eq!(before.currency.as_deref(), Some("EUR"));
        assert_eq!(before.funds_code, None);
        assert_eq!(before.amount, "100,50");

        let after = extract_fields(&line("230510D7,25USDNTRFREF")).unwrap();
        assert_eq!(after.currency.as_deref(), Some("USD"));
        assert_eq!(after.transaction_type, "NTRF");
        assert_eq!(after.reference, "REF");
    }

    #[test]
    fn test_type_code_is_not_mistaken_for_currency() {
        let fields = extract_fields(&line("230510C5,00NTRFNONREF")).unwrap();
        assert_eq!(fields.currency, None);
        assert_eq!(fields.transaction_type, "NTRF");
        assert_eq!(fields.reference, "NONREF");
    }

    #[test]
    fn test_extract_fields_missing_reference_and_supplementary() {
        let fields = extract_fields(&line("230510C5,00N641\n  card   1234 ")).unwrap();
        assert_eq!(fields.transaction_type, "N641");
        assert_eq!(fields.reference, "");
        assert_eq!(fields.bank_reference, None);
        assert_eq!(fields.supplementary.as_deref(), Some("card 1234"));
    }

    #[test]
    fn test_extract_fields_rejects_truncated_lines() {
        for payload in ["2305", "230510C", "230510CNTRF", "23O510C1,00", "230510X1,00NTRF"] {
            let err = extract_fields(&line(payload)).unwrap_err();
            assert!(
                matches!(err, Error::Mt940ParseError { .. }),
                "{payload} gave {err}"
            );
        }
    }

    #[test]
    fn test_bad_line_does_not_hide_following_lines() {
        let text = ":20:R\n:25:/1\n:60F:C230510EUR0,00\n:61:2305\n:86:lost\n:61:230510C1,00NTRF\n:86:kept\n";
        let blocks = split_blocks(text);
        let block = StatementBlock::parse(&blocks[0]).unwrap();
        let results: Vec<_> = block.transactions().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());
        assert_eq!(results[1].as_ref().unwrap().title, "kept");
    }
}
