use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::Debt;

/// A numeric form field as it arrives from a client: a JSON number or user-typed text.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FieldInput {
    Number(f64),
    Text(String),
}

impl FieldInput {
    fn is_blank(&self) -> bool {
        match self {
            FieldInput::Number(_) => false,
            FieldInput::Text(text) => text.trim().is_empty(),
        }
    }

    pub fn value(&self) -> Result<f64, String> {
        match self {
            FieldInput::Number(value) if value.is_finite() => Ok(*value),
            FieldInput::Number(value) => Err(format!("{value} is not a finite number")),
            FieldInput::Text(text) => parse_amount(text),
        }
    }
}

impl From<&str> for FieldInput {
    fn from(value: &str) -> Self {
        FieldInput::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawDebt {
    pub id: Option<String>,
    pub name: Option<String>,
    pub balance: Option<FieldInput>,
    pub apr: Option<FieldInput>,
    #[serde(alias = "minimum", alias = "min")]
    pub min_payment: Option<FieldInput>,
}

impl RawDebt {
    fn is_blank(&self) -> bool {
        let blank_text = |value: &Option<String>| {
            value
                .as_deref()
                .map(|text| text.trim().is_empty())
                .unwrap_or(true)
        };
        let blank_field = |value: &Option<FieldInput>| {
            value.as_ref().map(FieldInput::is_blank).unwrap_or(true)
        };
        blank_text(&self.name)
            && blank_field(&self.balance)
            && blank_field(&self.apr)
            && blank_field(&self.min_payment)
    }
}

/// Parses user-typed money or percentage text. Blank text is zero; currency
/// symbols, thousands separators and percent signs are ignored.
pub fn parse_amount(text: &str) -> Result<f64, String> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%' | '_') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Ok(0.0);
    }

    let value = cleaned
        .parse::<f64>()
        .map_err(|_| format!("'{}' is not a number", text.trim()))?;
    if !value.is_finite() {
        return Err(format!("'{}' is not a finite number", text.trim()));
    }
    Ok(value)
}

pub fn normalize_debts(rows: &[RawDebt]) -> Result<Vec<Debt>, String> {
    let mut debts = Vec::with_capacity(rows.len());
    let mut seen_ids = HashSet::new();

    for (index, row) in rows.iter().enumerate() {
        if row.is_blank() {
            continue;
        }
        let row_number = index + 1;

        let id = row
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("debt-{row_number}"));
        if !seen_ids.insert(id.clone()) {
            return Err(format!("row {row_number}: duplicate debt id '{id}'"));
        }

        let name = row
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Debt {row_number}"));

        let balance = row_field(row_number, "balance", row.balance.as_ref())?;
        let apr = row_field(row_number, "apr", row.apr.as_ref())?;
        let min_payment = row_field(row_number, "minPayment", row.min_payment.as_ref())?;

        debts.push(Debt {
            id,
            name,
            balance,
            apr,
            min_payment,
        });
    }

    Ok(debts)
}

fn row_field(row_number: usize, field: &str, input: Option<&FieldInput>) -> Result<f64, String> {
    let value = match input {
        Some(input) => input
            .value()
            .map_err(|e| format!("row {row_number}: {field} {e}"))?,
        None => 0.0,
    };
    if value < 0.0 {
        return Err(format!("row {row_number}: {field} must be >= 0"));
    }
    Ok(value)
}

/// Parses a `NAME:BALANCE:APR:MIN_PAYMENT` command line argument.
pub fn parse_debt_arg(arg: &str, row_number: usize) -> Result<Debt, String> {
    let parts: Vec<&str> = arg.split(':').collect();
    let [name, balance, apr, min_payment] = parts.as_slice() else {
        return Err(format!(
            "--debt '{arg}' must look like NAME:BALANCE:APR:MIN_PAYMENT"
        ));
    };

    let row = RawDebt {
        id: None,
        name: Some(name.to_string()),
        balance: Some((*balance).into()),
        apr: Some((*apr).into()),
        min_payment: Some((*min_payment).into()),
    };
    let mut debts = normalize_debts(std::slice::from_ref(&row))
        .map_err(|e| format!("--debt '{arg}': {e}"))?;
    let mut debt = debts
        .pop()
        .ok_or_else(|| format!("--debt '{arg}' is empty"))?;
    debt.id = format!("debt-{row_number}");
    if name.trim().is_empty() {
        debt.name = format!("Debt {row_number}");
    }
    Ok(debt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, balance: &str, apr: &str, min_payment: &str) -> RawDebt {
        RawDebt {
            id: None,
            name: Some(name.to_string()),
            balance: Some(balance.into()),
            apr: Some(apr.into()),
            min_payment: Some(min_payment.into()),
        }
    }

    #[test]
    fn parse_amount_strips_currency_formatting() {
        assert_eq!(parse_amount("$1,250.50"), Ok(1_250.5));
        assert_eq!(parse_amount(" 24.99% "), Ok(24.99));
        assert_eq!(parse_amount(""), Ok(0.0));
        assert_eq!(parse_amount("   "), Ok(0.0));
    }

    #[test]
    fn parse_amount_rejects_text_and_non_finite_values() {
        assert!(parse_amount("abc").unwrap_err().contains("'abc' is not a number"));
        assert!(parse_amount("NaN").is_err());
        assert!(parse_amount("inf").is_err());
    }

    #[test]
    fn normalize_defaults_blank_fields_and_skips_empty_rows() {
        let rows = vec![
            raw("Visa", "2,500", "24.99", "$75"),
            RawDebt::default(),
            raw("", "900", "", "30"),
        ];
        let debts = normalize_debts(&rows).expect("valid rows");
        assert_eq!(debts.len(), 2);

        assert_eq!(debts[0].id, "debt-1");
        assert_eq!(debts[0].name, "Visa");
        assert_eq!(debts[0].balance, 2_500.0);
        assert_eq!(debts[0].min_payment, 75.0);

        assert_eq!(debts[1].id, "debt-3");
        assert_eq!(debts[1].name, "Debt 3");
        assert_eq!(debts[1].apr, 0.0);
    }

    #[test]
    fn normalize_rejects_bad_rows_with_row_numbers() {
        let rows = vec![raw("Visa", "2500", "abc", "75")];
        let err = normalize_debts(&rows).unwrap_err();
        assert!(err.starts_with("row 1: apr"), "{err}");

        let rows = vec![raw("Visa", "-20", "10", "75")];
        let err = normalize_debts(&rows).unwrap_err();
        assert_eq!(err, "row 1: balance must be >= 0");
    }

    #[test]
    fn normalize_rejects_duplicate_ids() {
        let mut first = raw("A", "100", "10", "10");
        first.id = Some("card".to_string());
        let mut second = raw("B", "200", "10", "10");
        second.id = Some(" card ".to_string());
        let err = normalize_debts(&[first, second]).unwrap_err();
        assert!(err.contains("duplicate debt id 'card'"));
    }

    #[test]
    fn json_rows_accept_numbers_and_text() {
        let rows: Vec<RawDebt> = serde_json::from_str(
            r#"[{"name":"Visa","balance":1200,"apr":"19.9%","minPayment":"40"},
                {"id":"mc","balance":"$300","min":25}]"#,
        )
        .expect("valid json");
        let debts = normalize_debts(&rows).expect("valid rows");
        assert_eq!(debts[0].apr, 19.9);
        assert_eq!(debts[1].id, "mc");
        assert_eq!(debts[1].min_payment, 25.0);
    }

    #[test]
    fn debt_arg_parses_colon_separated_fields() {
        let debt = parse_debt_arg("Store card:$1,800:27.99:55", 2).expect("valid debt argument");
        assert_eq!(debt.id, "debt-2");
        assert_eq!(debt.name, "Store card");
        assert_eq!(debt.balance, 1_800.0);
        assert_eq!(debt.apr, 27.99);
        assert_eq!(debt.min_payment, 55.0);

        assert!(parse_debt_arg("only:two", 1).is_err());
        assert!(parse_debt_arg("x:1:2:abc", 1).unwrap_err().contains("minPayment"));
    }
}
