use std::sync::LazyLock;

use regex::Regex;

use crate::{
    error::{GatilhoError, Result},
    models::{AlertKind, Condition, CreateAlertPayload},
};

// Four alphanumerics + share class digits, optional fractional-market F.
static B3_TICKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{4}[0-9]{1,2}F?$").expect("valid ticker regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stock {
    pub ticker: &'static str,
    pub name: &'static str,
    pub sector: &'static str,
}

pub static POPULAR_STOCKS: [Stock; 8] = [
    Stock { ticker: "PETR4", name: "Petrobras", sector: "Oil & Gas" },
    Stock { ticker: "VALE3", name: "Vale", sector: "Mining" },
    Stock { ticker: "ITUB4", name: "Itaú", sector: "Banking" },
    Stock { ticker: "BBDC4", name: "Bradesco", sector: "Banking" },
    Stock { ticker: "MGLU3", name: "Magazine Luiza", sector: "Retail" },
    Stock { ticker: "B3SA3", name: "B3", sector: "Financial" },
    Stock { ticker: "WEGE3", name: "WEG", sector: "Industrial" },
    Stock { ticker: "RENT3", name: "Localiza", sector: "Rental" },
];

/// Case-insensitive match on ticker or company name.
pub fn search_stocks(query: &str) -> Vec<&'static Stock> {
    let q = query.trim().to_lowercase();
    POPULAR_STOCKS
        .iter()
        .filter(|s| s.ticker.to_lowercase().contains(&q) || s.name.to_lowercase().contains(&q))
        .collect()
}

pub fn is_b3_ticker(ticker: &str) -> bool {
    B3_TICKER.is_match(ticker)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum FormStep {
    #[default]
    Ticker,
    Kind,
    Condition,
    Value,
    Review,
}

impl FormStep {
    fn previous(self) -> Option<FormStep> {
        match self {
            FormStep::Ticker => None,
            FormStep::Kind => Some(FormStep::Ticker),
            FormStep::Condition => Some(FormStep::Kind),
            FormStep::Value => Some(FormStep::Condition),
            FormStep::Review => Some(FormStep::Value),
        }
    }
}

/// State of the step-by-step alert creation flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertForm {
    step: FormStep,
    ticker: String,
    kind: Option<AlertKind>,
    condition: Option<Condition>,
    target_value: String,
}

impl AlertForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> FormStep {
        self.step
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn select_ticker(&mut self, ticker: &str) -> Result<()> {
        let ticker = ticker.trim().to_uppercase();
        if !is_b3_ticker(&ticker) {
            return Err(GatilhoError::validation(format!(
                "'{ticker}' does not look like a B3 ticker (e.g. PETR4)"
            )));
        }
        self.ticker = ticker;
        self.step = FormStep::Kind;
        Ok(())
    }

    pub fn select_kind(&mut self, kind: AlertKind) {
        self.kind = Some(kind);
        self.step = FormStep::Condition;
    }

    pub fn select_condition(&mut self, condition: Condition) {
        self.condition = Some(condition);
        self.step = FormStep::Value;
    }

    pub fn set_target_value(&mut self, raw: &str) -> Result<()> {
        parse_target(raw)?;
        self.target_value = raw.trim().to_string();
        self.step = FormStep::Review;
        Ok(())
    }

    /// Goes back one step, keeping what was already entered.
    pub fn back(&mut self) -> bool {
        match self.step.previous() {
            Some(prev) => {
                self.step = prev;
                true
            }
            None => false,
        }
    }

    pub fn to_payload(&self, user_id: i64) -> Result<CreateAlertPayload> {
        let (Some(alert_type), Some(condition)) = (self.kind, self.condition) else {
            return Err(GatilhoError::validation("fill in all fields"));
        };
        if self.ticker.is_empty() || self.target_value.is_empty() {
            return Err(GatilhoError::validation("fill in all fields"));
        }

        Ok(CreateAlertPayload {
            user_id,
            ticker: self.ticker.clone(),
            alert_type,
            target_value: parse_target(&self.target_value)?,
            condition,
        })
    }
}

fn parse_target(raw: &str) -> Result<f64> {
    // accept the Brazilian decimal comma too
    let normalized = raw.trim().replace(',', ".");
    let value: f64 = normalized
        .parse()
        .map_err(|_| GatilhoError::validation(format!("'{}' is not a valid number", raw.trim())))?;

    if !value.is_finite() || value <= 0.0 {
        return Err(GatilhoError::validation("target value must be greater than zero"));
    }
    Ok(value)
}
