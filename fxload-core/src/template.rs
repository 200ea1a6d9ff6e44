use crate::config::ConfigError;
use crate::constants::{QUOTE_ID_PLACEHOLDER, TRADE_ID_PLACEHOLDER};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const BUILTIN_QUOTE: &str = include_str!("../templates/quote.json");
const BUILTIN_TRADE: &str = include_str!("../templates/trade.json");

/// Optional template files; unset entries fall back to the built-in payloads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplatePaths {
    pub quote: Option<PathBuf>,
    pub trade: Option<PathBuf>,
}

impl TemplatePaths {
    pub fn resolve(&self) -> Result<Templates, ConfigError> {
        let quote = match &self.quote {
            Some(path) => read_template(path)?,
            None => BUILTIN_QUOTE.to_string(),
        };
        let trade = match &self.trade {
            Some(path) => read_template(path)?,
            None => BUILTIN_TRADE.to_string(),
        };
        Templates::new(quote, trade)
    }
}

fn read_template(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))
}

/// JSON request bodies with identifier placeholders.
///
/// The quote template carries `${quoteId}`; the trade template carries `${tradeId}` and the
/// `${quoteId}` of the quote it books against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Templates {
    quote: String,
    trade: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            quote: BUILTIN_QUOTE.to_string(),
            trade: BUILTIN_TRADE.to_string(),
        }
    }
}

impl Templates {
    pub fn new(quote: String, trade: String) -> Result<Self, ConfigError> {
        if !quote.contains(QUOTE_ID_PLACEHOLDER) {
            return Err(ConfigError::Invalid(format!(
                "quote template is missing {QUOTE_ID_PLACEHOLDER}"
            )));
        }
        for placeholder in [TRADE_ID_PLACEHOLDER, QUOTE_ID_PLACEHOLDER] {
            if !trade.contains(placeholder) {
                return Err(ConfigError::Invalid(format!(
                    "trade template is missing {placeholder}"
                )));
            }
        }
        Ok(Self { quote, trade })
    }

    pub fn quote(&self, quote_id: &str) -> String {
        self.quote.replace(QUOTE_ID_PLACEHOLDER, quote_id)
    }

    pub fn trade(&self, trade_id: &str, quote_id: &str) -> String {
        self.trade
            .replace(TRADE_ID_PLACEHOLDER, trade_id)
            .replace(QUOTE_ID_PLACEHOLDER, quote_id)
    }
}
