use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Lookback window for a pipeline invocation: how many trading days of
/// history to request per security code.
///
/// Accepts an explicit day count ("90") or a named period token ("3mo");
/// both forms resolve to the same fetch window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookback(u32);

impl Lookback {
    pub fn from_days(days: u32) -> Self {
        Lookback(days)
    }

    /// Day count passed to the provider as the result-count limit.
    pub fn days(&self) -> u32 {
        self.0
    }
}

impl FromStr for Lookback {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.chars().all(|c| c.is_ascii_digit()) && !s.is_empty() {
            let days: u32 = s
                .parse()
                .map_err(|_| AppError::InvalidInput(format!("invalid day count: {}", s)))?;
            if days == 0 {
                return Err(AppError::InvalidInput("day count must be positive".to_string()));
            }
            return Ok(Lookback(days));
        }

        match s {
            "5d" => Ok(Lookback(5)),
            "1mo" => Ok(Lookback(30)),
            "3mo" => Ok(Lookback(90)),
            "6mo" => Ok(Lookback(180)),
            "1y" => Ok(Lookback(365)),
            "2y" => Ok(Lookback(730)),
            _ => Err(AppError::InvalidInput(format!(
                "invalid lookback: {}. Use a day count or one of 5d, 1mo, 3mo, 6mo, 1y, 2y",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_day_count() {
        assert_eq!("90".parse::<Lookback>().unwrap().days(), 90);
        assert_eq!("5".parse::<Lookback>().unwrap().days(), 5);
    }

    #[test]
    fn test_token_and_day_count_resolve_identically() {
        let by_token: Lookback = "3mo".parse().unwrap();
        let by_days: Lookback = "90".parse().unwrap();
        assert_eq!(by_token, by_days);
    }

    #[test]
    fn test_tokens() {
        assert_eq!("5d".parse::<Lookback>().unwrap().days(), 5);
        assert_eq!("1mo".parse::<Lookback>().unwrap().days(), 30);
        assert_eq!("6mo".parse::<Lookback>().unwrap().days(), 180);
        assert_eq!("1y".parse::<Lookback>().unwrap().days(), 365);
        assert_eq!("2y".parse::<Lookback>().unwrap().days(), 730);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!("".parse::<Lookback>().is_err());
        assert!("0".parse::<Lookback>().is_err());
        assert!("3months".parse::<Lookback>().is_err());
    }
}
