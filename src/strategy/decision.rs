//! Next-period action derived from the filter's prediction.

use serde::{Deserialize, Serialize};

/// Recommended action for the next period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Buy,
    Sell,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Buy => "Buy",
            Decision::Sell => "Sell",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Buy` when the prediction is strictly above the latest observation.
///
/// Equality resolves to `Sell`.
pub fn decide(predicted_value: f64, latest_observed_value: f64) -> Decision {
    if predicted_value > latest_observed_value {
        Decision::Buy
    } else {
        Decision::Sell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_boundary() {
        assert_eq!(decide(100.0, 100.0), Decision::Sell);
        assert_eq!(decide(100.0001, 100.0), Decision::Buy);
        assert_eq!(decide(99.9999, 100.0), Decision::Sell);
    }

    #[test]
    fn test_nan_prediction_sells() {
        assert_eq!(decide(f64::NAN, 100.0), Decision::Sell);
    }

    #[test]
    fn test_decision_labels() {
        assert_eq!(serde_json::to_string(&Decision::Buy).unwrap(), "\"Buy\"");
        assert_eq!(Decision::Sell.to_string(), "Sell");
    }
}
