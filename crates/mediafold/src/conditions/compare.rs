//! Numeric comparison shared by the dimension and file size matchers.

/// Operators accepted by numeric conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericOperator {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Between,
}

impl NumericOperator {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "eq" => Some(Self::Eq),
            "between" => Some(Self::Between),
            _ => None,
        }
    }

    /// `between` is inclusive at both ends.
    pub fn compare(self, actual: u64, value: u64, value_end: u64) -> bool {
        match self {
            Self::Gt => actual > value,
            Self::Gte => actual >= value,
            Self::Lt => actual < value,
            Self::Lte => actual <= value,
            Self::Eq => actual == value,
            Self::Between => actual >= value && actual <= value_end,
        }
    }
}

/// Compares with an operator string; unknown operators never match.
pub fn compare(actual: u64, operator: &str, value: u64, value_end: u64) -> bool {
    NumericOperator::parse(operator)
        .map(|op| op.compare(actual, value, value_end))
        .unwrap_or(false)
}
