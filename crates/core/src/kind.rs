//! The closed set of derived computation kinds.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Which derived computation to run for a subject.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiKind {
    Financials,
    Sales,
    Employee,
}

impl ApiKind {
    /// Every supported kind, in route order.
    pub const ALL: [ApiKind; 3] = [ApiKind::Financials, ApiKind::Sales, ApiKind::Employee];

    /// Lowercase wire name (also used in route paths and result payloads).
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKind::Financials => "financials",
            ApiKind::Sales => "sales",
            ApiKind::Employee => "employee",
        }
    }
}

impl core::fmt::Display for ApiKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "financials" => Ok(ApiKind::Financials),
            "sales" => Ok(ApiKind::Sales),
            "employee" => Ok(ApiKind::Employee),
            _ => Err(DomainError::invalid_kind(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for kind in ApiKind::ALL {
            assert_eq!(kind.as_str().parse::<ApiKind>().unwrap(), kind);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Sales".parse::<ApiKind>().unwrap(), ApiKind::Sales);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = "payroll".parse::<ApiKind>().unwrap_err();
        assert_eq!(err, DomainError::InvalidKind("payroll".to_string()));
    }

    #[test]
    fn serde_uses_wire_name() {
        let json = serde_json::to_string(&ApiKind::Employee).unwrap();
        assert_eq!(json, "\"employee\"");
    }
}
