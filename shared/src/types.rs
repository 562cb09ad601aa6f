//! Closed enumerations used at the service boundary
//!
//! Units, transaction kinds and roles arrive as strings in requests and are
//! stored as strings in the database. Internally they are always one of the
//! enums below; parsing happens once, at the edge.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a boundary string is not a member of its enumeration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Unit of measure a material is stocked in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "pcs")]
    Piece,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "ton")]
    Ton,
    #[serde(rename = "l")]
    Litre,
    #[serde(rename = "m")]
    Metre,
    #[serde(rename = "m2")]
    SquareMetre,
    #[serde(rename = "m3")]
    CubicMetre,
    #[serde(rename = "pkg")]
    Package,
}

impl Unit {
    pub const ALL: [Unit; 8] = [
        Unit::Piece,
        Unit::Kilogram,
        Unit::Ton,
        Unit::Litre,
        Unit::Metre,
        Unit::SquareMetre,
        Unit::CubicMetre,
        Unit::Package,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Piece => "pcs",
            Unit::Kilogram => "kg",
            Unit::Ton => "ton",
            Unit::Litre => "l",
            Unit::Metre => "m",
            Unit::SquareMetre => "m2",
            Unit::CubicMetre => "m3",
            Unit::Package => "pkg",
        }
    }
}

impl FromStr for Unit {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_lowercase();
        Unit::ALL
            .into_iter()
            .find(|unit| unit.as_str() == token)
            .ok_or_else(|| UnknownVariant {
                kind: "unit",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Incoming stock
    Receipt,
    /// Outgoing stock, bounded by what is on hand
    Issuance,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Receipt => "receipt",
            TransactionKind::Issuance => "issuance",
        }
    }

    /// Signed effect of `quantity` on a material's stock level
    pub fn signed(&self, quantity: i64) -> i64 {
        match self {
            TransactionKind::Receipt => quantity,
            TransactionKind::Issuance => -quantity,
        }
    }
}

impl FromStr for TransactionKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "receipt" => Ok(TransactionKind::Receipt),
            "issuance" => Ok(TransactionKind::Issuance),
            _ => Err(UnknownVariant {
                kind: "transaction kind",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            _ => Err(UnknownVariant {
                kind: "role",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_parse_is_case_insensitive() {
        assert_eq!("KG".parse::<Unit>(), Ok(Unit::Kilogram));
        assert_eq!(" ton ".parse::<Unit>(), Ok(Unit::Ton));
        assert_eq!("m3".parse::<Unit>(), Ok(Unit::CubicMetre));
    }

    #[test]
    fn test_unit_parse_rejects_unknown() {
        let err = "barrel".parse::<Unit>().unwrap_err();
        assert_eq!(err.kind, "unit");
        assert_eq!(err.value, "barrel");
    }

    #[test]
    fn test_unit_tokens_round_trip() {
        for unit in Unit::ALL {
            assert_eq!(unit.as_str().parse::<Unit>(), Ok(unit));
        }
    }

    #[test]
    fn test_unit_serde_uses_tokens() {
        assert_eq!(serde_json::to_string(&Unit::SquareMetre).unwrap(), "\"m2\"");
        let unit: Unit = serde_json::from_str("\"pcs\"").unwrap();
        assert_eq!(unit, Unit::Piece);
    }

    #[test]
    fn test_transaction_kind_parse() {
        assert_eq!("Receipt".parse(), Ok(TransactionKind::Receipt));
        assert_eq!("ISSUANCE".parse(), Ok(TransactionKind::Issuance));
        assert!("transfer".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn test_signed_quantity() {
        assert_eq!(TransactionKind::Receipt.signed(7), 7);
        assert_eq!(TransactionKind::Issuance.signed(7), -7);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("admin".parse(), Ok(Role::Admin));
        assert_eq!("Employee".parse(), Ok(Role::Employee));
        assert!("owner".parse::<Role>().is_err());
    }
}
