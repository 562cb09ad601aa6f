//! Validation rules for work order input

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{BatchItem, ValidatedItem};
use crate::types::Unit;

/// A single field that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Longest material name the stock table holds, in characters
pub const MAX_MATERIAL_NAME_LEN: usize = 200;

/// Largest quantity a single work order item may carry
pub const MAX_ITEM_QUANTITY: i64 = i32::MAX as i64;

static LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{L}").expect("letter pattern"));

static NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\p{N}\s,.\-]+$").expect("name pattern"));

/// Validate a material name: at least one letter; only letters, digits,
/// whitespace, commas, periods and dashes. Letters and digits may be any
/// Unicode script.
pub fn validate_material_name(name: &str) -> Result<(), &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name is required");
    }
    if name.chars().count() > MAX_MATERIAL_NAME_LEN {
        return Err("Name must be at most 200 characters");
    }
    if !LETTER.is_match(name) {
        return Err("Name must contain at least one letter");
    }
    if !NAME_CHARS.is_match(name) {
        return Err(
            "Name may only contain letters, digits, spaces, commas, periods and dashes",
        );
    }
    Ok(())
}

/// Validate that a quantity is a positive integer no larger than
/// [`MAX_ITEM_QUANTITY`]
pub fn validate_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity < 1 {
        return Err("Quantity must be greater than 0");
    }
    if quantity > MAX_ITEM_QUANTITY {
        return Err("Quantity is too large");
    }
    Ok(())
}

/// Check one submitted item and lift it into its validated form
pub fn validate_batch_item(item: &BatchItem) -> Result<ValidatedItem, FieldViolation> {
    validate_material_name(&item.name).map_err(|msg| FieldViolation::new("name", msg))?;
    validate_quantity(item.quantity).map_err(|msg| FieldViolation::new("quantity", msg))?;
    let unit = item
        .unit
        .parse::<Unit>()
        .map_err(|e| FieldViolation::new("unit", e.to_string()))?;

    Ok(ValidatedItem {
        name: item.name.trim().to_string(),
        quantity: item.quantity,
        unit,
    })
}

/// Names occurring more than once under case-insensitive comparison.
///
/// Each duplicate is reported once, lower-cased, in order of first appearance.
pub fn find_duplicate_names<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();

    for name in names {
        let key = name.trim().to_lowercase();
        if !seen.insert(key.clone()) && reported.insert(key.clone()) {
            duplicates.push(key);
        }
    }

    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_material_name_valid() {
        assert!(validate_material_name("Cement").is_ok());
        assert!(validate_material_name("Vijak M8, pocinčani").is_ok());
        assert!(validate_material_name("Pipe 1.5 - PVC").is_ok());
        assert!(validate_material_name("Žica 2mm").is_ok());
    }

    #[test]
    fn test_validate_material_name_requires_letter() {
        assert!(validate_material_name("12345").is_err());
        assert!(validate_material_name("1.5 - 2").is_err());
        assert!(validate_material_name("   ").is_err());
        assert!(validate_material_name("").is_err());
    }

    #[test]
    fn test_validate_material_name_length_limit() {
        assert!(validate_material_name(&"a".repeat(MAX_MATERIAL_NAME_LEN)).is_ok());
        assert!(validate_material_name(&"a".repeat(MAX_MATERIAL_NAME_LEN + 1)).is_err());
        // Counted in characters, not bytes
        assert!(validate_material_name(&"ž".repeat(MAX_MATERIAL_NAME_LEN)).is_ok());
        // Surrounding whitespace is trimmed before counting
        let padded = format!("  {}  ", "a".repeat(MAX_MATERIAL_NAME_LEN));
        assert!(validate_material_name(&padded).is_ok());
    }

    #[test]
    fn test_validate_material_name_needs_a_real_letter() {
        // Roman numerals are letter-like numbers, not letters
        assert!(validate_material_name("Ⅻ").is_err());
        assert!(validate_material_name("Ⅻ kabel").is_ok());
        // A lone combining mark is not a letter
        assert!(validate_material_name("1\u{0301}").is_err());
    }

    #[test]
    fn test_validate_material_name_rejects_symbols() {
        assert!(validate_material_name("Cement!").is_err());
        assert!(validate_material_name("Paint (white)").is_err());
        assert!(validate_material_name("Nails/Screws").is_err());
        assert!(validate_material_name("50% sand").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
        assert!(validate_quantity(i64::MAX).is_err());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_batch_item_reports_field() {
        let bad_name = BatchItem::new("#1", 5, "kg");
        assert_eq!(validate_batch_item(&bad_name).unwrap_err().field, "name");

        let bad_quantity = BatchItem::new("Cement", 0, "kg");
        assert_eq!(validate_batch_item(&bad_quantity).unwrap_err().field, "quantity");

        let bad_unit = BatchItem::new("Cement", 5, "bucket");
        assert_eq!(validate_batch_item(&bad_unit).unwrap_err().field, "unit");
    }

    #[test]
    fn test_validate_batch_item_trims_name() {
        let item = validate_batch_item(&BatchItem::new("  Cement ", 5, "KG")).unwrap();
        assert_eq!(item.name, "Cement");
        assert_eq!(item.unit, Unit::Kilogram);
    }

    #[test]
    fn test_find_duplicate_names() {
        let names = ["Cement", "Sand", "cement", "Gravel", "SAND", "CEMENT"];
        assert_eq!(find_duplicate_names(names), vec!["cement", "sand"]);
    }

    #[test]
    fn test_find_duplicate_names_none() {
        assert!(find_duplicate_names(["Cement", "Sand"]).is_empty());
    }
}
