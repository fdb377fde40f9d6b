//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 4xxx: Product errors
/// - 5xxx: Bundle errors
/// - 6xxx: Discount errors
/// - 7xxx: Sale errors
/// - 8xxx: Seller profile errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Product errors (4xxx)
    Product,
    /// Bundle errors (5xxx)
    Bundle,
    /// Discount errors (6xxx)
    Discount,
    /// Sale errors (7xxx)
    Sale,
    /// Seller profile errors (8xxx)
    Seller,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            // 3xxx is unassigned
            3000..4000 => Self::General,
            4000..5000 => Self::Product,
            5000..6000 => Self::Bundle,
            6000..7000 => Self::Discount,
            7000..8000 => Self::Sale,
            8000..9000 => Self::Seller,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Product => "product",
            Self::Bundle => "bundle",
            Self::Discount => "discount",
            Self::Sale => "sale",
            Self::Seller => "seller",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
