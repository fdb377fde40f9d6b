//! Unified error codes for the seller platform
//!
//! This module defines all error codes used across the seller server and its
//! clients. Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Product errors
//! - 5xxx: Bundle errors
//! - 6xxx: Discount errors
//! - 7xxx: Sale errors
//! - 8xxx: Seller profile errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 4xxx: Product ====================
    /// Product not found
    ProductNotFound = 4001,
    /// Product name already exists for this seller
    ProductNameExists = 4002,
    /// Product is inactive, deleted or blocked
    ProductNotSellable = 4003,
    /// Category not found
    CategoryNotFound = 4101,
    /// Category is not active
    CategoryInactive = 4102,

    // ==================== 5xxx: Bundle ====================
    /// Bundle not found
    BundleNotFound = 5001,
    /// Bundle has no products
    BundleEmpty = 5002,
    /// Product already present in bundle
    BundleDuplicateProduct = 5003,
    /// Product is not a member of the bundle
    BundleProductMissing = 5004,

    // ==================== 6xxx: Discount ====================
    /// Discount not found
    DiscountNotFound = 6001,
    /// Exactly one of product or bundle target must be given
    DiscountTargetAmbiguous = 6002,
    /// Discount validity window is invalid
    DiscountWindowInvalid = 6003,

    // ==================== 7xxx: Sale ====================
    /// Sale not found
    SaleNotFound = 7001,
    /// Sale has already ended
    SaleEnded = 7002,
    /// Product is already part of the sale
    SaleDuplicateProduct = 7003,
    /// Product category is not covered by the sale
    SaleCategoryMismatch = 7004,

    // ==================== 8xxx: Seller ====================
    /// Seller profile not found
    SellerProfileNotFound = 8001,
    /// Seller profile already exists
    SellerProfileExists = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Operation timeout
    TimeoutError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductNameExists => "Product name already exists",
            ErrorCode::ProductNotSellable => "Product is inactive, deleted or blocked",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryInactive => "Category does not exist or is not active",

            // Bundle
            ErrorCode::BundleNotFound => "Bundle not found",
            ErrorCode::BundleEmpty => "Products array is required and should not be empty",
            ErrorCode::BundleDuplicateProduct => {
                "Some of the provided product IDs are already in the bundle"
            }
            ErrorCode::BundleProductMissing => "Product not found in bundle",

            // Discount
            ErrorCode::DiscountNotFound => "Discount not found",
            ErrorCode::DiscountTargetAmbiguous => {
                "Either productId or bundleId must be provided, but not both"
            }
            ErrorCode::DiscountWindowInvalid => "Discount start date must be before end date",

            // Sale
            ErrorCode::SaleNotFound => "Sale not found or has been deleted",
            ErrorCode::SaleEnded => "Cannot modify products in a sale that has ended",
            ErrorCode::SaleDuplicateProduct => "Product is already added to this sale",
            ErrorCode::SaleCategoryMismatch => {
                "Product does not belong to any of the sale's categories"
            }

            // Seller
            ErrorCode::SellerProfileNotFound => "Seller profile not found",
            ErrorCode::SellerProfileExists => "Seller profile already exists",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Operation timed out",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::AdminRequired),

            // Product
            4001 => Ok(ErrorCode::ProductNotFound),
            4002 => Ok(ErrorCode::ProductNameExists),
            4003 => Ok(ErrorCode::ProductNotSellable),
            4101 => Ok(ErrorCode::CategoryNotFound),
            4102 => Ok(ErrorCode::CategoryInactive),

            // Bundle
            5001 => Ok(ErrorCode::BundleNotFound),
            5002 => Ok(ErrorCode::BundleEmpty),
            5003 => Ok(ErrorCode::BundleDuplicateProduct),
            5004 => Ok(ErrorCode::BundleProductMissing),

            // Discount
            6001 => Ok(ErrorCode::DiscountNotFound),
            6002 => Ok(ErrorCode::DiscountTargetAmbiguous),
            6003 => Ok(ErrorCode::DiscountWindowInvalid),

            // Sale
            7001 => Ok(ErrorCode::SaleNotFound),
            7002 => Ok(ErrorCode::SaleEnded),
            7003 => Ok(ErrorCode::SaleDuplicateProduct),
            7004 => Ok(ErrorCode::SaleCategoryMismatch),

            // Seller
            8001 => Ok(ErrorCode::SellerProfileNotFound),
            8002 => Ok(ErrorCode::SellerProfileExists),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::ProductNotFound.code(), 4001);
        assert_eq!(ErrorCode::BundleDuplicateProduct.code(), 5003);
        assert_eq!(ErrorCode::DiscountTargetAmbiguous.code(), 6002);
        assert_eq!(ErrorCode::SaleEnded.code(), 7002);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_roundtrip() {
        for code in [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::TokenExpired,
            ErrorCode::ProductNameExists,
            ErrorCode::BundleEmpty,
            ErrorCode::SaleCategoryMismatch,
            ErrorCode::DatabaseError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::NotFound.is_success());
    }

    #[test]
    fn test_serialize_as_u16() {
        let json = serde_json::to_string(&ErrorCode::ProductNotFound).unwrap();
        assert_eq!(json, "4001");
        let code: ErrorCode = serde_json::from_str("7003").unwrap();
        assert_eq!(code, ErrorCode::SaleDuplicateProduct);
    }
}
