//! Unified error codes for the EcoCart storefront
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Cart errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Product errors
//! - 7xxx: Planner errors
//! - 8xxx: User errors
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
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: Cart ====================
    /// Cart has no items
    CartEmpty = 3002,
    /// Quantity outside 1..=MAX per cart line
    CartInvalidQuantity = 3004,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order status cannot move to the requested state
    OrderInvalidTransition = 4002,

    // ==================== 5xxx: Payment ====================
    /// Checkout session could not be created
    PaymentSetupFailed = 5002,
    /// Checkout session is missing or malformed
    PaymentSessionInvalid = 5003,
    /// Webhook signature verification failed
    WebhookSignatureInvalid = 5004,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product has invalid price
    ProductInvalidPrice = 6002,

    // ==================== 7xxx: Planner ====================
    /// Meal plan generation failed
    PlanGenerationFailed = 7001,

    // ==================== 8xxx: User ====================
    /// Email is required
    EmailRequired = 8002,

    // ==================== 9xxx: System ====================
    /// Database error
    DatabaseError = 9002,
    /// Upstream service (payment provider, completion API) failed
    ExternalServiceError = 9006,
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
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Cart
            ErrorCode::CartEmpty => "Cart is empty",
            ErrorCode::CartInvalidQuantity => "Quantity is out of range",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderInvalidTransition => "Order status transition is not allowed",

            // Payment
            ErrorCode::PaymentSetupFailed => "Payment setup failed",
            ErrorCode::PaymentSessionInvalid => "Payment session is invalid",
            ErrorCode::WebhookSignatureInvalid => "Webhook signature is invalid",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Product has invalid price",

            // Planner
            ErrorCode::PlanGenerationFailed => {
                "Failed to generate plan. Please check your API key and try again."
            }

            // User
            ErrorCode::EmailRequired => "Email is required",

            // System
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ExternalServiceError => "Upstream service error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
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
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),

            // Cart
            3002 => Ok(ErrorCode::CartEmpty),
            3004 => Ok(ErrorCode::CartInvalidQuantity),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderInvalidTransition),

            // Payment
            5002 => Ok(ErrorCode::PaymentSetupFailed),
            5003 => Ok(ErrorCode::PaymentSessionInvalid),
            5004 => Ok(ErrorCode::WebhookSignatureInvalid),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductInvalidPrice),

            // Planner
            7001 => Ok(ErrorCode::PlanGenerationFailed),

            // User
            8002 => Ok(ErrorCode::EmailRequired),

            // System
            9002 => Ok(ErrorCode::DatabaseError),
            9006 => Ok(ErrorCode::ExternalServiceError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
