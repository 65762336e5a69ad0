use http::StatusCode;
use sea_orm::error::DbErr;

/// Unified error type for the checkout core.
///
/// Two families of variants live here. Business errors (`StockEmpty`,
/// `InsufficientStock`, `NotFound`, `Unauthorized`, `InvalidOperation`,
/// `ValidationError`) are expected outcomes that the caller renders to the
/// end user. Everything else is an integrity fault: it still rolls the
/// enclosing transaction back, but `response_message` returns a generic
/// message instead of the internal detail.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Product item {0} is out of stock")]
    StockEmpty(uuid::Uuid),

    #[error("Insufficient stock for product item {product_item_id}: {available} available, {requested} requested")]
    InsufficientStock {
        product_item_id: uuid::Uuid,
        available: i32,
        requested: i32,
    },

    #[error("Malformed amount: {0}")]
    MalformedAmount(String),

    #[error("Rollback failed: {rollback} (original error: {source})")]
    RollbackFailed {
        source: Box<ServiceError>,
        rollback: DbErr,
    },

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Returns true for errors the caller is expected to show to the end
    /// user (with a retry-or-adjust flow), as opposed to system faults.
    pub fn is_business_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::Unauthorized(_)
                | Self::ValidationError(_)
                | Self::InvalidOperation(_)
                | Self::StockEmpty(_)
                | Self::InsufficientStock { .. }
        )
    }

    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::ValidationError(_) | Self::InvalidOperation(_) => StatusCode::BAD_REQUEST,
            Self::StockEmpty(_) | Self::InsufficientStock { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::DatabaseError(_)
            | Self::MalformedAmount(_)
            | Self::RollbackFailed { .. }
            | Self::EventError(_)
            | Self::InternalError(_)
            | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message suitable for HTTP responses. Integrity faults return a
    /// generic message so implementation details never leak to end users.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::MalformedAmount(_)
            | Self::RollbackFailed { .. }
            | Self::EventError(_)
            | Self::InternalError(_)
            | Self::Other(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}
