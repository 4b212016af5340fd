use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use ecom_payment_engine::{query_objects::InvalidPagination, CartError, OrderFlowError, PaymentError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("Could not read request query: {0}")]
    InvalidRequestQuery(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Not authenticated. {0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Cart(#[from] CartError),
    #[error("{0}")]
    Order(#[from] OrderFlowError),
    #[error("{0}")]
    Payment(#[from] PaymentError),
}

impl From<InvalidPagination> for ServerError {
    fn from(e: InvalidPagination) -> Self {
        Self::InvalidRequestQuery(e.to_string())
    }
}

impl ServerError {
    /// A short machine-readable name for the error, so that clients do not have to parse the message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InitializeError(_)
            | Self::BackendError(_)
            | Self::IOError(_)
            | Self::ConfigurationError(_)
            | Self::Unspecified(_) => "InternalError",
            Self::InvalidRequestBody(_) | Self::InvalidRequestPath(_) | Self::InvalidRequestQuery(_) => "BadRequest",
            Self::Unauthenticated(_) => "Unauthenticated",
            Self::Cart(e) => match e {
                CartError::DatabaseError(_) => "InternalError",
                CartError::SkuNotFound(_) => "SkuNotFound",
                CartError::OutOfStock(_) => "OutOfStock",
                CartError::InvalidQuantity(_) => "InvalidQuantity",
                CartError::CartItemNotFound(_) => "CartItemNotFound",
                CartError::ProductNotFound(_) => "ProductNotFound",
                CartError::NotFound(_) => "NotFound",
                CartError::SkuAlreadyInCart(_) => "SkuAlreadyInCart",
            },
            Self::Order(e) => match e {
                OrderFlowError::DatabaseError(_) => "InternalError",
                OrderFlowError::EmptyCheckout => "EmptyCheckout",
                OrderFlowError::CartItemNotFound => "CartItemNotFound",
                OrderFlowError::OutOfStock(_) => "OutOfStock",
                OrderFlowError::ProductNotFound(_) => "ProductNotFound",
                OrderFlowError::SkuNotBelongToShop { .. } => "SkuNotBelongToShop",
                OrderFlowError::OrderNotFound(_) => "OrderNotFound",
                OrderFlowError::CannotCancelOrder { .. } => "CannotCancelOrder",
            },
            Self::Payment(e) => match e {
                PaymentError::DatabaseError(_) => "InternalError",
                PaymentError::DuplicateTransaction(_) => "DuplicateTransaction",
                PaymentError::MalformedReference(_) => "MalformedReference",
                PaymentError::PaymentNotFound(_) => "PaymentNotFound",
                PaymentError::AmountMismatch { .. } => "AmountMismatch",
                PaymentError::PaymentClosed(_) => "PaymentClosed",
                PaymentError::InvalidTransactionDate(_) => "InvalidTransactionDate",
            },
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestQuery(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Cart(e) => match e {
                CartError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                CartError::SkuNotFound(_)
                | CartError::CartItemNotFound(_)
                | CartError::ProductNotFound(_)
                | CartError::NotFound(_) => StatusCode::NOT_FOUND,
                CartError::OutOfStock(_) | CartError::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
                CartError::SkuAlreadyInCart(_) => StatusCode::CONFLICT,
            },
            Self::Order(e) => match e {
                OrderFlowError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                OrderFlowError::CartItemNotFound
                | OrderFlowError::ProductNotFound(_)
                | OrderFlowError::OrderNotFound(_) => StatusCode::NOT_FOUND,
                OrderFlowError::EmptyCheckout
                | OrderFlowError::OutOfStock(_)
                | OrderFlowError::SkuNotBelongToShop { .. } => StatusCode::BAD_REQUEST,
                OrderFlowError::CannotCancelOrder { .. } => StatusCode::CONFLICT,
            },
            Self::Payment(e) => match e {
                PaymentError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                PaymentError::PaymentNotFound(_) => StatusCode::NOT_FOUND,
                PaymentError::MalformedReference(_) | PaymentError::InvalidTransactionDate(_) => {
                    StatusCode::BAD_REQUEST
                },
                PaymentError::DuplicateTransaction(_) | PaymentError::PaymentClosed(_) => StatusCode::CONFLICT,
                PaymentError::AmountMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string(), "kind": self.kind() }).to_string())
    }
}
