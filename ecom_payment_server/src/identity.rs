//! Who is calling, and in which language they want product names.
//!
//! Authentication happens upstream of this server. The gateway in front of it validates the session and forwards the
//! user id in a trusted header (`x-user-id` by default). Handlers that act on behalf of a user take a
//! [`RequestIdentity`] argument, and requests without a usable user id are rejected with `401 Unauthorized`.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use ecom_payment_engine::query_objects::LanguageFilter;
use log::*;

use crate::{config::ServerOptions, errors::ServerError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdentity {
    pub user_id: i64,
    pub language: LanguageFilter,
}

impl RequestIdentity {
    pub fn from_request_headers(req: &HttpRequest, options: &ServerOptions) -> Result<Self, ServerError> {
        let user_id = req
            .headers()
            .get(options.user_id_header.as_str())
            .ok_or_else(|| ServerError::Unauthenticated(format!("The {} header is missing", options.user_id_header)))?
            .to_str()
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                debug!("🔐️ Rejecting request with an invalid {} header", options.user_id_header);
                ServerError::Unauthenticated(format!("The {} header is not a valid user id", options.user_id_header))
            })?;
        let language = req
            .headers()
            .get(options.language_header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(preferred_language)
            .unwrap_or_default();
        Ok(Self { user_id, language })
    }
}

/// Picks the first language out of an `Accept-Language` style value, e.g. `vi-VN,vi;q=0.9` selects `vi-VN`.
pub fn preferred_language(value: &str) -> LanguageFilter {
    let first = value.split([',', ';']).next().unwrap_or_default();
    first.parse().unwrap_or_default()
}

impl FromRequest for RequestIdentity {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<ServerOptions>>() {
            Some(options) => Self::from_request_headers(req, options),
            None => Self::from_request_headers(req, &ServerOptions::default()),
        };
        ready(result)
    }
}
