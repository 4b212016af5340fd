//! API key middleware for Actix Web.
//!
//! The bank gateway calls the payment webhook with an `Authorization: Apikey <key>` header, where the key is the
//! `ECOM_PAYMENT_API_KEY` configured on both sides. Wrap the webhook routes with [`ApiKeyMiddlewareFactory`] to reject
//! any call that does not carry the key.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error,
};
use ecom_common::Secret;
use futures::future::LocalBoxFuture;
use log::{trace, warn};

use crate::errors::ServerError;

const API_KEY_SCHEME: &str = "Apikey";

pub struct ApiKeyMiddlewareFactory {
    key: Secret<String>,
    // If false, then the middleware will not check the key and always allow the call
    enabled: bool,
}

impl ApiKeyMiddlewareFactory {
    pub fn new(key: Secret<String>, enabled: bool) -> Self {
        ApiKeyMiddlewareFactory { key, enabled }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = ApiKeyMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyMiddlewareService { key: self.key.clone(), enabled: self.enabled, service: Rc::new(service) }))
    }
}

pub struct ApiKeyMiddlewareService<S> {
    key: Secret<String>,
    enabled: bool,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ApiKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let enabled = self.enabled;
        let validated = !enabled || check_api_key(&req, &self.key);
        Box::pin(async move {
            if !enabled {
                trace!("🔐️ API key checks are disabled. Allowing request.");
                return service.call(req).await;
            }
            if validated {
                trace!("🔐️ API key check for request ✅️");
                service.call(req).await
            } else {
                warn!("🔐️ Invalid or missing API key on call to {}. Denying access.", req.path());
                Err(ServerError::Unauthenticated("Invalid API key".into()).into())
            }
        })
    }
}

/// An empty key never matches, so a server without a configured key rejects every call.
fn check_api_key(req: &ServiceRequest, key: &Secret<String>) -> bool {
    if key.is_empty() {
        return false;
    }
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case(API_KEY_SCHEME))
        .map(|(_, candidate)| key.matches(candidate.trim()))
        .unwrap_or(false)
}
