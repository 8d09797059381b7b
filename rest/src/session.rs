use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
#[cfg(feature = "mock_auth")]
use service::permission::MockContext;

#[cfg(feature = "mock_auth")]
pub type Context = MockContext;

/// Attaches the request's authentication context as an extension. The mock
/// variant stands in for a real login flow during development.
#[cfg(feature = "mock_auth")]
pub async fn context_extractor(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(MockContext);
    next.run(request).await
}
