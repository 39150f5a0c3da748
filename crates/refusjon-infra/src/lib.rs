//! Shared infrastructure components:
//! - Middleware (origin guard, request ID, security headers)
//! - Telemetry initialization

pub mod middleware;
pub mod telemetry;

pub use middleware::{
    get_request_id, origin_guard_middleware, request_id_middleware,
    security_headers_middleware, RequestId,
};
pub use telemetry::init_telemetry;
