//! Route methods and metadata keys

pub const POST: &str = "POST";
pub const PUT: &str = "PUT";
pub const PATCH: &str = "PATCH";
pub const DELETE: &str = "DELETE";
pub const GET: &str = "GET";
pub const HEAD: &str = "HEAD";
pub const OPTIONS: &str = "OPTIONS";
pub const TRACE: &str = "TRACE";

/// Every method a route may declare.
pub const ROUTE_METHODS: [&str; 8] = [POST, PUT, PATCH, DELETE, GET, HEAD, OPTIONS, TRACE];

/// Controller configuration, on the controller target.
pub const API_CONTROLLER_INSTANCE: &str = "__api_controller__";

/// Route declaration, on the handler target.
pub const ROUTE_FUNCTION: &str = "__route_function__";

/// Routes declared on a controller, in declaration order.
pub const CONTROLLER_ROUTES: &str = "__controller_routes__";

/// Permission classes, on a controller or handler target.
pub const PERMISSION_CLASSES: &str = "__permission_classes__";

/// Throttle scope, on the handler target.
pub const THROTTLED_FUNCTION: &str = "__throttled_endpoint__";

/// Whether `method` names one of [`ROUTE_METHODS`].
pub fn is_route_method(method: &str) -> bool {
	ROUTE_METHODS.contains(&method)
}
