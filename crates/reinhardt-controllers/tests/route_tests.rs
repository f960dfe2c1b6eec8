//! Route declaration integration tests
//!
//! Serialized with the other tests using the process-wide store.

use http::Method;
use reinhardt_controllers::{
	ApiController, ControllerError, ControllerRegistry, ExtraSettings, Route, ThrottleRate, api_controller,
	get_route_function, get_route_functions, get_throttle_rate, http_delete, http_get, http_post, reload_settings,
	route, throttle,
};
use reinhardt_permissions::{
	AllowAny, IsAdminUser, IsAuthenticated, PermissionClass, PermissionContext, PermissionError, PermissionExpr,
};
use reinhardt_reflect::{Target, reflect};
use rstest::*;
use serial_test::serial;
use std::time::Duration;

struct UsersController;

struct OrdersController;

fn list_users() {}

fn create_user() {}

fn delete_user() {}

fn list_orders() {}

fn handler(f: fn()) -> Target {
	Target::function(f as usize)
}

/// Declares `UsersController` without leaving it in the registry.
fn users() -> Target {
	let controller = api_controller(Target::of::<UsersController>(), ApiController::new("/users")).unwrap();
	ControllerRegistry::global().clear_controllers();
	controller
}

#[rstest]
#[serial(reflect)]
fn routes_are_listed_in_declaration_order() {
	// Arrange
	let _ctx = reflect().context();
	let controller = users();

	// Act
	route(&controller, handler(list_users), http_get("/")).unwrap();
	route(&controller, handler(create_user), http_post("/")).unwrap();
	route(&controller, handler(delete_user), http_delete("/{int:id}")).unwrap();

	// Assert
	let routes = get_route_functions(&controller);
	let declared: Vec<(&str, &[String])> = routes.iter().map(|r| (r.route.path(), r.route.methods())).collect();
	assert_eq!(declared.len(), 3);
	assert_eq!(declared[0], ("/", &["GET".to_string()][..]));
	assert_eq!(declared[1], ("/", &["POST".to_string()][..]));
	assert_eq!(declared[2], ("/{int:id}", &["DELETE".to_string()][..]));
	assert!(routes.iter().all(|r| r.controller == controller));
}

#[rstest]
#[serial(reflect)]
fn route_function_is_attached_to_handler() {
	// Arrange
	let _ctx = reflect().context();
	let controller = users();

	// Act
	let declared = route(
		&controller,
		handler(list_users),
		Route::new("/", ["get", "head"]).url_name("user-list"),
	)
	.unwrap();

	// Assert
	let found = get_route_function(handler(list_users)).unwrap();
	assert!(std::sync::Arc::ptr_eq(&declared, &found));
	assert_eq!(found.route.methods(), ["GET", "HEAD"]);
	assert_eq!(found.route.get_url_name(), Some("user-list"));
	assert_eq!(found.handler, handler(list_users));
}

#[rstest]
#[serial(reflect)]
fn duplicate_routes_keep_the_first() {
	// Arrange
	let _ctx = reflect().context();
	let controller = users();

	// Act
	route(&controller, handler(list_users), Route::new("/", ["GET", "POST"])).unwrap();
	route(&controller, handler(create_user), Route::new("/", ["POST", "GET"])).unwrap();

	// Assert
	let routes = get_route_functions(&controller);
	assert_eq!(routes.len(), 1);
	assert_eq!(routes[0].handler, handler(list_users));
}

#[rstest]
#[serial(reflect)]
fn invalid_method_stores_nothing() {
	// Arrange
	let _ctx = reflect().context();
	let controller = users();

	// Act
	let result = route(&controller, handler(list_users), Route::new("/", ["CONNECT"]));

	// Assert
	assert!(matches!(result, Err(ControllerError::InvalidRouteMethod(method)) if method == "CONNECT"));
	assert!(get_route_function(handler(list_users)).is_none());
	assert!(get_route_functions(&controller).is_empty());
}

#[rstest]
#[serial(reflect)]
fn route_through_wrapper_lands_on_handler() {
	// Arrange
	let _ctx = reflect().context();
	let controller = users();
	let wrapped = Target::wraps(handler(list_users));

	// Act
	route(&controller, &wrapped, http_get("/")).unwrap();

	// Assert
	assert!(get_route_function(handler(list_users)).is_some());
}

#[rstest]
#[serial(reflect)]
fn undeclared_controller_has_no_routes() {
	// Arrange
	let _ctx = reflect().context();

	// Act
	let routes = get_route_functions(Target::of::<OrdersController>());

	// Assert
	assert!(routes.is_empty());
}

#[rstest]
#[serial(reflect)]
fn route_permissions_fall_back_to_controller_then_settings() {
	// Arrange
	let _ctx = reflect().context();
	let guarded = api_controller(
		Target::of::<OrdersController>(),
		ApiController::new("/orders").permission(PermissionClass::of::<IsAuthenticated>()),
	)
	.unwrap();
	let open = users();

	// Act
	let own = route(
		&guarded,
		handler(delete_user),
		http_delete("/{id}").permissions([PermissionClass::of::<IsAdminUser>()]),
	)
	.unwrap();
	let inherited = route(&guarded, handler(list_orders), http_get("/")).unwrap();
	let defaulted = route(&open, handler(list_users), http_get("/")).unwrap();

	// Assert
	let names = |classes: Vec<PermissionExpr>| -> Vec<String> { classes.iter().map(ToString::to_string).collect() };
	assert_eq!(names(own.permission_classes().unwrap()), ["IsAdminUser"]);
	assert_eq!(names(inherited.permission_classes().unwrap()), ["IsAuthenticated"]);
	assert_eq!(names(defaulted.permission_classes().unwrap()), ["AllowAny"]);
	ControllerRegistry::global().clear_controllers();
}

#[rstest]
#[serial(reflect)]
#[tokio::test]
async fn route_permissions_are_checked() {
	// Arrange
	let _ctx = reflect().context();
	let controller = users();
	let admin_only = route(
		&controller,
		handler(delete_user),
		http_delete("/{id}").permissions([PermissionClass::of::<IsAdminUser>()]),
	)
	.unwrap();
	let anonymous = PermissionContext::new(Method::DELETE, "/users/1");
	let admin = PermissionContext::new(Method::DELETE, "/users/1")
		.authenticated(true)
		.admin(true);

	// Act
	let denied = admin_only.check_permissions(&anonymous).await.unwrap();
	let granted = admin_only.check_permissions(&admin).await.unwrap();

	// Assert
	let error = denied.unwrap_err();
	assert!(matches!(error, PermissionError::PermissionDenied { .. }));
	assert_eq!(error.to_string(), IsAdminUser::MESSAGE);
	assert!(granted.is_ok());
}

#[rstest]
#[serial(reflect)]
#[tokio::test]
async fn route_object_permissions_are_checked() {
	// Arrange
	let _ctx = reflect().context();
	let controller = users();
	let open = route(
		&controller,
		handler(list_users),
		http_get("/").permissions([PermissionClass::of::<AllowAny>()]),
	)
	.unwrap();
	let negated = route(
		&controller,
		handler(create_user),
		http_post("/").permissions([!PermissionClass::of::<AllowAny>()]),
	)
	.unwrap();
	let context = PermissionContext::new(Method::GET, "/users");
	let user = 42_u32;

	// Act
	let allowed = open.check_object_permissions(&context, &user).await.unwrap();
	let rejected = negated.check_object_permissions(&context, &user).await.unwrap();

	// Assert
	assert!(allowed.is_ok());
	assert!(rejected.is_err());
}

#[rstest]
#[serial(reflect)]
fn throttle_scopes_resolve_through_settings() {
	// Arrange
	let _ctx = reflect().context();
	reload_settings(ExtraSettings::from_toml_str("[throttle_rates]\nburst = \"10/min\"").unwrap());

	// Act
	throttle(handler(list_users), "burst").unwrap();
	throttle(handler(create_user), "anon").unwrap();
	let unknown = throttle(handler(delete_user), "sustained");

	// Assert
	assert_eq!(
		get_throttle_rate(handler(list_users)).unwrap(),
		Some(ThrottleRate {
			num_requests: 10,
			duration: Duration::from_secs(60),
		})
	);
	assert_eq!(get_throttle_rate(handler(create_user)).unwrap(), None);
	assert!(matches!(unknown, Err(ControllerError::UnknownThrottleScope(scope)) if scope == "sustained"));
	assert_eq!(get_throttle_rate(handler(delete_user)).unwrap(), None);
	reload_settings(ExtraSettings::default());
}
