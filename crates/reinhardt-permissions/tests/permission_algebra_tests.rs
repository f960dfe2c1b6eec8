//! Permission composition integration tests
//!
//! Covers short-circuit evaluation, operator precedence, object checks and
//! the checking helpers.

use async_trait::async_trait;
use http::Method;
use reinhardt_permissions::{
	AllowAny, DynPermission, IsAdminUser, IsAuthenticated, Permission, PermissionArgs, PermissionCheckMixin,
	PermissionClass, PermissionContext, PermissionError, PermissionExpr, and, check_object_permissions,
	check_permissions, impl_permission_operators, not, or,
};
use rstest::*;
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fixed answer, counting how often it is asked.
#[derive(Clone)]
struct Counting {
	grant: bool,
	object_grant: bool,
	calls: Arc<AtomicUsize>,
	object_calls: Arc<AtomicUsize>,
	message: &'static str,
}

impl Counting {
	fn new(grant: bool, message: &'static str) -> Self {
		Self {
			grant,
			object_grant: grant,
			calls: Arc::new(AtomicUsize::new(0)),
			object_calls: Arc::new(AtomicUsize::new(0)),
			message,
		}
	}

	fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	fn object_calls(&self) -> usize {
		self.object_calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl Permission for Counting {
	async fn has_permission(&self, _context: &PermissionContext<'_>) -> bool {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.grant
	}

	async fn has_object_permission(&self, _context: &PermissionContext<'_>, _obj: &(dyn Any + Send + Sync)) -> bool {
		self.object_calls.fetch_add(1, Ordering::SeqCst);
		self.object_grant
	}

	fn message(&self) -> Option<String> {
		Some(self.message.to_string())
	}
}

impl_permission_operators!(Counting);

/// Grants only to owners of the object.
struct IsOwner;

#[async_trait]
impl Permission for IsOwner {
	async fn has_permission(&self, _context: &PermissionContext<'_>) -> bool {
		true
	}

	async fn has_object_permission(&self, context: &PermissionContext<'_>, obj: &(dyn Any + Send + Sync)) -> bool {
		context.is_authenticated && obj.downcast_ref::<Article>().is_some_and(|article| article.owned)
	}

	fn message(&self) -> Option<String> {
		Some("Only the owner may do this.".to_string())
	}
}

struct Article {
	owned: bool,
}

#[fixture]
fn anonymous() -> PermissionContext<'static> {
	PermissionContext::new(Method::GET, "/articles")
}

// =============================================================================
// Short-circuiting
// =============================================================================

#[rstest]
#[tokio::test]
async fn and_skips_right_when_left_denies(anonymous: PermissionContext<'static>) {
	// Arrange
	let left = Counting::new(false, "left");
	let right = Counting::new(true, "right");
	let permission = left.clone() & right.clone();

	// Act
	let result = permission.has_permission(&anonymous).await;

	// Assert
	assert!(!result);
	assert_eq!(left.calls(), 1);
	assert_eq!(right.calls(), 0);
}

#[rstest]
#[tokio::test]
async fn or_skips_right_when_left_grants(anonymous: PermissionContext<'static>) {
	// Arrange
	let left = Counting::new(true, "left");
	let right = Counting::new(false, "right");
	let permission = left.clone() | right.clone();

	// Act
	let result = permission.has_permission(&anonymous).await;

	// Assert
	assert!(result);
	assert_eq!(left.calls(), 1);
	assert_eq!(right.calls(), 0);
}

#[rstest]
#[tokio::test]
async fn object_checks_short_circuit_independently(anonymous: PermissionContext<'static>) {
	// Arrange
	let left = Counting::new(false, "left");
	let right = Counting::new(true, "right");
	let and_permission = and(left.clone(), right.clone());
	let or_permission = or(right.clone(), left.clone());
	let article = Article { owned: true };

	// Act
	let and_result = and_permission.has_object_permission(&anonymous, &article).await;
	let or_result = or_permission.has_object_permission(&anonymous, &article).await;

	// Assert
	assert!(!and_result);
	assert!(or_result);
	assert_eq!(left.object_calls(), 1);
	assert_eq!(right.object_calls(), 1);
	assert_eq!(left.calls() + right.calls(), 0);
}

#[rstest]
#[case(true, true, true, false)]
#[case(true, false, false, true)]
#[case(false, true, false, true)]
#[case(false, false, false, false)]
#[tokio::test]
async fn composite_truth_table(
	anonymous: PermissionContext<'static>,
	#[case] a: bool,
	#[case] b: bool,
	#[case] expected_and: bool,
	#[case] expected_xor: bool,
) {
	// Arrange
	let p = || Counting::new(a, "a");
	let q = || Counting::new(b, "b");
	let conjunction = p() & q();
	let exclusive = (p() | q()) & !(p() & q());

	// Act
	let and_result = conjunction.has_permission(&anonymous).await;
	let xor_result = exclusive.has_permission(&anonymous).await;

	// Assert
	assert_eq!(and_result, expected_and);
	assert_eq!(xor_result, expected_xor);
}

// =============================================================================
// Negation and precedence
// =============================================================================

#[rstest]
#[tokio::test]
async fn not_inverts_both_checks(anonymous: PermissionContext<'static>) {
	// Arrange
	let permission = not(IsOwner);
	let article = Article { owned: true };
	let owner = PermissionContext::new(Method::DELETE, "/articles/1").authenticated(true);

	// Act
	let plain = permission.has_permission(&anonymous).await;
	let object = permission.has_object_permission(&owner, &article).await;

	// Assert
	assert!(!plain);
	assert!(!object);
}

#[rstest]
#[tokio::test]
async fn negation_binds_tighter_than_and_which_binds_tighter_than_or(anonymous: PermissionContext<'static>) {
	// Arrange
	let allow = Counting::new(true, "allow");
	let deny = Counting::new(false, "deny");

	// `!deny & deny | allow` reads `((!deny) & deny) | allow`
	let permission = !deny.clone() & deny.clone() | allow.clone();

	// Act
	let result = permission.has_permission(&anonymous).await;

	// Assert
	assert!(result);
	assert_eq!(deny.calls(), 2);
	assert_eq!(allow.calls(), 1);
}

// =============================================================================
// Messages
// =============================================================================

#[rstest]
#[tokio::test]
async fn and_reports_right_message_after_reaching_it(anonymous: PermissionContext<'static>) {
	// Arrange
	let permission = Counting::new(true, "left") & Counting::new(false, "right");
	assert_eq!(permission.message().as_deref(), Some("left"));

	// Act
	let result = check_permissions(&[Arc::new(permission) as DynPermission], &anonymous).await;

	// Assert
	assert_eq!(
		result,
		Err(PermissionError::PermissionDenied {
			message: Some("right".to_string()),
		})
	);
}

#[rstest]
#[tokio::test]
async fn and_keeps_left_message_when_left_denies(anonymous: PermissionContext<'static>) {
	// Arrange
	let permission = Counting::new(false, "left") & Counting::new(false, "right");

	// Act
	let result = permission.has_permission(&anonymous).await;

	// Assert
	assert!(!result);
	assert_eq!(permission.message().as_deref(), Some("left"));
}

// =============================================================================
// Checking helpers
// =============================================================================

#[rstest]
#[tokio::test]
async fn check_permissions_stops_at_first_denial(anonymous: PermissionContext<'static>) {
	// Arrange
	let first = Counting::new(true, "first");
	let denying = Counting::new(false, "denying");
	let never = Counting::new(false, "never");
	let permissions: Vec<DynPermission> =
		vec![Arc::new(first.clone()), Arc::new(denying.clone()), Arc::new(never.clone())];

	// Act
	let result = check_permissions(&permissions, &anonymous).await;

	// Assert
	assert_eq!(result.unwrap_err().message(), Some("denying"));
	assert_eq!(first.calls(), 1);
	assert_eq!(never.calls(), 0);
}

#[rstest]
#[tokio::test]
async fn check_object_permissions_uses_object(anonymous: PermissionContext<'static>) {
	// Arrange
	let permissions: Vec<DynPermission> = vec![Arc::new(IsAuthenticated | AllowAny), Arc::new(IsOwner)];
	let owner = PermissionContext::new(Method::PUT, "/articles/1").authenticated(true);

	// Act
	let owned = check_object_permissions(&permissions, &owner, &Article { owned: true }).await;
	let foreign = check_object_permissions(&permissions, &owner, &Article { owned: false }).await;
	let anonymous_result = check_object_permissions(&permissions, &anonymous, &Article { owned: true }).await;

	// Assert
	assert!(owned.is_ok());
	assert_eq!(foreign.unwrap_err().message(), Some("Only the owner may do this."));
	assert!(anonymous_result.is_err());
}

#[rstest]
#[tokio::test]
async fn empty_permission_list_allows() {
	// Arrange
	let context = PermissionContext::new(Method::DELETE, "/articles/1");

	// Act
	let result = check_permissions(&[], &context).await;

	// Assert
	assert!(result.is_ok());
}

// =============================================================================
// Class composition through the mixin
// =============================================================================

struct AdminController;

impl PermissionCheckMixin for AdminController {
	fn permission_classes(&self) -> Vec<PermissionExpr> {
		vec![PermissionClass::of::<IsAuthenticated>() & PermissionClass::of::<IsAdminUser>()]
	}
}

#[rstest]
#[case(false, false, Err(None))]
#[case(true, false, Err(Some(IsAdminUser::MESSAGE)))]
#[case(true, true, Ok(()))]
#[tokio::test]
async fn mixin_checks_composed_classes(
	#[case] is_authenticated: bool,
	#[case] is_admin: bool,
	#[case] expected: Result<(), Option<&'static str>>,
) {
	// Arrange
	let controller = AdminController;
	let context = PermissionContext::new(Method::POST, "/admin")
		.authenticated(is_authenticated)
		.admin(is_admin)
		.with_controller(&controller);

	// Act
	let result = controller.check_permissions(&context).await;

	// Assert
	assert_eq!(result.map_err(|err| err.message().map(str::to_string)), expected.map_err(|m| m.map(str::to_string)));
}

#[rstest]
fn mixin_instantiates_fresh_permissions_per_call() {
	// Arrange
	let controller = AdminController;

	// Act
	let first = controller.get_permissions();
	let second = controller.get_permissions();

	// Assert
	assert_eq!(first.len(), 1);
	assert!(!Arc::ptr_eq(&first[0], &second[0]));
	assert_eq!(controller.permission_args(), PermissionArgs::new());
}

#[rstest]
#[tokio::test]
async fn shared_composite_message_follows_latest_check(anonymous: PermissionContext<'static>) {
	// Arrange
	let shared = PermissionExpr::instance(IsAuthenticated & IsAdminUser);
	let permissions = vec![shared.instantiate(&PermissionArgs::new())];
	let signed_in = PermissionContext::new(Method::GET, "/").authenticated(true);

	// Act
	let not_admin = check_permissions(&permissions, &signed_in).await;
	let not_signed_in = check_permissions(&permissions, &anonymous).await;

	// Assert
	assert_eq!(not_admin.unwrap_err().message(), Some(IsAdminUser::MESSAGE));
	assert_eq!(not_signed_in.unwrap_err().message(), None);
}

#[rstest]
#[tokio::test]
async fn or_message_resets_between_checks(anonymous: PermissionContext<'static>) {
	// Arrange
	let permission = IsAuthenticated | IsAdminUser;
	let signed_in = PermissionContext::new(Method::GET, "/").authenticated(true);

	// Act
	let denied = permission.has_permission(&anonymous).await;
	let message_after_denial = permission.message();
	let granted = permission.has_permission(&signed_in).await;
	let message_after_grant = permission.message();

	// Assert
	assert!(!denied);
	assert_eq!(message_after_denial.as_deref(), Some(IsAdminUser::MESSAGE));
	assert!(granted);
	assert_eq!(message_after_grant, None);
}
