// self
use styla_connect::{
	_preludet::*,
	acl::{
		AttributeFilter, Privilege, ResourceAttributeMap, ResourceTree, Role, RoleAssignmentRequest,
		RoleRule,
	},
	auth::{PasswordHash, ResourceId, RoleName, Secret, ServiceIdentity, UserType, Username},
	config::DEFAULT_ROLE_RESOURCES,
	provision::{GrantOutcome, PermissionAssigner},
	store::{CredentialStore, EntityKind, MemoryStore},
};

struct Harness {
	backend: Arc<MemoryStore>,
	store: Arc<dyn CredentialStore>,
	assigner: PermissionAssigner,
}

fn harness() -> Harness {
	let backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn CredentialStore> = backend.clone();
	let assigner = PermissionAssigner::new(store.clone(), user_type());

	Harness { backend, store, assigner }
}

fn user_type() -> UserType {
	UserType::new("admin").expect("User type fixture should be valid.")
}

fn resource(name: &str) -> ResourceId {
	ResourceId::new(name).expect("Resource fixture should be valid.")
}

fn attributes() -> ResourceAttributeMap {
	ResourceAttributeMap::new([
		("styla_product", vec!["name", "sku", "price"]),
		("styla_category", vec!["name", "url_key"]),
	])
	.expect("Attribute map fixture should be valid.")
}

fn request() -> RoleAssignmentRequest {
	RoleAssignmentRequest::new(
		RoleName::new("StylaApi2Role").expect("Role fixture should be valid."),
		ResourceTree::parse(DEFAULT_ROLE_RESOURCES).expect("Resource tree fixture should parse."),
	)
}

async fn persisted_identity(store: &Arc<dyn CredentialStore>) -> ServiceIdentity {
	let identity = ServiceIdentity {
		id: None,
		username: Username::new("StylaApiAdminUser").expect("Username fixture should be valid."),
		first_name: "Styla".into(),
		last_name: "Api Connector".into(),
		email: "stylaapiadmin.ops@acme.test".into(),
		password_hash: PasswordHash::hash(&Secret::new("pw")).expect("Password should hash."),
		role: None,
		is_active: true,
		created_at: OffsetDateTime::now_utc(),
	};

	store.upsert_as(identity).await.expect("Identity fixture should persist.")
}

#[tokio::test]
async fn repeated_grants_keep_one_row_per_group() {
	let h = harness();
	let identity = persisted_identity(&h.store).await;
	let first = h
		.assigner
		.grant_read_access(&identity, &attributes())
		.await
		.expect("First grant should succeed.");
	let second = h
		.assigner
		.grant_read_access(&identity, &attributes())
		.await
		.expect("Second grant should succeed.");

	assert_eq!(first, GrantOutcome::Applied { removed: 0, inserted: 2 });
	assert_eq!(second, GrantOutcome::Applied { removed: 2, inserted: 2 });

	let filters =
		h.store.list_as::<AttributeFilter>().await.expect("Filters should be listable.");

	assert_eq!(filters.len(), 2);

	let product = filters
		.iter()
		.find(|f| f.resource == resource("styla_product"))
		.expect("Product filter should exist.");

	assert_eq!(product.attributes_csv(), "name,price,sku");
}

#[tokio::test]
async fn grants_leave_other_groups_and_user_types_alone() {
	let h = harness();
	let identity = persisted_identity(&h.store).await;
	let foreign = UserType::new("customer").expect("User type fixture should be valid.");

	h.store
		.upsert_as(AttributeFilter::read(foreign, resource("styla_product"), vec!["sku".into()]))
		.await
		.expect("Foreign filter should persist.");
	h.store
		.upsert_as(AttributeFilter::read(user_type(), resource("cms_page"), vec!["title".into()]))
		.await
		.expect("Unrelated filter should persist.");

	let outcome = h
		.assigner
		.grant_read_access(&identity, &attributes())
		.await
		.expect("Grant should succeed.");

	assert_eq!(outcome, GrantOutcome::Applied { removed: 0, inserted: 2 });
	assert_eq!(h.backend.count(EntityKind::AttributeFilter), 4);
}

#[tokio::test]
async fn wildcard_filter_short_circuits_without_writes() {
	let h = harness();
	let identity = persisted_identity(&h.store).await;

	h.store
		.upsert_as(AttributeFilter::read(user_type(), resource("all"), vec!["*".into()]))
		.await
		.expect("Wildcard filter should persist.");

	let writes = h.backend.mutations();
	let outcome = h
		.assigner
		.grant_read_access(&identity, &attributes())
		.await
		.expect("Grant should succeed.");

	assert_eq!(outcome, GrantOutcome::WildcardPresent);
	assert_eq!(h.backend.mutations(), writes);
	assert_eq!(h.backend.count(EntityKind::AttributeFilter), 1);
}

#[tokio::test]
async fn wildcard_role_rule_short_circuits_without_writes() {
	let h = harness();
	let mut identity = persisted_identity(&h.store).await;
	let role = h
		.store
		.upsert_as(Role::new(RoleName::new("Legacy").expect("Role fixture should be valid.")))
		.await
		.expect("Role fixture should persist.");
	let role_id = role.id.expect("Role should be persisted.");

	h.store
		.upsert_as(RoleRule::new(role_id, resource("all"), Privilege::Retrieve))
		.await
		.expect("Wildcard rule should persist.");

	identity.role = Some(role_id);

	let writes = h.backend.mutations();
	let outcome = h
		.assigner
		.grant_read_access(&identity, &attributes())
		.await
		.expect("Grant should succeed.");

	assert_eq!(outcome, GrantOutcome::WildcardPresent);
	assert_eq!(h.backend.mutations(), writes);
}

#[tokio::test]
async fn role_assignment_reuses_role_and_converges_rules() {
	let h = harness();
	let mut identity = persisted_identity(&h.store).await;
	let first = h
		.assigner
		.assign_role(&mut identity, &request())
		.await
		.expect("First assignment should succeed.");
	let role_id = first.role.id.expect("Role should be persisted.");

	assert!(first.role_created);
	assert_eq!(first.inserted_rules, 2);
	assert_eq!(identity.role, Some(role_id));
	assert!(first.role.members.contains(&identity.id.expect("Identity should be persisted.")));

	// An undeclared privilege on a declared resource and a rule on an undeclared resource.
	h.store
		.upsert_as(RoleRule::new(role_id, resource("styla_product"), Privilege::Delete))
		.await
		.expect("Stale rule should persist.");
	h.store
		.upsert_as(RoleRule::new(role_id, resource("cms_page"), Privilege::Retrieve))
		.await
		.expect("Unrelated rule should persist.");

	let second = h
		.assigner
		.assign_role(&mut identity, &request())
		.await
		.expect("Second assignment should succeed.");

	assert!(!second.role_created);
	assert_eq!(second.role.id, Some(role_id));
	assert_eq!(second.kept_rules, 2);
	assert_eq!(second.removed_rules, 1);
	assert_eq!(second.inserted_rules, 0);
	assert_eq!(h.backend.count(EntityKind::Role), 1);

	let rules = h.store.list_as::<RoleRule>().await.expect("Rules should be listable.");
	let mut pairs =
		rules.iter().map(|rule| (rule.resource.to_string(), rule.privilege)).collect::<Vec<_>>();

	pairs.sort();

	assert_eq!(
		pairs,
		vec![
			("cms_page".to_owned(), Privilege::Retrieve),
			("styla_category".to_owned(), Privilege::Retrieve),
			("styla_product".to_owned(), Privilege::Retrieve),
		]
	);
}

#[tokio::test]
async fn unsaved_identity_cannot_join_a_role() {
	let h = harness();
	let mut identity = persisted_identity(&h.store).await;

	identity.id = None;

	let err = h
		.assigner
		.assign_role(&mut identity, &request())
		.await
		.expect_err("Unsaved identities must be rejected.");

	assert!(matches!(err, Error::IdentityCreation { .. }));
	assert_eq!(h.backend.count(EntityKind::Role), 0);
}
