// ABOUTME: Integration tests for namespace key derivation.
// ABOUTME: Property tests for determinism and injectivity plus catalog-wide uniqueness.

use proptest::prelude::*;
use stackline::facts::Fact;
use stackline::namespace::{Namespace, build_key};
use std::collections::HashSet;

fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_%/-]{1,12}"
}

fn plain_segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{1,12}"
}

proptest! {
    #[test]
    fn same_inputs_same_key(app in segment(), env in segment(), cat in segment(), name in segment()) {
        prop_assert_eq!(
            build_key(&app, &env, &cat, &name),
            build_key(&app, &env, &cat, &name)
        );
    }

    #[test]
    fn key_is_rooted_in_lowercased_namespace(
        app in plain_segment(),
        env in plain_segment(),
        cat in plain_segment(),
        name in segment(),
    ) {
        let key = build_key(&app, &env, &cat, &name);
        let root = format!("/{}/{}/", app.to_lowercase(), env.to_lowercase());
        let tail = format!("/{}/{}", cat, name);
        prop_assert!(key.starts_with(&root));
        prop_assert!(key.as_str().ends_with(&tail));
    }

    #[test]
    fn distinct_inputs_never_collide(
        a in (segment(), segment(), segment(), segment()),
        b in (segment(), segment(), segment(), segment()),
    ) {
        let norm = |t: &(String, String, String, String)| {
            (t.0.to_lowercase(), t.1.to_lowercase(), t.2.clone(), t.3.clone())
        };
        prop_assume!(norm(&a) != norm(&b));
        prop_assert_ne!(
            build_key(&a.0, &a.1, &a.2, &a.3),
            build_key(&b.0, &b.1, &b.2, &b.3)
        );
    }
}

#[test]
fn slash_in_category_does_not_shift_into_name() {
    assert_ne!(
        build_key("n8n", "stg", "BastionHost/instance", "id"),
        build_key("n8n", "stg", "BastionHost", "instance/id")
    );
    assert_ne!(
        build_key("a/b", "stg", "Vpc", "Id"),
        build_key("a", "b/stg", "Vpc", "Id")
    );
}

#[test]
fn catalog_keys_are_unique_within_a_namespace() {
    let ns = Namespace::new("n8n", "stg");
    let keys: HashSet<_> = Fact::all().iter().map(|f| f.key(&ns)).collect();
    assert_eq!(keys.len(), Fact::all().len());
}

#[test]
fn same_fact_differs_across_environments() {
    let stg = Fact::VpcId.key(&Namespace::new("n8n", "stg"));
    let prod = Fact::VpcId.key(&Namespace::new("n8n", "prod"));
    assert_ne!(stg, prod);
    assert_eq!(stg.as_str(), "/n8n/stg/Vpc/Id");
}

#[test]
fn same_fact_differs_across_apps() {
    let a = Fact::RedisHost.key(&Namespace::new("n8n", "stg"));
    let b = Fact::RedisHost.key(&Namespace::new("flows", "stg"));
    assert_ne!(a, b);
}

#[test]
fn original_key_layout_is_kept() {
    let ns = Namespace::new("N8N", "STG");
    assert_eq!(
        Fact::PublicSubnetIds.key(&ns).as_str(),
        "/n8n/stg/Vpc/SubnetsId"
    );
    assert_eq!(
        Fact::PostgresAppUsername.key(&ns).as_str(),
        "/n8n/stg/PostgreSQL/NonRootUser"
    );
    assert_eq!(
        Fact::BastionSshKeySecretName.key(&ns).as_str(),
        "/n8n/stg/BastionHost/ssh/key"
    );
}
