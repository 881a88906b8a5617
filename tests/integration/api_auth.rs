//! Credential bindings between APIs and runtimes.

use crate::assert_error_kind;
use crate::common::fixtures::{application_input, basic_auth, oauth_auth, runtime_input};
use crate::common::{create_context, create_registry};
use runtime_registry::model::{AuthInput, Credential, CredentialDataInput};
use runtime_registry::storage::InMemoryStorage;
use runtime_registry::{ErrorKind, Registry, RequestContext};

struct Setup {
    registry: Registry<InMemoryStorage>,
    context: RequestContext,
    api_id: String,
    runtime_id: String,
}

async fn setup() -> Setup {
    let registry = create_registry();
    let context = create_context("tenant-a");
    let application = registry
        .register_application(application_input("shop"), &context)
        .await
        .unwrap();
    let runtime = registry
        .register_runtime(runtime_input("rt"), &context)
        .await
        .unwrap();

    Setup {
        api_id: application.api_definitions[0].id.clone(),
        runtime_id: runtime.id,
        registry,
        context,
    }
}

#[tokio::test]
async fn test_set_auth_last_write_wins() {
    let s = setup().await;

    let first = s
        .registry
        .set_api_auth(&s.api_id, &s.runtime_id, basic_auth(), &s.context)
        .await
        .unwrap();
    assert!(matches!(
        first.auth.as_ref().map(|auth| &auth.credential),
        Some(Credential::Basic(_))
    ));

    s.registry
        .set_api_auth(&s.api_id, &s.runtime_id, oauth_auth(), &s.context)
        .await
        .unwrap();

    let stored = s
        .registry
        .api_auth(&s.api_id, &s.runtime_id, &s.context)
        .await
        .unwrap();
    match stored.auth.map(|auth| auth.credential) {
        Some(Credential::OAuth(oauth)) => assert_eq!(oauth.client_id, "client-id"),
        other => panic!("expected oauth credential, got {:?}", other),
    }
}

#[tokio::test]
async fn test_credential_must_select_one_kind() {
    let s = setup().await;

    let both = CredentialDataInput {
        basic: CredentialDataInput::basic("u", "p").basic,
        oauth: CredentialDataInput::oauth("c", "s", "https://auth.example.com").oauth,
    };
    for credential in [CredentialDataInput::default(), both] {
        assert_error_kind!(
            s.registry
                .set_api_auth(&s.api_id, &s.runtime_id, AuthInput::new(credential), &s.context)
                .await,
            ErrorKind::Validation
        );
    }
}

#[tokio::test]
async fn test_unknown_api_or_runtime() {
    let s = setup().await;

    assert_error_kind!(
        s.registry
            .set_api_auth("missing", &s.runtime_id, basic_auth(), &s.context)
            .await,
        ErrorKind::NotFound
    );
    assert_error_kind!(
        s.registry
            .set_api_auth(&s.api_id, "missing", basic_auth(), &s.context)
            .await,
        ErrorKind::NotFound
    );
    assert_error_kind!(
        s.registry.api_auth(&s.api_id, "missing", &s.context).await,
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn test_auth_operations_fail_after_runtime_unregistered() {
    let s = setup().await;
    s.registry
        .set_api_auth(&s.api_id, &s.runtime_id, basic_auth(), &s.context)
        .await
        .unwrap();

    s.registry
        .unregister_runtime(&s.runtime_id, &s.context)
        .await
        .unwrap();

    assert_error_kind!(
        s.registry
            .set_api_auth(&s.api_id, &s.runtime_id, basic_auth(), &s.context)
            .await,
        ErrorKind::NotFound
    );
    assert_error_kind!(
        s.registry
            .delete_api_auth(&s.api_id, &s.runtime_id, &s.context)
            .await,
        ErrorKind::NotFound
    );
    assert!(
        s.registry
            .api_auths(&s.api_id, &s.context)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_api_auths_ordered_by_runtime() {
    let s = setup().await;
    let mut runtime_ids = vec![s.runtime_id.clone()];
    for name in ["rt-2", "rt-3"] {
        let runtime = s
            .registry
            .register_runtime(runtime_input(name), &s.context)
            .await
            .unwrap();
        runtime_ids.push(runtime.id);
    }
    for runtime_id in &runtime_ids {
        s.registry
            .set_api_auth(&s.api_id, runtime_id, basic_auth(), &s.context)
            .await
            .unwrap();
    }

    let bindings = s.registry.api_auths(&s.api_id, &s.context).await.unwrap();
    let listed: Vec<String> = bindings.into_iter().map(|binding| binding.runtime_id).collect();
    runtime_ids.sort();
    assert_eq!(listed, runtime_ids);
}

#[tokio::test]
async fn test_credentials_are_redacted_in_debug_output() {
    let s = setup().await;
    let binding = s
        .registry
        .set_api_auth(&s.api_id, &s.runtime_id, basic_auth(), &s.context)
        .await
        .unwrap();

    let debug = format!("{:?}", binding);
    assert!(debug.contains("admin"));
    assert!(!debug.contains("secret"));
}
