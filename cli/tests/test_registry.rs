//! Alias registry and resolver integration tests

mod common;

use common::MockPlatform;
use nimbus::errors::CliError;
use nimbus::registry::{AliasRegistry, AliasResolver};

#[tokio::test]
async fn test_bind_resolve_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let registry = AliasRegistry::at(dir.path().join(".nimbus.json"));

    let app = common::app("app_1");
    registry.bind("web", &app).await.unwrap();

    let resolved = registry.resolve("web").await.unwrap();
    assert_eq!(resolved, Some(app));
}

#[tokio::test]
async fn test_unbind_removes_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let registry = AliasRegistry::at(dir.path().join(".nimbus.json"));

    registry.bind("web", &common::app("app_1")).await.unwrap();
    assert!(registry.unbind("web").await.unwrap());

    // No stale resolution after unlink
    assert_eq!(registry.resolve("web").await.unwrap(), None);
    assert!(!registry.unbind("web").await.unwrap());
}

#[tokio::test]
async fn test_rebinding_replaces_entry() {
    let dir = tempfile::tempdir().unwrap();
    let registry = AliasRegistry::at(dir.path().join(".nimbus.json"));

    registry.bind("web", &common::app("app_1")).await.unwrap();
    registry.bind("web", &common::app("app_2")).await.unwrap();

    let resolved = registry.resolve("web").await.unwrap().unwrap();
    assert_eq!(resolved.id, "app_2");
    assert_eq!(registry.entries().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_discover_walks_up_the_tree() {
    let dir = tempfile::tempdir().unwrap();
    let registry = AliasRegistry::at(dir.path().join(".nimbus.json"));
    registry.bind("web", &common::app("app_1")).await.unwrap();

    let nested = dir.path().join("a").join("b");
    std::fs::create_dir_all(&nested).unwrap();

    let found = AliasRegistry::discover(&nested);
    assert_eq!(found.path(), dir.path().join(".nimbus.json"));
    assert!(found.resolve("web").await.unwrap().is_some());
}

#[tokio::test]
async fn test_resolver_unknown_alias() {
    let dir = tempfile::tempdir().unwrap();
    let registry = AliasRegistry::at(dir.path().join(".nimbus.json"));
    let platform = MockPlatform::new();

    let resolver = AliasResolver::new(&registry, &platform);
    match resolver.resolve(Some("ghost"), None).await {
        Err(CliError::UnknownAlias(alias)) => assert_eq!(alias, "ghost"),
        other => panic!("expected UnknownAlias, got {:?}", other),
    }
}

#[tokio::test]
async fn test_resolver_defaults_to_single_entry() {
    let dir = tempfile::tempdir().unwrap();
    let registry = AliasRegistry::at(dir.path().join(".nimbus.json"));
    let platform = MockPlatform::new();
    let resolver = AliasResolver::new(&registry, &platform);

    // Nothing linked: no default to fall back on
    match resolver.resolve(None, None).await {
        Err(CliError::UnresolvedAlias) => {}
        other => panic!("expected UnresolvedAlias, got {:?}", other),
    }

    registry.bind("web", &common::app("app_1")).await.unwrap();
    let resolved = resolver.resolve(None, None).await.unwrap();
    assert_eq!(resolved.id, "app_1");

    // Two entries: ambiguous again
    registry.bind("api", &common::app("app_2")).await.unwrap();
    match resolver.resolve(None, None).await {
        Err(CliError::UnresolvedAlias) => {}
        other => panic!("expected UnresolvedAlias, got {:?}", other),
    }
}

#[tokio::test]
async fn test_resolver_explicit_id_bypasses_registry() {
    let dir = tempfile::tempdir().unwrap();
    let registry = AliasRegistry::at(dir.path().join(".nimbus.json"));
    let platform = MockPlatform::new();
    platform.apps.lock().unwrap().push(common::app("app_9"));

    let resolver = AliasResolver::new(&registry, &platform);
    let resolved = resolver.resolve(None, Some("app_9")).await.unwrap();
    assert_eq!(resolved.id, "app_9");
}
