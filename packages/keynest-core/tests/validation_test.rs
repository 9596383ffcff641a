use keynest_core::memory::MemoryKeyProvider;
use keynest_core::registry::{KeyRegistry, KeyStoreError};

fn empty_registry() -> KeyRegistry<MemoryKeyProvider> {
    KeyRegistry::new(MemoryKeyProvider::new()).expect("registry")
}

fn assert_not_found<T: std::fmt::Debug>(result: Result<T, KeyStoreError>) {
    assert!(
        matches!(result, Err(KeyStoreError::NotFound(_))),
        "expected NotFound, got {result:?}"
    );
}

#[test]
fn missing_alias_cannot_be_addressed() {
    let registry = empty_registry();
    assert_not_found(registry.by_alias("foo"));
    assert_not_found(registry.delete("foo"));
}

#[test]
fn empty_alias_cannot_be_addressed() {
    let registry = empty_registry();
    assert_not_found(registry.by_alias(""));
    assert_not_found(registry.delete(""));
}

#[test]
fn empty_alias_cannot_be_created() {
    let registry = empty_registry();
    let result = registry.create("");
    assert!(matches!(result, Err(KeyStoreError::InvalidInput(_))));
    assert_eq!(registry.count(), 0);
    assert_eq!(registry.generation(), 1);
}

#[test]
fn fresh_registry_is_empty() {
    let registry = empty_registry();
    assert_eq!(registry.count(), 0);
    assert!(registry.aliases().is_empty());
    assert!(registry.by_position(0).unwrap_err().is_boundary());
}

#[test]
fn error_messages_name_the_alias() {
    let registry = empty_registry();
    let err = registry.by_alias("foo").unwrap_err();
    assert_eq!(err.to_string(), "alias not found: foo");
    assert_eq!(
        KeyStoreError::Retired("foo".to_string()).to_string(),
        "key handle retired: foo"
    );
}
