use snapvault_core::errors::{ExError, ExErrorKind, ValueError};

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (ExErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
        (ExErrorKind::PreconditionFailed, "ERR_PRECONDITION_FAILED"),
        (ExErrorKind::Conflict, "ERR_CONFLICT"),
        (ExErrorKind::Concurrency, "ERR_CONCURRENCY"),
        (ExErrorKind::DataIntegrity, "ERR_DATA_INTEGRITY"),
        (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
        (ExErrorKind::Serialization, "ERR_SERIALIZATION"),
        (ExErrorKind::Config, "ERR_CONFIG"),
        (ExErrorKind::Io, "ERR_IO"),
        (ExErrorKind::Internal, "ERR_INTERNAL"),
    ];

    let mut seen = std::collections::HashSet::new();
    for (kind, code) in kinds {
        assert_eq!(kind.code(), code);
        assert!(seen.insert(code), "duplicate code {}", code);
    }
}

#[test]
fn test_only_conflict_and_concurrency_are_retriable() {
    assert!(ExError::new(ExErrorKind::Conflict).is_retriable());
    assert!(ExError::new(ExErrorKind::Concurrency).is_retriable());
    assert!(!ExError::new(ExErrorKind::NotFound).is_retriable());
    assert!(!ExError::new(ExErrorKind::Persistence).is_retriable());
    assert!(!ExError::new(ExErrorKind::DataIntegrity).is_retriable());
}

#[test]
fn test_structured_context_accessors() {
    let err = ExError::new(ExErrorKind::NotFound)
        .with_op("set_asset_storage_location")
        .with_media_package_id("mp-1")
        .with_version(2)
        .with_element_id("track-1")
        .with_message("asset not found");

    assert_eq!(err.op(), Some("set_asset_storage_location"));
    assert_eq!(err.media_package_id(), Some("mp-1"));
    assert_eq!(err.version(), Some(2));
    assert_eq!(err.element_id(), Some("track-1"));
    assert_eq!(err.message(), "asset not found");
}

#[test]
fn test_value_error_message_preserved() {
    let err: ExError = ValueError::UnknownAvailability {
        value: "ARCHIVED".into(),
    }
    .into();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    assert!(err.message().contains("ARCHIVED"));
}
