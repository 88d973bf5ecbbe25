use super::*;

#[test]
fn test_error_messages() {
    assert_eq!(
        Error::AuthError("bad token".to_string()).to_string(),
        "Failed to authenticate or initialize GitHub client: bad token"
    );
    assert_eq!(Error::NotFound.to_string(), "Resource not found");
    assert_eq!(Error::PermissionDenied.to_string(), "Permission denied");
    assert_eq!(Error::RateLimitExceeded.to_string(), "Rate limit exceeded");
}

#[test]
fn test_rejected_carries_github_message() {
    let err = Error::Rejected("Reference already exists".to_string());
    assert!(err.to_string().contains("Reference already exists"));
}

#[test]
fn test_deserialization_error_converts() {
    let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Deserialization(_)));
}
