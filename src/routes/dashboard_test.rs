use super::*;

#[test]
fn not_found_maps_to_404() {
    assert_eq!(
        platform_error_status(&PlatformError::NotFound),
        StatusCode::NOT_FOUND
    );
}

#[test]
fn client_errors_map_to_bad_request() {
    let err = PlatformError::Api { status: 403, message: "row-level security".into() };
    assert_eq!(platform_error_status(&err), StatusCode::BAD_REQUEST);
}

#[test]
fn upstream_failures_map_to_bad_gateway() {
    let err = PlatformError::Api { status: 500, message: "oops".into() };
    assert_eq!(platform_error_status(&err), StatusCode::BAD_GATEWAY);

    let err = PlatformError::Request("connection reset".into());
    assert_eq!(platform_error_status(&err), StatusCode::BAD_GATEWAY);
}

#[test]
fn parse_failures_map_to_internal_error() {
    let err = PlatformError::Parse("unexpected shape".into());
    assert_eq!(platform_error_status(&err), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn confirm_query_defaults_to_false() {
    let query: ConfirmQuery = serde_json::from_str("{}").unwrap();
    assert!(!query.confirm);

    let query: ConfirmQuery = serde_json::from_str("{\"confirm\":true}").unwrap();
    assert!(query.confirm);
}

#[test]
fn project_body_description_is_optional() {
    let body: ProjectBody = serde_json::from_str("{\"title\":\"T\"}").unwrap();
    assert_eq!(body.title, "T");
    assert!(body.description.is_none());
}
