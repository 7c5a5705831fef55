use qweather_core::{ClientSettings, SetupError, lookup_city};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn settings(server: &MockServer) -> ClientSettings {
    ClientSettings { geo_host: server.uri(), ..ClientSettings::default() }
}

#[tokio::test]
async fn returns_first_city() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/city/lookup"))
        .and(query_param("location", "121.47,31.23"))
        .and(query_param("key", "KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "200",
            "location": [
                {"id": "101020100", "name": "上海", "adm1": "上海市", "adm2": "上海", "country": "中国", "tz": "Asia/Shanghai"},
                {"id": "101020200", "name": "闵行"}
            ]
        })))
        .mount(&server)
        .await;

    let city = lookup_city(&reqwest::Client::new(), &settings(&server), "KEY", 121.4737, 31.2304)
        .await
        .unwrap();

    assert_eq!(city.id, "101020100");
    assert_eq!(city.name, "上海");
    assert_eq!(city.tz.as_deref(), Some("Asia/Shanghai"));
}

#[tokio::test]
async fn empty_location_list_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/city/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "200", "location": []})))
        .mount(&server)
        .await;

    let err = lookup_city(&reqwest::Client::new(), &settings(&server), "KEY", 0.0, 0.0).await.unwrap_err();
    assert!(matches!(err, SetupError::NotFound(ref at) if at == "0.00,0.00"));
}

#[tokio::test]
async fn in_body_error_code_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/city/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "401"})))
        .mount(&server)
        .await;

    let err = lookup_city(&reqwest::Client::new(), &settings(&server), "BAD", 121.47, 31.23).await.unwrap_err();
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn http_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/city/lookup"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let err = lookup_city(&reqwest::Client::new(), &settings(&server), "KEY", 121.47, 31.23).await.unwrap_err();
    match err {
        SetupError::Status { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "forbidden");
        }
        other => panic!("unexpected error: {other}"),
    }
}
