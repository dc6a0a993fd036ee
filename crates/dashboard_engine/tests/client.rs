use std::sync::Arc;
use std::time::Duration;

use dashboard_core::{NewArtist, Service, Target};
use dashboard_engine::{
    ApiClient, ClientSettings, DashboardApi, Endpoint, Endpoints, FailureKind, ReqwestApiClient,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn endpoints_for(server: &MockServer) -> Endpoints {
    let mut endpoints = Endpoints::new();
    for service in [
        Service::Auth,
        Service::Artists,
        Service::Events,
        Service::Email,
        Service::Logs,
    ] {
        endpoints = endpoints
            .with_base(service, &format!("{}/{}", server.uri(), service))
            .expect("valid base url");
    }
    endpoints
}

fn client_for(server: &MockServer) -> ReqwestApiClient {
    ReqwestApiClient::new(endpoints_for(server), &ClientSettings::default()).expect("client")
}

fn api_for(server: &MockServer) -> DashboardApi {
    DashboardApi::new(Arc::new(client_for(server)))
}

#[tokio::test]
async fn get_sends_query_params_and_parses_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events/unassigned"))
        .and(query_param("calendar", "Clown"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"calendar": "Clown"}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .get(
            &Endpoint::new(Service::Events, "/unassigned"),
            &[("calendar", "Clown")],
        )
        .await
        .expect("get ok");

    assert_eq!(response.status, 200);
    assert_eq!(response.data, json!([{"calendar": "Clown"}]));
}

#[tokio::test]
async fn non_success_status_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logs/logs"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get(&Endpoint::for_target(Target::Logs), &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
}

#[tokio::test]
async fn slow_response_is_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/email/api/v1/email"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!([])),
        )
        .mount(&server)
        .await;

    let settings = ClientSettings {
        request_timeout: Duration::from_millis(50),
        ..ClientSettings::default()
    };
    let client = ReqwestApiClient::new(endpoints_for(&server), &settings).unwrap();
    let err = client
        .get(&Endpoint::for_target(Target::Emails), &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    let endpoints = Endpoints::new()
        .with_base(Service::Logs, "http://127.0.0.1:1/")
        .unwrap();
    let client = ReqwestApiClient::new(endpoints, &ClientSettings::default()).unwrap();
    let err = client
        .get(&Endpoint::for_target(Target::Logs), &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Network);
}

#[tokio::test]
async fn unconfigured_service_fails_before_sending() {
    let client = ReqwestApiClient::new(Endpoints::new(), &ClientSettings::default()).unwrap();
    let err = client
        .get(&Endpoint::for_target(Target::Artists), &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::UnknownEndpoint);
}

#[tokio::test]
async fn empty_body_is_null_and_garbage_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .post(&Endpoint::new(Service::Auth, "/logout"), &json!({}))
        .await
        .unwrap();
    assert_eq!(response.data, Value::Null);

    let err = client
        .get(&Endpoint::new(Service::Auth, "/me"), &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn session_cookie_from_login_is_sent_afterwards() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "admin@kks.de", "password": "geheim123"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "session=abc123; Path=/")
                .set_body_json(json!({"success": true})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("cookie", "session=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"Role": "Admin", "Name": "Anna", "_id": "u1", "E-Mail": "admin@kks.de"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    api.login(" admin@kks.de ", "geheim123").await.expect("login");
    let me = api.me().await.expect("me");

    assert_eq!(me.role, "Admin");
    assert_eq!(me.name, "Anna");
    assert_eq!(me.id, "u1");
    assert_eq!(me.email, "admin@kks.de");
}

#[tokio::test]
async fn invalid_artist_form_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let form = NewArtist {
        name: "Zauberer Zappo".to_string(),
        email: "kein-at-zeichen".to_string(),
        calendar: "Zauberer".to_string(),
        role: "Artist".to_string(),
        phone: None,
    };
    let err = api_for(&server).create_artist(&form).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Validation);
    assert!(err.message.contains("E-Mail"));
}

#[tokio::test]
async fn artist_crud_uses_service_contract() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/artists/"))
        .and(body_json(json!({
            "Name": "Zauberer Zappo",
            "E-Mail": "zappo@kks.de",
            "calendar": "Zauberer",
            "role": "Artist"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": "a1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/artists/"))
        .and(body_json(json!({"calendar": "Zauberer", "email": "zappo@kks.de"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/artists/calendars"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["Clown", "Zauberer"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/artists/roleOptions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": [{"name": "Artist"}, {"name": "Admin"}]})),
        )
        .mount(&server)
        .await;

    let api = api_for(&server);
    let form = NewArtist {
        name: "Zauberer Zappo".to_string(),
        email: "zappo@kks.de".to_string(),
        calendar: "Zauberer".to_string(),
        role: "Artist".to_string(),
        phone: None,
    };
    let created = api.create_artist(&form).await.unwrap();
    assert_eq!(created["_id"], "a1");
    api.delete_artist("Zauberer", "zappo@kks.de").await.unwrap();
    assert_eq!(api.calendars().await.unwrap(), vec!["Clown", "Zauberer"]);
    assert_eq!(api.role_options().await.unwrap(), vec!["Artist", "Admin"]);
}

#[tokio::test]
async fn logs_and_single_email_are_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logs/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "count": 2,
            "data": [
                {"service": "auth", "level": "info", "message": "login"},
                {"service": "mail", "level": "error", "message": "bounce"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/email/api/v1/email/m%201"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"subject": "Anfrage", "type": "booking"}})),
        )
        .mount(&server)
        .await;

    let api = api_for(&server);
    let logs = api.logs().await.unwrap();
    assert!(logs.success);
    assert_eq!(logs.count, 2);
    assert_eq!(logs.data[1].text("level").as_deref(), Some("error"));

    let email = api.email("m 1").await.unwrap();
    assert_eq!(email.text("subject").as_deref(), Some("Anfrage"));
}

#[tokio::test]
async fn password_reset_patches_token_path() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/auth/resetPassword/tok-42"))
        .and(body_json(json!({"password": "neues-passwort"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    api.reset_password("tok-42", "neues-passwort").await.unwrap();
    let err = api.reset_password("tok-42", "kurz").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Validation);
}

#[tokio::test]
async fn saved_session_cookie_can_be_restored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logs/logs"))
        .and(header("cookie", "session=restored"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "count": 0, "data": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.session_cookie(), None);
    client.restore_session_cookie("session=restored");
    assert_eq!(client.session_cookie().as_deref(), Some("session=restored"));

    let api = DashboardApi::new(Arc::new(client));
    let logs = api.logs().await.unwrap();
    assert!(logs.data.is_empty());
}
