// File: tests/api_client.rs
use mockito::{Matcher, Server};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use taskboard::client::{ApiClient, UnauthorizedHook};
use taskboard::error::ApiError;
use taskboard::model::{Credentials, NewTask, ProfileUpdate, TaskUpdate};
use taskboard::session::{MemorySessionStore, SessionStore, SharedSession};

fn client(url: &str, session: SharedSession) -> ApiClient {
    ApiClient::new(url, session, UnauthorizedHook::noop()).expect("client")
}

fn counting_client(url: &str, session: SharedSession) -> (ApiClient, Arc<AtomicUsize>) {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    let hook = UnauthorizedHook::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (ApiClient::new(url, session, hook).expect("client"), fired)
}

#[tokio::test]
async fn sign_in_stores_token_and_later_calls_carry_it() {
    let mut server = Server::new_async().await;
    let session = MemorySessionStore::shared();
    let api = client(&server.url(), session.clone());

    let m_login = server
        .mock("POST", "/auth/login")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::Json(serde_json::json!({
            "email": "ann@example.com",
            "password": "secret"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"token":"abc.def.ghi"}"#)
        .expect(1)
        .create_async()
        .await;

    let m_me = server
        .mock("GET", "/users/me")
        .match_header("authorization", "Bearer abc.def.ghi")
        .with_status(200)
        .with_body(r#"{"name":"Ann","email":"ann@example.com"}"#)
        .expect(1)
        .create_async()
        .await;

    api.sign_in(&Credentials {
        email: "ann@example.com".into(),
        password: "secret".into(),
    })
    .await
    .unwrap();
    assert_eq!(session.get().as_deref(), Some("abc.def.ghi"));

    let me = api.get_profile().await.unwrap();
    assert_eq!(me.name, "Ann");

    m_login.assert_async().await;
    m_me.assert_async().await;
}

#[tokio::test]
async fn token_change_is_seen_by_the_next_request() {
    let mut server = Server::new_async().await;
    let session = MemorySessionStore::shared();
    let api = client(&server.url(), session.clone());

    let m_anon = server
        .mock("GET", "/users/me")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;
    api.get_profile().await.unwrap();
    m_anon.assert_async().await;

    session.set("second").unwrap();
    let m_auth = server
        .mock("GET", "/users/me")
        .match_header("authorization", "Bearer second")
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;
    api.get_profile().await.unwrap();
    m_auth.assert_async().await;
}

#[tokio::test]
async fn unauthorized_clears_session_and_fires_hook() {
    let mut server = Server::new_async().await;
    let session: SharedSession = Arc::new(MemorySessionStore::with_token("stale"));
    let (api, fired) = counting_client(&server.url(), session.clone());

    let _m = server
        .mock("GET", "/tasks")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"message":"jwt expired"}"#)
        .create_async()
        .await;

    let err = api.list_tasks(1, 10).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(session.get().is_none());
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unauthorized_on_login_also_fires() {
    let mut server = Server::new_async().await;
    let session = MemorySessionStore::shared();
    let (api, fired) = counting_client(&server.url(), session.clone());

    let _m = server
        .mock("POST", "/auth/login")
        .with_status(401)
        .with_body(r#"{"message":"Invalid credentials"}"#)
        .create_async()
        .await;

    let err = api
        .sign_in(&Credentials {
            email: "ann@example.com".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Unauthorized {
            message: Some("Invalid credentials".into())
        }
    );
    assert_eq!(err.message_or("Login failed"), "Invalid credentials");
    assert!(session.get().is_none());
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_unauthorized_responses_each_fire_once() {
    let mut server = Server::new_async().await;
    let session: SharedSession = Arc::new(MemorySessionStore::with_token("stale"));
    let (api, fired) = counting_client(&server.url(), session.clone());

    let m = server
        .mock("GET", "/users/me")
        .with_status(401)
        .expect(3)
        .create_async()
        .await;

    let (a, b, c) = tokio::join!(api.get_profile(), api.get_profile(), api.get_profile());
    assert!(a.unwrap_err().is_unauthorized());
    assert!(b.unwrap_err().is_unauthorized());
    assert!(c.unwrap_err().is_unauthorized());

    assert!(session.get().is_none());
    assert_eq!(fired.load(Ordering::SeqCst), 3);
    m.assert_async().await;
}

#[tokio::test]
async fn other_errors_leave_session_alone() {
    let mut server = Server::new_async().await;
    let session: SharedSession = Arc::new(MemorySessionStore::with_token("tok"));
    let (api, fired) = counting_client(&server.url(), session.clone());

    let _m_422 = server
        .mock("POST", "/tasks")
        .with_status(422)
        .with_body(r#"{"message":"Title too long"}"#)
        .create_async()
        .await;
    let _m_500 = server
        .mock("DELETE", "/tasks/t1")
        .with_status(500)
        .with_body("<html>oops</html>")
        .create_async()
        .await;

    let err = api
        .create_task(&NewTask {
            title: "x".repeat(500),
            description: String::new(),
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Rejected {
            status: 422,
            message: Some("Title too long".into())
        }
    );
    assert_eq!(err.message_or("Failed to add task"), "Title too long");

    let err = api.delete_task("t1").await.unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 500, message: None }));
    assert_eq!(err.message_or("Failed to delete task"), "Failed to delete task");

    assert_eq!(session.get().as_deref(), Some("tok"));
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    // Grab a free port, then close it so nothing listens there.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let session: SharedSession = Arc::new(MemorySessionStore::with_token("tok"));
    let (api, fired) = counting_client(&format!("http://127.0.0.1:{}", port), session.clone());

    let err = api.list_tasks(1, 10).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got {:?}", err);
    assert_eq!(session.get().as_deref(), Some("tok"));
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn task_endpoints_use_expected_shapes() {
    let mut server = Server::new_async().await;
    let api = client(
        &format!("{}/api/", server.url()),
        Arc::new(MemorySessionStore::with_token("tok")),
    );

    let m_list = server
        .mock("GET", "/api/tasks")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("limit".into(), "10".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"tasks":[{"_id":"a1","title":"Milk","description":"2l","completed":false}],
                "currentPage":2,"totalPages":2}"#,
        )
        .create_async()
        .await;

    let m_put = server
        .mock("PUT", "/api/tasks/a1")
        .match_body(Matcher::Json(serde_json::json!({
            "title": "Milk",
            "description": "2l",
            "completed": true
        })))
        .with_status(200)
        .with_body(r#"{"id":"a1","title":"Milk","completed":true}"#)
        .create_async()
        .await;

    let page = api.list_tasks(2, 10).await.unwrap();
    assert_eq!(page.current_page, 2);
    assert_eq!(page.items[0].id, "a1");

    let update = TaskUpdate {
        completed: true,
        ..page.items[0].to_update()
    };
    let updated = api.update_task("a1", &update).await.unwrap();
    assert!(updated.completed);

    m_list.assert_async().await;
    m_put.assert_async().await;
}

#[tokio::test]
async fn unsafe_task_id_never_hits_the_network() {
    let server = Server::new_async().await;
    let api = client(&server.url(), MemorySessionStore::shared());
    let err = api.delete_task("../users/me").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidUrl(_)));
}

#[tokio::test]
async fn profile_update_omits_blank_password_and_tolerates_empty_body() {
    let mut server = Server::new_async().await;
    let api = client(&server.url(), Arc::new(MemorySessionStore::with_token("tok")));

    let m = server
        .mock("PUT", "/users/me")
        .match_body(Matcher::Json(serde_json::json!({
            "name": "Annie",
            "email": "ann@example.com"
        })))
        .with_status(200)
        .with_body("")
        .expect(1)
        .create_async()
        .await;

    let echoed = api
        .update_profile(&ProfileUpdate {
            name: Some("Annie".into()),
            email: Some("ann@example.com".into()),
            password: None,
        })
        .await
        .unwrap();
    assert_eq!(echoed.name, None);
    m.assert_async().await;
}
