use axum::body::{to_bytes, Body};
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use learning_log_core::db::open_db_in_memory;
use learning_log_core::SearchCase;
use learning_log_web::{router, AppState, WebError};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: AppState,
}

impl TestApp {
    fn new() -> Self {
        Self::with_search_case(SearchCase::Sensitive)
    }

    fn with_search_case(search_case: SearchCase) -> Self {
        let state = AppState::new(open_db_in_memory().unwrap(), search_case);
        Self {
            router: router(state.clone()),
            state,
        }
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn post(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Registers `username` and returns the session cookie pair.
    async fn register(&self, username: &str) -> String {
        let body = format!("username={username}&password1=s3cret-pass&password2=s3cret-pass");
        let response = self.post("/users/register/", &body, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/topics/");
        session_cookie(&response)
    }

    async fn topic_id(&self, text: &str) -> i64 {
        self.scalar("SELECT id FROM topics WHERE text = ?1;", Some(text))
            .await
    }

    async fn entry_id(&self, text: &str) -> i64 {
        self.scalar("SELECT id FROM entries WHERE text = ?1;", Some(text))
            .await
    }

    async fn count(&self, table: &str) -> i64 {
        self.scalar(&format!("SELECT COUNT(*) FROM {table};"), None)
            .await
    }

    async fn scalar(&self, sql: &str, param: Option<&str>) -> i64 {
        let sql = sql.to_string();
        let param = param.map(str::to_string);
        self.state
            .with_conn(move |_, conn| {
                let params: Vec<&dyn rusqlite::ToSql> = match &param {
                    Some(value) => vec![value as &dyn rusqlite::ToSql],
                    None => Vec::new(),
                };
                conn.query_row(&sql, params.as_slice(), |row| row.get(0))
                    .map_err(|err| WebError::Internal(err.to_string()))
            })
            .await
            .unwrap()
    }
}

fn location(response: &Response) -> String {
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn session_cookie(response: &Response) -> String {
    let header = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .expect("session cookie is set");
    header.split(';').next().unwrap().to_string()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn index_is_public() {
    let app = TestApp::new();

    let response = app.get("/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Learning Log helps you"));
}

#[tokio::test]
async fn gated_routes_redirect_to_login_with_next() {
    let app = TestApp::new();

    for path in ["/topics/", "/topics/1/", "/new_topic/", "/new_entry/1/", "/edit_entry/1/"] {
        let response = app.get(path, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), format!("/users/login/?next={path}"));
    }

    let response = app.post("/new_topic/", "text=Chess", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.count("topics").await, 0);
}

#[tokio::test]
async fn bogus_session_cookie_is_treated_as_anonymous() {
    let app = TestApp::new();

    let response = app
        .get("/topics/", Some("learning_log_session=forged"))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn new_topic_flow_validates_then_redirects() {
    let app = TestApp::new();
    let cookie = app.register("ada").await;

    let form = app.get("/new_topic/", Some(&cookie)).await;
    assert_eq!(form.status(), StatusCode::OK);
    assert!(body_text(form).await.contains("Add a new topic"));

    let invalid = app.post("/new_topic/", "text=+++", Some(&cookie)).await;
    assert_eq!(invalid.status(), StatusCode::OK);
    assert!(body_text(invalid).await.contains("This field is required."));
    assert_eq!(app.count("topics").await, 0);

    let created = app.post("/new_topic/", "text=Chess", Some(&cookie)).await;
    assert_eq!(created.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&created), "/topics/");
    assert_eq!(app.count("topics").await, 1);

    let listed = app.get("/topics/", Some(&cookie)).await;
    assert_eq!(listed.status(), StatusCode::OK);
    assert!(body_text(listed).await.contains("Chess"));
}

#[tokio::test]
async fn overlong_topic_is_echoed_back() {
    let app = TestApp::new();
    let cookie = app.register("ada").await;
    let text = "z".repeat(201);

    let response = app
        .post("/new_topic/", &format!("text={text}"), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("at most 200 characters (it has 201)"));
    assert!(html.contains(&text));
}

#[tokio::test]
async fn topic_pages_are_private_to_owner() {
    let app = TestApp::new();
    let ada = app.register("ada").await;
    let bob = app.register("bob").await;
    app.post("/new_topic/", "text=Secret", Some(&ada)).await;
    let topic_id = app.topic_id("Secret").await;

    let own = app.get(&format!("/topics/{topic_id}/"), Some(&ada)).await;
    assert_eq!(own.status(), StatusCode::OK);
    assert!(body_text(own).await.contains("There are no entries for this topic yet."));

    let foreign = app.get(&format!("/topics/{topic_id}/"), Some(&bob)).await;
    let missing = app.get(&format!("/topics/{}/", topic_id + 50), Some(&bob)).await;
    let garbage = app.get("/topics/abc/", Some(&bob)).await;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(garbage.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(foreign).await, body_text(missing).await);

    let listed = body_text(app.get("/topics/", Some(&bob)).await).await;
    assert!(!listed.contains("Secret"));
}

#[tokio::test]
async fn entries_are_created_and_edited_through_forms() {
    let app = TestApp::new();
    let ada = app.register("ada").await;
    app.post("/new_topic/", "text=Rust", Some(&ada)).await;
    let topic_id = app.topic_id("Rust").await;

    let created = app
        .post(
            &format!("/new_entry/{topic_id}/"),
            "text=Ownership+is+neat",
            Some(&ada),
        )
        .await;
    assert_eq!(created.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&created), format!("/topics/{topic_id}/"));
    let entry_id = app.entry_id("Ownership is neat").await;

    let edit_form = app
        .get(&format!("/edit_entry/{entry_id}/"), Some(&ada))
        .await;
    assert_eq!(edit_form.status(), StatusCode::OK);
    assert!(body_text(edit_form).await.contains("Ownership is neat</textarea>"));

    let edited = app
        .post(
            &format!("/edit_entry/{entry_id}/"),
            "text=Borrowing+too",
            Some(&ada),
        )
        .await;
    assert_eq!(edited.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&edited), format!("/topics/{topic_id}/"));
    assert_eq!(app.entry_id("Borrowing too").await, entry_id);
    assert_eq!(app.count("entries").await, 1);

    let page = body_text(app.get(&format!("/topics/{topic_id}/"), Some(&ada)).await).await;
    assert!(page.contains("Borrowing too"));
    assert!(!page.contains("Ownership is neat"));
}

#[tokio::test]
async fn editing_someone_elses_entry_is_not_found() {
    let app = TestApp::new();
    let ada = app.register("ada").await;
    let bob = app.register("bob").await;
    app.post("/new_topic/", "text=Rust", Some(&ada)).await;
    let topic_id = app.topic_id("Rust").await;
    app.post(&format!("/new_entry/{topic_id}/"), "text=mine", Some(&ada))
        .await;
    let entry_id = app.entry_id("mine").await;

    let shown = app.get(&format!("/edit_entry/{entry_id}/"), Some(&bob)).await;
    assert_eq!(shown.status(), StatusCode::NOT_FOUND);

    let submitted = app
        .post(&format!("/edit_entry/{entry_id}/"), "text=hijacked", Some(&bob))
        .await;
    assert_eq!(submitted.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.entry_id("mine").await, entry_id);
}

#[tokio::test]
async fn new_entry_for_missing_topic_is_not_found() {
    let app = TestApp::new();
    let ada = app.register("ada").await;

    let response = app.get("/new_entry/999/", Some(&ada)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_is_public_and_case_sensitive_by_default() {
    let app = TestApp::new();
    let ada = app.register("ada").await;
    let bob = app.register("bob").await;
    app.post("/new_topic/", "text=Chess+strategies", Some(&ada))
        .await;
    app.post("/new_topic/", "text=Checkers", Some(&bob)).await;

    let form = app.get("/search/", None).await;
    assert_eq!(form.status(), StatusCode::OK);

    let exact = body_text(app.post("/search/", "query=Chess", None).await).await;
    assert!(exact.contains("Chess strategies"));
    assert!(!exact.contains("Checkers"));

    let lower = body_text(app.post("/search/", "query=chess", None).await).await;
    assert!(lower.contains("No topics matched your search."));

    let blank = body_text(app.post("/search/", "query=", None).await).await;
    assert!(blank.contains("This field is required."));
}

#[tokio::test]
async fn insensitive_search_policy_matches_lowercase_query() {
    let app = TestApp::with_search_case(SearchCase::Insensitive);
    let ada = app.register("ada").await;
    app.post("/new_topic/", "text=Chess+strategies", Some(&ada))
        .await;
    app.post("/new_topic/", "text=Checkers", Some(&ada)).await;

    let html = body_text(app.post("/search/", "query=chess", None).await).await;
    assert!(html.contains("Chess strategies"));
    assert!(!html.contains("Checkers"));
}

#[tokio::test]
async fn login_honours_local_next_and_rejects_bad_password() {
    let app = TestApp::new();
    app.register("ada").await;

    let rejected = app
        .post(
            "/users/login/?next=/new_topic/",
            "username=ada&password=wrong-pass",
            None,
        )
        .await;
    assert_eq!(rejected.status(), StatusCode::OK);
    assert!(body_text(rejected)
        .await
        .contains("Please enter a correct username and password."));

    let accepted = app
        .post(
            "/users/login/?next=/new_topic/",
            "username=ada&password=s3cret-pass",
            None,
        )
        .await;
    assert_eq!(accepted.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&accepted), "/new_topic/");
    let cookie = session_cookie(&accepted);
    assert_eq!(
        app.get("/new_topic/", Some(&cookie)).await.status(),
        StatusCode::OK
    );

    for next in ["/%0A", "/%09/evil.example", "/topics/%0D%0ASet-Cookie:%20x=1"] {
        let response = app
            .post(
                &format!("/users/login/?next={next}"),
                "username=ada&password=s3cret-pass",
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{next}");
        assert_eq!(location(&response), "/topics/", "{next}");
    }

    let offsite = app
        .post(
            "/users/login/?next=//evil.example/",
            "username=ada&password=s3cret-pass",
            None,
        )
        .await;
    assert_eq!(location(&offsite), "/topics/");
}

#[tokio::test]
async fn logout_ends_session() {
    let app = TestApp::new();
    let cookie = app.register("ada").await;

    let response = app.post("/users/logout/", "", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let after = app.get("/topics/", Some(&cookie)).await;
    assert_eq!(after.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn topic_text_is_html_escaped() {
    let app = TestApp::new();
    let ada = app.register("ada").await;
    app.post("/new_topic/", "text=%3Cscript%3Ealert(1)%3C%2Fscript%3E", Some(&ada))
        .await;

    let html = body_text(app.get("/topics/", Some(&ada)).await).await;
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!html.contains("<script>"));
}

#[tokio::test]
async fn unknown_route_renders_not_found_page() {
    let app = TestApp::new();

    let response = app.get("/nope/", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Not Found"));
}
