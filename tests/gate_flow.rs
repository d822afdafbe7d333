//! End-to-end flows through the router, the session layer and the
//! migrated schema on in-memory SQLite.
#![cfg(feature = "migration")]

use std::path::PathBuf;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use bulletin::basic_auth::BasicCredentials;
use bulletin::credentials::NewAccount;
use bulletin::migration::{Migrator, MigratorTrait};
use bulletin::{router, AppState, GateSettings, LocaleSettings, SeaOrmStore};
use sea_orm::{ConnectOptions, Database};
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_sessions::SessionManagerLayer;

const HTML: &str = "text/html";
const JSON: &str = "application/json";

async fn setup() -> Router {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(opts).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let locales = LocaleSettings {
        dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("locales"),
        default_locale: "en".to_string(),
        available: vec!["en".to_string(), "cy".to_string()],
    };
    let state = AppState::new(db.clone(), GateSettings::default(), locales);

    for (login, password) in [("alice", "wonderland"), ("admin", "secret")] {
        state
            .accounts
            .register(NewAccount {
                firstname: "Test".to_string(),
                surname: login.to_string(),
                email: format!("{login}@example.test"),
                login: login.to_string(),
                password: password.to_string(),
                role: None,
            })
            .await
            .unwrap();
    }

    let sessions = SessionManagerLayer::new(SeaOrmStore::new(db)).with_secure(false);
    router(state).layer(sessions)
}

struct Call {
    builder: axum::http::request::Builder,
}

impl Call {
    fn new(method: &str, path: &str) -> Self {
        Self {
            builder: Request::builder().method(method).uri(path),
        }
    }

    fn get(path: &str) -> Self {
        Self::new("GET", path)
    }

    fn post(path: &str) -> Self {
        Self::new("POST", path)
    }

    fn accept(mut self, accept: &str) -> Self {
        self.builder = self.builder.header(header::ACCEPT, accept);
        self
    }

    fn cookie(mut self, cookie: &str) -> Self {
        self.builder = self.builder.header(header::COOKIE, cookie);
        self
    }

    fn basic(mut self, login: &str, password: &str) -> Self {
        let credentials = BasicCredentials {
            login: login.to_string(),
            password: password.to_string(),
        };
        let value = credentials.encode();
        self.builder = self.builder.header(header::AUTHORIZATION, value);
        self
    }

    async fn send(self, app: &Router) -> Response {
        self.send_body(app, Body::empty()).await
    }

    async fn form(self, app: &Router, body: &str) -> Response {
        let call = Self {
            builder: self
                .builder
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded"),
        };
        call.send_body(app, Body::from(body.to_string())).await
    }

    async fn json(self, app: &Router, body: Value) -> Response {
        let call = Self {
            builder: self.builder.header(header::CONTENT_TYPE, JSON),
        };
        call.send_body(app, Body::from(body.to_string())).await
    }

    async fn send_body(self, app: &Router, body: Body) -> Response {
        app.clone()
            .oneshot(self.builder.body(body).unwrap())
            .await
            .unwrap()
    }
}

fn session_cookie(res: &Response) -> Option<String> {
    res.headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

fn location(res: &Response) -> &str {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn text(res: Response) -> String {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn json_body(res: Response) -> Value {
    serde_json::from_str(&text(res).await).unwrap()
}

#[tokio::test]
async fn browser_is_sent_to_login_and_back() {
    let app = setup().await;

    let res = Call::get("/posts/search?q=surf")
        .accept(HTML)
        .send(&app)
        .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/session/new");
    let cookie = session_cookie(&res).expect("anonymous browser gets a session");

    let res = Call::get("/session/new").cookie(&cookie).send(&app).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(text(res).await.contains("Please log in"));

    let res = Call::post("/session")
        .accept(HTML)
        .cookie(&cookie)
        .form(&app, "login=alice&password=wonderland")
        .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/posts/search?q=surf");
    let logged_in = session_cookie(&res).expect("login issues a cookie");
    assert_ne!(logged_in, cookie, "session id is cycled on login");

    let res = Call::get("/posts/search?q=surf")
        .accept(HTML)
        .cookie(&logged_in)
        .send(&app)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(text(res).await.contains("Logged in successfully"));
}

#[tokio::test]
async fn login_returns_to_the_path_as_requested() {
    let app = setup().await;

    let res = Call::get("/posts/search.html?q=surf").send(&app).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/session/new");
    let cookie = session_cookie(&res).unwrap();

    let res = Call::post("/session")
        .accept(HTML)
        .cookie(&cookie)
        .form(&app, "login=alice&password=wonderland")
        .await;
    assert_eq!(location(&res), "/posts/search.html?q=surf");
}

#[tokio::test]
async fn bounce_back_keeps_the_format_extension() {
    let app = setup().await;

    let res = Call::get("/posts.json?page=2")
        .basic("alice", "wonderland")
        .send(&app)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res).unwrap();

    let res = Call::post("/session")
        .accept(HTML)
        .cookie(&cookie)
        .form(&app, "login=alice&password=wonderland")
        .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/posts.json?page=2");
}

#[tokio::test]
async fn failed_login_rerenders_form() {
    let app = setup().await;

    let res = Call::post("/session")
        .accept(HTML)
        .form(&app, "login=alice&password=nope")
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = text(res).await;
    assert!(body.contains("Invalid login or password"));
    assert!(body.contains("action=\"/session\""));

    let res = Call::post("/session")
        .accept(JSON)
        .form(&app, "login=alice&password=nope")
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn weighted_accept_prefers_html() {
    let app = setup().await;

    let res = Call::get("/posts")
        .accept("application/json;q=0.1, text/html")
        .send(&app)
        .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/session/new");
}

#[tokio::test]
async fn api_client_is_challenged() {
    let app = setup().await;

    let res = Call::get("/posts").accept(JSON).send(&app).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let challenge = res
        .headers()
        .get(header::WWW_AUTHENTICATE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(challenge, "Basic realm=\"Web Password\"");

    let res = Call::get("/posts.json")
        .basic("alice", "wrong")
        .send(&app)
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn basic_credentials_log_the_session_in() {
    let app = setup().await;

    let res = Call::get("/posts.json")
        .basic("alice", "wonderland")
        .send(&app)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res).expect("principal is written to the session");
    assert_eq!(json_body(res).await, json!([]));

    let res = Call::get("/posts")
        .accept(JSON)
        .cookie(&cookie)
        .send(&app)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_pages_are_guarded() {
    let app = setup().await;

    let res = Call::get("/users")
        .basic("alice", "wonderland")
        .send(&app)
        .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/");

    let res = Call::get("/users.json")
        .basic("alice", "wonderland")
        .send(&app)
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = Call::get("/users.json")
        .basic("admin", "secret")
        .send(&app)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let users = json_body(res).await;
    assert_eq!(users.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn unsupported_formats_are_refused() {
    let app = setup().await;

    let res = Call::get("/posts.xml")
        .basic("alice", "wonderland")
        .send(&app)
        .await;
    assert_eq!(res.status(), StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn locale_falls_back_with_notice() {
    let app = setup().await;

    let res = Call::get("/session/new?locale=xx").send(&app).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = text(res).await;
    assert!(body.contains("xx translation not available"));
    assert!(body.contains("lang=\"en\""));

    let res = Call::get("/session/new?locale=cy").send(&app).await;
    let cookie = session_cookie(&res).expect("locale sticks in the session");
    assert!(text(res).await.contains("Mewngofnodi"));

    let res = Call::get("/session/new").cookie(&cookie).send(&app).await;
    assert!(text(res).await.contains("lang=\"cy\""));
}

#[tokio::test]
async fn login_bounces_back_to_last_page() {
    let app = setup().await;

    let res = Call::post("/session")
        .accept(HTML)
        .form(&app, "login=alice&password=wonderland")
        .await;
    assert_eq!(location(&res), "/");
    let cookie = session_cookie(&res).unwrap();

    let res = Call::get("/posts")
        .accept(HTML)
        .cookie(&cookie)
        .send(&app)
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = Call::post("/session/logout")
        .accept(HTML)
        .cookie(&cookie)
        .send(&app)
        .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/session/new");

    let res = Call::get("/posts")
        .accept(JSON)
        .cookie(&cookie)
        .send(&app)
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = Call::post("/session")
        .accept(HTML)
        .cookie(&cookie)
        .form(&app, "login=alice&password=wonderland")
        .await;
    assert_eq!(location(&res), "/posts");
}

#[tokio::test]
async fn posting_and_notifications() {
    let app = setup().await;

    let res = Call::post("/posts")
        .accept(JSON)
        .basic("alice", "wonderland")
        .json(&app, json!({ "title": "Surfing", "body": "Waves today" }))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let thread_id = json_body(res).await["id"].as_i64().unwrap();

    let res = Call::post(&format!("/posts/{thread_id}/replies"))
        .accept(JSON)
        .basic("alice", "wonderland")
        .json(
            &app,
            json!({ "title": "Re: Surfing", "body": "Cold though", "anonymous": true }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = Call::post("/posts/999/replies")
        .accept(JSON)
        .basic("alice", "wonderland")
        .json(&app, json!({ "title": "Lost", "body": "Nobody home" }))
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = Call::get(&format!("/posts/{thread_id}.json"))
        .basic("alice", "wonderland")
        .send(&app)
        .await;
    let thread = json_body(res).await;
    assert_eq!(thread["title"], "Surfing");
    assert_eq!(thread["replies"][0]["author"], Value::Null);

    let res = Call::post("/broadcasts")
        .accept(JSON)
        .basic("admin", "secret")
        .json(
            &app,
            json!({ "content": "Reunion on Friday", "feeds": "notification" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = Call::get("/").basic("alice", "wonderland").send(&app).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(text(res).await.contains("Reunion on Friday"));
}
