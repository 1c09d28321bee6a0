use bloglist_api::app::services::AppServices;
use bloglist_auth::TokenClaims;
use bloglist_core::UserId;
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

const JWT_SECRET: &str = "test-secret";
const TEST_BCRYPT_COST: u32 = 4;

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let services = AppServices::in_memory(JWT_SECRET, TEST_BCRYPT_COST);
        let app = bloglist_api::app::build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn register(&self, username: &str, password: &str) -> Value {
        let res = self
            .client
            .post(self.url("/api/users"))
            .json(&json!({ "username": username, "name": "Test User", "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        res.json().await.unwrap()
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let res = self
            .client
            .post(self.url("/api/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    /// Register + login in one go.
    async fn user_token(&self, username: &str) -> (String, String) {
        let user = self.register(username, "sekret").await;
        let token = self.login(username, "sekret").await;
        (user["id"].as_str().unwrap().to_string(), token)
    }

    async fn create_blog(&self, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/blogs"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn blogs(&self) -> Vec<Value> {
        let res = self.client.get(self.url("/api/blogs")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        res.json().await.unwrap()
    }

    async fn users(&self) -> Vec<Value> {
        let res = self.client.get(self.url("/api/users")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        res.json().await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(secret: &str, id: UserId, issued_at: chrono::DateTime<Utc>, ttl: ChronoDuration) -> String {
    let claims = TokenClaims::issue(id, "someone", issued_at, ttl);

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn sample_blog() -> Value {
    json!({
        "title": "React patterns",
        "author": "Michael Chan",
        "url": "https://reactpatterns.com/",
        "likes": 7,
    })
}

async fn error_of(res: reqwest::Response) -> String {
    let body: Value = res.json().await.unwrap();
    body["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_paths_are_404() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/api/nothing-here")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(res).await, "unknown endpoint");
}

#[tokio::test]
async fn registration_returns_user_without_password() {
    let srv = TestServer::spawn().await;
    let user = srv.register("wwwemmm", "helloworld").await;

    assert_eq!(user["username"], "wwwemmm");
    assert_eq!(user["name"], "Test User");
    assert_eq!(user["blogs"], json!([]));
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());
}

#[tokio::test]
async fn short_username_is_rejected() {
    let srv = TestServer::spawn().await;
    let res = srv
        .client
        .post(srv.url("/api/users"))
        .json(&json!({ "username": "ab", "name": "X", "password": "longpw" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let error = error_of(res).await;
    assert!(error.contains("shorter than the minimum allowed length (3)"), "{error}");
    assert!(srv.users().await.is_empty());
}

#[tokio::test]
async fn short_password_is_rejected_without_echo() {
    let srv = TestServer::spawn().await;
    let res = srv
        .client
        .post(srv.url("/api/users"))
        .json(&json!({ "username": "superhero", "password": "pw" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let error = error_of(res).await;
    assert_eq!(
        error,
        "User validation failed: password: Path `password` is shorter than the minimum allowed length (3)."
    );
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let srv = TestServer::spawn().await;
    srv.register("root", "sekret").await;

    let res = srv
        .client
        .post(srv.url("/api/users"))
        .json(&json!({ "username": "root", "name": "Again", "password": "salainen" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let error = error_of(res).await;
    assert!(error.contains("expected `username` to be unique"), "{error}");
    assert_eq!(srv.users().await.len(), 1);
}

#[tokio::test]
async fn login_with_wrong_password_is_401() {
    let srv = TestServer::spawn().await;
    srv.register("root", "sekret").await;

    for (username, password) in [("root", "wrong"), ("nobody", "sekret")] {
        let res = srv
            .client
            .post(srv.url("/api/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_of(res).await, "invalid username or password");
    }
}

#[tokio::test]
async fn login_returns_token_username_and_name() {
    let srv = TestServer::spawn().await;
    srv.register("root", "sekret").await;

    let res = srv
        .client
        .post(srv.url("/api/login"))
        .json(&json!({ "username": "root", "password": "sekret" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["token"].as_str().is_some_and(|t| t.split('.').count() == 3));
    assert_eq!(body["username"], "root");
    assert_eq!(body["name"], "Test User");
}

#[tokio::test]
async fn blog_creation_defaults_likes_and_links_owner() {
    let srv = TestServer::spawn().await;
    let (user_id, token) = srv.user_token("root").await;

    let res = srv
        .create_blog(&token, json!({ "title": "T", "url": "http://x" }))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["likes"], 0);
    assert_eq!(created["user"], user_id.as_str());

    let blogs = srv.blogs().await;
    assert_eq!(blogs.len(), 1);
    assert_eq!(blogs[0]["user"]["username"], "root");
    assert_eq!(blogs[0]["user"]["id"], user_id.as_str());

    let users = srv.users().await;
    assert_eq!(users[0]["blogs"][0]["id"], created["id"]);
    assert_eq!(users[0]["blogs"][0]["title"], "T");
}

#[tokio::test]
async fn created_blog_keeps_given_likes() {
    let srv = TestServer::spawn().await;
    let (_, token) = srv.user_token("root").await;

    let res = srv.create_blog(&token, sample_blog()).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["likes"], 7);
    assert_eq!(created["author"], "Michael Chan");
}

#[tokio::test]
async fn blog_creation_requires_token() {
    let srv = TestServer::spawn().await;
    let res = srv
        .client
        .post(srv.url("/api/blogs"))
        .json(&sample_blog())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await, "token missing or invalid");
    assert!(srv.blogs().await.is_empty());
}

#[tokio::test]
async fn blog_without_title_or_url_is_rejected() {
    let srv = TestServer::spawn().await;
    let (_, token) = srv.user_token("root").await;

    let res = srv.create_blog(&token, json!({ "author": "Nobody" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let error = error_of(res).await;
    assert!(error.starts_with("Blog validation failed:"), "{error}");
    assert!(error.contains("`title` is required"), "{error}");
    assert!(error.contains("`url` is required"), "{error}");

    let res = srv
        .create_blog(&token, json!({ "title": "T", "url": "http://x", "likes": -1 }))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(srv.blogs().await.is_empty());
}

#[tokio::test]
async fn unparsable_body_is_400() {
    let srv = TestServer::spawn().await;
    let (_, token) = srv.user_token("root").await;

    let res = srv
        .client
        .post(srv.url("/api/blogs"))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(!error_of(res).await.is_empty());
}

#[tokio::test]
async fn non_owner_cannot_delete() {
    let srv = TestServer::spawn().await;
    let (_, owner_token) = srv.user_token("owner").await;
    let (_, other_token) = srv.user_token("mallory").await;

    let created: Value = srv.create_blog(&owner_token, sample_blog()).await.json().await.unwrap();
    let id = created["id"].as_str().unwrap();

    let res = srv
        .client
        .delete(srv.url(&format!("/api/blogs/{id}")))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await, "only the creator can delete a blog");
    assert_eq!(srv.blogs().await.len(), 1);
}

#[tokio::test]
async fn owner_delete_removes_exactly_one_blog() {
    let srv = TestServer::spawn().await;
    let (_, token) = srv.user_token("root").await;

    let first: Value = srv.create_blog(&token, sample_blog()).await.json().await.unwrap();
    srv.create_blog(&token, json!({ "title": "Second", "url": "http://second" }))
        .await;
    let id = first["id"].as_str().unwrap();

    let res = srv
        .client
        .delete(srv.url(&format!("/api/blogs/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.bytes().await.unwrap().is_empty());

    let blogs = srv.blogs().await;
    assert_eq!(blogs.len(), 1);
    assert_eq!(blogs[0]["title"], "Second");

    let users = srv.users().await;
    assert_eq!(users[0]["blogs"].as_array().unwrap().len(), 1);

    let res = srv
        .client
        .delete(srv.url(&format!("/api/blogs/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(res).await, "blog not found");
}

#[tokio::test]
async fn malformed_id_is_400() {
    let srv = TestServer::spawn().await;
    let (_, token) = srv.user_token("root").await;

    let res = srv.client.get(srv.url("/api/blogs/not-an-id")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(res).await, "malformatted id");

    let res = srv
        .client
        .delete(srv.url("/api/blogs/5a3d5da59070081a82a3445"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(res).await, "malformatted id");
}

#[tokio::test]
async fn single_blog_includes_owner() {
    let srv = TestServer::spawn().await;
    let (_, token) = srv.user_token("root").await;
    let created: Value = srv.create_blog(&token, sample_blog()).await.json().await.unwrap();
    let id = created["id"].as_str().unwrap();

    let res = srv.client.get(srv.url(&format!("/api/blogs/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["title"], "React patterns");
    assert_eq!(body["user"]["username"], "root");

    let missing = UserId::new().to_string();
    let res = srv.client.get(srv.url(&format!("/api/blogs/{missing}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn owner_can_update_and_others_cannot() {
    let srv = TestServer::spawn().await;
    let (_, token) = srv.user_token("root").await;
    let (_, other_token) = srv.user_token("mallory").await;
    let created: Value = srv.create_blog(&token, sample_blog()).await.json().await.unwrap();
    let id = created["id"].as_str().unwrap();
    let update = json!({ "title": "React patterns", "url": "https://reactpatterns.com/", "likes": 8 });

    let res = srv
        .client
        .put(srv.url(&format!("/api/blogs/{id}")))
        .bearer_auth(&other_token)
        .json(&update)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await, "only the creator can update a blog");

    let res = srv
        .client
        .put(srv.url(&format!("/api/blogs/{id}")))
        .bearer_auth(&token)
        .json(&update)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["id"], id);
    assert_eq!(body["likes"], 8);
    assert!(body["author"].is_null());

    let res = srv
        .client
        .put(srv.url(&format!("/api/blogs/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "title": "", "url": "http://x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let srv = TestServer::spawn().await;
    let (user_id, _) = srv.user_token("root").await;
    let id: UserId = user_id.parse().unwrap();

    let token = mint_jwt(JWT_SECRET, id, Utc::now() - ChronoDuration::hours(2), ChronoDuration::hours(1));
    let res = srv.create_blog(&token, sample_blog()).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await, "token expired");
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() {
    let srv = TestServer::spawn().await;
    let (user_id, _) = srv.user_token("root").await;
    let id: UserId = user_id.parse().unwrap();

    let token = mint_jwt("another-secret", id, Utc::now(), ChronoDuration::hours(1));
    let res = srv.create_blog(&token, sample_blog()).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await, "invalid signature");
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let srv = TestServer::spawn().await;
    let res = srv.create_blog("not-a-jwt", sample_blog()).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await, "jwt malformed");
}

#[tokio::test]
async fn token_for_unknown_user_is_rejected() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(JWT_SECRET, UserId::new(), Utc::now(), ChronoDuration::hours(1));

    let res = srv.create_blog(&token, sample_blog()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await, "token user not found");
}

#[tokio::test]
async fn public_reads_ignore_missing_token() {
    let srv = TestServer::spawn().await;
    let res = srv
        .client
        .get(srv.url("/api/blogs"))
        .header("authorization", "Basic dXNlcjpwdw==")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn unrouted_methods_on_known_paths_are_unknown_endpoints() {
    let srv = TestServer::spawn().await;
    let id = UserId::new().to_string();

    let requests = [
        srv.client.patch(srv.url(&format!("/api/blogs/{id}"))),
        srv.client.patch(srv.url("/api/blogs/abc")),
        srv.client.put(srv.url("/api/blogs")),
        srv.client.delete(srv.url("/api/users")),
        srv.client.get(srv.url("/api/login")),
    ];

    for request in requests {
        let res = request.send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(error_of(res).await, "unknown endpoint");
    }
}
