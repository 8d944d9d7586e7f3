//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP endpoints for the Pencraft blog backend:
//! - Post endpoints (/assignments)
//! - Category endpoints (/categories)
//! - Auth endpoints (/auth)
//! - Profile endpoints (/profiles)
//! - Health check (/health)

pub mod auth;
pub mod categories;
pub mod health;
pub mod middleware;
pub mod posts;
pub mod profiles;
pub mod responses;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (category mutations)
    let admin_routes = Router::new()
        .route("/categories", post(categories::create_category))
        .route("/categories/{id}", put(categories::update_category))
        .route("/categories/{id}", delete(categories::delete_category))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_admin,
        ))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_user,
        ));

    // Protected routes (need auth but not admin)
    let protected_routes = Router::new()
        .route("/assignments", post(posts::create_post))
        .route("/assignments/upload", post(posts::upload_post))
        .route("/assignments/{id}", put(posts::update_post))
        .route("/assignments/{id}", delete(posts::delete_post))
        .route("/auth/logout", post(auth::logout))
        .route("/profiles", get(profiles::get_profile))
        .route("/profiles", put(profiles::update_profile))
        .route("/profiles/avatar", put(profiles::update_avatar))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_user,
        ));

    // Public routes
    Router::new()
        .route("/assignments", get(posts::list_posts))
        .route("/assignments/{id}", get(posts::get_post))
        .route("/categories", get(categories::list_categories))
        .route("/categories/{id}", get(categories::get_category))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/auth/reset-password", put(auth::change_password))
        .route("/health", get(health::health_check))
        .merge(admin_routes)
        .merge(protected_routes)
}

/// JSON 404 for unknown routes
async fn endpoint_not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Endpoint not found" })),
    )
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            cors_origin
                .parse::<HeaderValue>()
                .unwrap_or_else(|_| HeaderValue::from_static("*")),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // Leave headroom above the largest accepted file so the size checks in
    // the handlers produce the 400 responses instead of a body-limit reject
    let body_limit = state.upload_config.max_file_size as usize + 1024 * 1024;

    Router::new()
        .merge(build_api_router(state.clone()))
        .fallback(endpoint_not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploadConfig;
    use crate::db::create_test_pool;
    use crate::db::repositories::{
        ProfileRepository, SqlxCategoryRepository, SqlxPostRepository, SqlxProfileRepository,
    };
    use crate::models::{Profile, UserRole};
    use crate::providers::{
        IdentityError, IdentityProvider, IdentityUser, ObjectStorage, Session, StorageError,
    };
    use crate::services::{CategoryService, PostService, ProfileService, UserService};
    use async_trait::async_trait;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Identity stub: fixed token->user and credential->user maps
    struct StubIdentity {
        tokens: HashMap<String, IdentityUser>,
        credentials: HashMap<(String, String), IdentityUser>,
    }

    impl StubIdentity {
        fn new() -> Self {
            let admin = IdentityUser {
                id: "uuid-admin".to_string(),
                email: "admin@example.com".to_string(),
            };
            let jane = IdentityUser {
                id: "uuid-jane".to_string(),
                email: "jane@example.com".to_string(),
            };
            let mut tokens = HashMap::new();
            tokens.insert("admin-token".to_string(), admin.clone());
            tokens.insert("jane-token".to_string(), jane.clone());
            let mut credentials = HashMap::new();
            credentials.insert(
                ("jane@example.com".to_string(), "secret123".to_string()),
                jane,
            );
            Self {
                tokens,
                credentials,
            }
        }

        fn session_for(user: IdentityUser) -> Session {
            Session {
                access_token: "fresh-access".to_string(),
                refresh_token: "fresh-refresh".to_string(),
                expires_at: Some(1_700_000_000),
                user,
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for StubIdentity {
        async fn sign_up(
            &self,
            email: &str,
            _password: &str,
        ) -> Result<IdentityUser, IdentityError> {
            if self.credentials.keys().any(|(e, _)| e == email) {
                return Err(IdentityError::UserAlreadyExists);
            }
            Ok(IdentityUser {
                id: format!("uuid-{}", email),
                email: email.to_string(),
            })
        }

        async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
            self.credentials
                .get(&(email.to_string(), password.to_string()))
                .cloned()
                .map(Self::session_for)
                .ok_or(IdentityError::InvalidCredentials)
        }

        async fn get_user(&self, access_token: &str) -> Result<IdentityUser, IdentityError> {
            self.tokens
                .get(access_token)
                .cloned()
                .ok_or(IdentityError::InvalidToken)
        }

        async fn refresh(&self, refresh_token: &str) -> Result<Session, IdentityError> {
            if refresh_token == "good-refresh" {
                Ok(Self::session_for(IdentityUser {
                    id: "uuid-jane".to_string(),
                    email: "jane@example.com".to_string(),
                }))
            } else {
                Err(IdentityError::InvalidToken)
            }
        }

        async fn sign_out(&self, _access_token: &str) -> Result<(), IdentityError> {
            Ok(())
        }

        async fn send_reset_email(&self, _email: &str) -> Result<(), IdentityError> {
            Ok(())
        }

        async fn update_password(
            &self,
            access_token: &str,
            _new_password: &str,
        ) -> Result<IdentityUser, IdentityError> {
            self.get_user(access_token).await
        }
    }

    /// Storage stub counting uploads so tests can assert nothing was
    /// touched on auth failures
    struct StubStorage {
        uploads: AtomicUsize,
    }

    impl StubStorage {
        fn new() -> Self {
            Self {
                uploads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ObjectStorage for StubStorage {
        async fn upload(
            &self,
            key: &str,
            _data: Vec<u8>,
            _content_type: &str,
            _upsert: bool,
        ) -> Result<String, StorageError> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            Ok(format!("https://cdn.example.com/{}", key))
        }
    }

    struct TestHarness {
        server: TestServer,
        storage: Arc<StubStorage>,
        profiles: Arc<dyn ProfileRepository>,
    }

    async fn harness() -> TestHarness {
        let pool = create_test_pool().await.unwrap();
        let post_repo = SqlxPostRepository::boxed(pool.clone());
        let category_repo = SqlxCategoryRepository::boxed(pool.clone());
        let profile_repo = SqlxProfileRepository::boxed(pool.clone());
        let identity: Arc<dyn IdentityProvider> = Arc::new(StubIdentity::new());
        let storage = Arc::new(StubStorage::new());

        // Known accounts matching the identity stub's tokens
        for (id, username, role) in [
            ("uuid-admin", "admin", UserRole::Admin),
            ("uuid-jane", "jane", UserRole::User),
        ] {
            profile_repo
                .create(&Profile {
                    id: id.to_string(),
                    username: username.to_string(),
                    name: username.to_string(),
                    email: format!("{}@example.com", username),
                    role,
                    avatar_url: None,
                })
                .await
                .unwrap();
        }

        let state = AppState {
            post_service: Arc::new(PostService::new(post_repo.clone())),
            category_service: Arc::new(CategoryService::new(category_repo, post_repo)),
            profile_service: Arc::new(ProfileService::new(profile_repo.clone())),
            user_service: Arc::new(UserService::new(profile_repo.clone(), identity.clone())),
            identity,
            storage: storage.clone() as Arc<dyn ObjectStorage>,
            upload_config: Arc::new(UploadConfig::default()),
        };

        let server = TestServer::new(build_router(state, "http://localhost:3000")).unwrap();
        TestHarness {
            server,
            storage,
            profiles: profile_repo,
        }
    }

    fn post_body(title: &str, category_id: i64) -> serde_json::Value {
        serde_json::json!({
            "title": title,
            "image": "https://cdn.example.com/cover.png",
            "category_id": category_id,
            "description": "desc",
            "content": "content",
            "status_id": 1,
        })
    }

    fn upload_text_fields(category_id: i64) -> MultipartForm {
        MultipartForm::new()
            .add_text("title", "Uploaded post")
            .add_text("category_id", category_id.to_string())
            .add_text("description", "desc")
            .add_text("content", "content")
            .add_text("status_id", "1")
    }

    fn image_part(filename: &str, mime: &str, data: Vec<u8>) -> Part {
        Part::bytes(data)
            .file_name(filename.to_string())
            .mime_type(mime.to_string())
    }

    async fn create_category(server: &TestServer, name: &str) -> i64 {
        let response = server
            .post("/categories")
            .authorization_bearer("admin-token")
            .json(&serde_json::json!({ "name": name }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<serde_json::Value>()["data"]["id"]
            .as_i64()
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let h = harness().await;
        let response = h.server.get("/health").await;
        response.assert_status_ok();
        response.assert_json(&serde_json::json!({
            "status": "OK",
            "message": "Server is running",
        }));
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let h = harness().await;
        let response = h.server.get("/nope").await;
        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&serde_json::json!({ "error": "Endpoint not found" }));
    }

    #[tokio::test]
    async fn test_create_post_requires_token() {
        let h = harness().await;
        let response = h.server.post("/assignments").json(&post_body("A", 1)).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&serde_json::json!({ "error": "Unauthorized: Token missing" }));
    }

    #[tokio::test]
    async fn test_upload_rejected_before_storage_touched() {
        let h = harness().await;
        let response = h.server.post("/assignments/upload").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(h.storage.uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_upload_without_file_400() {
        let h = harness().await;
        let response = h
            .server
            .post("/assignments/upload")
            .authorization_bearer("jane-token")
            .multipart(upload_text_fields(1))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&serde_json::json!({ "error": "Image file is required" }));
        assert_eq!(h.storage.uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_upload_missing_text_field_400() {
        let h = harness().await;
        let form = MultipartForm::new()
            .add_text("title", "Uploaded post")
            .add_text("category_id", "1")
            .add_text("content", "content")
            .add_text("status_id", "1")
            .add_part("imageFile", image_part("cover.png", "image/png", vec![1, 2, 3]));

        let response = h
            .server
            .post("/assignments/upload")
            .authorization_bearer("jane-token")
            .multipart(form)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&serde_json::json!({
            "error": "All fields are required: title, category_id, description, content, status_id"
        }));
        assert_eq!(h.storage.uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_upload_success_stores_image_and_returns_url() {
        let h = harness().await;
        let category_id = create_category(&h.server, "Tech").await;
        let form = upload_text_fields(category_id)
            .add_part("imageFile", image_part("cover.png", "image/png", vec![1, 2, 3]));

        let response = h
            .server
            .post("/assignments/upload")
            .authorization_bearer("jane-token")
            .multipart(form)
            .await;
        response.assert_status(StatusCode::CREATED);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["message"], "Created post successfully");
        let image_url = body["imageUrl"].as_str().unwrap();
        assert!(image_url.starts_with("https://cdn.example.com/posts/"));
        assert!(image_url.ends_with("_cover.png"));
        assert_eq!(h.storage.uploads.load(Ordering::SeqCst), 1);

        // The post row persists the URL storage handed back
        let list = h.server.get("/assignments").await.json::<serde_json::Value>();
        assert_eq!(list["data"][0]["title"], "Uploaded post");
        assert_eq!(list["data"][0]["image"], image_url);
    }

    #[tokio::test]
    async fn test_avatar_wrong_mime_400() {
        let h = harness().await;
        let form = MultipartForm::new().add_part(
            "avatarFile",
            image_part("cv.pdf", "application/pdf", vec![1, 2, 3]),
        );

        let response = h
            .server
            .put("/profiles/avatar")
            .authorization_bearer("jane-token")
            .multipart(form)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&serde_json::json!({
            "error": "Invalid file type. Only JPEG, PNG, GIF, and WebP are allowed"
        }));
        assert_eq!(h.storage.uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_avatar_oversize_400() {
        let h = harness().await;
        let oversize = vec![0u8; 5 * 1024 * 1024 + 1];
        let form = MultipartForm::new()
            .add_part("avatarFile", image_part("me.png", "image/png", oversize));

        let response = h
            .server
            .put("/profiles/avatar")
            .authorization_bearer("jane-token")
            .multipart(form)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&serde_json::json!({ "error": "Avatar file is too large" }));
        assert_eq!(h.storage.uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_avatar_upload_success_persists_url() {
        let h = harness().await;
        let form = MultipartForm::new()
            .add_part("avatarFile", image_part("me.png", "image/png", vec![1, 2, 3]));

        let response = h
            .server
            .put("/profiles/avatar")
            .authorization_bearer("jane-token")
            .multipart(form)
            .await;
        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["message"], "Avatar updated successfully");
        let avatar_url = body["data"]["avatar_url"].as_str().unwrap();
        assert!(avatar_url.contains("/avatars/uuid-jane/"));

        let stored = h.profiles.get_by_id("uuid-jane").await.unwrap().unwrap();
        assert_eq!(stored.avatar_url.as_deref(), Some(avatar_url));
    }

    #[tokio::test]
    async fn test_create_post_validation_errors_itemized_in_order() {
        let h = harness().await;
        let response = h
            .server
            .post("/assignments")
            .authorization_bearer("jane-token")
            .json(&serde_json::json!({
                "title": "A",
                "category_id": "one",
                "content": "body",
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["message"], "Validation failed");
        let errors = body["errors"].as_array().unwrap();
        let fields: Vec<&str> = errors
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, ["image", "category_id", "description", "status_id"]);
        assert_eq!(errors[1]["message"], "Category ID must be a number");
    }

    #[tokio::test]
    async fn test_post_crud_round_trip() {
        let h = harness().await;
        let category_id = create_category(&h.server, "Tech").await;

        let response = h
            .server
            .post("/assignments")
            .authorization_bearer("jane-token")
            .json(&post_body("First post", category_id))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.assert_json(&serde_json::json!({ "message": "Created post successfully" }));

        let list = h.server.get("/assignments").await;
        list.assert_status_ok();
        let body = list.json::<serde_json::Value>();
        let posts = body["data"].as_array().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["title"], "First post");
        assert_eq!(posts[0]["category_name"], "Tech");
        assert_eq!(posts[0]["status_name"], "publish");

        let id = posts[0]["id"].as_i64().unwrap();
        let one = h.server.get(&format!("/assignments/{}", id)).await;
        one.assert_status_ok();
        assert_eq!(one.json::<serde_json::Value>()["data"]["title"], "First post");
    }

    #[tokio::test]
    async fn test_get_missing_post_404() {
        let h = harness().await;
        let response = h.server.get("/assignments/999").await;
        response.assert_status(StatusCode::NOT_FOUND);
        response
            .assert_json(&serde_json::json!({ "message": "Server could not find a requested post" }));
    }

    #[tokio::test]
    async fn test_update_missing_post_404_even_with_invalid_body() {
        let h = harness().await;
        let response = h
            .server
            .put("/assignments/999")
            .authorization_bearer("jane-token")
            .json(&serde_json::json!({ "title": "" }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&serde_json::json!({
            "message": "Server could not find a requested post to update"
        }));
    }

    #[tokio::test]
    async fn test_delete_post_not_idempotent() {
        let h = harness().await;
        let category_id = create_category(&h.server, "Tech").await;
        h.server
            .post("/assignments")
            .authorization_bearer("jane-token")
            .json(&post_body("Doomed", category_id))
            .await
            .assert_status(StatusCode::CREATED);

        let id = h.server.get("/assignments").await.json::<serde_json::Value>()["data"][0]["id"]
            .as_i64()
            .unwrap();

        let first = h
            .server
            .delete(&format!("/assignments/{}", id))
            .authorization_bearer("jane-token")
            .await;
        first.assert_status_ok();
        first.assert_json(&serde_json::json!({ "message": "Deleted post successfully" }));

        let second = h
            .server
            .delete(&format!("/assignments/{}", id))
            .authorization_bearer("jane-token")
            .await;
        second.assert_status(StatusCode::NOT_FOUND);
        second.assert_json(&serde_json::json!({
            "message": "Server could not find a requested post to delete"
        }));
    }

    #[tokio::test]
    async fn test_category_mutations_are_admin_only() {
        let h = harness().await;
        let response = h
            .server
            .post("/categories")
            .authorization_bearer("jane-token")
            .json(&serde_json::json!({ "name": "Tech" }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        response
            .assert_json(&serde_json::json!({ "error": "Forbidden: You do not have admin access" }));
    }

    #[tokio::test]
    async fn test_duplicate_category_create_400() {
        let h = harness().await;
        create_category(&h.server, "Tech").await;

        let response = h
            .server
            .post("/categories")
            .authorization_bearer("admin-token")
            .json(&serde_json::json!({ "name": "Tech" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response
            .assert_json(&serde_json::json!({ "message": "Category with this name already exists" }));
    }

    #[tokio::test]
    async fn test_delete_category_in_use_blocked() {
        let h = harness().await;
        let category_id = create_category(&h.server, "Tech").await;
        h.server
            .post("/assignments")
            .authorization_bearer("jane-token")
            .json(&post_body("Pinning", category_id))
            .await
            .assert_status(StatusCode::CREATED);

        let response = h
            .server
            .delete(&format!("/categories/{}", category_id))
            .authorization_bearer("admin-token")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&serde_json::json!({
            "message": "Cannot delete category because it is used in existing posts"
        }));
    }

    #[tokio::test]
    async fn test_login_failure_message_identical_for_both_causes() {
        let h = harness().await;
        let expected =
            serde_json::json!({ "error": "Your password is incorrect or this email doesn't exist" });

        let wrong_password = h
            .server
            .post("/auth/login")
            .json(&serde_json::json!({ "email": "jane@example.com", "password": "not-it" }))
            .await;
        wrong_password.assert_status(StatusCode::BAD_REQUEST);
        wrong_password.assert_json(&expected);

        let unknown_email = h
            .server
            .post("/auth/login")
            .json(&serde_json::json!({ "email": "ghost@example.com", "password": "secret123" }))
            .await;
        unknown_email.assert_status(StatusCode::BAD_REQUEST);
        unknown_email.assert_json(&expected);
    }

    #[tokio::test]
    async fn test_login_success_returns_token_pair() {
        let h = harness().await;
        let response = h
            .server
            .post("/auth/login")
            .json(&serde_json::json!({ "email": "jane@example.com", "password": "secret123" }))
            .await;
        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["message"], "Signed in successfully");
        assert_eq!(body["access_token"], "fresh-access");
        assert_eq!(body["user"]["id"], "uuid-jane");
    }

    #[tokio::test]
    async fn test_register_duplicate_username_rejected() {
        let h = harness().await;
        let response = h
            .server
            .post("/auth/register")
            .json(&serde_json::json!({
                "email": "second@example.com",
                "password": "secret123",
                "username": "jane",
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&serde_json::json!({ "error": "This username is already taken" }));
    }

    #[tokio::test]
    async fn test_register_short_password_rejected() {
        let h = harness().await;
        let response = h
            .server
            .post("/auth/register")
            .json(&serde_json::json!({
                "email": "new@example.com",
                "password": "short",
                "username": "newbie",
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response
            .assert_json(&serde_json::json!({ "error": "Password must be at least 6 characters" }));
    }

    #[tokio::test]
    async fn test_me_merges_local_profile_role() {
        let h = harness().await;
        let response = h
            .server
            .get("/auth/me")
            .authorization_bearer("admin-token")
            .await;
        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["user"]["id"], "uuid-admin");
        assert_eq!(body["user"]["role"], "admin");
        assert_eq!(body["user"]["username"], "admin");
    }

    #[tokio::test]
    async fn test_refresh_with_bad_token_401() {
        let h = harness().await;
        let response = h
            .server
            .post("/auth/refresh")
            .json(&serde_json::json!({ "refresh_token": "stale" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&serde_json::json!({ "message": "Invalid refresh token" }));
    }

    #[tokio::test]
    async fn test_profile_update_username_conflict() {
        let h = harness().await;
        let response = h
            .server
            .put("/profiles")
            .authorization_bearer("jane-token")
            .json(&serde_json::json!({ "username": "admin" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&serde_json::json!({ "error": "Username is already taken" }));
    }

    #[tokio::test]
    async fn test_profile_update_success() {
        let h = harness().await;
        let response = h
            .server
            .put("/profiles")
            .authorization_bearer("jane-token")
            .json(&serde_json::json!({ "name": "Jane Doe" }))
            .await;
        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["message"], "Profile updated successfully");
        assert_eq!(body["data"]["name"], "Jane Doe");

        let stored = h.profiles.get_by_id("uuid-jane").await.unwrap().unwrap();
        assert_eq!(stored.name, "Jane Doe");
    }

    #[tokio::test]
    async fn test_get_profile_and_invalid_token() {
        let h = harness().await;
        let ok = h
            .server
            .get("/profiles")
            .authorization_bearer("jane-token")
            .await;
        ok.assert_status_ok();
        assert_eq!(ok.json::<serde_json::Value>()["data"]["username"], "jane");

        let bad = h
            .server
            .get("/profiles")
            .authorization_bearer("forged")
            .await;
        bad.assert_status(StatusCode::UNAUTHORIZED);
        bad.assert_json(&serde_json::json!({ "error": "Unauthorized: Invalid token" }));
    }
}
