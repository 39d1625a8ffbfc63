//! API router: REST routes under `/api`, WebSocket at `/ws`, uploaded
//! media served statically under `/media`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::api::websocket;

/// Uploads are multi-file; the multipart body cap leaves headroom over the
/// per-file and per-batch limits enforced in `uploads`.
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

pub fn api_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/auth/register", post(endpoints::auth::register))
        .route("/auth/login", post(endpoints::auth::login))
        .route("/users", get(endpoints::users::list))
        .route("/users/:id", get(endpoints::users::detail))
        .route(
            "/users/:id/schedules",
            get(endpoints::schedules::list_for_user),
        )
        .route(
            "/users/:id/notifications",
            get(endpoints::notifications::list_for_user),
        )
        .route(
            "/clients",
            get(endpoints::clients::list).post(endpoints::clients::create),
        )
        .route(
            "/clients/:id",
            get(endpoints::clients::detail)
                .put(endpoints::clients::update)
                .delete(endpoints::clients::remove),
        )
        .route(
            "/clients/:id/services",
            get(endpoints::services::list_for_client),
        )
        .route(
            "/services",
            get(endpoints::services::list).post(endpoints::services::create),
        )
        .route(
            "/services/:id",
            get(endpoints::services::detail)
                .put(endpoints::services::update)
                .delete(endpoints::services::remove),
        )
        .route(
            "/services/:id/inspections",
            get(endpoints::inspections::list_for_service),
        )
        .route(
            "/services/:id/stations",
            get(endpoints::stations::list_for_service),
        )
        .route(
            "/products",
            get(endpoints::products::list).post(endpoints::products::create),
        )
        .route(
            "/products/:id",
            get(endpoints::products::detail)
                .put(endpoints::products::update)
                .delete(endpoints::products::remove),
        )
        .route("/inspections", post(endpoints::inspections::create))
        .route(
            "/inspections/:id",
            get(endpoints::inspections::detail)
                .put(endpoints::inspections::update)
                .delete(endpoints::inspections::remove),
        )
        .route(
            "/inspections/:id/findings",
            post(endpoints::inspections::save_findings),
        )
        .route("/stations", post(endpoints::stations::create))
        .route(
            "/stations/:id",
            get(endpoints::stations::detail)
                .put(endpoints::stations::update)
                .delete(endpoints::stations::remove),
        )
        .route("/schedules", post(endpoints::schedules::create))
        .route(
            "/schedules/:id",
            axum::routing::delete(endpoints::schedules::remove),
        )
        .route(
            "/schedules/:id/status",
            put(endpoints::schedules::update_status),
        )
        .route("/notifications", post(endpoints::notifications::create))
        .route(
            "/notifications/:id/read",
            put(endpoints::notifications::mark_read),
        )
        .route("/convert/pdf", post(endpoints::convert::to_pdf))
        .route("/archive", post(endpoints::archive::upload))
        .route(
            "/archive/*key",
            get(endpoints::archive::presign).delete(endpoints::archive::remove),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(ctx.clone());

    let ws = Router::new()
        .route("/ws", get(websocket::ws_upgrade))
        .with_state(ctx.clone());

    Router::new()
        .nest("/api", api)
        .merge(ws)
        .nest_service("/media", ServeDir::new(&ctx.media_dir))
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::test_support::test_context;
    use crate::db::open_database;
    use crate::db::repository::{client, inspection, service, user};
    use crate::models::enums::UserRole;
    use crate::models::{Client, Inspection, Service, User};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use chrono::Utc;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    const BOUNDARY: &str = "fumigo-test-boundary";

    // Tiny but valid-enough image payloads (magic bytes only).
    const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn multipart_body(
        text_fields: &[(&str, &str)],
        files: &[(&str, &str, &[u8])],
    ) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in text_fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for (filename, content_type, data) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"images\"; \
                     filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    /// Seed a client, a service, and an open inspection straight through
    /// the repository layer. Returns the inspection id.
    fn seed_inspection(ctx: &crate::api::types::ApiContext) -> Uuid {
        let conn = open_database(&ctx.db_path).unwrap();
        let seeded_client = Client {
            id: Uuid::new_v4(),
            name: "Panaderia Central".into(),
            contact_name: None,
            email: None,
            phone: None,
            address: None,
            created_at: Utc::now().naive_utc(),
        };
        client::insert_client(&conn, &seeded_client).unwrap();
        let seeded_service = Service {
            id: Uuid::new_v4(),
            client_id: seeded_client.id,
            service_type: "rodent_control".into(),
            frequency: Some("monthly".into()),
            address: None,
            notes: None,
            active: true,
            created_at: Utc::now().naive_utc(),
        };
        service::insert_service(&conn, &seeded_service).unwrap();
        let seeded_inspection = Inspection {
            id: Uuid::new_v4(),
            service_id: seeded_service.id,
            inspection_date: "2026-08-22".into(),
            inspection_time: "08:00".into(),
            inspection_type: "routine".into(),
            sub_type: None,
            duration_minutes: None,
            observations: None,
            findings: None,
            exit_time: None,
            created_at: Utc::now().naive_utc(),
        };
        inspection::insert_inspection(&conn, &seeded_inspection).unwrap();
        seeded_inspection.id
    }

    /// Seed a user through the repository layer; notifications and
    /// schedules reference the users table.
    fn seed_user(ctx: &crate::api::types::ApiContext) -> Uuid {
        let conn = open_database(&ctx.db_path).unwrap();
        let seeded_user = User {
            id: Uuid::new_v4(),
            name: "Rosa Ibarra".into(),
            email: format!("{}@fumigo.test", Uuid::new_v4()),
            password: "hash".into(),
            role: UserRole::Technician,
            created_at: Utc::now().naive_utc(),
        };
        user::insert_user(&conn, &seeded_user).unwrap();
        seeded_user.id
    }

    #[tokio::test]
    async fn register_then_duplicate_email_conflicts() {
        let (ctx, _tmp) = test_context();
        let app = api_router(ctx);

        let payload = json!({
            "name": "Marta",
            "email": "marta@example.com",
            "password": "hunter22",
            "role": "technician"
        });
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/auth/register", payload.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["email"], "marta@example.com");
        // Password hash never leaves the server.
        assert!(body["data"].get("password").is_none());

        let response = app
            .oneshot(json_request("POST", "/api/auth/register", payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn login_accepts_correct_password_and_rejects_wrong() {
        let (ctx, _tmp) = test_context();
        let app = api_router(ctx);

        let register = json!({
            "name": "Luis",
            "email": "luis@example.com",
            "password": "fumigador",
            "role": "supervisor"
        });
        app.clone()
            .oneshot(json_request("POST", "/api/auth/register", register))
            .await
            .unwrap();

        let ok = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                json!({"email": "luis@example.com", "password": "fumigador"}),
            ))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let wrong = app
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                json!({"email": "luis@example.com", "password": "nope"}),
            ))
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(wrong).await;
        assert_eq!(body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn login_upgrades_legacy_plaintext_password() {
        let (ctx, _tmp) = test_context();

        // A pre-hashing row holds the password verbatim.
        let legacy = crate::models::User {
            id: Uuid::new_v4(),
            name: "Old Timer".into(),
            email: "old@example.com".into(),
            password: "plaintext-pw".into(),
            role: crate::models::enums::UserRole::Admin,
            created_at: Utc::now().naive_utc(),
        };
        {
            let conn = open_database(&ctx.db_path).unwrap();
            crate::db::repository::user::insert_user(&conn, &legacy).unwrap();
        }

        let app = api_router(ctx.clone());
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                json!({"email": "old@example.com", "password": "plaintext-pw"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let conn = open_database(&ctx.db_path).unwrap();
        let stored = crate::db::repository::user::get_user(&conn, &legacy.id)
            .unwrap()
            .unwrap();
        assert_ne!(stored.password, "plaintext-pw");
        assert_eq!(stored.password.len(), 64);
    }

    #[tokio::test]
    async fn client_crud_round_trip() {
        let (ctx, _tmp) = test_context();
        let app = api_router(ctx);

        let created = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/clients",
                json!({"name": "Hotel Mirador", "phone": "555-0199"}),
            ))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let created = body_json(created).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let listed = app
            .clone()
            .oneshot(Request::get("/api/clients").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let listed = body_json(listed).await;
        assert_eq!(listed["data"].as_array().unwrap().len(), 1);

        let updated = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/api/clients/{id}"),
                json!({"name": "Hotel Mirador Sur"}),
            ))
            .await
            .unwrap();
        assert_eq!(updated.status(), StatusCode::OK);
        let updated = body_json(updated).await;
        assert_eq!(updated["data"]["name"], "Hotel Mirador Sur");

        let deleted = app
            .clone()
            .oneshot(
                Request::delete(format!("/api/clients/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(deleted.status(), StatusCode::OK);

        let gone = app
            .oneshot(
                Request::get(format!("/api/clients/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn findings_save_assigns_photos_positionally_end_to_end() {
        let (ctx, _tmp) = test_context();
        let inspection_id = seed_inspection(&ctx);
        let app = api_router(ctx.clone());

        let findings_by_type = json!({
            "rodents": [
                {"photo": null, "zone": "warehouse"},
                {"photo": "/media/inspections/kept.jpg", "zone": "office"}
            ],
            "insects": [{"photo": "blob:device-ref", "zone": "kitchen"}]
        })
        .to_string();
        let stations_findings =
            json!([{"photo": "", "station": "C-04", "consumed": true}]).to_string();

        let body = multipart_body(
            &[
                ("generalObservations", "droppings along the north wall"),
                ("findingsByType", &findings_by_type),
                ("stationsFindings", &stations_findings),
            ],
            &[
                ("visit-1.jpg", "image/jpeg", JPEG_BYTES),
                ("visit-2.png", "image/png", PNG_BYTES),
                ("visit-3.jpg", "image/jpeg", JPEG_BYTES),
            ],
        );
        let response = app
            .clone()
            .oneshot(multipart_request(
                &format!("/api/inspections/{inspection_id}/findings"),
                body,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);

        let attachments: Vec<String> = body["attachments"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        assert_eq!(attachments.len(), 3);
        assert!(attachments[0].ends_with(".jpg"));
        assert!(attachments[1].ends_with(".png"));

        // Positional association: rodents[0] (placeholder) takes the first
        // attachment, rodents[1] keeps its persisted photo, insects[0]
        // (blob: temp ref) takes the second, the station finding the third.
        let saved = &body["data"]["findings"]["findingsByType"];
        assert_eq!(saved["rodents"][0]["photo"], json!(attachments[0]));
        assert_eq!(saved["rodents"][1]["photo"], json!("/media/inspections/kept.jpg"));
        assert_eq!(saved["insects"][0]["photo"], json!(attachments[1]));
        assert_eq!(
            body["data"]["findings"]["stationsFindings"][0]["photo"],
            json!(attachments[2])
        );
        // Free-form attributes survive.
        assert_eq!(saved["rodents"][0]["zone"], "warehouse");
        assert_eq!(
            body["data"]["findings"]["stationsFindings"][0]["consumed"],
            json!(true)
        );
        assert_eq!(body["data"]["observations"], "droppings along the north wall");
        assert!(!body["data"]["exit_time"].is_null());

        // Attachments are durably on disk and served under /media.
        for url in &attachments {
            let on_disk = ctx.media_dir.join(url.trim_start_matches("/media/"));
            assert!(on_disk.exists(), "missing {on_disk:?}");
        }
        let served = app
            .oneshot(
                Request::get(attachments[0].as_str())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(served.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn findings_save_without_photos_keeps_placeholders() {
        let (ctx, _tmp) = test_context();
        let inspection_id = seed_inspection(&ctx);
        let app = api_router(ctx);

        let findings_by_type = json!({"rodents": [{"photo": null}]}).to_string();
        let body = multipart_body(&[("findingsByType", &findings_by_type)], &[]);
        let response = app
            .oneshot(multipart_request(
                &format!("/api/inspections/{inspection_id}/findings"),
                body,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            body["data"]["findings"]["findingsByType"]["rodents"][0]["photo"],
            json!(null)
        );
        assert_eq!(body["attachments"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn findings_save_on_missing_inspection_is_404_with_code() {
        let (ctx, _tmp) = test_context();
        let app = api_router(ctx);

        let body = multipart_body(&[("findingsByType", "{}")], &[]);
        let response = app
            .oneshot(multipart_request(
                &format!("/api/inspections/{}/findings", Uuid::new_v4()),
                body,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["code"], "INSPECTION_NOT_FOUND");
    }

    #[tokio::test]
    async fn findings_save_with_unparseable_field_is_422() {
        let (ctx, _tmp) = test_context();
        let inspection_id = seed_inspection(&ctx);
        let app = api_router(ctx);

        let body = multipart_body(&[("findingsByType", "{broken json")], &[]);
        let response = app
            .oneshot(multipart_request(
                &format!("/api/inspections/{inspection_id}/findings"),
                body,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["code"], "MALFORMED_PAYLOAD");
    }

    #[tokio::test]
    async fn findings_save_rejects_disallowed_file_type() {
        let (ctx, _tmp) = test_context();
        let inspection_id = seed_inspection(&ctx);
        let app = api_router(ctx.clone());

        let body = multipart_body(
            &[("findingsByType", "{}")],
            &[
                ("photo.jpg", "image/jpeg", JPEG_BYTES),
                ("report.pdf", "application/pdf", b"%PDF-1.4"),
            ],
        );
        let response = app
            .oneshot(multipart_request(
                &format!("/api/inspections/{inspection_id}/findings"),
                body,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION");

        // Whole batch rejected: nothing was written to disk.
        let dir = ctx.media_dir.join("inspections");
        assert!(!dir.exists() || std::fs::read_dir(dir).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn notification_create_and_list_per_user() {
        let (ctx, _tmp) = test_context();
        let user_id = seed_user(&ctx);
        let app = api_router(ctx);

        let created = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/notifications",
                json!({"user_id": user_id, "title": "Visit confirmed"}),
            ))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);

        let listed = app
            .clone()
            .oneshot(
                Request::get(format!("/api/users/{user_id}/notifications"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let listed = body_json(listed).await;
        assert_eq!(listed["data"].as_array().unwrap().len(), 1);
        assert_eq!(listed["data"][0]["read"], false);
    }

    #[tokio::test]
    async fn schedule_status_transition() {
        let (ctx, _tmp) = test_context();
        let inspection_id = seed_inspection(&ctx);
        // Reuse the seeded service for the schedule.
        let service_id = {
            let conn = open_database(&ctx.db_path).unwrap();
            inspection::get_inspection(&conn, &inspection_id)
                .unwrap()
                .unwrap()
                .service_id
        };
        let user_id = seed_user(&ctx);
        let app = api_router(ctx);

        let created = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/schedules",
                json!({
                    "service_id": service_id,
                    "user_id": user_id,
                    "scheduled_date": "2026-09-01",
                    "scheduled_time": "10:00"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let created = body_json(created).await;
        assert_eq!(created["data"]["status"], "pending");
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let updated = app
            .oneshot(json_request(
                "PUT",
                &format!("/api/schedules/{id}/status"),
                json!({"status": "confirmed"}),
            ))
            .await
            .unwrap();
        assert_eq!(updated.status(), StatusCode::OK);
        let updated = body_json(updated).await;
        assert_eq!(updated["data"]["status"], "confirmed");
    }

    #[tokio::test]
    async fn notification_for_unknown_user_is_a_validation_error() {
        let (ctx, _tmp) = test_context();
        let app = api_router(ctx);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/notifications",
                json!({"user_id": Uuid::new_v4(), "title": "Visit confirmed"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION");
    }

    #[tokio::test]
    async fn schedule_for_unknown_user_is_a_validation_error() {
        let (ctx, _tmp) = test_context();
        let inspection_id = seed_inspection(&ctx);
        let service_id = {
            let conn = open_database(&ctx.db_path).unwrap();
            inspection::get_inspection(&conn, &inspection_id)
                .unwrap()
                .unwrap()
                .service_id
        };
        let app = api_router(ctx);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/schedules",
                json!({
                    "service_id": service_id,
                    "user_id": Uuid::new_v4(),
                    "scheduled_date": "2026-09-01",
                    "scheduled_time": "10:00"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION");
    }

    #[tokio::test]
    async fn archive_without_storage_configured_is_dependency_error() {
        let (ctx, _tmp) = test_context();
        let app = api_router(ctx);

        let response = app
            .oneshot(
                Request::get("/api/archive/reports/jan.pdf")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["code"], "DEPENDENCY");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (ctx, _tmp) = test_context();
        let app = api_router(ctx);
        let response = app
            .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
