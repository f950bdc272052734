#[cfg(test)]
mod integration_tests {
    use crate::handlers::auth::{LoginRequest, RegisterRequest};
    use crate::handlers::deliveries::CreateDeliveryRequest;
    use crate::handlers::descriptions::CreateDescriptionRequest;
    use crate::handlers::goods::CreateGoodRequest;
    use crate::handlers::ledger::CreateLedgerEntryRequest;
    use crate::handlers::schools::CreateSchoolRequest;
    use crate::schemas::ApiResponse;
    use crate::test_utils::test_utils::setup_test_app;
    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn bearer(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn decimal(value: &serde_json::Value) -> Decimal {
        Decimal::from_str(value.as_str().expect("expected a decimal string")).unwrap()
    }

    /// Register an account and log in, returning the session token.
    async fn register_and_login(server: &TestServer, email: &str) -> String {
        let register_request = RegisterRequest {
            name: "Test User".to_string(),
            email: email.to_string(),
            password: "hunter2".to_string(),
        };
        let response = server
            .post("/api/v1/auth/register")
            .json(&register_request)
            .await;
        response.assert_status(StatusCode::CREATED);

        let login_request = LoginRequest {
            email: email.to_string(),
            password: "hunter2".to_string(),
        };
        let response = server.post("/api/v1/auth/login").json(&login_request).await;
        response.assert_status(StatusCode::OK);

        let body: ApiResponse<serde_json::Value> = response.json();
        assert!(body.success);
        body.data["token"].as_str().unwrap().to_string()
    }

    async fn add_school(server: &TestServer, token: &str, name: &str) -> i64 {
        let response = server
            .post("/api/v1/schools")
            .add_header(header::AUTHORIZATION, bearer(token))
            .json(&CreateSchoolRequest {
                name: name.to_string(),
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        body.data["id"].as_i64().unwrap()
    }

    async fn add_good(server: &TestServer, token: &str, name: &str) -> i64 {
        let response = server
            .post("/api/v1/goods")
            .add_header(header::AUTHORIZATION, bearer(token))
            .json(&CreateGoodRequest {
                name: name.to_string(),
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        body.data["id"].as_i64().unwrap()
    }

    async fn add_ledger_entry(
        server: &TestServer,
        token: &str,
        school_id: i64,
        day: u32,
        debit: Option<Decimal>,
        credit: Option<Decimal>,
    ) {
        let response = server
            .post("/api/v1/ledger")
            .add_header(header::AUTHORIZATION, bearer(token))
            .json(&CreateLedgerEntryRequest {
                school_id: school_id as i32,
                date: date(day),
                good: "Arroz".to_string(),
                description: "Compra mensal".to_string(),
                debit,
                credit,
            })
            .await;
        response.assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_register_and_login_flow() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let register_request = RegisterRequest {
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let response = server
            .post("/api/v1/auth/register")
            .json(&register_request)
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert!(body.success);
        assert_eq!(body.data["email"], "maria@example.com");

        // Correct credentials, email case differing from the stored spelling.
        let response = server
            .post("/api/v1/auth/login")
            .json(&LoginRequest {
                email: "MARIA@example.com".to_string(),
                password: "hunter2".to_string(),
            })
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert!(body.data["token"].as_str().unwrap().len() > 0);
        assert_eq!(body.data["user"]["name"], "Maria");

        // Wrong password and unknown email fail with the same generic shape.
        let response = server
            .post("/api/v1/auth/login")
            .json(&LoginRequest {
                email: "maria@example.com".to_string(),
                password: "wrong".to_string(),
            })
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let wrong_password: serde_json::Value = response.json();

        let response = server
            .post("/api/v1/auth/login")
            .json(&LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "hunter2".to_string(),
            })
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let unknown_email: serde_json::Value = response.json();

        assert_eq!(wrong_password, unknown_email);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_is_case_insensitive() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/v1/auth/register")
            .json(&RegisterRequest {
                name: "First".to_string(),
                email: "A@x.com".to_string(),
                password: "pw".to_string(),
            })
            .await;
        response.assert_status(StatusCode::CREATED);

        let response = server
            .post("/api/v1/auth/register")
            .json(&RegisterRequest {
                name: "Second".to_string(),
                email: "a@x.com".to_string(),
                password: "pw".to_string(),
            })
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "EMAIL_ALREADY_USED");
    }

    #[tokio::test]
    async fn test_scoped_endpoints_require_a_session() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/v1/schools").await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let response = server
            .get("/api/v1/schools")
            .add_header(header::AUTHORIZATION, bearer("not-a-real-token"))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_invalidates_the_token() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let token = register_and_login(&server, "maria@example.com").await;

        let response = server
            .get("/api/v1/schools")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .post("/api/v1/auth/logout")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .get("/api/v1/schools")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_duplicate_school_is_rejected_and_single_row_remains() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let token = register_and_login(&server, "maria@example.com").await;

        add_school(&server, &token, "Lincoln").await;

        let response = server
            .post("/api/v1/schools")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&CreateSchoolRequest {
                name: "Lincoln".to_string(),
            })
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "ALREADY_EXISTS");

        let response = server
            .get("/api/v1/schools")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0]["name"], "Lincoln");
    }

    #[tokio::test]
    async fn test_delete_school_then_404_on_second_delete() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let token = register_and_login(&server, "maria@example.com").await;

        let school_id = add_school(&server, &token, "Lincoln").await;

        let response = server
            .delete(&format!("/api/v1/schools/{}", school_id))
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .delete(&format!("/api/v1/schools/{}", school_id))
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_goods_and_descriptions_crud() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let token = register_and_login(&server, "maria@example.com").await;

        let good_id = add_good(&server, &token, "Arroz").await;

        let response = server
            .post("/api/v1/descriptions")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&CreateDescriptionRequest {
                text: "Compra mensal".to_string(),
            })
            .await;
        response.assert_status(StatusCode::CREATED);

        let response = server
            .post("/api/v1/descriptions")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&CreateDescriptionRequest {
                text: "Compra mensal".to_string(),
            })
            .await;
        response.assert_status(StatusCode::CONFLICT);

        let response = server
            .get("/api/v1/goods")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0]["id"].as_i64().unwrap(), good_id);

        let response = server
            .delete(&format!("/api/v1/goods/{}", good_id))
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .get("/api/v1/goods")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert!(body.data.is_empty());
    }

    #[tokio::test]
    async fn test_delivery_requires_school_and_good_in_scope() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let token = register_and_login(&server, "maria@example.com").await;

        let response = server
            .post("/api/v1/deliveries")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&CreateDeliveryRequest {
                school_id: 999,
                good_id: 999,
                date: date(1),
                quantity: 5,
            })
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delivery_quantity_is_clamped_by_validation() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let token = register_and_login(&server, "maria@example.com").await;

        let school_id = add_school(&server, &token, "Lincoln").await;
        let good_id = add_good(&server, &token, "Arroz").await;

        let response = server
            .post("/api/v1/deliveries")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&CreateDeliveryRequest {
                school_id: school_id as i32,
                good_id: good_id as i32,
                date: date(1),
                quantity: 20_000,
            })
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_dashboard_shows_delivered_quantity() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let token = register_and_login(&server, "maria@example.com").await;

        let school_id = add_school(&server, &token, "S").await;
        let good_id = add_good(&server, &token, "G").await;

        let response = server
            .post("/api/v1/deliveries")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&CreateDeliveryRequest {
                school_id: school_id as i32,
                good_id: good_id as i32,
                date: date(1),
                quantity: 5,
            })
            .await;
        response.assert_status(StatusCode::CREATED);

        let response = server
            .get("/api/v1/dashboard/deliveries-by-good")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0]["good"], "G");
        assert_eq!(body.data[0]["total_quantity"].as_i64().unwrap(), 5);
    }

    #[tokio::test]
    async fn test_deleting_a_school_leaves_its_deliveries_behind() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let token = register_and_login(&server, "maria@example.com").await;

        let school_id = add_school(&server, &token, "Lincoln").await;
        let good_id = add_good(&server, &token, "Arroz").await;

        let response = server
            .post("/api/v1/deliveries")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&CreateDeliveryRequest {
                school_id: school_id as i32,
                good_id: good_id as i32,
                date: date(1),
                quantity: 5,
            })
            .await;
        response.assert_status(StatusCode::CREATED);

        let response = server
            .delete(&format!("/api/v1/schools/{}", school_id))
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);

        // The delivery row remains with a now-dangling school id.
        let response = server
            .get("/api/v1/deliveries")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0]["school_id"].as_i64().unwrap(), school_id);
    }

    #[tokio::test]
    async fn test_running_balance_accumulates_forward_and_displays_backward() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let token = register_and_login(&server, "maria@example.com").await;

        let school_id = add_school(&server, &token, "Lincoln").await;

        // Balances [10, -5, 20] on D1 < D2 < D3, inserted out of order.
        add_ledger_entry(&server, &token, school_id, 3, None, Some(Decimal::from(20))).await;
        add_ledger_entry(&server, &token, school_id, 1, None, Some(Decimal::from(10))).await;
        add_ledger_entry(&server, &token, school_id, 2, Some(Decimal::from(5)), None).await;

        let response = server
            .get(&format!("/api/v1/schools/{}/ledger", school_id))
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 3);

        // Newest first.
        assert_eq!(body.data[0]["date"], "2024-01-03");
        assert_eq!(body.data[1]["date"], "2024-01-02");
        assert_eq!(body.data[2]["date"], "2024-01-01");

        // Cumulative values [25, 5, 10]: the top row carries the total.
        assert_eq!(decimal(&body.data[0]["running_balance"]), Decimal::from(25));
        assert_eq!(decimal(&body.data[1]["running_balance"]), Decimal::from(5));
        assert_eq!(decimal(&body.data[2]["running_balance"]), Decimal::from(10));

        // Per-row balances are the rows' own values.
        assert_eq!(decimal(&body.data[0]["balance"]), Decimal::from(20));
        assert_eq!(decimal(&body.data[1]["balance"]), Decimal::from(-5));
        assert_eq!(decimal(&body.data[2]["balance"]), Decimal::from(10));

        let response = server
            .get(&format!("/api/v1/schools/{}/balance", school_id))
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(decimal(&body.data["balance"]), Decimal::from(25));
    }

    #[tokio::test]
    async fn test_balance_summary_defaults_to_zero() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let token = register_and_login(&server, "maria@example.com").await;

        let school_id = add_school(&server, &token, "Lincoln").await;

        let response = server
            .get(&format!("/api/v1/schools/{}/balance", school_id))
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(decimal(&body.data["balance"]), Decimal::ZERO);

        // The chart skips schools without entries, the summary keeps them.
        let response = server
            .get("/api/v1/dashboard/balance-by-school")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert!(body.data.is_empty());

        let response = server
            .get("/api/v1/dashboard/balance-summary")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(decimal(&body.data[0]["balance"]), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_users_cannot_see_each_others_rows() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let token_a = register_and_login(&server, "a@example.com").await;
        let token_b = register_and_login(&server, "b@example.com").await;

        add_school(&server, &token_a, "Lincoln").await;

        // Same name in another scope is allowed, and listings stay disjoint.
        add_school(&server, &token_b, "Lincoln").await;

        let response = server
            .get("/api/v1/schools")
            .add_header(header::AUTHORIZATION, bearer(&token_b))
            .await;
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);

        let response = server
            .get("/api/v1/dashboard/balance-summary")
            .add_header(header::AUTHORIZATION, bearer(&token_a))
            .await;
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);
    }

    #[tokio::test]
    async fn test_export_returns_a_workbook() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let token = register_and_login(&server, "maria@example.com").await;

        let school_id = add_school(&server, &token, "Lincoln").await;
        add_school(&server, &token, "Escola sem lançamentos").await;
        add_ledger_entry(&server, &token, school_id, 1, None, Some(Decimal::from(10))).await;

        let response = server
            .get("/api/v1/export")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.contains("spreadsheetml"));

        // xlsx files are zip archives; check the magic bytes.
        let bytes = response.as_bytes();
        assert!(bytes.len() > 4);
        assert_eq!(&bytes[..2], b"PK");
    }
}
