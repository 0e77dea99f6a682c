use axum::http::StatusCode;
use axum_extra::extract::cookie::Cookie;
use axum_test::{TestResponse, TestServer};
use mortgage_console::server::app_router;
use mortgage_console::{
    Database, SESSION_COOKIE, SessionStore, SqliteDatabase, TableCatalog, TableRecordManager,
};
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{DB_NAME, PASSWORD, app_state, fields};

async fn server() -> (TestServer, Arc<SqliteDatabase>) {
    let (state, db) = app_state().await;
    (TestServer::new(app_router(state)).unwrap(), db)
}

async fn session(server: &TestServer) -> Cookie<'static> {
    let response = server
        .post("/login")
        .form(&[("password", PASSWORD)])
        .await;
    response.cookie(SESSION_COOKIE)
}

fn assert_redirects_to(response: &TestResponse, location: &str) {
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), location);
}

#[tokio::test]
async fn health_check_needs_no_login() {
    let (server, _) = server().await;
    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn console_redirects_to_login_without_a_session() {
    let (server, _) = server().await;
    assert_redirects_to(&server.get("/").await, "/login");
    assert_redirects_to(&server.get("/tables/Borrowers/read").await, "/login");
    assert_redirects_to(
        &server.post("/tables/Borrowers/delete/1").await,
        "/login",
    );
}

#[tokio::test]
async fn wrong_password_shows_an_inline_error() {
    let (server, _) = server().await;
    let response = server
        .post("/login")
        .form(&[("password", "guess")])
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert!(response.text().contains("Incorrect password"));
    assert!(response.maybe_cookie(SESSION_COOKIE).is_none());
}

#[tokio::test]
async fn login_opens_the_home_page() {
    let (server, _) = server().await;
    let cookie = session(&server).await;
    let response = server.get("/").add_cookie(cookie).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let html = response.text();
    assert!(html.contains("Welcome to Mortgage Management System"));
    assert!(html.contains("Guarantor_Cosigners"));
}

#[tokio::test]
async fn logout_ends_the_session() {
    let (server, _) = server().await;
    let cookie = session(&server).await;

    let response = server.post("/logout").add_cookie(cookie.clone()).await;
    assert_redirects_to(&response, "/login");

    let response = server.get("/").add_cookie(cookie).await;
    assert_redirects_to(&response, "/login");
}

#[tokio::test]
async fn idle_sessions_are_sent_back_to_login() {
    let (state, _) = app_state().await;
    let state = state.with_sessions(SessionStore::with_idle_timeout(Duration::from_millis(20)));
    let server = TestServer::new(app_router(state)).unwrap();
    let cookie = session(&server).await;

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_redirects_to(&server.get("/").add_cookie(cookie).await, "/login");
}

#[tokio::test]
async fn menu_selection_navigates_to_the_operation() {
    let (server, _) = server().await;
    let cookie = session(&server).await;
    let response = server
        .get("/navigate?operation=update&table=Payments")
        .add_cookie(cookie)
        .await;
    assert_redirects_to(&response, "/tables/Payments/update");
}

#[tokio::test]
async fn unknown_tables_are_not_found() {
    let (server, _) = server().await;
    let cookie = session(&server).await;
    let response = server.get("/tables/Lenders/read").add_cookie(cookie).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert!(response.text().contains("Unknown table selected"));
}

#[tokio::test]
async fn create_form_lists_editable_columns() {
    let (server, _) = server().await;
    let cookie = session(&server).await;
    let response = server
        .get("/tables/Properties/create")
        .add_cookie(cookie)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let html = response.text();
    assert!(html.contains("Create a new record on table Properties"));
    assert!(html.contains(r#"name="Address""#));
    assert!(!html.contains(r#"name="PropertyID""#));
}

#[tokio::test]
async fn created_records_show_up_in_read() {
    let (server, _) = server().await;
    let cookie = session(&server).await;

    let response = server
        .post("/tables/Properties/create")
        .add_cookie(cookie.clone())
        .form(&[("Address", "1 Main St"), ("Value", "250000")])
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert!(response.text().contains("Record created successfully in Properties!"));

    let html = server
        .get("/tables/Properties/read")
        .add_cookie(cookie)
        .await
        .text();
    assert!(html.contains("<th>PropertyID</th>"));
    assert!(html.contains("<td>1 Main St</td>"));
    assert!(html.contains("<td>250000</td>"));
}

#[tokio::test]
async fn update_on_an_empty_table_reports_no_records() {
    let (server, _) = server().await;
    let cookie = session(&server).await;
    let response = server
        .get("/tables/Borrowers/update")
        .add_cookie(cookie)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("No records found in Borrowers."));
}

#[tokio::test]
async fn update_flow_prefills_and_saves() {
    let (server, db) = server().await;
    let borrowers = TableRecordManager::new(
        db.as_ref() as &dyn Database,
        DB_NAME,
        &TableCatalog::mortgage(),
        "Borrowers",
    );
    let key = borrowers
        .create(&fields(&[("FirstName", "Ada"), ("LastName", "Byron")]))
        .await
        .unwrap()
        .key
        .unwrap();
    let cookie = session(&server).await;

    let picker = server
        .get("/tables/Borrowers/update")
        .add_cookie(cookie.clone())
        .await
        .text();
    assert!(picker.contains(&format!(r#"<option value="{key}">"#)));

    let response = server
        .get(&format!("/tables/Borrowers/update?key={key}"))
        .add_cookie(cookie.clone())
        .await;
    assert_redirects_to(&response, &format!("/tables/Borrowers/update/{key}"));

    let form = server
        .get(&format!("/tables/Borrowers/update/{key}"))
        .add_cookie(cookie.clone())
        .await
        .text();
    assert!(form.contains(r#"value="Byron""#));

    let response = server
        .post(&format!("/tables/Borrowers/update/{key}"))
        .add_cookie(cookie)
        .form(&[
            ("FirstName", "Ada"),
            ("LastName", "Lovelace"),
            ("Email", ""),
            ("Phone", ""),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("Record Updated successfully in Borrowers!"));

    let record = borrowers.fetch_record(&key).await.unwrap().unwrap();
    assert_eq!(record.text("LastName").as_deref(), Some("Lovelace"));
}

#[tokio::test]
async fn delete_flow_confirms_then_deletes() {
    let (server, db) = server().await;
    let properties = TableRecordManager::new(
        db.as_ref() as &dyn Database,
        DB_NAME,
        &TableCatalog::mortgage(),
        "Properties",
    );
    let key = properties
        .create(&fields(&[("Address", "1 Main St")]))
        .await
        .unwrap()
        .key
        .unwrap();
    let cookie = session(&server).await;

    let confirm = server
        .get(&format!("/tables/Properties/delete/{key}"))
        .add_cookie(cookie.clone())
        .await
        .text();
    assert!(confirm.contains("<td>1 Main St</td>"));
    assert!(confirm.contains("Delete Record"));

    let response = server
        .post(&format!("/tables/Properties/delete/{key}"))
        .add_cookie(cookie.clone())
        .await;
    assert!(response.text().contains("Record Deleted successfully from Properties!"));
    assert!(properties.read().await.unwrap().is_empty());

    let again = server
        .post(&format!("/tables/Properties/delete/{key}"))
        .add_cookie(cookie)
        .await;
    assert_eq!(again.status_code(), StatusCode::OK);
    assert!(again.text().contains("Nothing to delete"));
}

#[tokio::test]
async fn saving_the_edit_form_keeps_stored_empty_strings() {
    let (server, db) = server().await;
    db.run_script(
        "INSERT INTO `Borrowers` (`FirstName`, `LastName`, `Email`) VALUES ('', 'Byron', '')",
    )
    .await
    .unwrap();
    let cookie = session(&server).await;

    let response = server
        .post("/tables/Borrowers/update/1")
        .add_cookie(cookie)
        .form(&[
            ("FirstName", ""),
            ("LastName", "Lovelace"),
            ("Email", ""),
            ("Phone", ""),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("Record Updated successfully in Borrowers!"));

    let borrowers = TableRecordManager::new(
        db.as_ref() as &dyn Database,
        DB_NAME,
        &TableCatalog::mortgage(),
        "Borrowers",
    );
    let record = borrowers.fetch_record("1").await.unwrap().unwrap();
    assert_eq!(record.text("LastName").as_deref(), Some("Lovelace"));
    assert_eq!(record.get("FirstName"), Some(&serde_json::Value::from("")));
}
