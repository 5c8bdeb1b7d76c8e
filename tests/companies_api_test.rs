mod common;

use axum::http::StatusCode;
use common::{bearer, error_message, setup_seeded_server};
use serde_json::{json, Value};

fn new_company_json(handle: &str) -> Value {
    json!({
        "handle": handle,
        "name": format!("Company {}", handle),
        "description": "A new company",
        "numEmployees": 10,
        "logoUrl": "https://example.com/logo.png"
    })
}

#[tokio::test]
async fn test_create_company() {
    let seeded = setup_seeded_server().await;

    let response = seeded
        .server
        .post("/companies")
        .add_header(http::header::AUTHORIZATION, bearer(&seeded.admin_token))
        .json(&new_company_json("new"))
        .await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(
        response.json::<Value>(),
        json!({
            "company": {
                "handle": "new",
                "name": "Company new",
                "description": "A new company",
                "numEmployees": 10,
                "logoUrl": "https://example.com/logo.png"
            }
        })
    );

    let response = seeded
        .server
        .post("/companies")
        .add_header(http::header::AUTHORIZATION, bearer(&seeded.admin_token))
        .json(&new_company_json("new"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(&response.json::<Value>()),
        "Duplicate company: new"
    );
}

#[tokio::test]
async fn test_create_company_validation() {
    let seeded = setup_seeded_server().await;

    seeded
        .server
        .post("/companies")
        .add_header(http::header::AUTHORIZATION, bearer(&seeded.u1_token))
        .json(&new_company_json("new"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let mut bad_logo = new_company_json("new");
    bad_logo["logoUrl"] = json!("not a url");
    seeded
        .server
        .post("/companies")
        .add_header(http::header::AUTHORIZATION, bearer(&seeded.admin_token))
        .json(&bad_logo)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let mut bad_handle = new_company_json("New Co");
    bad_handle["handle"] = json!("New Co");
    seeded
        .server
        .post("/companies")
        .add_header(http::header::AUTHORIZATION, bearer(&seeded.admin_token))
        .json(&bad_handle)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_companies() {
    let seeded = setup_seeded_server().await;

    let response = seeded.server.get("/companies").await;
    response.assert_status(StatusCode::OK);
    let body = response.json::<Value>();
    let companies = body["companies"].as_array().unwrap();
    assert_eq!(companies.len(), 3);
    assert_eq!(companies[0]["handle"], "c1");

    let response = seeded
        .server
        .get("/companies")
        .add_query_param("minEmployees", "2")
        .await;
    let body = response.json::<Value>();
    let handles: Vec<&str> = body["companies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["handle"].as_str().unwrap())
        .collect();
    assert_eq!(handles, vec!["c2", "c3"]);

    seeded
        .server
        .get("/companies")
        .add_query_param("minEmployees", "3")
        .add_query_param("maxEmployees", "1")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_company_lists_jobs() {
    let seeded = setup_seeded_server().await;

    let response = seeded.server.get("/companies/c2").await;
    response.assert_status(StatusCode::OK);
    let company = &response.json::<Value>()["company"];
    assert_eq!(company["name"], "C2");

    let jobs = company["jobs"].as_array().unwrap();
    assert_eq!(jobs.len(), 3);
    assert_eq!(
        jobs[0],
        json!({
            "id": seeded.fixture.job_ids[3],
            "title": "j21",
            "salary": 21,
            "equity": "0.2"
        })
    );

    let response = seeded.server.get("/companies/nope").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(error_message(&response.json::<Value>()), "No company: nope");
}

#[tokio::test]
async fn test_update_company() {
    let seeded = setup_seeded_server().await;

    let response = seeded
        .server
        .patch("/companies/c1")
        .add_header(http::header::AUTHORIZATION, bearer(&seeded.admin_token))
        .json(&json!({"name": "C1 New", "logoUrl": null}))
        .await;
    response.assert_status(StatusCode::OK);
    let company = &response.json::<Value>()["company"];
    assert_eq!(company["name"], "C1 New");
    assert_eq!(company["logoUrl"], Value::Null);
    assert_eq!(company["numEmployees"], 1);

    // handle is immutable
    seeded
        .server
        .patch("/companies/c1")
        .add_header(http::header::AUTHORIZATION, bearer(&seeded.admin_token))
        .json(&json!({"handle": "c1-new"}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    seeded
        .server
        .patch("/companies/c1")
        .add_header(http::header::AUTHORIZATION, bearer(&seeded.u1_token))
        .json(&json!({"name": "x"}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_company() {
    let seeded = setup_seeded_server().await;

    let response = seeded
        .server
        .delete("/companies/c1")
        .add_header(http::header::AUTHORIZATION, bearer(&seeded.admin_token))
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({"deleted": "c1"}));

    seeded
        .server
        .get(&format!("/jobs/{}", seeded.fixture.job_ids[0]))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    seeded
        .server
        .delete("/companies/c1")
        .add_header(http::header::AUTHORIZATION, bearer(&seeded.admin_token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
