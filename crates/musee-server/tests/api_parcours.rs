mod common;

use axum::http::{Method, StatusCode};
use common::*;
use serde_json::json;

async fn create_tour(app: &TestApp, nom: &str, duree: i64) -> serde_json::Value {
    let (status, tour) = send(
        &app.router,
        json_request(Method::POST, "/parcours", json!({ "nom": nom, "duree": duree })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create tour failed: {tour}");
    tour
}

#[tokio::test]
async fn create_tour_starts_empty() {
    let app = setup_app();

    let tour = create_tour(&app, "Romantisme", 45).await;

    assert_eq!(
        tour,
        json!({ "id": 1, "nom": "Romantisme", "duree": 45, "oeuvres": [] })
    );
}

#[tokio::test]
async fn invalid_tours_are_rejected() {
    let app = setup_app();

    for body in [
        json!({ "nom": "", "duree": 30 }),
        json!({ "nom": "Sans durée", "duree": 0 }),
    ] {
        let (status, _) = send(
            &app.router,
            json_request(Method::POST, "/parcours", body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (_, tours) = send(&app.router, get_request("/parcours")).await;
    assert_eq!(tours, json!([]));
}

#[tokio::test]
async fn tour_embeds_its_works() {
    let app = setup_app();
    create_tour(&app, "Romantisme", 45).await;
    create_tour(&app, "Impressionnisme", 30).await;

    create_work(&app, work_form().text("parcoursId", "1")).await;
    create_work(&app, work_form()).await;
    create_work(&app, work_form().text("parcoursId", "1")).await;

    let (status, tour) = send(&app.router, get_request("/parcours/1")).await;
    assert_eq!(status, StatusCode::OK);
    let work_ids: Vec<i64> = tour["oeuvres"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["id"].as_i64().unwrap())
        .collect();
    assert_eq!(work_ids, vec![1, 3]);
    assert_eq!(tour["oeuvres"][0]["parcoursId"], 1);

    let (_, tours) = send(&app.router, get_request("/parcours")).await;
    let tours = tours.as_array().unwrap();
    assert_eq!(tours.len(), 2);
    assert_eq!(tours[1]["oeuvres"], json!([]));
}

#[tokio::test]
async fn moving_a_work_between_tours() {
    let app = setup_app();
    create_tour(&app, "Romantisme", 45).await;
    create_tour(&app, "Impressionnisme", 30).await;
    create_work(&app, work_form().text("parcoursId", "1")).await;

    let (status, work) = send(
        &app.router,
        json_request(Method::PATCH, "/oeuvres/1", json!({ "parcoursId": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(work["parcoursId"], 2);

    let (_, first) = send(&app.router, get_request("/parcours/1")).await;
    let (_, second) = send(&app.router, get_request("/parcours/2")).await;
    assert_eq!(first["oeuvres"], json!([]));
    assert_eq!(second["oeuvres"][0]["id"], 1);

    let (status, _) = send(
        &app.router,
        json_request(Method::PATCH, "/oeuvres/1", json!({ "parcoursId": 99 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_tour_is_not_found() {
    let app = setup_app();

    let (status, body) = send(&app.router, get_request("/parcours/999")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("999"));
}

#[tokio::test]
async fn malformed_tour_body_is_bad_request() {
    let app = setup_app();

    let (status, body) = send(
        &app.router,
        json_request(Method::POST, "/parcours", json!({ "nom": "Romantisme" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "got {body}");
}

#[tokio::test]
async fn tour_works_carry_their_overlays() {
    let app = setup_app();
    create_tour(&app, "Romantisme", 45).await;
    create_work(&app, work_form().text("parcoursId", "1")).await;
    create_overlay(&app, 1, overlay_form("composition")).await;

    let (status, tour) = send(&app.router, get_request("/parcours/1")).await;

    assert_eq!(status, StatusCode::OK);
    let calques = tour["oeuvres"][0]["calques"].as_array().unwrap();
    assert_eq!(calques.len(), 1);
    assert_eq!(calques[0]["typeCalque"], "composition");
}
