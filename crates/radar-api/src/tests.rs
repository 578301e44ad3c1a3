//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Method, Request, StatusCode},
};
use radar_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{Clock, api_router};

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  let app = api_router(Arc::new(store), Clock::utc());

  let (status, _) = send(&app, Method::PUT, "/bands/T1", Some(json!({
    "question": "Will machines think?",
    "side_a":   "Yes",
    "side_b":   "No",
    "domain":   "tech",
  })))
  .await;
  assert_eq!(status, StatusCode::OK);
  app
}

async fn send(
  app: &Router,
  method: Method,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut req = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      req = req.header("content-type", "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
  let status = res.status();
  let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

fn item(date: &str, title: &str, visible: usize) -> Value {
  json!({
    "date":        date,
    "freq":        "T1",
    "stance":      "A",
    "title":       title,
    "author_name": "Alan Turing",
    "source":      "Mind, 1950",
    "content":     "x".repeat(visible),
  })
}

#[tokio::test]
async fn upsert_then_read_by_date() {
  let app = app().await;

  let (status, created) = send(&app, Method::POST, "/items", Some(item("2026-01-22", "One", 520))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(created["created"], true);

  let (status, updated) = send(&app, Method::POST, "/items", Some(item("2026-01-22", "Two", 520))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["item"]["item_id"], created["item"]["item_id"]);

  let (status, items) = send(&app, Method::GET, "/items?date=2026-01-22", None).await;
  assert_eq!(status, StatusCode::OK);
  let items = items.as_array().unwrap();
  assert_eq!(items.len(), 1);
  assert_eq!(items[0]["title"], "Two");
  assert_eq!(items[0]["domain"], "tech");
  assert_eq!(items[0]["tension"]["question"], "Will machines think?");
}

#[tokio::test]
async fn short_content_is_unprocessable_with_shortage() {
  let app = app().await;
  let (status, body) = send(&app, Method::POST, "/items", Some(item("2026-01-22", "Short", 480))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["field"], "content");
  assert_eq!(body["reason"], "too_short");
  assert_eq!(body["shortage"], 20);
}

#[tokio::test]
async fn strict_insert_conflicts() {
  let app = app().await;
  let uri = "/items?on_conflict=error";
  let (status, _) = send(&app, Method::POST, uri, Some(item("2026-02-01", "One", 520))).await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, _) = send(&app, Method::POST, uri, Some(item("2026-02-01", "Two", 520))).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_bodies_are_validation_failures() {
  let app = app().await;

  let mut extra = item("2026-01-22", "Extra", 520);
  extra["surprise"] = json!(true);
  let (status, body) = send(&app, Method::POST, "/items", Some(extra)).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["field"], "body");

  let mut bad_stance = item("2026-01-22", "Bad", 520);
  bad_stance["stance"] = json!("C");
  let (status, _) = send(&app, Method::POST, "/items", Some(bad_stance)).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

  let (status, body) = send(&app, Method::GET, "/items?date=yesterday", None).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["field"], "query");
}

#[tokio::test]
async fn reactions_round_trip() {
  let app = app().await;
  let (_, created) = send(&app, Method::POST, "/items", Some(item("2026-03-01", "React", 520))).await;
  let id = created["item"]["item_id"].as_str().unwrap().to_owned();

  let like = format!("/users/u1/items/{id}/like");
  let (_, body) = send(&app, Method::POST, &like, None).await;
  assert_eq!(body["liked"], true);
  let (_, body) = send(&app, Method::POST, &like, None).await;
  assert_eq!(body["liked"], false);

  let stance = format!("/users/u1/items/{id}/stance");
  let (_, body) = send(&app, Method::PUT, &stance, Some(json!({ "stance": "B" }))).await;
  assert_eq!(body["stance"], "B");
  let (_, body) = send(&app, Method::PUT, &stance, Some(json!({ "stance": "B" }))).await;
  assert_eq!(body["stance"], Value::Null);

  send(&app, Method::POST, &like, None).await;
  let (status, favorites) = send(&app, Method::GET, "/users/u1/favorites", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(favorites.as_array().unwrap().len(), 1);
  assert_eq!(favorites[0]["liked"], true);

  let missing = format!("/users/u1/items/{}/like", uuid::Uuid::new_v4());
  let (status, _) = send(&app, Method::POST, &missing, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
  let app = app().await;
  let (_, created) = send(&app, Method::POST, "/items", Some(item("2026-03-02", "Gone", 520))).await;
  let uri = format!("/items/{}", created["item"]["item_id"].as_str().unwrap());

  let (status, _) = send(&app, Method::DELETE, &uri, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = send(&app, Method::GET, &uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn drafts_approve_once() {
  let app = app().await;
  let (status, draft) = send(&app, Method::POST, "/drafts", Some(json!({
    "candidates": [item("2026-04-01", "Drafted", 520)],
  })))
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let approve = format!("/drafts/{}/approve", draft["draft_id"].as_str().unwrap());

  let (status, promotion) = send(&app, Method::POST, &approve, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(promotion["draft"]["status"], "approved");
  assert_eq!(promotion["report"]["inserted"].as_array().unwrap().len(), 1);

  let (status, _) = send(&app, Method::POST, &approve, None).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (_, approved) = send(&app, Method::GET, "/drafts?status=approved", None).await;
  assert_eq!(approved.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn backfill_reports_skips() {
  let app = app().await;
  send(&app, Method::POST, "/items", Some(item("2026-05-01", "Curated", 520))).await;

  let (status, report) = send(&app, Method::POST, "/items/backfill", Some(json!([
    item("2026-05-01", "Generated", 520),
    item("2026-05-02", "Fresh", 520),
  ])))
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(report["inserted"].as_array().unwrap().len(), 1);
  assert_eq!(report["skipped"][0]["index"], 0);
}

#[tokio::test]
async fn today_serves_the_clock_date_with_filters() {
  let app = app().await;
  send(&app, Method::PUT, "/bands/P1", Some(json!({
    "question": "Should voting be mandatory?",
    "side_a":   "Yes",
    "side_b":   "No",
    "domain":   "politics",
  })))
  .await;

  let today = Clock::utc().today().to_string();
  let mut politics = item(&today, "Civic duty", 520);
  politics["freq"] = json!("P1");
  let (status, _) = send(&app, Method::POST, "/items", Some(item(&today, "Thinking", 520))).await;
  assert_eq!(status, StatusCode::CREATED);
  send(&app, Method::POST, "/items", Some(politics)).await;

  let (status, all) = send(&app, Method::GET, "/items/today", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(all.as_array().unwrap().len(), 2);

  let (status, tech) = send(&app, Method::GET, "/items/today?domain=tech", None).await;
  assert_eq!(status, StatusCode::OK);
  let tech = tech.as_array().unwrap();
  assert_eq!(tech.len(), 1);
  assert_eq!(tech[0]["title"], "Thinking");
  assert_eq!(tech[0]["date"], today);
}

#[tokio::test]
async fn sources_and_collection_log() {
  let app = app().await;
  let (status, source) = send(&app, Method::POST, "/sources", Some(json!({
    "name": "Lecture channel",
    "kind": "channel",
  })))
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(source["active"], true);
  let log = format!("/sources/{}/log", source["source_id"].as_str().unwrap());

  let (status, sources) = send(&app, Method::GET, "/sources", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(sources.as_array().unwrap().len(), 1);

  let entry = json!({ "external_id": "vid-42", "title": "On minds" });
  let (status, first) = send(&app, Method::POST, &log, Some(entry.clone())).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(first["newly_seen"], true);

  let (status, again) = send(&app, Method::POST, &log, Some(entry)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(again["newly_seen"], false);
  assert_eq!(again["entry"]["entry_id"], first["entry"]["entry_id"]);

  let (status, entries) = send(&app, Method::GET, &log, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(entries.as_array().unwrap().len(), 1);

  let (status, _) = send(&app, Method::POST, "/sources", Some(json!({
    "name": "  ",
    "kind": "person",
  })))
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

  let unknown = format!("/sources/{}/log", uuid::Uuid::new_v4());
  let (status, _) = send(&app, Method::GET, &unknown, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rejected_drafts_publish_nothing() {
  let app = app().await;
  let (_, draft) = send(&app, Method::POST, "/drafts", Some(json!({
    "candidates": [item("2026-06-01", "Declined", 520)],
  })))
  .await;
  let id = draft["draft_id"].as_str().unwrap();

  let reject = format!("/drafts/{id}/reject");
  let (status, rejected) = send(&app, Method::POST, &reject, Some(json!({ "note": "off topic" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(rejected["status"], "rejected");
  assert_eq!(rejected["note"], "off topic");

  let (status, _) = send(&app, Method::POST, &reject, Some(json!({ "note": null }))).await;
  assert_eq!(status, StatusCode::CONFLICT);
  let (status, _) = send(&app, Method::POST, &format!("/drafts/{id}/approve"), None).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (_, items) = send(&app, Method::GET, "/items?date=2026-06-01", None).await;
  assert!(items.as_array().unwrap().is_empty());
}
