mod common;

use axum::http::StatusCode;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;
use uuid::Uuid;

use annotation_kit::entities::{annotation, image, project};
use common::{dog_box, routes, TestApp};

#[tokio::test]
async fn create_and_fetch_project() {
    let app = TestApp::spawn().await;

    let res = app.post_json(routes::PROJECTS, json!({ "name": "P1" })).await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["name"], "P1");
    let id = res.body["id"].as_str().unwrap();
    assert!(Uuid::parse_str(id).is_ok());

    let res = app.get(&routes::project(id)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!({ "id": id, "name": "P1" }));
}

#[tokio::test]
async fn list_returns_every_project() {
    let app = TestApp::spawn().await;
    let first = app.create_project("first").await;
    let second = app.create_project("second").await;

    let res = app.get(routes::PROJECTS).await;
    assert_eq!(res.status, StatusCode::OK);

    let ids: Vec<&str> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first.as_str()));
    assert!(ids.contains(&second.as_str()));
}

#[tokio::test]
async fn empty_list_is_an_empty_array() {
    let app = TestApp::spawn().await;
    let res = app.get(routes::PROJECTS).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!([]));
}

#[tokio::test]
async fn create_without_name_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app.post_json(routes::PROJECTS, json!({})).await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(res.body["error"].is_string());

    let count = project::Entity::find().count(&app.db).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn unknown_project_is_not_found() {
    let app = TestApp::spawn().await;
    let missing = Uuid::new_v4().to_string();

    let res = app.get(&routes::project(&missing)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["error"], "Project not found");

    let res = app.delete(&routes::project(&missing)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_id_is_a_client_error() {
    let app = TestApp::spawn().await;
    let res = app.get(&routes::project("not-a-uuid")).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rename_project() {
    let app = TestApp::spawn().await;
    let id = app.create_project("draft").await;

    let res = app
        .patch_json(&routes::project(&id), json!({ "name": "final" }))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["name"], "final");

    let res = app.get(&routes::project(&id)).await;
    assert_eq!(res.body["name"], "final");
}

#[tokio::test]
async fn empty_patch_keeps_project() {
    let app = TestApp::spawn().await;
    let id = app.create_project("same").await;

    let res = app.patch_json(&routes::project(&id), json!({})).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["name"], "same");
}

#[tokio::test]
async fn delete_cascades_to_images_annotations_and_files() {
    let app = TestApp::spawn().await;
    let id = app.create_project("doomed").await;

    for name in ["a.jpg", "b.png"] {
        let img = app.upload_one(&id, name, b"pixels").await;
        let image_id = img["id"].as_str().unwrap();
        let res = app.create_annotation(image_id, dog_box()).await;
        assert_eq!(res.status, StatusCode::CREATED);
    }
    assert_eq!(app.stored_files(&id), 2);

    let res = app.delete(&routes::project(&id)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!({ "status": "deleted" }));

    assert_eq!(project::Entity::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(image::Entity::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(annotation::Entity::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(app.stored_files(&id), 0);
    assert!(!app
        .storage
        .project_dir(Uuid::parse_str(&id).unwrap())
        .exists());

    let res = app.get(&routes::project(&id)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_leaves_other_projects_alone() {
    let app = TestApp::spawn().await;
    let doomed = app.create_project("doomed").await;
    let kept = app.create_project("kept").await;
    app.upload_one(&doomed, "a.jpg", b"x").await;
    let kept_image = app.upload_one(&kept, "a.jpg", b"y").await;

    let res = app.delete(&routes::project(&doomed)).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.get(&routes::project_images(&kept)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!([kept_image]));
    assert_eq!(app.stored_files(&kept), 1);
}

#[tokio::test]
async fn delete_tolerates_missing_files() {
    let app = TestApp::spawn().await;
    let id = app.create_project("p").await;
    app.upload_one(&id, "a.jpg", b"x").await;

    std::fs::remove_dir_all(app.storage.project_dir(Uuid::parse_str(&id).unwrap())).unwrap();

    let res = app.delete(&routes::project(&id)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(image::Entity::find().count(&app.db).await.unwrap(), 0);
}
