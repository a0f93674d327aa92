mod annotations;
mod home;
mod images;
mod predict;
mod projects;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

/// Body returned by delete endpoints.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StatusResponse {
    #[schema(value_type = String, example = "deleted")]
    status: &'static str,
}

impl StatusResponse {
    pub fn deleted() -> Self {
        StatusResponse { status: "deleted" }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        home::root,
        projects::create_project,
        projects::list_projects,
        projects::get_project,
        projects::update_project,
        projects::delete_project,
        images::upload_images,
        images::list_images,
        images::get_image,
        images::delete_image,
        annotations::create_annotation,
        annotations::list_annotations,
        annotations::update_annotation,
        annotations::delete_annotation,
        predict::predict,
    ),
    components(
        schemas(
            StatusResponse,
            projects::CreateProjectRequest,
            projects::UpdateProjectRequest,
            projects::ProjectResponse,
            images::ImageResponse,
            annotations::CreateAnnotationRequest,
            annotations::UpdateAnnotationRequest,
            annotations::AnnotationResponse,
            predict::PredictionResponse,
            crate::services::prediction::Detection,
        )
    ),
    tags(
        (name = "General", description = "General API information"),
        (name = "Projects", description = "Project management"),
        (name = "Images", description = "Image upload and retrieval"),
        (name = "Annotations", description = "Bounding-box annotations on images"),
        (name = "Prediction", description = "Placeholder detector output")
    ),
    info(
        title = "Image Annotation API",
        version = "0.1.0",
        description = "Projects, images and bounding-box annotations, with a stub prediction endpoint",
    )
)]
struct ApiDoc;

pub fn create_routes(state: AppState) -> Router {
    let swagger_router: Router = SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into();

    let static_files = ServeDir::new(state.storage.root());
    let static_prefix = state.storage.url_prefix().to_string();

    let app_routes = Router::new()
        .route("/", get(home::root))
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/{project_id}",
            get(projects::get_project)
                .patch(projects::update_project)
                .delete(projects::delete_project),
        )
        .route(
            "/projects/{project_id}/images",
            get(images::list_images)
                .post(images::upload_images)
                .layer(DefaultBodyLimit::max(state.max_upload_bytes)),
        )
        .route(
            "/images/{image_id}",
            get(images::get_image).delete(images::delete_image),
        )
        .route(
            "/images/{image_id}/annotations",
            get(annotations::list_annotations).post(annotations::create_annotation),
        )
        .route(
            "/images/{image_id}/annotations/{annotation_id}",
            patch(annotations::update_annotation).delete(annotations::delete_annotation),
        )
        .route("/predict/{image_id}", post(predict::predict))
        .nest_service(&static_prefix, static_files)
        .with_state(state);

    Router::new()
        .merge(swagger_router)
        .merge(app_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
