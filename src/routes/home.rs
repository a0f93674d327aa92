use axum::response::Html;

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Links to the API documentation", content_type = "text/html")
    ),
    tag = "General"
)]
pub async fn root() -> Html<&'static str> {
    Html(concat!(
        "<!DOCTYPE html>",
        "<html><head><title>Image Annotation API</title></head><body>",
        "<h1>Image Annotation API</h1>",
        "<ul>",
        "<li><a href=\"/swagger-ui/\">Swagger UI</a></li>",
        "<li><a href=\"/api-docs/openapi.json\">OpenAPI document</a></li>",
        "</ul>",
        "</body></html>",
    ))
}
