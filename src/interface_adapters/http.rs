// JSON error body shared by the level-editor routes.

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
