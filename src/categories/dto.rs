use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: Option<String>,
}
