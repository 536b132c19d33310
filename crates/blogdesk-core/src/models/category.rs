use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(rename = "postCount", default)]
    pub post_count: Option<i64>,
}

impl Category {
    pub fn display_post_count(&self) -> String {
        match self.post_count.unwrap_or(0) {
            1 => "1 post".to_string(),
            count => format!("{} posts", count),
        }
    }
}
