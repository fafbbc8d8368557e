use serde::{Deserialize, Serialize};

use crate::domain::books::BookRecord;

#[derive(Debug, Deserialize, Serialize)]
pub struct BookInfoRequest {
    #[serde(default)]
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct BookInfoResponse {
    pub books: Vec<BookRecord>,
}
