use std::sync::Arc;

use crate::application::book_info::BookInfoService;

#[derive(Clone)]
pub struct HttpState {
    pub books: Arc<BookInfoService>,
}
