use crate::db::models::MpaRating;
use crate::db::MpaStore;
use crate::error::AppResult;
use std::sync::Arc;

#[derive(Clone)]
pub struct MpaService {
    ratings: Arc<dyn MpaStore>,
}

impl MpaService {
    pub fn new(ratings: Arc<dyn MpaStore>) -> Self {
        MpaService { ratings }
    }

    pub async fn list(&self) -> AppResult<Vec<MpaRating>> {
        self.ratings.list().await
    }

    pub async fn get(&self, id: i64) -> AppResult<MpaRating> {
        self.ratings.get(id).await
    }
}
