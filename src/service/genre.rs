use crate::db::models::Genre;
use crate::db::GenreStore;
use crate::error::AppResult;
use std::sync::Arc;

#[derive(Clone)]
pub struct GenreService {
    genres: Arc<dyn GenreStore>,
}

impl GenreService {
    pub fn new(genres: Arc<dyn GenreStore>) -> Self {
        GenreService { genres }
    }

    pub async fn list(&self) -> AppResult<Vec<Genre>> {
        self.genres.list().await
    }

    pub async fn get(&self, id: i64) -> AppResult<Genre> {
        self.genres.get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_genre_lookup() {
        let service = GenreService::new(Arc::new(MemoryStore::new()));
        assert_eq!(service.get(2).await.unwrap().name, "Drama");
        assert!(matches!(service.get(7).await, Err(AppError::NotFound(_))));
    }
}
