/// REST handlers for films, likes and the popular list.
use actix_web::{web, HttpResponse};

use super::dto::{film_responses, FilmRequest, FilmResponse, PopularQuery, DEFAULT_POPULAR_COUNT};
use crate::error::AppResult;
use crate::service::FilmService;

/// List all films
/// GET /films
pub async fn list_films(service: web::Data<FilmService>) -> AppResult<HttpResponse> {
    let films = service.list().await?;
    Ok(HttpResponse::Ok().json(film_responses(films)))
}

/// Create a film
/// POST /films
pub async fn create_film(
    service: web::Data<FilmService>,
    req: web::Json<FilmRequest>,
) -> AppResult<HttpResponse> {
    let film = service.create(req.into_inner().into_draft()).await?;
    Ok(HttpResponse::Ok().json(FilmResponse::from(film)))
}

/// Update the film named by the body's id
/// PUT /films
pub async fn update_film(
    service: web::Data<FilmService>,
    req: web::Json<FilmRequest>,
) -> AppResult<HttpResponse> {
    let req = req.into_inner();
    let id = req.require_id()?;
    let film = service.update(id, req.into_draft()).await?;
    Ok(HttpResponse::Ok().json(FilmResponse::from(film)))
}

/// GET /films/:id
pub async fn get_film(
    service: web::Data<FilmService>,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let film = service.get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(FilmResponse::from(film)))
}

/// DELETE /films/:id
pub async fn delete_film(
    service: web::Data<FilmService>,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    service.delete(id.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}

/// PUT /films/:id/like/:user_id
pub async fn add_like(
    service: web::Data<FilmService>,
    path: web::Path<(i64, i64)>,
) -> AppResult<HttpResponse> {
    let (film_id, user_id) = path.into_inner();
    service.add_like(film_id, user_id).await?;
    Ok(HttpResponse::Ok().finish())
}

/// DELETE /films/:id/like/:user_id
pub async fn remove_like(
    service: web::Data<FilmService>,
    path: web::Path<(i64, i64)>,
) -> AppResult<HttpResponse> {
    let (film_id, user_id) = path.into_inner();
    service.remove_like(film_id, user_id).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Most liked films
/// GET /films/popular?count=N
pub async fn popular_films(
    service: web::Data<FilmService>,
    query: web::Query<PopularQuery>,
) -> AppResult<HttpResponse> {
    let count = query.count.unwrap_or(DEFAULT_POPULAR_COUNT);
    let films = service.popular(count).await?;
    Ok(HttpResponse::Ok().json(film_responses(films)))
}
