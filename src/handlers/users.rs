/// REST handlers for users and friendships.
use actix_web::{web, HttpResponse};

use super::dto::{user_responses, UserRequest, UserResponse};
use crate::error::AppResult;
use crate::service::UserService;

/// GET /users
pub async fn list_users(service: web::Data<UserService>) -> AppResult<HttpResponse> {
    let users = service.list().await?;
    Ok(HttpResponse::Ok().json(user_responses(users)))
}

/// Register a new user
/// POST /users
pub async fn create_user(
    service: web::Data<UserService>,
    req: web::Json<UserRequest>,
) -> AppResult<HttpResponse> {
    let user = service.create(req.into_inner().into_draft()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Update the user named by the body's id
/// PUT /users
pub async fn update_user(
    service: web::Data<UserService>,
    req: web::Json<UserRequest>,
) -> AppResult<HttpResponse> {
    let req = req.into_inner();
    let id = req.require_id()?;
    let user = service.update(id, req.into_draft()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// GET /users/:id
pub async fn get_user(
    service: web::Data<UserService>,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let user = service.get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// DELETE /users/:id
pub async fn delete_user(
    service: web::Data<UserService>,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    service.delete(id.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}

/// PUT /users/:id/friends/:friend_id
pub async fn add_friend(
    service: web::Data<UserService>,
    path: web::Path<(i64, i64)>,
) -> AppResult<HttpResponse> {
    let (user_id, friend_id) = path.into_inner();
    service.add_friend(user_id, friend_id).await?;
    Ok(HttpResponse::Ok().finish())
}

/// DELETE /users/:id/friends/:friend_id
pub async fn remove_friend(
    service: web::Data<UserService>,
    path: web::Path<(i64, i64)>,
) -> AppResult<HttpResponse> {
    let (user_id, friend_id) = path.into_inner();
    service.remove_friend(user_id, friend_id).await?;
    Ok(HttpResponse::Ok().finish())
}

/// GET /users/:id/friends
pub async fn list_friends(
    service: web::Data<UserService>,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let friends = service.friends(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user_responses(friends)))
}

/// GET /users/:id/friends/common/:other_id
pub async fn common_friends(
    service: web::Data<UserService>,
    path: web::Path<(i64, i64)>,
) -> AppResult<HttpResponse> {
    let (user_id, other_id) = path.into_inner();
    let common = service.common_friends(user_id, other_id).await?;
    Ok(HttpResponse::Ok().json(user_responses(common)))
}
