/// HTTP server factory and configuration.
/// Provides the route table and a reusable function to create and configure
/// the HTTP server for use in both the main binary and tests.

use actix_web::{error, middleware, web, App, HttpRequest, HttpServer};

use crate::db::Stores;
use crate::error::AppError;
use crate::handlers::{
    add_friend, add_like, common_friends, create_film, create_user, delete_film, delete_user,
    get_film, get_genre, get_mpa, get_user, health, list_films, list_friends, list_genres,
    list_mpa, list_users, popular_films, remove_friend, remove_like, update_film, update_user,
};
use crate::service::AppServices;

fn json_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    log::warn!("Rejected JSON body for {} {}: {}", req.method(), req.path(), err);
    AppError::Validation(format!("Invalid request body: {err}")).into()
}

fn path_error(err: error::PathError, req: &HttpRequest) -> actix_web::Error {
    log::warn!("Rejected path {}: {}", req.path(), err);
    AppError::Validation(format!("Invalid path parameter: {err}")).into()
}

fn query_error(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    log::warn!("Rejected query for {}: {}", req.path(), err);
    AppError::Validation(format!("Invalid query parameter: {err}")).into()
}

/// Register services, extractor error mapping and every route
///
/// Malformed bodies, path ids and query parameters are all reported as
/// validation errors (400).
pub fn configure_app(cfg: &mut web::ServiceConfig, services: &AppServices) {
    cfg.app_data(web::Data::new(services.films.clone()))
        .app_data(web::Data::new(services.users.clone()))
        .app_data(web::Data::new(services.genres.clone()))
        .app_data(web::Data::new(services.mpa.clone()))
        .app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .route("/health", web::get().to(health))
        // Films
        .route("/films", web::get().to(list_films))
        .route("/films", web::post().to(create_film))
        .route("/films", web::put().to(update_film))
        .route("/films/popular", web::get().to(popular_films))
        .route("/films/{id}", web::get().to(get_film))
        .route("/films/{id}", web::delete().to(delete_film))
        .route("/films/{id}/like/{user_id}", web::put().to(add_like))
        .route("/films/{id}/like/{user_id}", web::delete().to(remove_like))
        // Users
        .route("/users", web::get().to(list_users))
        .route("/users", web::post().to(create_user))
        .route("/users", web::put().to(update_user))
        .route("/users/{id}", web::get().to(get_user))
        .route("/users/{id}", web::delete().to(delete_user))
        .route("/users/{id}/friends", web::get().to(list_friends))
        .route("/users/{id}/friends/common/{other_id}", web::get().to(common_friends))
        .route("/users/{id}/friends/{friend_id}", web::put().to(add_friend))
        .route("/users/{id}/friends/{friend_id}", web::delete().to(remove_friend))
        // Reference data
        .route("/genres", web::get().to(list_genres))
        .route("/genres/{id}", web::get().to(get_genre))
        .route("/mpa", web::get().to(list_mpa))
        .route("/mpa/{id}", web::get().to(get_mpa));
}

/// Create a configured HTTP server
///
/// Takes the wired services and a bind address, then returns a fully
/// configured `Server` ready to be awaited.
///
/// # Example
/// ```ignore
/// let services = AppServices::new(Stores::sqlite(db::create_pool("filmorate.db")?));
/// let server = server::create_http_server(services, "127.0.0.1:8080")?;
/// server.await?;
/// ```
pub fn create_http_server(
    services: AppServices,
    bind_addr: &str,
) -> std::io::Result<actix_web::dev::Server> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .configure(|cfg| configure_app(cfg, &services))
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}

/// Create a test HTTP server backed by an in-memory SQLite database
///
/// Binds to a random available port and returns the server together with
/// the address it listens on.
pub fn create_test_http_server() -> std::io::Result<(actix_web::dev::Server, String)> {
    let services = AppServices::new(Stores::sqlite(crate::db::create_test_pool()));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .configure(|cfg| configure_app(cfg, &services))
    })
    .bind("127.0.0.1:0")?;

    // Get the actual bind address (including the assigned port)
    let addr_str = server
        .addrs()
        .first()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "No bind address found"))?
        .to_string();

    Ok((server.run(), addr_str))
}
