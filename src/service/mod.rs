/// Domain services.
/// Orchestrate the stores, apply validation and compute derived views.

pub mod film;
pub mod genre;
pub mod mpa;
pub mod user;

pub use film::FilmService;
pub use genre::GenreService;
pub use mpa::MpaService;
pub use user::UserService;

use crate::db::Stores;

/// All services, wired to one set of stores
#[derive(Clone)]
pub struct AppServices {
    pub films: FilmService,
    pub users: UserService,
    pub genres: GenreService,
    pub mpa: MpaService,
}

impl AppServices {
    pub fn new(stores: Stores) -> Self {
        AppServices {
            films: FilmService::new(
                stores.films,
                stores.users.clone(),
                stores.genres.clone(),
                stores.mpa.clone(),
            ),
            users: UserService::new(stores.users),
            genres: GenreService::new(stores.genres),
            mpa: MpaService::new(stores.mpa),
        }
    }
}
