/// Validation rules for film and user payloads.
/// Applied once by the services before anything reaches a store.
use crate::db::models::{FilmDraft, UserDraft};
use crate::error::{AppError, AppResult};
use chrono::NaiveDate;

/// Longest accepted film description, in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 200;

/// Date of the first public film screening
pub const MIN_RELEASE_DATE: NaiveDate = match NaiveDate::from_ymd_opt(1895, 12, 28) {
    Some(date) => date,
    None => panic!("invalid minimum release date"),
};

/// Check a film against the domain constraints
pub fn validate_film(film: &FilmDraft) -> AppResult<()> {
    if film.name.trim().is_empty() {
        return Err(reject_film(film, "Film name must not be blank".to_string()));
    }

    if let Some(description) = &film.description {
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(reject_film(
                film,
                format!("Film description must not exceed {MAX_DESCRIPTION_LENGTH} characters"),
            ));
        }
    }

    if film.release_date < MIN_RELEASE_DATE {
        return Err(reject_film(
            film,
            format!("Release date must not be earlier than {MIN_RELEASE_DATE}"),
        ));
    }

    if film.duration < 0 {
        return Err(reject_film(film, "Film duration must not be negative".to_string()));
    }

    Ok(())
}

/// Check a user against the domain constraints, with `today` as the upper
/// bound for the birthday
pub fn validate_user(user: &UserDraft, today: NaiveDate) -> AppResult<()> {
    if user.email.trim().is_empty() || !user.email.contains('@') {
        return Err(reject_user(user, "Email must be non-blank and contain '@'"));
    }

    if user.login.trim().is_empty() || user.login.contains(' ') {
        return Err(reject_user(user, "Login must be non-blank and contain no spaces"));
    }

    if user.birthday > today {
        return Err(reject_user(user, "Birthday must not be in the future"));
    }

    Ok(())
}

/// Requested size of the popular-films list must be positive
pub fn validate_count(count: i64) -> AppResult<usize> {
    if count <= 0 {
        log::warn!("Rejected popular films request: count={}", count);
        return Err(AppError::Validation(format!(
            "count must be a positive integer, got {count}"
        )));
    }
    usize::try_from(count).map_err(|_| AppError::Validation(format!("count {count} is too large")))
}

fn reject_film(film: &FilmDraft, message: String) -> AppError {
    log::warn!(
        "Film validation failed: name={:?}, description_len={}, release_date={}, duration={}: {}",
        film.name,
        film.description.as_deref().map_or(0, |d| d.chars().count()),
        film.release_date,
        film.duration,
        message
    );
    AppError::Validation(message)
}

fn reject_user(user: &UserDraft, message: &str) -> AppError {
    log::warn!(
        "User validation failed: email={:?}, login={:?}, birthday={}: {}",
        user.email,
        user.login,
        user.birthday,
        message
    );
    AppError::Validation(message.to_string())
}
