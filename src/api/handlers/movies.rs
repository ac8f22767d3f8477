use axum::{
    extract::{Path, State},
    response::Response,
};

use crate::{
    api::{
        AppState,
        auth::Principal,
        extract::ApiJson,
        response::{created, empty_success, success},
    },
    core::{
        access::Action,
        movie::{self, MovieDraft},
    },
    errors::{Error, Result},
};

/// `GET /movies`
pub async fn list_movies(State(state): State<AppState>, principal: Principal) -> Result<Response> {
    principal.actor.require(Action::Browse)?;
    let movies = movie::list_movies(&state.core.db).await?;
    Ok(success(movies, "Movies retrieved"))
}

/// `GET /movies/:id`
pub async fn get_movie(
    State(state): State<AppState>,
    principal: Principal,
    Path(movie_id): Path<i64>,
) -> Result<Response> {
    principal.actor.require(Action::Browse)?;
    let found = movie::get_movie(&state.core.db, movie_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "Movie",
            id: movie_id,
        })?;
    Ok(success(found, "Movie retrieved"))
}

/// `POST /movies`
pub async fn create_movie(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(draft): ApiJson<MovieDraft>,
) -> Result<Response> {
    let created_movie = movie::create_movie(&state.core, &principal.actor, &draft).await?;
    Ok(created(created_movie, "Movie created"))
}

/// `PUT /movies/:id`
pub async fn update_movie(
    State(state): State<AppState>,
    principal: Principal,
    Path(movie_id): Path<i64>,
    ApiJson(draft): ApiJson<MovieDraft>,
) -> Result<Response> {
    let updated = movie::update_movie(&state.core, &principal.actor, movie_id, &draft).await?;
    Ok(success(updated, "Movie updated"))
}

/// `DELETE /movies/:id`
pub async fn delete_movie(
    State(state): State<AppState>,
    principal: Principal,
    Path(movie_id): Path<i64>,
) -> Result<Response> {
    movie::delete_movie(&state.core, &principal.actor, movie_id).await?;
    Ok(empty_success("Movie deleted"))
}
