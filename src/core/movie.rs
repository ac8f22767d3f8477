//! Movie business logic - catalog entries that sessions screen.

use crate::{
    core::{
        access::{Action, Actor},
        context::CoreContext,
        guard,
    },
    entities::{Movie, movie},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Latest release year accepted.
pub const MAX_YEAR: i32 = 2030;
/// Longest allowed title.
pub const MAX_TITLE_LEN: usize = 100;

/// Editable movie fields.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct MovieDraft {
    /// Title
    pub title: String,
    /// Description, may be empty
    #[serde(default)]
    pub description: String,
    /// Release year
    pub year: i32,
}

fn validate_movie(draft: &MovieDraft) -> Result<String> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(Error::validation("Title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(Error::validation(format!(
            "Title cannot be longer than {MAX_TITLE_LEN} characters"
        )));
    }
    if !(1..=MAX_YEAR).contains(&draft.year) {
        return Err(Error::validation(format!(
            "Year must be between 1 and {MAX_YEAR}"
        )));
    }
    Ok(title.to_string())
}

/// Inserts a movie without a permission check. Used by seeding.
pub(crate) async fn insert_movie<C>(db: &C, draft: &MovieDraft) -> Result<movie::Model>
where
    C: ConnectionTrait,
{
    let title = validate_movie(draft)?;
    movie::ActiveModel {
        title: Set(title),
        description: Set(draft.description.clone()),
        year: Set(draft.year),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Adds a movie to the catalog.
pub async fn create_movie(
    ctx: &CoreContext,
    actor: &Actor,
    draft: &MovieDraft,
) -> Result<movie::Model> {
    actor.require(Action::ManageCatalog)?;
    let created = insert_movie(&ctx.db, draft).await?;
    info!(movie_id = created.id, "Movie created");
    Ok(created)
}

/// Replaces a movie's fields.
pub async fn update_movie(
    ctx: &CoreContext,
    actor: &Actor,
    movie_id: i64,
    draft: &MovieDraft,
) -> Result<movie::Model> {
    actor.require(Action::ManageCatalog)?;
    let title = validate_movie(draft)?;

    let existing = get_movie(&ctx.db, movie_id).await?.ok_or(Error::NotFound {
        entity: "Movie",
        id: movie_id,
    })?;

    let mut active_model: movie::ActiveModel = existing.into();
    active_model.title = Set(title);
    active_model.description = Set(draft.description.clone());
    active_model.year = Set(draft.year);
    active_model.update(&ctx.db).await.map_err(Into::into)
}

/// Removes a movie. Forbidden while any session screens it.
///
/// Holds the movie's exclusive lock so no session can be scheduled for it
/// between the check and the delete.
pub async fn delete_movie(ctx: &CoreContext, actor: &Actor, movie_id: i64) -> Result<()> {
    actor.require(Action::ManageCatalog)?;

    let _movie_lock = ctx.locks().movies.exclusive(movie_id).await;
    let txn = ctx.db.begin().await?;

    let existing = get_movie(&txn, movie_id).await?.ok_or(Error::NotFound {
        entity: "Movie",
        id: movie_id,
    })?;

    if guard::movie_has_sessions(&txn, movie_id).await? {
        return Err(Error::forbidden(
            "You cannot delete this movie because sessions are scheduled for it",
        ));
    }

    existing.delete(&txn).await?;
    txn.commit().await?;
    info!(movie_id, "Movie deleted");
    Ok(())
}

/// Finds a movie by id.
pub async fn get_movie<C>(db: &C, movie_id: i64) -> Result<Option<movie::Model>>
where
    C: ConnectionTrait,
{
    Movie::find_by_id(movie_id).one(db).await.map_err(Into::into)
}

/// All movies, alphabetically by title.
pub async fn list_movies<C>(db: &C) -> Result<Vec<movie::Model>>
where
    C: ConnectionTrait,
{
    Movie::find()
        .order_by_asc(movie::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::session;
    use crate::test_utils::*;

    fn draft(title: &str, year: i32) -> MovieDraft {
        MovieDraft {
            title: title.to_string(),
            description: String::new(),
            year,
        }
    }

    #[test]
    fn test_validate_movie() {
        assert!(validate_movie(&draft("Heat", 1995)).is_ok());
        assert!(validate_movie(&draft("Heat", MAX_YEAR)).is_ok());
        assert!(validate_movie(&draft("Heat", MAX_YEAR + 1)).is_err());
        assert!(validate_movie(&draft("Heat", 0)).is_err());
        assert!(validate_movie(&draft(" ", 1995)).is_err());
    }

    #[tokio::test]
    async fn test_movie_crud() -> Result<()> {
        let fixture = BoxOfficeFixture::new().await?;

        let created = create_movie(&fixture.ctx, &fixture.staff, &draft("Heat", 1995)).await?;
        assert_eq!(created.title, "Heat");

        let updated = update_movie(
            &fixture.ctx,
            &fixture.staff,
            created.id,
            &draft("Heat (Director's Cut)", 1995),
        )
        .await?;
        assert_eq!(updated.title, "Heat (Director's Cut)");

        delete_movie(&fixture.ctx, &fixture.staff, created.id).await?;
        assert!(get_movie(&fixture.ctx.db, created.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_customer_cannot_create_movie() -> Result<()> {
        let fixture = BoxOfficeFixture::new().await?;
        let result = create_movie(&fixture.ctx, &fixture.customer, &draft("Heat", 1995)).await;
        assert!(matches!(result, Err(Error::PermissionDenied { .. })));
        assert!(list_movies(&fixture.ctx.db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_scheduled_movie_cannot_be_deleted() -> Result<()> {
        let fixture = BoxOfficeFixture::new().await?;
        let showing = fixture.scenario_session().await?;

        let result = delete_movie(&fixture.ctx, &fixture.staff, showing.movie_id).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));
        assert!(get_movie(&fixture.ctx.db, showing.movie_id).await?.is_some());
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_delete_racing_a_new_session_stays_consistent() -> Result<()> {
        let fixture = BoxOfficeFixture::on_disk().await?;
        let red = fixture.hall("Red Hall", 50).await?;

        for round in 0..5 {
            let movie_id = fixture.movie(&format!("Feature {round}")).await?.id;
            let draft = session_draft(red.id, movie_id, (1, 2), (hm(10, 0), hm(11, 0)));

            let (ctx, staff) = (fixture.ctx.clone(), fixture.staff);
            let scheduling =
                tokio::spawn(async move { session::create_session(&ctx, &staff, &draft).await });
            let (ctx, staff) = (fixture.ctx.clone(), fixture.staff);
            let deleting = tokio::spawn(async move { delete_movie(&ctx, &staff, movie_id).await });

            let scheduled = scheduling.await.unwrap();
            let deleted = deleting.await.unwrap();
            let consistent = match (&scheduled, &deleted) {
                (Ok(_), Err(Error::Forbidden { .. })) => true,
                (Err(Error::NotFound { entity, .. }), Ok(())) => *entity == "Movie",
                _ => false,
            };
            assert!(consistent, "{scheduled:?} / {deleted:?}");

            if let Ok(created) = scheduled {
                session::delete_session(&fixture.ctx, &fixture.staff, created.id).await?;
            }
        }
        Ok(())
    }
}
