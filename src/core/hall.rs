//! Hall business logic - Handles creation, editing and removal of halls.
//!
//! Hall names are unique. Edits and deletions take the hall's exclusive lock and
//! are refused once any session in the hall has sold a paid ticket.

use crate::{
    core::{
        access::{Action, Actor},
        context::CoreContext,
        guard,
    },
    entities::{Hall, Session, hall, session},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, SqlErr, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Fewest seats a hall may have.
pub const MIN_SEATS: i32 = 20;
/// Most seats a hall may have.
pub const MAX_SEATS: i32 = 250;
/// Longest allowed hall name.
pub const MAX_NAME_LEN: usize = 100;

fn validate_hall(name: &str, seats: i32) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(Error::validation(format!(
            "Name cannot be longer than {MAX_NAME_LEN} characters"
        )));
    }
    if !(MIN_SEATS..=MAX_SEATS).contains(&seats) {
        return Err(Error::validation(format!(
            "Seats must be between {MIN_SEATS} and {MAX_SEATS}"
        )));
    }
    Ok(name.to_string())
}

fn duplicate_name(err: DbErr, name: &str) -> Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            Error::validation(format!("Hall name '{name}' already exists"))
        }
        _ => err.into(),
    }
}

async fn ensure_name_free<C>(db: &C, name: &str, exclude: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = Hall::find().filter(hall::Column::Name.eq(name));
    if let Some(hall_id) = exclude {
        query = query.filter(hall::Column::Id.ne(hall_id));
    }
    if query.one(db).await?.is_some() {
        return Err(Error::validation(format!("Hall name '{name}' already exists")));
    }
    Ok(())
}

/// Inserts a hall without a permission check. Used by seeding.
pub(crate) async fn insert_hall<C>(db: &C, name: &str, seats: i32) -> Result<hall::Model>
where
    C: ConnectionTrait,
{
    let name = validate_hall(name, seats)?;
    ensure_name_free(db, &name, None).await?;

    hall::ActiveModel {
        name: Set(name.clone()),
        seats: Set(seats),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| duplicate_name(e, &name))
}

/// Creates a hall.
#[instrument(skip(ctx))]
pub async fn create_hall(
    ctx: &CoreContext,
    actor: &Actor,
    name: &str,
    seats: i32,
) -> Result<hall::Model> {
    actor.require(Action::ManageCatalog)?;
    let created = insert_hall(&ctx.db, name, seats).await?;
    info!(hall_id = created.id, "Hall created");
    Ok(created)
}

/// Renames or resizes a hall. Forbidden once tickets were sold in it.
#[instrument(skip(ctx))]
pub async fn update_hall(
    ctx: &CoreContext,
    actor: &Actor,
    hall_id: i64,
    name: &str,
    seats: i32,
) -> Result<hall::Model> {
    actor.require(Action::ManageCatalog)?;
    let name = validate_hall(name, seats)?;

    let _hall_lock = ctx.locks().halls.exclusive(hall_id).await;
    let txn = ctx.db.begin().await?;

    let existing = Hall::find_by_id(hall_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: "Hall",
            id: hall_id,
        })?;

    if guard::has_paid_tickets_for_hall(&txn, hall_id).await? {
        return Err(Error::forbidden(
            "You cannot update this hall because some tickets have already been sold",
        ));
    }

    ensure_name_free(&txn, &name, Some(hall_id)).await?;

    let mut active_model: hall::ActiveModel = existing.into();
    active_model.name = Set(name.clone());
    active_model.seats = Set(seats);
    let updated = active_model
        .update(&txn)
        .await
        .map_err(|e| duplicate_name(e, &name))?;

    txn.commit().await?;
    info!(hall_id, "Hall updated");
    Ok(updated)
}

/// Deletes a hall along with its sessions. Forbidden once tickets were sold in it.
#[instrument(skip(ctx))]
pub async fn delete_hall(ctx: &CoreContext, actor: &Actor, hall_id: i64) -> Result<()> {
    actor.require(Action::ManageCatalog)?;

    let _hall_lock = ctx.locks().halls.exclusive(hall_id).await;
    let txn = ctx.db.begin().await?;

    let existing = Hall::find_by_id(hall_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: "Hall",
            id: hall_id,
        })?;

    if guard::has_paid_tickets_for_hall(&txn, hall_id).await? {
        return Err(Error::forbidden(
            "You cannot delete this hall because some tickets have been sold",
        ));
    }

    let removed_sessions = Session::delete_many()
        .filter(session::Column::HallId.eq(hall_id))
        .exec(&txn)
        .await?
        .rows_affected;
    existing.delete(&txn).await?;

    txn.commit().await?;
    info!(hall_id, removed_sessions, "Hall deleted");
    Ok(())
}

/// Finds a hall by id.
pub async fn get_hall<C>(db: &C, hall_id: i64) -> Result<Option<hall::Model>>
where
    C: ConnectionTrait,
{
    Hall::find_by_id(hall_id).one(db).await.map_err(Into::into)
}

/// All halls, alphabetically.
pub async fn list_halls<C>(db: &C) -> Result<Vec<hall::Model>>
where
    C: ConnectionTrait,
{
    Hall::find()
        .order_by_asc(hall::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::access::Role;
    use crate::test_utils::*;

    #[test]
    fn test_validate_hall_bounds() {
        assert!(validate_hall("Red", MIN_SEATS).is_ok());
        assert!(validate_hall("Red", MAX_SEATS).is_ok());
        assert!(validate_hall("Red", MIN_SEATS - 1).is_err());
        assert!(validate_hall("Red", MAX_SEATS + 1).is_err());
        assert!(validate_hall("   ", 50).is_err());
        assert!(validate_hall(&"x".repeat(MAX_NAME_LEN + 1), 50).is_err());
        assert_eq!(validate_hall("  Red  ", 50).unwrap(), "Red");
    }

    #[tokio::test]
    async fn test_create_hall_requires_staff() -> Result<()> {
        let fixture = BoxOfficeFixture::new().await?;
        let result = create_hall(&fixture.ctx, &fixture.customer, "Red Hall", 50).await;
        assert!(matches!(
            result,
            Err(Error::PermissionDenied {
                action: Action::ManageCatalog
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_hall_rejects_duplicate_name() -> Result<()> {
        let fixture = BoxOfficeFixture::new().await?;
        create_hall(&fixture.ctx, &fixture.staff, "Red Hall", 50).await?;

        let result = create_hall(&fixture.ctx, &fixture.staff, "Red Hall", 80).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert_eq!(list_halls(&fixture.ctx.db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_hall_without_tickets() -> Result<()> {
        let fixture = BoxOfficeFixture::new().await?;
        let red = fixture.hall("Red Hall", 50).await?;
        let superuser = Actor {
            user_id: Some(99),
            role: Role::Superuser,
        };

        let updated = update_hall(&fixture.ctx, &superuser, red.id, "Crimson Hall", 60).await?;
        assert_eq!(updated.name, "Crimson Hall");
        assert_eq!(updated.seats, 60);

        // keeping its own name is not a duplicate
        update_hall(&fixture.ctx, &fixture.staff, red.id, "Crimson Hall", 70).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_update_hall_rejects_taken_name() -> Result<()> {
        let fixture = BoxOfficeFixture::new().await?;
        let red = fixture.hall("Red Hall", 50).await?;
        fixture.hall("Blue Hall", 50).await?;

        let result = update_hall(&fixture.ctx, &fixture.staff, red.id, "Blue Hall", 50).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_hall_with_tickets_is_locked() -> Result<()> {
        let fixture = BoxOfficeFixture::new().await?;
        let showing = fixture.scenario_session().await?;
        fixture.buy(&showing, 1, scenario_day(2)).await?;

        let result = update_hall(&fixture.ctx, &fixture.staff, showing.hall_id, "Other", 50).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));

        let result = delete_hall(&fixture.ctx, &fixture.staff, showing.hall_id).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));

        let hall = get_hall(&fixture.ctx.db, showing.hall_id).await?.unwrap();
        assert_eq!(hall.seats, 50);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_hall_removes_sessions() -> Result<()> {
        let fixture = BoxOfficeFixture::new().await?;
        let showing = fixture.scenario_session().await?;

        delete_hall(&fixture.ctx, &fixture.staff, showing.hall_id).await?;

        assert!(get_hall(&fixture.ctx.db, showing.hall_id).await?.is_none());
        assert!(Session::find_by_id(showing.id).one(&fixture.ctx.db).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_hall() -> Result<()> {
        let fixture = BoxOfficeFixture::new().await?;
        let result = delete_hall(&fixture.ctx, &fixture.staff, 404).await;
        assert!(matches!(result, Err(Error::NotFound { entity: "Hall", .. })));
        Ok(())
    }
}
