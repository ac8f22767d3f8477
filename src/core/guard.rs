//! Mutation guard - read-only checks consulted before structural changes.
//!
//! A session or hall with paid tickets can no longer be edited or deleted, and a
//! movie that is scheduled cannot be deleted.

use crate::{
    entities::{Purchase, Session, purchase, session},
    errors::Result,
};
use sea_orm::prelude::*;

/// Whether any paid purchase references the session.
pub async fn has_paid_tickets<C>(db: &C, session_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let found = Purchase::find()
        .filter(purchase::Column::SessionId.eq(session_id))
        .filter(purchase::Column::Paid.eq(true))
        .one(db)
        .await?;
    Ok(found.is_some())
}

/// Whether any paid purchase references a session held in the hall.
pub async fn has_paid_tickets_for_hall<C>(db: &C, hall_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let found = Purchase::find()
        .inner_join(Session)
        .filter(session::Column::HallId.eq(hall_id))
        .filter(purchase::Column::Paid.eq(true))
        .one(db)
        .await?;
    Ok(found.is_some())
}

/// Whether any session shows the movie.
pub async fn movie_has_sessions<C>(db: &C, movie_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let found = Session::find()
        .filter(session::Column::MovieId.eq(movie_id))
        .one(db)
        .await?;
    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_no_purchases_means_unguarded() -> Result<()> {
        let fixture = BoxOfficeFixture::new().await?;
        let showing = fixture.scenario_session().await?;

        assert!(!has_paid_tickets(&fixture.ctx.db, showing.id).await?);
        assert!(!has_paid_tickets_for_hall(&fixture.ctx.db, showing.hall_id).await?);
        assert!(movie_has_sessions(&fixture.ctx.db, showing.movie_id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_paid_purchase_guards_session_and_hall() -> Result<()> {
        let fixture = BoxOfficeFixture::new().await?;
        let showing = fixture.scenario_session().await?;
        let other_hall = fixture.hall("Blue Hall", 40).await?;

        fixture.buy(&showing, 2, scenario_day(5)).await?;

        assert!(has_paid_tickets(&fixture.ctx.db, showing.id).await?);
        assert!(has_paid_tickets_for_hall(&fixture.ctx.db, showing.hall_id).await?);
        assert!(!has_paid_tickets_for_hall(&fixture.ctx.db, other_hall.id).await?);
        Ok(())
    }
}
