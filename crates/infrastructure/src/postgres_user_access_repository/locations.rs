use sqlx::{Postgres, Transaction};

use super::*;

impl PostgresUserAccessRepository {
    pub(super) async fn list_location_access_impl(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<LocationAccessRecord>> {
        let rows = sqlx::query_as::<_, LocationAccessRow>(
            r#"
            SELECT
                access.location_id,
                locations.name AS location_name,
                access.account_id
            FROM user_location_access AS access
            INNER JOIN locations
                ON locations.location_id = access.location_id
            WHERE access.user_id = $1
            ORDER BY locations.name, access.location_id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list location access: {error}"))
        })?;

        Ok(rows.into_iter().map(LocationAccessRecord::from).collect())
    }

    pub(super) async fn list_account_location_access_impl(
        &self,
        account_id: AccountId,
    ) -> AppResult<Vec<AccountMemberLocation>> {
        let rows = sqlx::query_as::<_, AccountMemberRow>(
            r#"
            SELECT
                access.user_id,
                access.location_id,
                locations.name AS location_name
            FROM user_location_access AS access
            INNER JOIN locations
                ON locations.location_id = access.location_id
            WHERE access.account_id = $1
            ORDER BY access.user_id, locations.name
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list account location access: {error}"))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| AccountMemberLocation {
                user_id: UserId::from_uuid(row.user_id),
                location_id: LocationId::from_uuid(row.location_id),
                location_name: row.location_name,
            })
            .collect())
    }

    pub(super) async fn grant_locations_impl(
        &self,
        user_id: UserId,
        account_id: AccountId,
        location_ids: &[LocationId],
        granted_by: UserId,
    ) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        insert_location_rows(&mut transaction, user_id, account_id, location_ids, granted_by)
            .await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }

    /// Replaces the user's rows inside one account in a single transaction.
    pub(super) async fn replace_locations_impl(
        &self,
        user_id: UserId,
        account_id: AccountId,
        location_ids: &[LocationId],
        granted_by: UserId,
    ) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        sqlx::query(
            r#"
            DELETE FROM user_location_access
            WHERE user_id = $1
                AND account_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(account_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to clear location access: {error}"))
        })?;

        insert_location_rows(&mut transaction, user_id, account_id, location_ids, granted_by)
            .await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }
}

/// Inserts access rows for locations owned by the account. Unknown or
/// foreign locations fail the whole batch.
async fn insert_location_rows(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    account_id: AccountId,
    location_ids: &[LocationId],
    granted_by: UserId,
) -> AppResult<()> {
    for location_id in location_ids {
        let rows_affected = sqlx::query(
            r#"
            INSERT INTO user_location_access (user_id, location_id, account_id, created_by)
            SELECT $1, locations.location_id, locations.account_id, $4
            FROM locations
            WHERE locations.location_id = $2
                AND locations.account_id = $3
            ON CONFLICT (user_id, location_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(location_id.as_uuid())
        .bind(account_id.as_uuid())
        .bind(granted_by.as_uuid())
        .execute(&mut **transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to grant location access: {error}"))
        })?
        .rows_affected();

        if rows_affected == 0 && !location_already_granted(transaction, user_id, *location_id).await? {
            return Err(AppError::NotFound(format!(
                "location '{location_id}' was not found in account '{account_id}'"
            )));
        }
    }

    Ok(())
}

async fn location_already_granted(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    location_id: LocationId,
) -> AppResult<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM user_location_access
        WHERE user_id = $1
            AND location_id = $2
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(location_id.as_uuid())
    .fetch_one(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to check location access: {error}")))?;

    Ok(count > 0)
}
