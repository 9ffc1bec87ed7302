//! PostgreSQL table queue.
//!
//! Messages live in `command_messages`. Receivers claim a batch with
//! `FOR UPDATE SKIP LOCKED`, bump `receive_count`, and push `visible_at`
//! forward by the visibility timeout, so concurrent workers never claim the
//! same row and an unacknowledged claim reappears once the timeout lapses.
//! A visible message already received `max_receive_count` times is
//! dead-lettered instead of redelivered.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Integer, Text};
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{
    CommandQueue, CommandSource, Delivery, DeliveryReceipt, EnqueueError, QueueReceiveError,
};
use crate::domain::{Command, CommandChannel};
use crate::outbound::persistence::DbPool;
use crate::outbound::persistence::diesel_error_mapping::{map_diesel_error, map_pool_error};
use crate::outbound::persistence::schema::command_messages;

use super::{DeliveryPolicy, QueueNames, receipt};

const DEAD_LETTER_SQL: &str = r#"
UPDATE command_messages
SET dead_lettered_at = now()
WHERE queue_name = $1
  AND dead_lettered_at IS NULL
  AND visible_at <= now()
  AND receive_count >= $2
"#;

const CLAIM_SQL: &str = r#"
WITH claimable AS (
    SELECT id
    FROM command_messages
    WHERE queue_name = $1
      AND dead_lettered_at IS NULL
      AND visible_at <= now()
    ORDER BY id
    LIMIT $2
    FOR UPDATE SKIP LOCKED
)
UPDATE command_messages m
SET receive_count = m.receive_count + 1,
    visible_at = now() + make_interval(secs => $3)
FROM claimable c
WHERE m.id = c.id
RETURNING m.id, m.body, m.receive_count
"#;

const RELEASE_SQL: &str = r#"
UPDATE command_messages
SET visible_at = now()
WHERE id = $1
  AND receive_count = $2
  AND dead_lettered_at IS NULL
"#;

#[derive(Debug, QueryableByName)]
struct ClaimedRow {
    #[diesel(sql_type = BigInt)]
    id: i64,
    #[diesel(sql_type = Text)]
    body: String,
    #[diesel(sql_type = Integer)]
    receive_count: i32,
}

impl From<ClaimedRow> for Delivery {
    fn from(row: ClaimedRow) -> Self {
        let receive_count = u32::try_from(row.receive_count).unwrap_or_default();
        Self {
            receipt: receipt::issue(row.id, receive_count),
            body: row.body,
            receive_count,
        }
    }
}

/// Row id and stored receive count named by `receipt`.
fn parse_receipt(receipt: &DeliveryReceipt) -> Result<(i64, i32), QueueReceiveError> {
    let (id, receive_count) = receipt::parse(receipt)?;
    let receive_count =
        i32::try_from(receive_count).map_err(|_| QueueReceiveError::receipt(receipt.as_str()))?;
    Ok((id, receive_count))
}

/// Durable [`CommandQueue`] and [`CommandSource`] over PostgreSQL.
#[derive(Clone)]
pub struct PostgresCommandQueue {
    pool: DbPool,
    names: QueueNames,
    policy: DeliveryPolicy,
}

impl PostgresCommandQueue {
    pub fn new(pool: DbPool, names: QueueNames, policy: DeliveryPolicy) -> Self {
        Self {
            pool,
            names,
            policy,
        }
    }
}

fn unavailable(err: impl std::fmt::Display) -> QueueReceiveError {
    QueueReceiveError::unavailable(err.to_string())
}

#[async_trait]
impl CommandQueue for PostgresCommandQueue {
    async fn enqueue(&self, command: &Command) -> Result<(), EnqueueError> {
        let body = command
            .to_message()
            .map_err(|err| EnqueueError::rejected(err.to_string()))?;
        let queue_name = self.names.for_channel(command.channel());
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| EnqueueError::unavailable(map_pool_error(err).to_string()))?;
        diesel::insert_into(command_messages::table)
            .values((
                command_messages::queue_name.eq(queue_name),
                command_messages::body.eq(body.as_str()),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| EnqueueError::unavailable(map_diesel_error(err).to_string()))
    }
}

#[async_trait]
impl CommandSource for PostgresCommandQueue {
    async fn receive(
        &self,
        channel: CommandChannel,
        max: usize,
    ) -> Result<Vec<Delivery>, QueueReceiveError> {
        let queue_name = self.names.for_channel(channel);
        let max_receive_count = i32::try_from(self.policy.max_receive_count).unwrap_or(i32::MAX);
        let limit = i64::try_from(max).unwrap_or(i64::MAX);
        let visibility_secs = self.policy.visibility_timeout.as_secs_f64();
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| unavailable(map_pool_error(err)))?;

        let dead_lettered = diesel::sql_query(DEAD_LETTER_SQL)
            .bind::<Text, _>(queue_name)
            .bind::<Integer, _>(max_receive_count)
            .execute(&mut conn)
            .await
            .map_err(|err| unavailable(map_diesel_error(err)))?;
        if dead_lettered > 0 {
            warn!(
                queue = queue_name,
                count = dead_lettered,
                max_receive_count = self.policy.max_receive_count,
                "dead-lettered command messages"
            );
        }

        let mut rows: Vec<ClaimedRow> = diesel::sql_query(CLAIM_SQL)
            .bind::<Text, _>(queue_name)
            .bind::<BigInt, _>(limit)
            .bind::<Double, _>(visibility_secs)
            .load(&mut conn)
            .await
            .map_err(|err| unavailable(map_diesel_error(err)))?;
        rows.sort_by_key(|row| row.id);
        Ok(rows.into_iter().map(Delivery::from).collect())
    }

    async fn acknowledge(&self, receipt: &DeliveryReceipt) -> Result<(), QueueReceiveError> {
        let (id, receive_count) = parse_receipt(receipt)?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| unavailable(map_pool_error(err)))?;
        let deleted = diesel::delete(
            command_messages::table
                .filter(command_messages::id.eq(id))
                .filter(command_messages::receive_count.eq(receive_count)),
        )
        .execute(&mut conn)
        .await
        .map_err(|err| unavailable(map_diesel_error(err)))?;
        if deleted == 0 {
            return Err(QueueReceiveError::receipt(receipt.as_str()));
        }
        Ok(())
    }

    async fn release(&self, receipt: &DeliveryReceipt) -> Result<(), QueueReceiveError> {
        let (id, receive_count) = parse_receipt(receipt)?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| unavailable(map_pool_error(err)))?;
        let released = diesel::sql_query(RELEASE_SQL)
            .bind::<BigInt, _>(id)
            .bind::<Integer, _>(receive_count)
            .execute(&mut conn)
            .await
            .map_err(|err| unavailable(map_diesel_error(err)))?;
        if released == 0 {
            return Err(QueueReceiveError::receipt(receipt.as_str()));
        }
        Ok(())
    }
}
