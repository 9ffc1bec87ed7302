//! `PostgresCommandQueue` against embedded PostgreSQL: claiming, visibility,
//! release, dead-lettering, and per-receive receipts.

use std::collections::BTreeSet;
use std::time::Duration;

use diesel::QueryableByName;
use diesel::sql_types::BigInt;
use diesel_async::RunQueryDsl;
use roster::domain::ports::{CommandQueue, CommandSource, Delivery, QueueReceiveError};
use roster::domain::{Command, CommandChannel, Organization, OrganizationId, OrganizationName};
use roster::outbound::queue::{DeliveryPolicy, PostgresCommandQueue, QueueNames};
use rstest::{fixture, rstest};

#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;

use embedded_postgres::PgDatabase;

#[fixture]
fn database() -> Option<PgDatabase> {
    embedded_postgres::pg_database()
}

fn queue(
    database: &PgDatabase,
    visibility_timeout: Duration,
    max_receive_count: u32,
) -> PostgresCommandQueue {
    PostgresCommandQueue::new(
        database.pool.clone(),
        QueueNames::default(),
        DeliveryPolicy {
            visibility_timeout,
            max_receive_count,
        },
    )
}

fn create_org(id: &str) -> Command {
    Command::CreateOrganization(Organization::new(
        OrganizationId::new(id).expect("id"),
        OrganizationName::new(format!("Org {id}")).expect("name"),
        None,
    ))
}

fn receive(database: &PgDatabase, queue: &PostgresCommandQueue, max: usize) -> Vec<Delivery> {
    database
        .block_on(queue.receive(CommandChannel::Organizations, max))
        .expect("receive")
}

#[derive(QueryableByName)]
struct Count {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

fn dead_lettered(database: &PgDatabase) -> i64 {
    database.block_on(async {
        let mut conn = database.pool.get().await.expect("connection");
        let row: Count = diesel::sql_query(
            "SELECT count(*) AS count FROM command_messages WHERE dead_lettered_at IS NOT NULL",
        )
        .get_result(&mut conn)
        .await
        .expect("count");
        row.count
    })
}

#[rstest]
fn commands_are_received_once_until_the_lease_lapses(database: Option<PgDatabase>) {
    let Some(database) = database else {
        return;
    };
    let queue = queue(&database, Duration::from_millis(300), 5);
    let command = create_org("org-1");
    database.block_on(queue.enqueue(&command)).expect("enqueue");

    let first = receive(&database, &queue, 10);
    let hidden = receive(&database, &queue, 10);
    std::thread::sleep(Duration::from_millis(600));
    let redelivered = receive(&database, &queue, 10);

    assert_eq!(first.len(), 1);
    assert_eq!(first[0].receive_count, 1);
    assert_eq!(Command::decode(&first[0].body).expect("decode"), command);
    assert!(hidden.is_empty());
    assert_eq!(redelivered.len(), 1);
    assert_eq!(redelivered[0].receive_count, 2);
    assert_ne!(redelivered[0].receipt, first[0].receipt);
}

#[rstest]
fn channels_do_not_see_each_others_messages(database: Option<PgDatabase>) {
    let Some(database) = database else {
        return;
    };
    let queue = queue(&database, Duration::from_secs(30), 5);
    database
        .block_on(queue.enqueue(&create_org("org-1")))
        .expect("enqueue");

    let users = database
        .block_on(queue.receive(CommandChannel::Users, 10))
        .expect("receive");

    assert!(users.is_empty());
    assert_eq!(receive(&database, &queue, 10).len(), 1);
}

#[rstest]
fn release_makes_a_delivery_visible_immediately(database: Option<PgDatabase>) {
    let Some(database) = database else {
        return;
    };
    let queue = queue(&database, Duration::from_secs(30), 5);
    database
        .block_on(queue.enqueue(&create_org("org-1")))
        .expect("enqueue");
    let delivery = receive(&database, &queue, 1).remove(0);

    database
        .block_on(queue.release(&delivery.receipt))
        .expect("release");

    let again = receive(&database, &queue, 1);
    assert_eq!(again.len(), 1);
    assert_eq!(again[0].receive_count, 2);
}

#[rstest]
fn acknowledged_messages_are_gone(database: Option<PgDatabase>) {
    let Some(database) = database else {
        return;
    };
    let queue = queue(&database, Duration::ZERO, 5);
    database
        .block_on(queue.enqueue(&create_org("org-1")))
        .expect("enqueue");
    let delivery = receive(&database, &queue, 1).remove(0);

    database
        .block_on(queue.acknowledge(&delivery.receipt))
        .expect("ack");

    assert!(receive(&database, &queue, 10).is_empty());
    assert_eq!(
        database.block_on(queue.acknowledge(&delivery.receipt)),
        Err(QueueReceiveError::receipt(delivery.receipt.as_str()))
    );
}

#[rstest]
fn a_lapsed_lease_cannot_settle_the_redelivery(database: Option<PgDatabase>) {
    let Some(database) = database else {
        return;
    };
    let queue = queue(&database, Duration::ZERO, 5);
    database
        .block_on(queue.enqueue(&create_org("org-1")))
        .expect("enqueue");
    let stale = receive(&database, &queue, 1).remove(0);
    let current = receive(&database, &queue, 1).remove(0);

    assert_eq!(
        database.block_on(queue.acknowledge(&stale.receipt)),
        Err(QueueReceiveError::receipt(stale.receipt.as_str()))
    );
    assert_eq!(
        database.block_on(queue.release(&stale.receipt)),
        Err(QueueReceiveError::receipt(stale.receipt.as_str()))
    );
    database
        .block_on(queue.acknowledge(&current.receipt))
        .expect("current receipt settles");
}

#[rstest]
fn exhausted_messages_are_dead_lettered(database: Option<PgDatabase>) {
    let Some(database) = database else {
        return;
    };
    let queue = queue(&database, Duration::ZERO, 2);
    database
        .block_on(queue.enqueue(&create_org("poison")))
        .expect("enqueue");

    let counts: Vec<u32> = (0..2)
        .flat_map(|_| receive(&database, &queue, 1))
        .map(|delivery| delivery.receive_count)
        .collect();
    let after = receive(&database, &queue, 1);

    assert_eq!(counts, vec![1, 2]);
    assert!(after.is_empty());
    assert_eq!(dead_lettered(&database), 1);
}

#[rstest]
fn concurrent_receivers_never_share_a_message(database: Option<PgDatabase>) {
    let Some(database) = database else {
        return;
    };
    let first = queue(&database, Duration::from_secs(30), 5);
    let second = first.clone();
    for index in 0..20 {
        database
            .block_on(first.enqueue(&create_org(&format!("org-{index}"))))
            .expect("enqueue");
    }

    let (left, right) = database.block_on(async {
        tokio::join!(
            first.receive(CommandChannel::Organizations, 10),
            second.receive(CommandChannel::Organizations, 10),
        )
    });
    let left = left.expect("receive");
    let right = right.expect("receive");
    let rest = receive(&database, &first, 20);

    let bodies = |deliveries: &[Delivery]| -> BTreeSet<String> {
        deliveries.iter().map(|delivery| delivery.body.clone()).collect()
    };
    let (left, right, rest) = (bodies(&left), bodies(&right), bodies(&rest));
    assert!(left.is_disjoint(&right));
    assert!(rest.is_disjoint(&left) && rest.is_disjoint(&right));
    assert_eq!(left.len() + right.len() + rest.len(), 20);
}
