//! Strict-mode claims in PostgreSQL: one owner per value, re-claims by the
//! holder succeed, and releases only free claims the caller holds.

use roster::domain::ports::{ClaimOutcome, UniqueKey, UniquenessIndex};
use roster::domain::{EmailAddress, OrganizationName};
use roster::outbound::persistence::DieselUniquenessIndex;
use rstest::{fixture, rstest};

#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;

use embedded_postgres::PgDatabase;

#[fixture]
fn database() -> Option<PgDatabase> {
    embedded_postgres::pg_database()
}

fn acme() -> UniqueKey {
    UniqueKey::organization_name(&OrganizationName::new("Acme").expect("name"))
}

#[rstest]
fn a_second_owner_sees_the_holder(database: Option<PgDatabase>) {
    let Some(database) = database else {
        return;
    };
    let index = DieselUniquenessIndex::new(database.pool.clone());

    let (first, again, rival) = database.block_on(async {
        (
            index.claim(&acme(), "org-1").await.expect("claim"),
            index.claim(&acme(), "org-1").await.expect("re-claim"),
            index.claim(&acme(), "org-2").await.expect("rival claim"),
        )
    });

    assert_eq!(first, ClaimOutcome::Claimed);
    assert_eq!(again, ClaimOutcome::Claimed);
    assert_eq!(rival, ClaimOutcome::HeldBy("org-1".to_owned()));
}

#[rstest]
fn releases_by_other_owners_are_ignored(database: Option<PgDatabase>) {
    let Some(database) = database else {
        return;
    };
    let index = DieselUniquenessIndex::new(database.pool.clone());

    let (after_foreign_release, after_own_release) = database.block_on(async {
        index.claim(&acme(), "org-1").await.expect("claim");
        index.release(&acme(), "org-2").await.expect("foreign release");
        let blocked = index.claim(&acme(), "org-2").await.expect("claim");
        index.release(&acme(), "org-1").await.expect("own release");
        let freed = index.claim(&acme(), "org-2").await.expect("claim");
        (blocked, freed)
    });

    assert_eq!(after_foreign_release, ClaimOutcome::HeldBy("org-1".to_owned()));
    assert_eq!(after_own_release, ClaimOutcome::Claimed);
}

#[rstest]
fn kinds_are_claimed_independently(database: Option<PgDatabase>) {
    let Some(database) = database else {
        return;
    };
    let index = DieselUniquenessIndex::new(database.pool.clone());
    let email = UniqueKey::user_email(&EmailAddress::new("acme@example.com").expect("email"));
    let name = UniqueKey::organization_name(
        &OrganizationName::new("acme@example.com").expect("name"),
    );

    let outcomes = database.block_on(async {
        (
            index.claim(&name, "org-1").await.expect("claim"),
            index.claim(&email, "user-1").await.expect("claim"),
        )
    });

    assert_eq!(outcomes, (ClaimOutcome::Claimed, ClaimOutcome::Claimed));
}

#[rstest]
fn racing_claims_have_exactly_one_winner(database: Option<PgDatabase>) {
    let Some(database) = database else {
        return;
    };
    let index = DieselUniquenessIndex::new(database.pool.clone());

    let (left, right) = database.block_on(async {
        let (first, second) = (acme(), acme());
        tokio::join!(index.claim(&first, "org-1"), index.claim(&second, "org-2"))
    });
    let outcomes = [left.expect("claim"), right.expect("claim")];

    let winners = outcomes
        .iter()
        .filter(|outcome| **outcome == ClaimOutcome::Claimed)
        .count();
    assert_eq!(winners, 1);
}
