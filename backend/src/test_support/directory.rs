//! Record builders for directory tests.

use crate::domain::{
    EmailAddress, Organization, OrganizationId, OrganizationName, User, UserId, UserName,
};

pub fn organization(id: &str, name: &str, description: Option<&str>) -> Organization {
    Organization::new(
        OrganizationId::new(id).expect("organization id"),
        OrganizationName::new(name).expect("organization name"),
        description.map(str::to_owned),
    )
}

pub fn user(id: &str, org_id: &str, name: &str, email: &str) -> User {
    User::new(
        UserId::new(id).expect("user id"),
        OrganizationId::new(org_id).expect("organization id"),
        UserName::new(name).expect("user name"),
        EmailAddress::new(email).expect("email"),
    )
}
