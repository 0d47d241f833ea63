use crate::*;

/// The identity behind one transaction, resolved once up front
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub principal: Principal,
    pub org: OrgId,
    pub node_org: OrgId,
    same_org: bool,
}

impl Caller {
    pub fn resolve<I: IdentityProvider + ?Sized>(identity: &I) -> Result<Self, Error> {
        let principal = identity.caller_identity()?;
        let org = identity.caller_org()?;
        let node_org = identity.executing_node_org()?;
        let same_org = identity.same_org(&org, &node_org);
        Ok(Caller {
            principal,
            org,
            node_org,
            same_org,
        })
    }
}

/// What a caller must be for an operation to proceed
#[derive(Clone, Copy, Debug)]
pub enum Role<'a> {
    /// The identity that created the election
    Organizer,

    /// The voter recorded on a ballot
    Voter(&'a PublicVote),

    /// A member of the organization running the executing peer
    NodeOrgMember,
}

/// Allow or deny `caller` acting as `role` on `election`
pub fn authorize(role: Role, caller: &Caller, election: &Election) -> Result<(), Error> {
    match role {
        Role::Organizer => {
            if caller.principal != election.organizer {
                return Err(Error::Unauthorized(format!(
                    "election {} can only be managed by its organizer",
                    election.name
                )));
            }
        }
        Role::Voter(vote) => authorize_voter(caller, vote)?,
        Role::NodeOrgMember => authorize_node_org(caller)?,
    }
    Ok(())
}

/// Only the voter named on a ballot may act on it
pub fn authorize_voter(caller: &Caller, vote: &PublicVote) -> Result<(), Error> {
    if caller.principal != vote.vote_from {
        return Err(Error::Unauthorized(format!(
            "client {} is not the owner of the vote",
            caller.principal
        )));
    }
    Ok(())
}

/// Confidential ballots are only handled on a peer of the voter's own org
pub fn authorize_node_org(caller: &Caller) -> Result<(), Error> {
    if !caller.same_org {
        return Err(Error::OrgMismatch {
            caller: caller.org.clone(),
            node: caller.node_org.clone(),
        });
    }
    Ok(())
}
