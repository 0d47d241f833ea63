use crate::*;
use std::fmt;

/// The identity of a client submitting a transaction
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Principal(pub String);

/// An organization (membership service provider) identifier
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct OrgId(pub String);

impl Principal {
    pub fn new<S: Into<String>>(s: S) -> Self {
        Principal(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl OrgId {
    pub fn new<S: Into<String>>(s: S) -> Self {
        OrgId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolves who is calling and where the call is executing.
///
/// Supplied by the environment hosting the ledger; the core never decodes
/// certificates itself.
pub trait IdentityProvider {
    /// Identity of the client that signed the current transaction
    fn caller_identity(&self) -> Result<Principal, Error>;

    /// Organization the calling client belongs to
    fn caller_org(&self) -> Result<OrgId, Error>;

    /// Organization of the peer executing the transaction
    fn executing_node_org(&self) -> Result<OrgId, Error>;

    /// Whether two organization memberships denote the same organization
    fn same_org(&self, a: &OrgId, b: &OrgId) -> bool {
        a == b
    }
}

/// An identity provider with fixed answers
#[derive(Clone, Debug)]
pub struct StaticIdentity {
    pub principal: Principal,
    pub org: OrgId,
    pub node_org: OrgId,
}

impl StaticIdentity {
    /// A client calling through a peer of its own organization
    pub fn new(principal: &str, org: &str) -> Self {
        StaticIdentity {
            principal: Principal::new(principal),
            org: OrgId::new(org),
            node_org: OrgId::new(org),
        }
    }

    /// Route the call through a peer of another organization
    pub fn via_node(mut self, node_org: &str) -> Self {
        self.node_org = OrgId::new(node_org);
        self
    }
}

impl IdentityProvider for StaticIdentity {
    fn caller_identity(&self) -> Result<Principal, Error> {
        if self.principal.0.is_empty() {
            return Err(Error::Identity("empty client identity".to_owned()));
        }
        Ok(self.principal.clone())
    }

    fn caller_org(&self) -> Result<OrgId, Error> {
        if self.org.0.is_empty() {
            return Err(Error::Identity("empty client MSP ID".to_owned()));
        }
        Ok(self.org.clone())
    }

    fn executing_node_org(&self) -> Result<OrgId, Error> {
        if self.node_org.0.is_empty() {
            return Err(Error::Identity("empty peer MSP ID".to_owned()));
        }
        Ok(self.node_org.clone())
    }
}
