use crate::*;
use std::fmt;

/// Joins a confidential ballot to its commitment and its later reveal.
///
/// Issued by AddVote; it is the id of the AddVote transaction.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct VoteToken(pub String);

impl VoteToken {
    pub fn new<S: Into<String>>(s: S) -> Self {
        VoteToken(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<TxId> for VoteToken {
    fn from(id: TxId) -> Self {
        VoteToken(id.to_string())
    }
}

impl fmt::Display for VoteToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hex-encoded hash of a confidential value
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct Commitment(pub String);

impl Commitment {
    pub fn new<S: Into<String>>(s: S) -> Self {
        Commitment(s.into())
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A ballot: who voted, and for whom.
///
/// The same JSON document is the secret payload committed by AddVote and the
/// revealed payload published by DisplayVote.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicVote {
    pub vote_from: Principal,
    pub vote_to: String,
}

impl PublicVote {
    pub fn new(vote_from: Principal, vote_to: &str) -> Self {
        PublicVote {
            vote_from,
            vote_to: vote_to.to_owned(),
        }
    }

    /// Parse a ballot payload
    pub fn from_payload(payload: &[u8]) -> Result<Self, Error> {
        let vote: PublicVote = serde_json::from_slice(payload)
            .map_err(|e| Error::MalformedBallot(e.to_string()))?;
        if vote.vote_to.is_empty() {
            return Err(Error::MalformedBallot("voteTo is empty".to_owned()));
        }
        Ok(vote)
    }

    /// Serialize to the canonical ballot payload
    pub fn to_payload(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec(self)?)
    }
}
