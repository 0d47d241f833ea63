use crate::*;
use std::collections::BTreeMap;
use std::fmt;

/// Election lifecycle: `Open` -> `Closed` -> `Completed`
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ElectionStatus {
    Open,
    Closed,
    Completed,
}

impl fmt::Display for ElectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ElectionStatus::Open => "open",
            ElectionStatus::Closed => "closed",
            ElectionStatus::Completed => "completed",
        };
        write!(f, "{}", name)
    }
}

/// Commitment to a confidential ballot, as published on the election
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PrivateVote {
    pub hash: Commitment,
}

/// The election record stored in the public partition under its name
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Election {
    pub name: String,
    pub candidate_one: String,
    pub candidate_two: String,
    pub candidate_three: String,

    /// Set at creation, never changes
    pub organizer: Principal,

    pub private_votes: BTreeMap<VoteToken, PrivateVote>,
    pub public_votes: BTreeMap<VoteToken, PublicVote>,

    /// Empty until the election is completed
    pub winner: String,
    pub num_votes: u64,
    pub status: ElectionStatus,
}

impl Election {
    /// Create a new open election
    pub fn new(
        name: &str,
        candidates: [&str; 3],
        organizer: Principal,
    ) -> Result<Self, Error> {
        if name.is_empty() {
            return Err(Error::InvalidArgument("election name is empty".to_owned()));
        }
        for (i, candidate) in candidates.iter().enumerate() {
            if candidate.is_empty() {
                return Err(Error::InvalidArgument(format!(
                    "candidate {} name is empty",
                    i + 1
                )));
            }
            if candidates[..i].contains(candidate) {
                return Err(Error::InvalidArgument(format!(
                    "candidate '{}' is listed twice",
                    candidate
                )));
            }
        }

        Ok(Election {
            name: name.to_owned(),
            candidate_one: candidates[0].to_owned(),
            candidate_two: candidates[1].to_owned(),
            candidate_three: candidates[2].to_owned(),
            organizer,
            private_votes: BTreeMap::new(),
            public_votes: BTreeMap::new(),
            winner: String::new(),
            num_votes: 0,
            status: ElectionStatus::Open,
        })
    }

    /// Candidate names in ballot order
    pub fn candidates(&self) -> [&str; 3] {
        [
            &self.candidate_one,
            &self.candidate_two,
            &self.candidate_three,
        ]
    }

    /// Fail unless the election is currently in `required` status
    pub fn require_status(&self, required: ElectionStatus) -> Result<(), Error> {
        if self.status != required {
            return Err(Error::InvalidState {
                required,
                actual: self.status,
            });
        }
        Ok(())
    }

    /// Open -> Closed
    pub fn close(&mut self) -> Result<(), Error> {
        self.require_status(ElectionStatus::Open)?;
        self.status = ElectionStatus::Closed;
        Ok(())
    }

    /// Closed -> Completed, recording the winner
    pub fn complete(&mut self, winner: &str, num_votes: u64) -> Result<(), Error> {
        self.require_status(ElectionStatus::Closed)?;
        self.winner = winner.to_owned();
        self.num_votes = num_votes;
        self.status = ElectionStatus::Completed;
        Ok(())
    }

    /// Publish the commitment for a vote. Only while open, once per token.
    pub fn record_commitment(&mut self, token: VoteToken, hash: Commitment) -> Result<(), Error> {
        self.require_status(ElectionStatus::Open)?;
        if self.private_votes.contains_key(&token) {
            return Err(Error::AlreadyExists(format!("commitment for vote {}", token)));
        }
        self.private_votes.insert(token, PrivateVote { hash });
        Ok(())
    }

    /// Publish a revealed vote. Only while closed, once per token.
    pub fn record_reveal(&mut self, token: VoteToken, vote: PublicVote) -> Result<(), Error> {
        self.require_status(ElectionStatus::Closed)?;
        if self.public_votes.contains_key(&token) {
            return Err(Error::AlreadyRevealed(token));
        }
        self.public_votes.insert(token, vote);
        self.num_votes += 1;
        Ok(())
    }

    /// Load an election from the public partition
    pub fn load<S: LedgerStore + ?Sized>(store: &S, name: &str) -> Result<Option<Self>, Error> {
        match store.get_public(name)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Load an election, failing with NotFound if absent
    pub fn fetch<S: LedgerStore + ?Sized>(store: &S, name: &str) -> Result<Self, Error> {
        Self::load(store, name)?.ok_or_else(|| Error::NotFound(format!("election {}", name)))
    }

    /// Write the election back to the public partition
    pub fn save<S: LedgerStore + ?Sized>(&self, store: &mut S) -> Result<(), Error> {
        let bytes = serde_json::to_vec(self)?;
        store.put_public(&self.name, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn election() -> Election {
        Election::new("electionPrime", ["ben", "simon", "jim"], Principal::new("org")).unwrap()
    }

    #[test]
    fn create_new_election() {
        let e = election();
        assert_eq!(e.status, ElectionStatus::Open);
        assert_eq!(e.candidates(), ["ben", "simon", "jim"]);
        assert!(e.winner.is_empty());
        assert_eq!(e.num_votes, 0);

        assert!(Election::new("", ["a", "b", "c"], Principal::new("o")).is_err());
        assert!(Election::new("e", ["a", "", "c"], Principal::new("o")).is_err());
        assert!(Election::new("e", ["a", "b", "a"], Principal::new("o")).is_err());
    }

    #[test]
    fn status_only_moves_forward() {
        let mut e = election();

        // Can't complete before closing
        assert!(matches!(
            e.complete("ben", 1),
            Err(Error::InvalidState {
                required: ElectionStatus::Closed,
                actual: ElectionStatus::Open
            })
        ));

        e.close().unwrap();
        assert_eq!(e.status, ElectionStatus::Closed);
        assert!(e.close().is_err());

        e.complete("ben", 3).unwrap();
        assert_eq!(e.status, ElectionStatus::Completed);
        assert_eq!(e.winner, "ben");
        assert!(e.close().is_err());
        assert!(e.complete("jim", 3).is_err());
    }

    #[test]
    fn commitments_and_reveals_follow_status() {
        let mut e = election();
        let token = VoteToken::new("t1");
        let vote = PublicVote::new(Principal::new("v"), "ben");

        assert!(e.record_reveal(token.clone(), vote.clone()).is_err());
        e.record_commitment(token.clone(), Commitment::new("aa"))
            .unwrap();
        assert!(matches!(
            e.record_commitment(token.clone(), Commitment::new("bb")),
            Err(Error::AlreadyExists(_))
        ));

        e.close().unwrap();
        assert!(e
            .record_commitment(VoteToken::new("t2"), Commitment::new("cc"))
            .is_err());

        e.record_reveal(token.clone(), vote.clone()).unwrap();
        assert_eq!(e.num_votes, 1);
        assert!(matches!(
            e.record_reveal(token, vote),
            Err(Error::AlreadyRevealed(_))
        ));
        assert_eq!(e.num_votes, 1);
    }

    #[test]
    fn record_shape() {
        let e = election();
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["candidateOne"], "ben");
        assert_eq!(json["numVotes"], 0);
        assert_eq!(json["status"], "open");
        assert!(json["privateVotes"].as_object().unwrap().is_empty());
        assert!(json["publicVotes"].as_object().unwrap().is_empty());
    }
}
