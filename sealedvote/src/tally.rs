use crate::*;
use indexmap::IndexMap;
use std::str::FromStr;

/// How to count a revealed vote whose target is not a candidate
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TallyPolicy {
    /// Fail the tally with `UnknownCandidate`
    Strict,

    /// Count it for the last candidate
    AttributeToLast,
}

impl Default for TallyPolicy {
    fn default() -> Self {
        TallyPolicy::Strict
    }
}

impl FromStr for TallyPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(TallyPolicy::Strict),
            "attribute-to-last" => Ok(TallyPolicy::AttributeToLast),
            _ => Err(Error::InvalidArgument(format!("unknown tally policy '{}'", s))),
        }
    }
}

/// Result of evaluating an election
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    Winner { winner: String },

    /// Two or more candidates share the highest count
    Draw,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TallyResult {
    pub election: String,
    pub num_votes: u64,

    /// Candidate -> count, in ballot order
    pub totals: IndexMap<String, u64>,

    #[serde(flatten)]
    pub outcome: Outcome,
}

impl TallyResult {
    /// Count the revealed votes of an election
    pub fn tally(election: &Election, policy: TallyPolicy) -> Result<Self, Error> {
        if election.public_votes.is_empty() {
            return Err(Error::EmptyTally(election.name.clone()));
        }

        let candidates = election.candidates();
        let mut totals: IndexMap<String, u64> =
            candidates.iter().map(|c| ((*c).to_owned(), 0)).collect();

        for (token, vote) in election.public_votes.iter() {
            let target = if totals.contains_key(&vote.vote_to) {
                vote.vote_to.as_str()
            } else {
                match policy {
                    TallyPolicy::Strict => {
                        return Err(Error::UnknownCandidate {
                            token: token.clone(),
                            candidate: vote.vote_to.clone(),
                        })
                    }
                    TallyPolicy::AttributeToLast => candidates[candidates.len() - 1],
                }
            };
            if let Some(count) = totals.get_mut(target) {
                *count += 1;
            }
        }

        let num_votes: u64 = totals.values().sum();
        let max = totals.values().copied().max().unwrap_or(0);
        let mut leaders = totals.iter().filter(|(_, count)| **count == max);

        let outcome = match (leaders.next(), leaders.next()) {
            (Some((winner, _)), None) => Outcome::Winner {
                winner: winner.clone(),
            },
            _ => Outcome::Draw,
        };

        Ok(TallyResult {
            election: election.name.clone(),
            num_votes,
            totals,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn election_with(votes: &[&str]) -> Election {
        let mut e =
            Election::new("electionPrime", ["ben", "simon", "jim"], Principal::new("o")).unwrap();
        e.close().unwrap();
        for (i, to) in votes.iter().enumerate() {
            let token = VoteToken::new(format!("t{}", i));
            let vote = PublicVote::new(Principal::new(format!("voter{}", i)), to);
            e.record_reveal(token, vote).unwrap();
        }
        e
    }

    fn outcome(votes: &[&str]) -> Outcome {
        TallyResult::tally(&election_with(votes), TallyPolicy::Strict)
            .unwrap()
            .outcome
    }

    fn winner(name: &str) -> Outcome {
        Outcome::Winner {
            winner: name.to_owned(),
        }
    }

    #[test]
    fn strict_maximum_wins() {
        let result =
            TallyResult::tally(&election_with(&["ben", "simon", "ben"]), TallyPolicy::Strict)
                .unwrap();
        assert_eq!(result.outcome, winner("ben"));
        assert_eq!(result.num_votes, 3);
        assert_eq!(result.totals["ben"], 2);
        assert_eq!(result.totals["simon"], 1);
        assert_eq!(result.totals["jim"], 0);

        assert_eq!(outcome(&["jim"]), winner("jim"));
        assert_eq!(outcome(&["simon", "ben", "simon"]), winner("simon"));

        // Ties below the maximum don't matter
        assert_eq!(outcome(&["ben", "simon", "jim", "jim"]), winner("jim"));
        assert_eq!(outcome(&["simon", "simon"]), winner("simon"));
    }

    #[test]
    fn shared_maximum_is_a_draw() {
        assert_eq!(outcome(&["ben", "simon", "jim"]), Outcome::Draw);
        assert_eq!(outcome(&["ben", "simon"]), Outcome::Draw);
        assert_eq!(outcome(&["ben", "jim", "simon", "jim", "ben"]), Outcome::Draw);
        assert_eq!(outcome(&["simon", "jim"]), Outcome::Draw);
    }

    #[test]
    fn empty_tally() {
        assert!(matches!(
            TallyResult::tally(&election_with(&[]), TallyPolicy::Strict),
            Err(Error::EmptyTally(_))
        ));
    }

    #[test]
    fn unknown_targets() {
        let e = election_with(&["ben", "nobody", "simon", "mallory"]);

        assert!(matches!(
            TallyResult::tally(&e, TallyPolicy::Strict),
            Err(Error::UnknownCandidate { .. })
        ));

        let result = TallyResult::tally(&e, TallyPolicy::AttributeToLast).unwrap();
        assert_eq!(result.totals["jim"], 2);
        assert_eq!(result.outcome, winner("jim"));
        assert_eq!(result.num_votes, 4);
    }

    #[test]
    fn policy_from_str() {
        assert_eq!(TallyPolicy::from_str("strict").unwrap(), TallyPolicy::Strict);
        assert_eq!(
            TallyPolicy::from_str("attribute-to-last").unwrap(),
            TallyPolicy::AttributeToLast
        );
        assert!(TallyPolicy::from_str("lenient").is_err());
        assert_eq!(TallyPolicy::default(), TallyPolicy::Strict);
    }

    #[test]
    fn serialized_outcome() {
        let result =
            TallyResult::tally(&election_with(&["ben"]), TallyPolicy::Strict).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["result"], "winner");
        assert_eq!(json["winner"], "ben");
        assert_eq!(json["numVotes"], 1);

        let result = TallyResult::tally(&election_with(&["ben", "jim"]), TallyPolicy::Strict)
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["result"], "draw");
    }
}
