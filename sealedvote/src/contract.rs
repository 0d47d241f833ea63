use crate::*;

/// The election contract.
///
/// Holds no election state: everything lives in the ledger reached through
/// the transaction context, so any number of instances may serve requests.
#[derive(Clone, Copy, Debug, Default)]
pub struct ElectionContract {
    pub tally_policy: TallyPolicy,
}

impl ElectionContract {
    pub fn new(tally_policy: TallyPolicy) -> Self {
        ElectionContract { tally_policy }
    }

    /// Identity of the invoking client
    pub fn query_identity<S: LedgerStore + ?Sized>(&self, ctx: &TxContext<S>) -> Principal {
        ctx.caller().principal.clone()
    }

    /// Create a new open election organized by the caller
    pub fn create_election<S: LedgerStore + ?Sized>(
        &self,
        ctx: &mut TxContext<S>,
        name: &str,
        candidates: [&str; 3],
    ) -> Result<Election, Error> {
        if Election::load(&*ctx, name)?.is_some() {
            return Err(Error::AlreadyExists(format!("election {}", name)));
        }

        let election = Election::new(name, candidates, ctx.caller().principal.clone())?;
        election.save(ctx)?;

        log::info!(
            "election {} created by {} with candidates {:?}",
            name,
            election.organizer,
            candidates
        );
        Ok(election)
    }

    pub fn query_election<S: LedgerStore + ?Sized>(
        &self,
        ctx: &TxContext<S>,
        name: &str,
    ) -> Result<Election, Error> {
        Election::fetch(ctx, name)
    }

    /// Store a secret ballot in the caller's organization partition.
    ///
    /// Returns the token under which it is stored.
    pub fn add_vote<S: LedgerStore + ?Sized>(
        &self,
        ctx: &mut TxContext<S>,
        election_name: &str,
        ballot: &[u8],
    ) -> Result<VoteToken, Error> {
        authorize_node_org(ctx.caller())?;

        let token = VoteToken::from(ctx.id());
        let org = ctx.caller().org.clone();
        ctx.put_confidential(&org, &vote_key(election_name, &token), ballot.to_vec())?;

        log::debug!("vote {} stored in {}", token, collection_name(&org));
        Ok(token)
    }

    /// Publish the commitment of a stored ballot on the election
    pub fn submit_vote<S: LedgerStore + ?Sized>(
        &self,
        ctx: &mut TxContext<S>,
        election_name: &str,
        token: &VoteToken,
    ) -> Result<(), Error> {
        let mut election = Election::fetch(&*ctx, election_name)?;
        election.require_status(ElectionStatus::Open)?;

        let org = &ctx.caller().org;
        let hash = ctx
            .commitment_of(org, &vote_key(election_name, token))?
            .ok_or_else(|| Error::NotFound(format!("vote hash for {}", token)))?;

        election.record_commitment(token.clone(), hash)?;
        election.save(ctx)?;

        log::info!("commitment for vote {} submitted to {}", token, election_name);
        Ok(())
    }

    /// A voter reads back their own revealed vote
    pub fn query_vote<S: LedgerStore + ?Sized>(
        &self,
        ctx: &TxContext<S>,
        election_name: &str,
        token: &VoteToken,
    ) -> Result<PublicVote, Error> {
        let election = Election::fetch(ctx, election_name)?;
        authorize(Role::NodeOrgMember, ctx.caller(), &election)?;

        let vote = election
            .public_votes
            .get(token)
            .ok_or_else(|| Error::NotFound(format!("revealed vote {}", token)))?;
        authorize(Role::Voter(vote), ctx.caller(), &election)?;

        Ok(vote.clone())
    }

    /// A voter reads back their own confidential ballot, before or after reveal
    pub fn query_ballot<S: LedgerStore + ?Sized>(
        &self,
        ctx: &TxContext<S>,
        election_name: &str,
        token: &VoteToken,
    ) -> Result<PublicVote, Error> {
        let caller = ctx.caller();
        authorize_node_org(caller)?;

        let payload = ctx
            .get_confidential(&caller.org, &vote_key(election_name, token))?
            .ok_or_else(|| Error::NotFound(format!("vote {}", token)))?;
        let vote = PublicVote::from_payload(&payload)?;
        authorize_voter(caller, &vote)?;

        Ok(vote)
    }

    /// Stop accepting votes
    pub fn close_election<S: LedgerStore + ?Sized>(
        &self,
        ctx: &mut TxContext<S>,
        name: &str,
    ) -> Result<Election, Error> {
        let mut election = Election::fetch(&*ctx, name)?;
        election.require_status(ElectionStatus::Open)?;
        authorize(Role::Organizer, ctx.caller(), &election)?;

        election.close()?;
        election.save(ctx)?;

        log::info!(
            "election {} closed with {} committed votes",
            name,
            election.private_votes.len()
        );
        Ok(election)
    }

    /// Publish a committed ballot once the election is closed.
    ///
    /// The revealed payload must hash to the commitment submitted while the
    /// election was open.
    pub fn display_vote<S: LedgerStore + ?Sized>(
        &self,
        ctx: &mut TxContext<S>,
        election_name: &str,
        token: &VoteToken,
        revealed: &[u8],
    ) -> Result<PublicVote, Error> {
        let mut election = Election::fetch(&*ctx, election_name)?;
        election.require_status(ElectionStatus::Closed)?;

        let committed = election
            .private_votes
            .get(token)
            .ok_or_else(|| Error::NotFound(format!("commitment for vote {}", token)))?;
        if ctx.digest(revealed) != committed.hash {
            return Err(Error::CommitmentMismatch {
                token: token.clone(),
            });
        }

        let vote = PublicVote::from_payload(revealed)?;
        authorize(Role::Voter(&vote), ctx.caller(), &election)?;

        // A stored write-in would fail every later strict tally
        if self.tally_policy == TallyPolicy::Strict
            && !election.candidates().contains(&vote.vote_to.as_str())
        {
            return Err(Error::UnknownCandidate {
                token: token.clone(),
                candidate: vote.vote_to,
            });
        }

        election.record_reveal(token.clone(), vote.clone())?;
        election.save(ctx)?;

        log::info!("vote {} revealed in {}", token, election_name);
        Ok(vote)
    }

    /// Count revealed votes. A unique leader completes the election; a draw
    /// leaves it closed.
    pub fn evaluate_election<S: LedgerStore + ?Sized>(
        &self,
        ctx: &mut TxContext<S>,
        name: &str,
    ) -> Result<TallyResult, Error> {
        let mut election = Election::fetch(&*ctx, name)?;
        election.require_status(ElectionStatus::Closed)?;
        authorize(Role::Organizer, ctx.caller(), &election)?;

        let result = TallyResult::tally(&election, self.tally_policy)?;
        match &result.outcome {
            Outcome::Winner { winner } => {
                election.complete(winner, result.num_votes)?;
                election.save(ctx)?;
                log::info!(
                    "election {} completed: {} wins with {:?}",
                    name,
                    winner,
                    result.totals
                );
            }
            Outcome::Draw => {
                log::info!("election {} is a draw: {:?}", name, result.totals);
            }
        }

        Ok(result)
    }
}
