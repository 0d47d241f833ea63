use crate::*;
use serde::Serialize;

/// Executes named transactions against a ledger store.
///
/// Each call to [`ElectionHandler::apply`] is one atomic transaction: its
/// writes are applied together after it succeeds, and dropped if it fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct ElectionHandler {
    contract: ElectionContract,
}

impl ElectionHandler {
    pub fn new(tally_policy: TallyPolicy) -> Self {
        ElectionHandler {
            contract: ElectionContract::new(tally_policy),
        }
    }

    /// Run one transaction, returning its JSON-encoded result.
    ///
    /// Transactions without a result return an empty string.
    pub fn apply<S, I>(
        &self,
        invocation: &Invocation,
        store: &mut S,
        identity: &I,
    ) -> Result<String, Error>
    where
        S: LedgerStore + ?Sized,
        I: IdentityProvider + ?Sized,
    {
        let outcome = Caller::resolve(identity).and_then(|caller| {
            let mut ctx = TxContext::new(invocation.id, caller, &*store);
            let response = self.execute(invocation, &mut ctx)?;
            Ok((response, ctx.into_writes()))
        });

        let (response, writes) = outcome.map_err(|e| {
            log::warn!(
                "error executing {} {}: {}",
                invocation.function,
                invocation.id,
                e
            );
            e
        })?;

        if !writes.is_empty() {
            let count = writes.len();
            store.apply(writes).map_err(|e| {
                log::warn!(
                    "cannot commit {} {}: {}",
                    invocation.function,
                    invocation.id,
                    e
                );
                Error::Commit(e)
            })?;
            log::info!(
                "committed {} {} ({} writes)",
                invocation.function,
                invocation.id,
                count
            );
        }

        Ok(response)
    }

    fn execute<S: LedgerStore + ?Sized>(
        &self,
        invocation: &Invocation,
        ctx: &mut TxContext<S>,
    ) -> Result<String, Error> {
        let args = invocation.args()?;
        let contract = &self.contract;

        match invocation.function {
            TransactionType::CreateElection => to_json(&contract.create_election(
                ctx,
                args[0],
                [args[1], args[2], args[3]],
            )?),
            TransactionType::QueryElection => to_json(&contract.query_election(ctx, args[0])?),
            TransactionType::AddVote => {
                let ballot = invocation.transient(TRANSIENT_VOTE)?;
                to_json(&contract.add_vote(ctx, args[0], ballot)?)
            }
            TransactionType::SubmitVote => {
                contract.submit_vote(ctx, args[0], &VoteToken::new(args[1]))?;
                Ok(String::new())
            }
            TransactionType::QueryVote => {
                to_json(&contract.query_vote(ctx, args[0], &VoteToken::new(args[1]))?)
            }
            TransactionType::QueryBallot => {
                to_json(&contract.query_ballot(ctx, args[0], &VoteToken::new(args[1]))?)
            }
            TransactionType::CloseElection => {
                contract.close_election(ctx, args[0])?;
                Ok(String::new())
            }
            TransactionType::DisplayVote => {
                let revealed = invocation.transient(TRANSIENT_VOTE)?;
                contract.display_vote(ctx, args[0], &VoteToken::new(args[1]), revealed)?;
                Ok(String::new())
            }
            TransactionType::EvaluateElection => {
                to_json(&contract.evaluate_election(ctx, args[0])?)
            }
            TransactionType::QueryIdentity => to_json(&contract.query_identity(ctx)),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, Error> {
    Ok(serde_json::to_string(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_transaction_writes_nothing() {
        let handler = ElectionHandler::default();
        let mut store = MemStore::default();
        let organizer = StaticIdentity::new("organizer", "Org1MSP");

        // Wrong arity
        let inv = Invocation::new(TransactionType::CreateElection, &["e", "a", "b"]);
        assert!(handler.apply(&inv, &mut store, &organizer).is_err());
        assert_eq!(store.public_keys().count(), 0);

        // Duplicate candidates
        let inv = Invocation::new(TransactionType::CreateElection, &["e", "a", "b", "b"]);
        assert!(handler.apply(&inv, &mut store, &organizer).is_err());
        assert_eq!(store.public_keys().count(), 0);
    }

    #[test]
    fn unresolvable_identity() {
        let handler = ElectionHandler::default();
        let mut store = MemStore::default();
        let nobody = StaticIdentity::new("", "Org1MSP");

        let inv = Invocation::new(TransactionType::QueryIdentity, &[]);
        assert!(matches!(
            handler.apply(&inv, &mut store, &nobody),
            Err(Error::Identity(_))
        ));
    }

    #[test]
    fn query_identity() {
        let handler = ElectionHandler::default();
        let mut store = MemStore::default();
        let voter = StaticIdentity::new("x509::CN=voter1", "Org1MSP");

        let inv = Invocation::new(TransactionType::QueryIdentity, &[]);
        let response = handler.apply(&inv, &mut store, &voter).unwrap();
        assert_eq!(response, "\"x509::CN=voter1\"");
    }

    #[test]
    fn ballot_must_be_supplied() {
        let handler = ElectionHandler::default();
        let mut store = MemStore::default();
        let voter = StaticIdentity::new("voter", "Org1MSP");

        let inv = Invocation::new(TransactionType::AddVote, &["e"]);
        assert!(matches!(
            handler.apply(&inv, &mut store, &voter),
            Err(Error::MissingTransient("vote"))
        ));
    }
}
