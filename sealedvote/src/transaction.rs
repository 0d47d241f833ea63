use crate::*;
use rand::Rng;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Transient field carrying a ballot payload
pub const TRANSIENT_VOTE: &str = "vote";

/// Transaction identifier
///
/// 32 random bytes, unique per ledger operation. Hex-encoded when displayed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TxId([u8; 32]);

impl TxId {
    /// Create a new random transaction id
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng {};
        TxId(csprng.gen())
    }
}

impl FromStr for TxId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| Error::InvalidArgument(format!("transaction id {}: {}", s, e)))?;
        Ok(TxId(bytes))
    }
}

impl std::fmt::Display for TxId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// A transaction type
#[derive(Serialize, Deserialize, Copy, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransactionType {
    CreateElection,
    QueryElection,
    AddVote,
    SubmitVote,
    QueryVote,
    QueryBallot,
    CloseElection,
    DisplayVote,
    EvaluateElection,
    QueryIdentity,
}

impl TransactionType {
    pub const ALL: [TransactionType; 10] = [
        TransactionType::CreateElection,
        TransactionType::QueryElection,
        TransactionType::AddVote,
        TransactionType::SubmitVote,
        TransactionType::QueryVote,
        TransactionType::QueryBallot,
        TransactionType::CloseElection,
        TransactionType::DisplayVote,
        TransactionType::EvaluateElection,
        TransactionType::QueryIdentity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TransactionType::CreateElection => "CreateElection",
            TransactionType::QueryElection => "QueryElection",
            TransactionType::AddVote => "AddVote",
            TransactionType::SubmitVote => "SubmitVote",
            TransactionType::QueryVote => "QueryVote",
            TransactionType::QueryBallot => "QueryBallot",
            TransactionType::CloseElection => "CloseElection",
            TransactionType::DisplayVote => "DisplayVote",
            TransactionType::EvaluateElection => "EvaluateElection",
            TransactionType::QueryIdentity => "QueryIdentity",
        }
    }

    /// Number of positional arguments the transaction takes
    pub fn arity(&self) -> usize {
        match self {
            TransactionType::CreateElection => 4,
            TransactionType::SubmitVote
            | TransactionType::QueryVote
            | TransactionType::QueryBallot
            | TransactionType::DisplayVote => 2,
            TransactionType::QueryElection
            | TransactionType::AddVote
            | TransactionType::CloseElection
            | TransactionType::EvaluateElection => 1,
            TransactionType::QueryIdentity => 0,
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionType::ALL
            .iter()
            .find(|t| t.name() == s)
            .copied()
            .ok_or_else(|| Error::UnknownTransaction(s.to_owned()))
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A named transaction with positional string arguments.
///
/// Transient values travel with the invocation but are never written to
/// the ledger as arguments.
#[derive(Clone, Debug)]
pub struct Invocation {
    pub id: TxId,
    pub function: TransactionType,
    pub args: Vec<String>,
    pub transient: BTreeMap<String, Vec<u8>>,
}

impl Invocation {
    pub fn new(function: TransactionType, args: &[&str]) -> Self {
        Invocation {
            id: TxId::generate(),
            function,
            args: args.iter().map(|a| (*a).to_owned()).collect(),
            transient: BTreeMap::new(),
        }
    }

    /// Build an invocation from a function name, as received over the wire
    pub fn parse(function: &str, args: Vec<String>) -> Result<Self, Error> {
        Ok(Invocation {
            id: TxId::generate(),
            function: function.parse()?,
            args,
            transient: BTreeMap::new(),
        })
    }

    /// Attach a transient value
    pub fn with_transient(mut self, key: &str, value: Vec<u8>) -> Self {
        self.transient.insert(key.to_owned(), value);
        self
    }

    /// Positional arguments, checked against the transaction's arity
    pub fn args(&self) -> Result<Vec<&str>, Error> {
        let expected = self.function.arity();
        if self.args.len() != expected {
            return Err(Error::InvalidArgument(format!(
                "{} expects {} arguments, got {}",
                self.function,
                expected,
                self.args.len()
            )));
        }
        Ok(self.args.iter().map(|a| a.as_str()).collect())
    }

    pub fn transient(&self, key: &'static str) -> Result<&[u8], Error> {
        self.transient
            .get(key)
            .map(|v| v.as_slice())
            .ok_or(Error::MissingTransient(key))
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_tx_id() {
        let id = TxId::generate();
        let stringed = id.to_string();
        assert_eq!(stringed.len(), 64);
        assert_eq!(TxId::from_str(&stringed).unwrap(), id);
        assert_ne!(TxId::generate(), id);

        assert!(TxId::from_str("zz").is_err());
        assert!(TxId::from_str("abcd").is_err());
    }

    #[test]
    fn test_transaction_type() {
        for t in TransactionType::ALL.iter() {
            assert_eq!(TransactionType::from_str(t.name()).unwrap(), *t);
        }
        assert!(matches!(
            TransactionType::from_str("DeleteElection"),
            Err(Error::UnknownTransaction(_))
        ));
    }

    #[test]
    fn test_invocation_arity() {
        let inv = Invocation::new(TransactionType::CreateElection, &["e", "a", "b"]);
        assert!(matches!(inv.args(), Err(Error::InvalidArgument(_))));

        let inv = Invocation::parse(
            "SubmitVote",
            vec!["electionPrime".to_owned(), "token".to_owned()],
        )
        .unwrap();
        assert_eq!(inv.args().unwrap(), vec!["electionPrime", "token"]);
        assert!(matches!(
            inv.transient(TRANSIENT_VOTE),
            Err(Error::MissingTransient("vote"))
        ));

        let inv = inv.with_transient(TRANSIENT_VOTE, b"{}".to_vec());
        assert_eq!(inv.transient(TRANSIENT_VOTE).unwrap(), b"{}");
    }
}
