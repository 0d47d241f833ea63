use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use sealedvote::{
    ElectionHandler, Invocation, Principal, PublicVote, TransactionType, TRANSIENT_VOTE,
};

mod config;
mod file_store;

use config::*;
use file_store::FileStore;

fn main() {
    let matches = App::new("SealedVote CLI")
        .version("1.0")
        .about("Runs commit-reveal elections against a local ledger")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .global(true)
                .help("Sets the level of verbosity"),
        )
        .arg(
            Arg::with_name("ledger")
                .long("ledger")
                .takes_value(true)
                .global(true)
                .help("Ledger file - can also be set with SEALEDVOTE_LEDGER_PATH"),
        )
        .arg(
            Arg::with_name("identity")
                .long("identity")
                .takes_value(true)
                .global(true)
                .help("Client identity - can also be set with SEALEDVOTE_IDENTITY"),
        )
        .arg(
            Arg::with_name("org")
                .long("org")
                .takes_value(true)
                .global(true)
                .help("Client organization - can also be set with SEALEDVOTE_ORG"),
        )
        .arg(
            Arg::with_name("peer-org")
                .long("peer-org")
                .takes_value(true)
                .global(true)
                .help("Organization of the executing peer - can also be set with SEALEDVOTE_PEER_ORG"),
        )
        .arg(
            Arg::with_name("tally-policy")
                .long("tally-policy")
                .takes_value(true)
                .global(true)
                .possible_values(&["strict", "attribute-to-last"])
                .help("How to count votes for unknown candidates - can also be set with SEALEDVOTE_TALLY_POLICY"),
        )
        .subcommand(
            SubCommand::with_name("whoami").about("Print the identity the ledger sees for this client"),
        )
        .subcommand(
            SubCommand::with_name("create-election")
                .about("Create a new open election")
                .arg(name_arg())
                .arg(candidate_arg("CANDIDATE_ONE", 2))
                .arg(candidate_arg("CANDIDATE_TWO", 3))
                .arg(candidate_arg("CANDIDATE_THREE", 4)),
        )
        .subcommand(
            SubCommand::with_name("query-election")
                .about("Print an election")
                .arg(name_arg()),
        )
        .subcommand(
            ballot_args(
                SubCommand::with_name("add-vote")
                    .about("Store a sealed ballot and print its vote token")
                    .arg(name_arg()),
            ),
        )
        .subcommand(
            SubCommand::with_name("submit-vote")
                .about("Publish the commitment of a sealed ballot on the election")
                .arg(name_arg())
                .arg(token_arg()),
        )
        .subcommand(
            SubCommand::with_name("close-election")
                .about("Stop accepting votes")
                .arg(name_arg()),
        )
        .subcommand(
            ballot_args(
                SubCommand::with_name("display-vote")
                    .about("Reveal a ballot on a closed election")
                    .arg(name_arg())
                    .arg(token_arg()),
            ),
        )
        .subcommand(
            SubCommand::with_name("query-vote")
                .about("Print a revealed ballot")
                .arg(name_arg())
                .arg(token_arg()),
        )
        .subcommand(
            SubCommand::with_name("query-ballot")
                .about("Print a sealed ballot from this client's organization")
                .arg(name_arg())
                .arg(token_arg()),
        )
        .subcommand(
            SubCommand::with_name("evaluate-election")
                .about("Tally a closed election")
                .arg(name_arg()),
        )
        .subcommand(
            SubCommand::with_name("invoke")
                .about("Run any transaction by name")
                .arg(
                    Arg::with_name("FUNCTION")
                        .index(1)
                        .required(true)
                        .help("Transaction name, e.g. CreateElection"),
                )
                .arg(Arg::with_name("ARGS").index(2).multiple(true))
                .arg(
                    Arg::with_name("ballot")
                        .long("ballot")
                        .takes_value(true)
                        .help("File holding the transient ballot"),
                ),
        )
        .get_matches();

    // Global flags may land on either side of the subcommand
    let sub_matches = matches.subcommand().1;
    let global = |name: &str| {
        sub_matches
            .and_then(|m| m.value_of(name))
            .or_else(|| matches.value_of(name))
    };
    let verbosity = matches.occurrences_of("v")
        + sub_matches.map(|m| m.occurrences_of("v")).unwrap_or(0);

    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = Config::from_env(|key| {
        let flag = match key {
            ENV_LEDGER_PATH => "ledger",
            ENV_IDENTITY => "identity",
            ENV_ORG => "org",
            ENV_PEER_ORG => "peer-org",
            ENV_TALLY_POLICY => "tally-policy",
            _ => return None,
        };
        global(flag).map(str::to_owned)
    })
    .unwrap_or_else(|e| {
        eprintln!("sealedvote: {}", e);
        std::process::exit(1);
    });

    let mut cli = Cli::open(config);

    let response = match matches.subcommand() {
        ("whoami", Some(_)) => cli.run(TransactionType::QueryIdentity, &[], None),
        ("create-election", Some(m)) => {
            let args = [
                arg(m, "NAME"),
                arg(m, "CANDIDATE_ONE"),
                arg(m, "CANDIDATE_TWO"),
                arg(m, "CANDIDATE_THREE"),
            ];
            cli.run(TransactionType::CreateElection, &args, None)
        }
        ("query-election", Some(m)) => cli.run(TransactionType::QueryElection, &[arg(m, "NAME")], None),
        ("add-vote", Some(m)) => {
            let ballot = cli.ballot(m);
            cli.run(TransactionType::AddVote, &[arg(m, "NAME")], Some(ballot))
        }
        ("submit-vote", Some(m)) => cli.run(
            TransactionType::SubmitVote,
            &[arg(m, "NAME"), arg(m, "TOKEN")],
            None,
        ),
        ("close-election", Some(m)) => cli.run(TransactionType::CloseElection, &[arg(m, "NAME")], None),
        ("display-vote", Some(m)) => {
            let ballot = cli.ballot(m);
            cli.run(
                TransactionType::DisplayVote,
                &[arg(m, "NAME"), arg(m, "TOKEN")],
                Some(ballot),
            )
        }
        ("query-vote", Some(m)) => cli.run(
            TransactionType::QueryVote,
            &[arg(m, "NAME"), arg(m, "TOKEN")],
            None,
        ),
        ("query-ballot", Some(m)) => cli.run(
            TransactionType::QueryBallot,
            &[arg(m, "NAME"), arg(m, "TOKEN")],
            None,
        ),
        ("evaluate-election", Some(m)) => {
            cli.run(TransactionType::EvaluateElection, &[arg(m, "NAME")], None)
        }
        ("invoke", Some(m)) => cli.invoke(m),
        _ => unreachable!("clap requires a subcommand"),
    };

    if !response.is_empty() {
        println!("{}", response);
    }
}

fn name_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("NAME")
        .index(1)
        .required(true)
        .help("Election name")
}

fn candidate_arg<'a, 'b>(name: &'a str, index: u64) -> Arg<'a, 'b> {
    Arg::with_name(name).index(index).required(true)
}

fn token_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("TOKEN")
        .index(2)
        .required(true)
        .help("Vote token returned by add-vote")
}

fn ballot_args<'a, 'b>(cmd: App<'a, 'b>) -> App<'a, 'b> {
    cmd.arg(
        Arg::with_name("vote-to")
            .long("vote-to")
            .takes_value(true)
            .required_unless("ballot")
            .conflicts_with("ballot")
            .help("Candidate to vote for, as this client"),
    )
    .arg(
        Arg::with_name("ballot")
            .long("ballot")
            .takes_value(true)
            .help("File holding the exact ballot JSON to send"),
    )
}

fn arg<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches.value_of(name).unwrap_or_default()
}

struct Cli {
    store: FileStore,
    handler: ElectionHandler,
    config: Config,
}

impl Cli {
    fn open(config: Config) -> Self {
        let store = FileStore::open(&config.ledger_path).unwrap_or_else(|e| {
            eprintln!(
                "sealedvote: unable to open ledger {}: {}",
                config.ledger_path.display(),
                e
            );
            std::process::exit(1);
        });
        log::info!(
            "acting as {} of {} via a {} peer",
            config.identity,
            config.org,
            config.peer_org
        );

        Cli {
            store,
            handler: ElectionHandler::new(config.tally_policy),
            config,
        }
    }

    fn run(&mut self, function: TransactionType, args: &[&str], ballot: Option<Vec<u8>>) -> String {
        let mut invocation = Invocation::new(function, args);
        if let Some(ballot) = ballot {
            invocation = invocation.with_transient(TRANSIENT_VOTE, ballot);
        }
        self.submit(&invocation)
    }

    fn invoke(&mut self, matches: &ArgMatches) -> String {
        let args = matches
            .values_of("ARGS")
            .into_iter()
            .flatten()
            .map(str::to_owned)
            .collect();
        let mut invocation = Invocation::parse(arg(matches, "FUNCTION"), args).unwrap_or_else(|e| {
            eprintln!("sealedvote invoke: {}", e);
            std::process::exit(1);
        });
        if let Some(filename) = matches.value_of("ballot") {
            invocation = invocation.with_transient(TRANSIENT_VOTE, read_file(filename));
        }
        self.submit(&invocation)
    }

    fn submit(&mut self, invocation: &Invocation) -> String {
        let identity = self.config.identity();
        self.handler
            .apply(invocation, &mut self.store, &identity)
            .unwrap_or_else(|e| {
                eprintln!("sealedvote {}: {}", invocation.function, e);
                std::process::exit(1);
            })
    }

    /// The ballot for add-vote and display-vote, either read verbatim from a
    /// file or built for this client's own identity
    fn ballot(&mut self, matches: &ArgMatches) -> Vec<u8> {
        if let Some(filename) = matches.value_of("ballot") {
            return read_file(filename);
        }

        let whoami = self.run(TransactionType::QueryIdentity, &[], None);
        let principal: Principal = serde_json::from_str(&whoami).unwrap_or_else(|e| {
            eprintln!("sealedvote: unexpected identity {}: {}", whoami, e);
            std::process::exit(1);
        });

        PublicVote::new(principal, arg(matches, "vote-to"))
            .to_payload()
            .unwrap_or_else(|e| {
                eprintln!("sealedvote: {}", e);
                std::process::exit(1);
            })
    }
}

fn read_file(filename: &str) -> Vec<u8> {
    std::fs::read(filename).unwrap_or_else(|e| {
        eprintln!("sealedvote: unable to read {}: {}", filename, e);
        std::process::exit(1);
    })
}
