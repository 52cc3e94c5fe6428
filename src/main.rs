use clap::{Parser as ClapParser, Subcommand};
use rql_lang::ParseOptions;
use rql_lang::cli::{self, CheckOptions, CheckResult, CliError};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "rql")]
#[command(about = "rql - compile, check and merge RQL resource queries")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct QueryArgs {
    /// Render in the normalized, fully functional format
    #[arg(short, long)]
    normalized: bool,

    /// Print the tree as JSON
    #[arg(short, long)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(short, long)]
    pretty: bool,

    /// Offset for dates without a zone, e.g. +02:00 (defaults to the host's)
    #[arg(long)]
    offset: Option<String>,

    /// Do not percent-decode the query
    #[arg(long)]
    no_decode: bool,

    /// Keep repeated select and sort clauses apart
    #[arg(long)]
    no_consolidate: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a query and print it back
    Parse {
        /// The RQL query (reads from stdin if not provided)
        query: Option<String>,

        #[command(flatten)]
        args: QueryArgs,
    },

    /// Validate a query
    Check {
        /// The RQL query (reads from stdin if not provided)
        query: Option<String>,

        #[command(flatten)]
        args: QueryArgs,
    },

    /// Merge two queries into one
    Merge {
        left: String,
        right: String,

        #[command(flatten)]
        args: QueryArgs,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'rql docs' to list categories)
        category: String,
    },
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let result = match cli.command {
        Commands::Parse { query, args } => run_check(query, &args, false),
        Commands::Check { query, args } => run_check(query, &args, true),
        Commands::Merge { left, right, args } => run_merge(left, &right, &args),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => match cli::get_doc_category(&category) {
            Ok(content) => {
                print!("{}", content);
                Ok(())
            }
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn setup_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new().filter_level(log_level).init();
}

fn check_options(query: String, args: &QueryArgs, syntax_only: bool) -> Result<CheckOptions, CliError> {
    let mut parse = ParseOptions::default()
        .with_url_decode(!args.no_decode)
        .with_consolidate(!args.no_consolidate);
    if let Some(offset) = &args.offset {
        parse = parse.with_local_offset(cli::parse_offset(offset)?);
    }

    Ok(CheckOptions {
        query,
        normalized: args.normalized,
        json: args.json,
        pretty: args.pretty,
        syntax_only,
        parse,
    })
}

fn print_result(result: CheckResult, pretty: bool) -> Result<(), CliError> {
    match result {
        CheckResult::Valid => println!("Query is valid"),
        CheckResult::Text(text) => println!("{}", text),
        CheckResult::Json(value) => {
            let json = if pretty {
                serde_json::to_string_pretty(&value)
            } else {
                serde_json::to_string(&value)
            }?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn run_check(query: Option<String>, args: &QueryArgs, syntax_only: bool) -> Result<(), CliError> {
    let query = match query {
        Some(q) => q,
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(CliError::Io)?;
            buffer.trim_end().to_string()
        }
        None => return Err(CliError::NoInput),
    };

    let options = check_options(query, args, syntax_only)?;
    print_result(cli::execute_check(&options)?, args.pretty)
}

fn run_merge(left: String, right: &str, args: &QueryArgs) -> Result<(), CliError> {
    let options = check_options(left, args, false)?;
    print_result(cli::execute_merge(&options, right)?, args.pretty)
}
