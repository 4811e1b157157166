use clap::{Parser as ClapParser, Subcommand};
use jsonpath_engine::cli::{
    self, CliError, MutateOptions, Mutation, QueryMode, QueryOptions, WalkOptions,
};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "jpath")]
#[command(about = "jpath - query and update JSON documents with JSONPath expressions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every match as a JSON array
    Get {
        /// The path expression
        path: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the first match
    First {
        path: String,

        #[arg(short, long)]
        input: Option<String>,

        #[arg(short, long)]
        pretty: bool,
    },

    /// Print whether the path matches anything
    Has {
        path: String,

        #[arg(short, long)]
        input: Option<String>,
    },

    /// Write a JSON value at every match and print the document
    Set {
        path: String,

        /// The JSON value to write
        value: String,

        #[arg(short, long)]
        input: Option<String>,

        #[arg(short, long)]
        pretty: bool,

        /// Stop after the first write
        #[arg(long)]
        one: bool,
    },

    /// Delete every match and print the document
    Del {
        path: String,

        #[arg(short, long)]
        input: Option<String>,

        #[arg(short, long)]
        pretty: bool,

        /// Stop after the first deletion
        #[arg(long)]
        one: bool,
    },

    /// Remove matched elements, filters allowed, and print the document
    Remove {
        path: String,

        #[arg(short, long)]
        input: Option<String>,

        #[arg(short, long)]
        pretty: bool,

        /// Stop after the first removal
        #[arg(long)]
        one: bool,
    },

    /// List the path and value of every node
    Walk {
        #[arg(short, long)]
        input: Option<String>,

        /// Only list leaves
        #[arg(long)]
        leaves: bool,
    },

    /// Check a path and print its canonical form
    Fmt {
        path: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Get {
            path,
            input,
            pretty,
        } => run_query(path, input, pretty, QueryMode::Get),
        Commands::First {
            path,
            input,
            pretty,
        } => run_query(path, input, pretty, QueryMode::First),
        Commands::Has { path, input } => run_query(path, input, false, QueryMode::Has),
        Commands::Set {
            path,
            value,
            input,
            pretty,
            one,
        } => run_mutation(path, input, pretty, one, Mutation::Set(value)),
        Commands::Del {
            path,
            input,
            pretty,
            one,
        } => run_mutation(path, input, pretty, one, Mutation::Del),
        Commands::Remove {
            path,
            input,
            pretty,
            one,
        } => run_mutation(path, input, pretty, one, Mutation::Remove),
        Commands::Walk { input, leaves } => read_input(input).and_then(|input| {
            cli::execute_walk(&WalkOptions { input, leaves }).map(|out| print!("{}", out))
        }),
        Commands::Fmt { path } => cli::execute_fmt(&path).map(|out| println!("{}", out)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// Uses `--input` when given, otherwise piped stdin.
fn read_input(input: Option<String>) -> Result<Option<String>, CliError> {
    match input {
        Some(s) => Ok(Some(s)),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        None => Ok(None),
    }
}

fn run_query(
    path: String,
    input: Option<String>,
    pretty: bool,
    mode: QueryMode,
) -> Result<(), CliError> {
    let options = QueryOptions {
        path,
        input: read_input(input)?,
        pretty,
    };
    println!("{}", cli::execute_query(&options, mode)?);
    Ok(())
}

fn run_mutation(
    path: String,
    input: Option<String>,
    pretty: bool,
    one: bool,
    mutation: Mutation,
) -> Result<(), CliError> {
    let options = MutateOptions {
        path,
        input: read_input(input)?,
        pretty,
        one,
    };
    println!("{}", cli::execute_mutation(&options, &mutation)?);
    Ok(())
}
