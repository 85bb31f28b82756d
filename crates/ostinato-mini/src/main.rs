use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ostinato_core::{query_cycle, Hap, TidalEvent};
use ostinato_mini::{compile, parse_statement};

#[derive(Parser)]
#[command(name = "ostinato", about = "Inspect ostinato pattern statements", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a statement for parse and compile errors
    Validate {
        /// Pattern statement, e.g. 'note "c3 e3" # hold:0 0.8'
        statement: String,
    },
    /// Print the parsed syntax tree
    Ast {
        statement: String,
        #[arg(long, value_enum, default_value = "debug")]
        format: Format,
    },
    /// Compile a statement and print the events of one or more cycles
    Events {
        statement: String,
        /// First cycle to query
        #[arg(long, default_value_t = 0)]
        from: i64,
        /// How many cycles to query
        #[arg(long, default_value_t = 1)]
        cycles: u32,
        #[arg(long, value_enum, default_value = "debug")]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Debug,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Validate { statement } => {
            if let Err(err) = compile(&statement) {
                bail!("{err}");
            }
            println!("ok");
        }
        Command::Ast { statement, format } => {
            let ast = match parse_statement(&statement) {
                Ok(ast) => ast,
                Err(err) => bail!("{err}"),
            };
            match format {
                Format::Debug => println!("{ast:#?}"),
                Format::Json => println!("{}", serde_json::to_string_pretty(&ast)?),
            }
        }
        Command::Events {
            statement,
            from,
            cycles,
            format,
        } => {
            let pattern = match compile(&statement) {
                Ok(pattern) => pattern,
                Err(err) => bail!("{err}"),
            };
            for cycle in from..from + cycles as i64 {
                let onsets: Vec<Hap<TidalEvent>> = query_cycle(&pattern, cycle)
                    .into_iter()
                    .filter(Hap::has_onset)
                    .collect();
                match format {
                    Format::Debug => {
                        println!("cycle {cycle}:");
                        for hap in onsets {
                            println!("  {} {} {}", hap.part.begin, hap.part.end, hap.value);
                        }
                    }
                    Format::Json => println!("{}", serde_json::to_string(&onsets)?),
                }
            }
        }
    }
    Ok(())
}
