use clap::{Args, Parser, Subcommand, ValueEnum};
use csvapi::{DatasetStore, LoadOptions};
use std::path::PathBuf;
use std::process;

mod server;

/// Serve a directory of CSV files as a read-only JSON API
#[derive(Parser)]
#[command(name = "csvapi", version, about)]
struct Cli {
    /// Output format for `check` and `get`
    #[arg(long, global = true, default_value = "json")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Args)]
struct DataArgs {
    /// Directory holding <name>.csv files and their <name>.json schemas
    #[arg(env = "CSVAPI_DIR")]
    dir: PathBuf,

    /// CSV field delimiter
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    delimiter: u8,
}

impl DataArgs {
    fn open(&self) -> csvapi::Result<DatasetStore> {
        let options = LoadOptions {
            delimiter: self.delimiter,
        };
        DatasetStore::open_with(&self.dir, &options)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Load the directory and serve it over HTTP
    Serve {
        #[command(flatten)]
        data: DataArgs,

        /// Address to bind
        #[arg(long, env = "CSVAPI_HOST", default_value = "127.0.0.1")]
        host: String,

        /// The port to listen on
        #[arg(long, short, env = "CSVAPI_PORT", default_value_t = 1234)]
        port: u16,
    },

    /// Load the directory and report every dataset without serving
    Check {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Answer a single request path (e.g. people/2) from the command line
    Get {
        #[command(flatten)]
        data: DataArgs,

        /// Request path
        path: String,
    },
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s.as_bytes() {
        [b] => Ok(*b),
        _ => Err(format!("Delimiter must be a single ASCII character, got '{s}'")),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR:{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Serve { data, host, port } => {
            log::info!("Loading datasets from {}", data.dir.display());
            let store = data.open()?;
            log::info!("Loaded {} routes", store.len());
            actix_web::rt::System::new().block_on(server::serve(store, &host, port))?;
        }

        Command::Check { data } => {
            let store = data.open()?;
            print_output(&summary(&store), &cli.format)?;
        }

        Command::Get { data, path } => {
            let store = data.open()?;
            let body = csvapi::resolve_path(&store, &path)?;
            let value: serde_json::Value = serde_json::from_slice(&body)?;
            print_output(&value, &cli.format)?;
        }
    }

    Ok(())
}

fn summary(store: &DatasetStore) -> serde_json::Value {
    let routes: Vec<_> = store
        .iter()
        .map(|(route, dataset)| {
            serde_json::json!({
                "route": route,
                "rows": dataset.len(),
                "fields": dataset.schema().fields(),
                "types": dataset.schema().types(),
            })
        })
        .collect();

    serde_json::json!({ "ok": true, "routes": routes })
}

fn print_output(
    value: &serde_json::Value,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(value)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["csvapi", "serve", "data"]).unwrap();
        match cli.command {
            Command::Serve { data, host, port } => {
                assert_eq!(data.dir, PathBuf::from("data"));
                assert_eq!(data.delimiter, b',');
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 1234);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_short_port_flag() {
        let cli = Cli::try_parse_from(["csvapi", "serve", "data", "-p", "8080"]).unwrap();
        assert!(matches!(cli.command, Command::Serve { port: 8080, .. }));
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("ab").is_err());
    }

    #[test]
    fn test_summary() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("ages.csv"), "7\n8\n").unwrap();
        std::fs::write(
            tmp.path().join("ages.json"),
            r#"{"fields":["age"],"types":["int"]}"#,
        )
        .unwrap();

        let store = DatasetStore::open(tmp.path()).unwrap();
        assert_eq!(
            summary(&store),
            serde_json::json!({
                "ok": true,
                "routes": [{ "route": "ages", "rows": 2, "fields": ["age"], "types": ["int"] }]
            })
        );
    }

    #[test]
    fn test_load_failure_is_reported() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("ages.csv"), "abc\n").unwrap();
        std::fs::write(
            tmp.path().join("ages.json"),
            r#"{"fields":["age"],"types":["int"]}"#,
        )
        .unwrap();

        let dir = tmp.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["csvapi", "check", dir]).unwrap();
        let err = run(cli).unwrap_err();
        assert!(err.to_string().contains("cannot parse \"abc\" as int"));
    }
}
