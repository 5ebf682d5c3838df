//! ColKV CLI Client
//!
//! Command-line interface for a ColKV store node. Keys, names and values are
//! taken as strings and encoded with the chosen serializers.

use clap::{Args as ClapArgs, Parser, Subcommand};
use colkv::{fields, CallOptions, Client, ClientConfig, Columns, Rows, Serializer, TcpTransport, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// ColKV CLI
#[derive(Parser, Debug)]
#[command(name = "colkv-cli")]
#[command(about = "CLI for a ColKV store node")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:9160")]
    server: String,

    /// Keyspace
    #[arg(short, long, default_value = "default")]
    keyspace: String,

    #[command(flatten)]
    codecs: Codecs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ClapArgs, Debug)]
struct Codecs {
    /// Row key serializer
    #[arg(long, default_value = "string")]
    k_serializer: String,

    /// Column name serializer
    #[arg(long, default_value = "string")]
    n_serializer: String,

    /// Column value serializer
    #[arg(long, default_value = "string")]
    v_serializer: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write one column of a row
    Put {
        column_family: String,
        key: String,
        name: String,
        value: String,
    },

    /// Read rows
    Get {
        column_family: String,
        keys: Vec<String>,

        /// Maximum columns per row
        #[arg(long)]
        count: Option<u32>,

        /// Walk columns in reverse order
        #[arg(long)]
        reversed: bool,
    },

    /// Read one column of a row
    Column {
        column_family: String,
        key: String,
        name: String,
    },

    /// Scan a key range
    Range {
        column_family: String,
        start_key: String,
        finish_key: String,
    },

    /// Count the columns of a row
    Count { column_family: String, key: String },

    /// Delete columns of a row
    DelColumns {
        column_family: String,
        key: String,
        names: Vec<String>,
    },

    /// Delete rows
    DelRow {
        column_family: String,
        keys: Vec<String>,
    },

    /// Connect and disconnect
    Ping,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> colkv::Result<()> {
    let config = ClientConfig::builder()
        .endpoint(&args.server)
        .keyspace(&args.keyspace)
        .build();
    let client = Client::connect(TcpTransport::new(&config), &config)?;

    let ks: Serializer = args.codecs.k_serializer.parse()?;
    let ns: Serializer = args.codecs.n_serializer.parse()?;
    let vs: Serializer = args.codecs.v_serializer.parse()?;
    let options = CallOptions::new()
        .k_serializer(ks)
        .n_serializer(ns)
        .v_serializer(vs);

    match args.command {
        Commands::Put {
            column_family,
            key,
            name,
            value,
        } => {
            let row = fields([(parse(ns, &name)?, parse(vs, &value)?)]);
            client.put_row(&column_family, parse(ks, &key)?, &row, &options)?;
            println!("OK");
        }
        Commands::Get {
            column_family,
            keys,
            count,
            reversed,
        } => {
            let keys = keys.iter().map(|k| parse(ks, k)).collect::<colkv::Result<Vec<_>>>()?;
            let mut options = options.reversed(reversed);
            if let Some(count) = count {
                options = options.count(count);
            }
            print_rows(&client.get_rows(&column_family, &keys, &options)?);
        }
        Commands::Column {
            column_family,
            key,
            name,
        } => {
            let names = [parse(ns, &name)?];
            print_columns(&client.get_columns(&column_family, parse(ks, &key)?, &names, &options)?);
        }
        Commands::Range {
            column_family,
            start_key,
            finish_key,
        } => {
            let rows = client.get_range(
                &column_family,
                parse(ks, &start_key)?,
                parse(ks, &finish_key)?,
                &options,
            )?;
            print_rows(&rows);
        }
        Commands::Count { column_family, key } => {
            println!("{}", client.count_columns(&column_family, parse(ks, &key)?, &options)?);
        }
        Commands::DelColumns {
            column_family,
            key,
            names,
        } => {
            let names = names.iter().map(|n| parse(ns, n)).collect::<colkv::Result<Vec<_>>>()?;
            client.delete_columns(&column_family, parse(ks, &key)?, &names, &options)?;
            println!("OK");
        }
        Commands::DelRow { column_family, keys } => {
            let keys = keys.iter().map(|k| parse(ks, k)).collect::<colkv::Result<Vec<_>>>()?;
            client.delete_rows(&column_family, &keys, &options)?;
            println!("OK");
        }
        Commands::Ping => println!("PONG"),
    }

    client.disconnect()
}

/// Turn command-line text into a value the serializer accepts
fn parse(serializer: Serializer, text: &str) -> colkv::Result<Value> {
    serializer
        .parse_text(text)
        .map_err(|e| colkv::ColError::Config(e.to_string()))
}

fn print_rows(rows: &Rows) {
    for (key, columns) in rows {
        println!("{}:", key);
        for (name, value) in columns {
            println!("  {} = {}", name, value);
        }
    }
}

fn print_columns(columns: &Columns) {
    for (name, value) in columns {
        println!("{} = {}", name, value);
    }
}
