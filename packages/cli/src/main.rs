//! `docjson` — command-line client for DocJSON hypermedia APIs.
//!
//! Three subcommands:
//!
//! - **`get`** — fetch a document, optionally walk a path into it, render it.
//! - **`render`** — decode a local file (or stdin) and render it.
//! - **`submit`** — walk to a form and invoke it with `key=value` arguments.
//!
//! Set `RUST_LOG=docjson=debug` (or pass `-v`) to see every request made.

mod navigate;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use docjson::{Node, Transport, Url};
use docjson_http::{HttpConfig, HttpTransport};
use navigate::{navigate, NavError};
use serde_json::{Map, Value};

/// docjson — DocJSON hypermedia client
///
/// Fetch, navigate, and act on self-describing JSON APIs.
#[derive(Parser)]
#[command(name = "docjson", version, about, long_about = None)]
struct Cli {
    /// Log every request and page fetch to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Request timeout in seconds.
    #[arg(long, global = true, env = "DOCJSON_TIMEOUT_SECS", value_name = "SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a document and print it.
    ///
    /// Examples:
    ///   docjson get http://api.example.com/
    ///   docjson get http://api.example.com/ --path todos.0 --all
    Get {
        /// URL of the document.
        url: Url,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Decode a DocJSON file and print it.
    ///
    /// Pass `-` as FILE to read from stdin. Relative links resolve against
    /// --base; they are only fetched if the path walks through them.
    Render {
        /// Path to a JSON file, or `-` for stdin.
        file: PathBuf,

        /// Base URL for resolving relative references.
        #[arg(long, value_name = "URL")]
        base: Url,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Invoke a form and print the resulting document.
    ///
    /// Values are parsed as JSON when possible, so `done=true` sends a boolean
    /// and `text=hello` sends a string.
    ///
    /// Example:
    ///   docjson submit http://api.example.com/ --path add --arg text=milk
    Submit {
        /// URL of the document containing the form.
        url: Url,

        /// Dot-separated path from the document root to the form.
        #[arg(long, value_name = "PATH")]
        path: String,

        /// A form argument. Repeat for several: --arg a=1 --arg b=two
        #[arg(long = "arg", value_name = "KEY=VALUE")]
        args: Vec<String>,

        /// Print the result in wire format instead of the rendered tree.
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct ViewArgs {
    /// Dot-separated path into the document, e.g. `todos.3.title`.
    #[arg(long, value_name = "PATH", default_value = "")]
    path: String,

    /// Fetch every remaining page if the result is a list.
    #[arg(long)]
    all: bool,

    /// Print the result in wire format instead of the rendered tree.
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = HttpConfig::from_env();
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let transport = HttpTransport::new(config)
        .unwrap_or_else(|e| fatal(&format!("failed to build HTTP client: {}", e)));

    match cli.command {
        Command::Get { url, view } => {
            let root = docjson::get(&transport, &url).unwrap_or_else(|e| fatal(&e.to_string()));
            show(&transport, root, &view);
        }

        Command::Render { file, base, view } => {
            let raw = read_input(&file);
            let root = docjson::decode(raw.as_bytes(), &base)
                .unwrap_or_else(|e| fatal(&format!("failed to decode {}: {}", file.display(), e)));
            show(&transport, root, &view);
        }

        Command::Submit {
            url,
            path,
            args,
            json,
        } => {
            let root = docjson::get(&transport, &url).unwrap_or_else(|e| fatal(&e.to_string()));
            let node = navigate(&transport, root, &path).unwrap_or_else(|e| fatal(&e.to_string()));
            let form = match node {
                Node::Form(form) => form,
                other => fatal(&format!("{:?} is a {}, not a form", path, other.kind())),
            };

            let args = parse_args(&args);
            // Validate separately so bad arguments get their own exit code.
            if let Err(e) = form.validate(&args) {
                eprintln!("error: {}", e);
                eprintln!("usage: form({})", form.signature());
                process::exit(1);
            }
            let result = form
                .invoke(&transport, &args)
                .unwrap_or_else(|e| fatal(&e.to_string()));
            print_node(&result, json);
        }
    }
}

/// Navigate, optionally drain, and print.
fn show<T: Transport>(transport: &T, root: Node, view: &ViewArgs) {
    let node = navigate(transport, root, &view.path).unwrap_or_else(|e: NavError| {
        fatal(&format!("cannot resolve path {:?}: {}", view.path, e))
    });
    if view.all {
        if let Node::List(list) = &node {
            list.fetch_all(transport)
                .unwrap_or_else(|e| fatal(&format!("failed to fetch remaining pages: {}", e)));
        }
    }
    print_node(&node, view.json);
}

fn print_node(node: &Node, json: bool) {
    if json {
        let text = serde_json::to_string_pretty(node)
            .unwrap_or_else(|e| fatal(&format!("failed to serialise document: {}", e)));
        println!("{}", text);
    } else {
        println!("{}", node);
    }
}

/// Parse `key=value` pairs into form arguments, keeping their order.
///
/// The value is taken as JSON if it parses, otherwise as a plain string.
fn parse_args(raw: &[String]) -> Map<String, Value> {
    let mut out = Map::new();
    for pair in raw {
        let (key, value) = pair.split_once('=').unwrap_or_else(|| {
            fatal(&format!("invalid --arg {:?}: expected format KEY=VALUE", pair))
        });
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.into()));
        out.insert(key.to_string(), value);
    }
    out
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "docjson=debug,docjson_http=debug"
    } else {
        "docjson=warn,docjson_http=warn"
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .init();
}

/// Read the full contents of a file, or stdin when the path is `"-"`.
fn read_input(path: &PathBuf) -> String {
    if path.to_str() == Some("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {}", e)));
        buf
    } else {
        fs::read_to_string(path).unwrap_or_else(|e| {
            fatal(&format!("failed to read {}: {}", path.display(), e))
        })
    }
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("docjson: {}", msg);
    process::exit(2);
}
