//! Request command implementation.

use std::io::{self, Read};

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use serde_json::Value;

use timeclock_http::RequestDescriptor;

use crate::cli::ClientArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: String,

    /// Endpoint path relative to the API base (e.g., api/attendance/)
    pub path: String,

    /// JSON request body (use - for stdin)
    #[arg(long)]
    pub body: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "query", short = 'q')]
    pub query: Vec<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: RequestArgs, client_args: &ClientArgs) -> Result<()> {
    let client = session::active_client(client_args)?;

    let mut request = RequestDescriptor::parse(&args.method, &args.path)?;
    for pair in &args.query {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid query parameter '{}': expected key=value", pair);
        };
        request = request.with_query(key, value);
    }
    if let Some(body) = read_body(args.body.as_deref())? {
        request = request.with_json(body);
    }

    let response = client
        .send(&request)
        .await
        .with_context(|| format!("{} {} failed", args.method.to_uppercase(), args.path))?;

    if response.is_empty() {
        eprintln!("{}", format!("HTTP {} (no content)", response.status()).dimmed());
        return Ok(());
    }

    match response.json::<Value>() {
        Ok(value) => output::json(&value, args.pretty),
        Err(_) => {
            println!("{}", response.text());
            Ok(())
        }
    }
}

fn read_body(body: Option<&str>) -> Result<Option<Value>> {
    let Some(body) = body else {
        return Ok(None);
    };

    let text = if body == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read body from stdin")?;
        buf
    } else {
        body.to_string()
    };

    let value = serde_json::from_str(&text).context("Request body is not valid JSON")?;
    Ok(Some(value))
}
