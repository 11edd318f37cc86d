//! Command line access to the Wave API.
//!
//! Prints the selected resource as pretty JSON on stdout. Logs and
//! diagnostics go to stderr.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{ArgGroup, Parser};
use serde::Serialize;
use tracing_error::ErrorLayer;
use tracing_subscriber::{filter::LevelFilter, prelude::*};
use url::Url;
use wave_rs::{
    Client, KeyPair, ListOptions, ProductListOptions, Scope,
    oauth::{self, Token},
};

#[derive(Parser, Debug)]
#[command(name = "wave", version, about = "Query the Wave accounting API")]
#[command(group(ArgGroup::new("operation").required(true)))]
struct Cli {
    /// List the businesses you have access to
    #[arg(long, group = "operation")]
    businesses: bool,

    /// Show one business
    #[arg(long, value_name = "BUSINESS_ID", group = "operation")]
    business: Option<String>,

    /// List all currencies
    #[arg(long, group = "operation")]
    currencies: bool,

    /// Show one currency
    #[arg(long, value_name = "CODE", group = "operation")]
    currency: Option<String>,

    /// List all countries
    #[arg(long, group = "operation")]
    countries: bool,

    /// Show one country
    #[arg(long, value_name = "COUNTRY_CODE", group = "operation")]
    country: Option<String>,

    /// List the provinces of a country
    #[arg(long, value_name = "COUNTRY_CODE", group = "operation")]
    provinces: Option<String>,

    /// List the customers of a business
    #[arg(long, value_name = "BUSINESS_ID", group = "operation")]
    customers: Option<String>,

    /// List the products of a business
    #[arg(long, value_name = "BUSINESS_ID", group = "operation")]
    products: Option<String>,

    /// Show the authorized user
    #[arg(long, group = "operation")]
    user: bool,

    /// List the chart of accounts of a business
    #[arg(long, value_name = "BUSINESS_ID", group = "operation")]
    accounts: Option<String>,

    /// OAuth client ID (defaults to WAVE_CLIENT_ID)
    #[arg(long)]
    id: Option<String>,

    /// OAuth client secret (defaults to WAVE_CLIENT_SECRET)
    #[arg(long)]
    secret: Option<String>,

    /// Access token to use instead of the token cache
    #[arg(long)]
    access: Option<String>,

    /// Space-separated OAuth scopes to request
    #[arg(long, default_value = "basic")]
    scope: String,

    /// Token cache file
    #[arg(long, default_value = "cache.json")]
    cache: PathBuf,

    /// OAuth redirect URL registered for the client
    #[arg(long, default_value = "http://localhost:9001/oauth2")]
    redirect: Url,

    /// Page to fetch, for paginated lists
    #[arg(long)]
    page: Option<u64>,

    /// Number of results per page, for paginated lists
    #[arg(long)]
    page_size: Option<u64>,

    /// Log requests and responses to stderr
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn list_options(&self) -> Option<ListOptions> {
        (self.page.is_some() || self.page_size.is_some()).then_some(ListOptions {
            page: self.page,
            page_size: self.page_size,
        })
    }

    fn product_list_options(&self) -> Option<ProductListOptions> {
        self.list_options().map(|options| ProductListOptions {
            page: options.page,
            page_size: options.page_size,
            ..Default::default()
        })
    }

    fn key_pair(&self) -> Option<KeyPair> {
        match &self.id {
            Some(id) => Some(KeyPair::new(
                id.clone(),
                self.secret.clone().or_else(|| std::env::var("WAVE_CLIENT_SECRET").ok()),
            )),
            None => KeyPair::from_env(),
        }
    }
}

fn init_tracing(debug: bool) {
    let level = if debug { LevelFilter::DEBUG } else { LevelFilter::WARN };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(ErrorLayer::default())
        .with(level)
        .init();
}

/// Finds a token: `--access` first, then the cache file, then an
/// interactive code exchange whose result is written to the cache.
async fn access_token(cli: &Cli) -> anyhow::Result<String> {
    if let Some(access) = &cli.access {
        return Ok(access.clone());
    }

    match Token::load(&cli.cache) {
        Ok(token) => {
            tracing::debug!(cache = %cli.cache.display(), "using cached token");
            return Ok(token.access_token);
        }
        Err(e) => tracing::debug!(error = %e, "no usable token cache"),
    }

    let Some(key_pair) = cli.key_pair() else {
        bail!("no access token: pass --access, or --id (or set WAVE_CLIENT_ID) to authorize");
    };

    let (url, _csrf) = oauth::authorize_url(key_pair.clone(), cli.redirect.clone(), Scope::from_string(&cli.scope))?;
    eprintln!("Open in browser: {url}");
    eprint!("Enter verification code: ");
    std::io::stderr().flush()?;

    let mut code = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut code)
        .context("failed to read verification code")?;

    let token = oauth::exchange_code(key_pair, cli.redirect.clone(), code.trim().to_string()).await?;
    token
        .save(&cli.cache)
        .with_context(|| format!("failed to write token cache {}", cli.cache.display()))?;
    Ok(token.access_token)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to encode output")?;
    println!("{json}");
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let token = access_token(&cli).await?;
    let client = Client::with_access_token(&token)?;

    if cli.businesses {
        print_json(&client.businesses().list(cli.list_options()).await?.0)
    } else if let Some(id) = &cli.business {
        print_json(&client.businesses().get(id).await?.0)
    } else if cli.currencies {
        print_json(&client.currencies().list().await?.0)
    } else if let Some(code) = &cli.currency {
        print_json(&client.currencies().get(code).await?.0)
    } else if cli.countries {
        print_json(&client.countries().list().await?.0)
    } else if let Some(code) = &cli.country {
        print_json(&client.countries().get(code).await?.0)
    } else if let Some(code) = &cli.provinces {
        print_json(&client.countries().provinces(code).await?.0)
    } else if let Some(business_id) = &cli.customers {
        print_json(&client.customers().list(business_id, cli.list_options()).await?.0)
    } else if let Some(business_id) = &cli.products {
        let (products, response) = client.products().list(business_id, cli.product_list_options()).await?;
        if let Some(pagination) = response.pagination() {
            tracing::debug!(
                page = pagination.current_page,
                next = pagination.next_page,
                total = pagination.total_count,
                "fetched products"
            );
        }
        print_json(&products)
    } else if cli.user {
        print_json(&client.users().get().await?.0)
    } else if let Some(business_id) = &cli.accounts {
        print_json(&client.accounts().list(business_id).await?.0)
    } else {
        bail!("no operation selected")
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(error) = run(cli).await {
        match error.downcast::<wave_rs::Error>() {
            Ok(error) => {
                let body = error.response_body().map(String::from);
                eprintln!("{:?}", miette::Report::new(error));
                if let Some(body) = body.filter(|b| !b.is_empty()) {
                    eprintln!("Response body:\n{body}");
                }
            }
            Err(error) => eprintln!("Error: {error:#}"),
        }
        std::process::exit(1);
    }
}
