use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pickup_core::seo::{render_sitemap, sitemap_entries};
use pickup_core::whatsapp::{IntentFields, IntentKind};
use pickup_core::{compose, filter_products, MessageIntent, ProductQuery, SiteConfig};
use pickup_observability::init_tracing;
use pickup_storage::{CatalogRepository, ContentRepository, Store};

#[derive(Debug, Parser)]
#[command(name = "pickup")]
#[command(about = "ElectroFurni pickup service CLI")]
struct Cli {
    /// Overrides the destination number used for WhatsApp links.
    #[arg(long, global = true, env = "PICKUP_WHATSAPP_NUMBER")]
    whatsapp_number: Option<String>,

    #[arg(long, global = true, env = "PICKUP_SITE_URL")]
    site_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Serve,
    Whatsapp {
        /// pickup, product, contact or general
        kind: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        message: Option<String>,
        #[arg(long)]
        product_name: Option<String>,
        #[arg(long)]
        product_id: Option<String>,
        #[arg(long)]
        message_only: bool,
    },
    Products {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<usize>,
        #[arg(long)]
        limit: Option<usize>,
    },
    Sitemap,
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("pickup_cli");
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Command::Serve => pickup_api::serve(config).await?,
        Command::Whatsapp {
            kind,
            name,
            phone,
            message,
            product_name,
            product_id,
            message_only,
        } => {
            let kind = IntentKind::parse(&kind)
                .with_context(|| format!("unknown message kind {kind:?}"))?;
            let intent = MessageIntent::from_parts(
                kind,
                IntentFields {
                    customer_name: name,
                    customer_phone: phone,
                    custom_message: message,
                    product_name,
                    product_id,
                },
            );
            let link = compose(&config.whatsapp, &intent);
            if message_only {
                println!("{}", link.message());
            } else {
                println!("{link}");
            }
        }
        Command::Products {
            category,
            search,
            page,
            limit,
        } => {
            let store = Store::seeded();
            let products = store.list_products().await?;
            let page = filter_products(
                &products,
                &ProductQuery {
                    category,
                    search,
                    page,
                    limit,
                },
            );
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        Command::Sitemap => {
            let store = Store::seeded();
            let products = store.list_products().await?;
            let posts = store.list_posts().await?;
            let today = chrono::Utc::now().date_naive();
            let entries = sitemap_entries(&config.site_url, today, &products, &posts);
            print!("{}", render_sitemap(&entries));
        }
        Command::CheckConfig => {
            let summary = serde_json::json!({
                "business": config.business,
                "whatsapp_number": config.whatsapp.number().as_str(),
                "whatsapp_chat_url": config.whatsapp.chat_url(),
                "site_url": config.site_url,
                "bind": config.bind,
                "form_rate_limit": {
                    "window_seconds": config.form_rate_limit.window.as_secs(),
                    "max_requests": config.form_rate_limit.max_requests,
                },
                "allowed_origins": config.allowed_origins,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<SiteConfig> {
    config_from(cli, |key| std::env::var(key).ok())
}

/// Flags take precedence over the environment for the keys they cover.
fn config_from(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> Result<SiteConfig> {
    SiteConfig::from_lookup(|key| match key {
        "PICKUP_WHATSAPP_NUMBER" => cli.whatsapp_number.clone().or_else(|| env(key)),
        "PICKUP_SITE_URL" => cli.site_url.clone().or_else(|| env(key)),
        _ => env(key),
    })
    .context("invalid site configuration")
}
