mod checkins;
mod community;
mod lists;
mod sync;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "beerdb-cli")]
#[command(about = "beerdb pipeline command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run pending database migrations.
    Migrate,
    /// Sync the full product catalog from the retailer.
    SyncCatalog,
    /// Sync the retailer's store directory.
    SyncStores,
    /// Refresh per-store stock for the stalest stores.
    SyncStock {
        /// How many stores to refresh this run.
        #[arg(long, default_value_t = 5)]
        stores: i64,
    },
    /// Fetch detail attributes for products that have none yet.
    SyncDetails {
        /// Upper bound on detail requests this run.
        #[arg(long, default_value_t = 100)]
        calls: i64,
    },
    /// Register a product id to watch for before its release.
    AddPending {
        #[arg(long)]
        retail_id: i64,
    },
    /// Poll registered pending releases against the product endpoint.
    ResolvePending,
    /// Deactivate products unseen by the catalog sync for N days.
    Deactivate {
        #[arg(long, default_value_t = 14)]
        days: i64,
    },
    /// Match unmatched products against the community beer index.
    MatchCommunity {
        /// Upper bound on products to match this run.
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
    /// Refresh community-page data for matched products.
    RefreshCommunity {
        /// Upper bound on page fetches this run.
        #[arg(long, default_value_t = 50)]
        calls: i64,
    },
    /// Clear a product's community match and stop auto-matching it.
    RemoveMatch {
        #[arg(long)]
        retail_id: i64,
    },
    /// Re-enter manually flagged products into automatic matching.
    ClearManualFlags,
    /// Submit a corrected community url for a product.
    SubmitWrongMatch {
        #[arg(long)]
        retail_id: i64,
        #[arg(long)]
        url: String,
    },
    /// List corrections waiting for review.
    ListWrongMatches,
    /// Accept a pending correction by id.
    AcceptWrongMatch {
        #[arg(long)]
        id: i64,
    },
    /// Import a check-in export file for a user.
    ImportCheckins {
        #[arg(long)]
        user: String,
        #[arg(long)]
        file: std::path::PathBuf,
    },
    /// Subscribe a user to a community activity feed.
    AddFeed {
        #[arg(long)]
        user: String,
        #[arg(long)]
        url: String,
    },
    /// Sync activity feeds (all users, or one with --user).
    SyncRss {
        #[arg(long)]
        user: Option<String>,
    },
    /// Re-derive tastings for check-ins whose beers matched later.
    SyncTasted,
    /// Mark a product as tasted by a user.
    MarkTasted {
        #[arg(long)]
        user: String,
        #[arg(long)]
        retail_id: i64,
    },
    /// Remove a user's tasted mark from a product.
    UnmarkTasted {
        #[arg(long)]
        user: String,
        #[arg(long)]
        retail_id: i64,
    },
    /// Create a named list for a user.
    CreateList {
        #[arg(long)]
        user: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Show a user's lists.
    ShowLists {
        #[arg(long)]
        user: String,
    },
    /// Append a product to a list.
    AddListItem {
        #[arg(long)]
        list_id: i64,
        #[arg(long)]
        product_id: String,
    },
    /// Remove a product from a list.
    RemoveListItem {
        #[arg(long)]
        list_id: i64,
        #[arg(long)]
        product_id: String,
    },
    /// Set a user's list order explicitly.
    ReorderLists {
        #[arg(long)]
        user: String,
        /// List ids in the desired order.
        ids: Vec<i64>,
    },
    /// Set a list's item order explicitly.
    ReorderItems {
        #[arg(long)]
        list_id: i64,
        /// Item ids in the desired order.
        ids: Vec<i64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = beerdb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = beerdb_db::PoolConfig::from_app_config(&config);
    let pool = beerdb_db::connect_pool(&config.database_url, pool_config).await?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Migrate => {
            beerdb_db::run_migrations(&pool).await?;
            println!("migrations applied");
        }
        Commands::SyncCatalog => sync::sync_catalog(&pool, &config).await?,
        Commands::SyncStores => sync::sync_stores(&pool, &config).await?,
        Commands::SyncStock { stores } => sync::sync_stock(&pool, &config, stores).await?,
        Commands::SyncDetails { calls } => sync::sync_details(&pool, &config, calls).await?,
        Commands::AddPending { retail_id } => {
            beerdb_db::add_pending_release(&pool, retail_id).await?;
            println!("registered pending release {retail_id}");
        }
        Commands::ResolvePending => sync::resolve_pending(&pool, &config).await?,
        Commands::Deactivate { days } => {
            let (deactivated, unstocked) = beerdb_db::deactivate_stale(&pool, days).await?;
            println!("deactivated {deactivated} products, cleared {unstocked} stock rows");
        }
        Commands::MatchCommunity { limit } => {
            community::match_community(&pool, &config, limit).await?;
        }
        Commands::RefreshCommunity { calls } => {
            community::refresh_community(&pool, &config, calls).await?;
        }
        Commands::RemoveMatch { retail_id } => {
            beerdb_db::reset_manual_match(&pool, retail_id).await?;
            println!("cleared community match for {retail_id}");
        }
        Commands::ClearManualFlags => {
            let cleared = beerdb_db::clear_manual_flags(&pool).await?;
            println!("re-entered {cleared} products into matching");
        }
        Commands::SubmitWrongMatch { retail_id, url } => {
            community::submit_wrong_match(&pool, &config, retail_id, &url).await?;
        }
        Commands::ListWrongMatches => community::list_wrong_matches(&pool).await?,
        Commands::AcceptWrongMatch { id } => {
            beerdb_match::accept_wrong_match(&pool, id).await?;
            println!("accepted correction {id}");
        }
        Commands::ImportCheckins { user, file } => {
            checkins::import_checkins(&pool, &user, &file).await?;
        }
        Commands::AddFeed { user, url } => checkins::add_feed(&pool, &user, &url).await?,
        Commands::SyncRss { user } => {
            checkins::sync_rss(&pool, &config, user.as_deref()).await?;
        }
        Commands::SyncTasted => {
            let outcome = beerdb_db::sync_unmatched_checkins(&pool).await?;
            println!(
                "derived {} tastings across {} users",
                outcome.synced_count, outcome.users_affected
            );
        }
        Commands::MarkTasted { user, retail_id } => {
            checkins::mark_tasted(&pool, &user, retail_id).await?;
        }
        Commands::UnmarkTasted { user, retail_id } => {
            checkins::unmark_tasted(&pool, &user, retail_id).await?;
        }
        Commands::CreateList {
            user,
            name,
            description,
        } => {
            lists::create_list(&pool, &user, &name, description.as_deref()).await?;
        }
        Commands::ShowLists { user } => lists::show_lists(&pool, &user).await?,
        Commands::AddListItem {
            list_id,
            product_id,
        } => {
            lists::add_list_item(&pool, list_id, &product_id).await?;
        }
        Commands::RemoveListItem {
            list_id,
            product_id,
        } => {
            lists::remove_list_item(&pool, list_id, &product_id).await?;
        }
        Commands::ReorderLists { user, ids } => {
            lists::reorder_lists(&pool, &user, &ids).await?;
        }
        Commands::ReorderItems { list_id, ids } => {
            lists::reorder_items(&pool, list_id, &ids).await?;
        }
    }

    Ok(())
}
