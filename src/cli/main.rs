use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use restaurant_search::search::SortBy;
use reqwest::{Client, Response};
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "rs-cli")]
#[command(about = "Restaurant search CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "RESTAURANT_SEARCH_ENDPOINT", default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search restaurants
    Search {
        #[arg(value_name = "QUERY", default_value = "")]
        query: String,

        /// Cuisine filter, repeatable
        #[arg(short, long)]
        cuisine: Vec<String>,

        #[arg(short = 'r', long)]
        min_rating: Option<f64>,

        #[arg(short = 'f', long)]
        max_delivery_fee: Option<f64>,

        /// Only restaurants that are open now
        #[arg(short, long)]
        open: bool,

        #[arg(long, requires = "lng")]
        lat: Option<f64>,

        #[arg(long, requires = "lat")]
        lng: Option<f64>,

        #[arg(long, default_value = "5km")]
        radius: String,

        #[arg(short, long, value_enum, default_value = "relevance")]
        sort: SortBy,

        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,

        #[arg(long, default_value = "0")]
        from: usize,

        #[arg(long, default_value = "20")]
        size: usize,
    },

    /// Autocomplete suggestions
    Suggest {
        #[arg(value_name = "PREFIX")]
        prefix: String,

        /// Expand the prefix through synonyms and common misspellings
        #[arg(short, long)]
        intelligent: bool,
    },

    /// Open restaurants near a point
    Nearby {
        #[arg(long)]
        lat: f64,

        #[arg(long)]
        lng: f64,

        #[arg(short, long)]
        radius: Option<String>,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Popular searches
    Popular,

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Search {
            query,
            cuisine,
            min_rating,
            max_delivery_fee,
            open,
            lat,
            lng,
            radius,
            sort,
            asc,
            from,
            size,
        } => {
            let mut filters = Map::new();
            if !cuisine.is_empty() {
                filters.insert("cuisine".to_string(), json!(cuisine));
            }
            if let Some(rating) = min_rating {
                filters.insert("minRating".to_string(), json!(rating));
            }
            if let Some(fee) = max_delivery_fee {
                filters.insert("maxDeliveryFee".to_string(), json!(fee));
            }
            if open {
                filters.insert("isOpen".to_string(), json!(true));
            }
            if let (Some(lat), Some(lng)) = (lat, lng) {
                filters.insert(
                    "location".to_string(),
                    json!({ "lat": lat, "lng": lng, "radius": radius }),
                );
            }

            let response = client
                .post(format!("{}/v1/search", cli.endpoint))
                .json(&json!({
                    "query": query,
                    "filters": filters,
                    "options": {
                        "from": from,
                        "size": size,
                        "sortBy": sort.to_string(),
                        "sortOrder": if asc { "asc" } else { "desc" },
                    },
                }))
                .send()
                .await
                .with_context(|| format!("failed to reach {}", cli.endpoint))?;

            print_json(response).await?;
        }

        Commands::Suggest { prefix, intelligent } => {
            let path = if intelligent {
                "v1/suggestions/intelligent"
            } else {
                "v1/suggestions"
            };

            let response = client
                .get(format!("{}/{}", cli.endpoint, path))
                .query(&[("q", prefix)])
                .send()
                .await
                .with_context(|| format!("failed to reach {}", cli.endpoint))?;

            print_json(response).await?;
        }

        Commands::Nearby {
            lat,
            lng,
            radius,
            limit,
        } => {
            let mut params = vec![("lat", lat.to_string()), ("lng", lng.to_string())];
            if let Some(radius) = radius {
                params.push(("radius", radius));
            }
            if let Some(limit) = limit {
                params.push(("limit", limit.to_string()));
            }

            let response = client
                .get(format!("{}/v1/restaurants/nearby", cli.endpoint))
                .query(&params)
                .send()
                .await
                .with_context(|| format!("failed to reach {}", cli.endpoint))?;

            print_json(response).await?;
        }

        Commands::Popular => {
            let response = client
                .get(format!("{}/v1/searches/popular", cli.endpoint))
                .send()
                .await
                .with_context(|| format!("failed to reach {}", cli.endpoint))?;

            print_json(response).await?;
        }

        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await
                .with_context(|| format!("failed to reach {}", cli.endpoint))?;

            print_json(response).await?;
        }
    }

    Ok(())
}

/// Pretty-print a JSON response, noting non-success statuses on stderr
async fn print_json(response: Response) -> Result<()> {
    let status = response.status();
    if !status.is_success() {
        eprintln!("server returned {}", status);
    }

    let body: Value = response
        .json()
        .await
        .context("response body is not JSON")?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
