use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Parser)]
#[command(name = "traffic-cli")]
#[command(about = "Generate traffic against the LGTM demo service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Call one endpoint and print the response
    Hit {
        #[arg(value_enum)]
        endpoint: Route,
    },
    /// Check service health
    Health,
    /// Send a batch of requests across the instrumented endpoints
    Load {
        #[arg(short, long, default_value_t = 100)]
        requests: usize,

        #[arg(short, long, default_value_t = 10)]
        concurrency: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Route {
    Home,
    Users,
    Items,
    Error,
    Health,
}

impl Route {
    const LOAD_MIX: [Route; 4] = [Route::Home, Route::Users, Route::Items, Route::Error];

    fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Users => "/api/users",
            Route::Items => "/api/items",
            Route::Error => "/api/error",
            Route::Health => "/health",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/').to_string();

    match cli.command {
        Commands::Hit { endpoint } => hit(&client, &base, endpoint).await?,
        Commands::Health => hit(&client, &base, Route::Health).await?,
        Commands::Load {
            requests,
            concurrency,
        } => load(client, base, requests, concurrency.max(1)).await,
    }

    Ok(())
}

async fn hit(client: &reqwest::Client, base: &str, route: Route) -> Result<(), reqwest::Error> {
    let res = client.get(format!("{}{}", base, route.path())).send().await?;
    let status = res.status();
    let request_id = res
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let body = res.text().await?;

    println!("{} {} (request id {})", status, route.path(), request_id);
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json).unwrap_or(body)),
        Err(_) => println!("{}", body),
    }
    Ok(())
}

async fn load(client: reqwest::Client, base: String, requests: usize, concurrency: usize) {
    let permits = Arc::new(Semaphore::new(concurrency));
    let mut tasks = JoinSet::new();
    let started = Instant::now();

    for i in 0..requests {
        let route = Route::LOAD_MIX[i % Route::LOAD_MIX.len()];
        let url = format!("{}{}", base, route.path());
        let client = client.clone();
        let permits = permits.clone();

        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await.ok();
            let sent = Instant::now();
            let outcome = match client.get(url).send().await {
                Ok(res) => res.status().as_u16().to_string(),
                Err(e) if e.is_timeout() => "timeout".to_string(),
                Err(_) => "transport error".to_string(),
            };
            (outcome, sent.elapsed())
        });
    }

    let mut by_outcome: BTreeMap<String, usize> = BTreeMap::new();
    let mut latencies = Vec::with_capacity(requests);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((outcome, latency)) => {
                *by_outcome.entry(outcome).or_default() += 1;
                latencies.push(latency);
            }
            Err(e) => eprintln!("Request task failed: {}", e),
        }
    }
    latencies.sort();

    println!("{} requests in {:.2?} (concurrency {})", requests, started.elapsed(), concurrency);
    for (outcome, count) in &by_outcome {
        println!("  {:>16}: {}", outcome, count);
    }
    for (label, q) in [("p50", 0.50), ("p95", 0.95), ("p99", 0.99)] {
        if let Some(latency) = percentile(&latencies, q) {
            println!("  {:>16}: {:.1?}", label, latency);
        }
    }
}

fn percentile(sorted: &[Duration], q: f64) -> Option<Duration> {
    if sorted.is_empty() {
        return None;
    }
    let rank = ((sorted.len() as f64 * q).ceil() as usize).clamp(1, sorted.len());
    Some(sorted[rank - 1])
}
