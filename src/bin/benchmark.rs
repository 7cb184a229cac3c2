use chrono::{Duration as ChronoDuration, Utc};
use colored::*;
use contractor_booking::{
    api::router::create_router,
    config::Config,
    domain::models::service::{NewServiceParams, ServiceConfig, WeeklyHours},
    infra::factory::bootstrap_state,
};
use hdrhistogram::Histogram;
use reqwest::Client;
use serde_json::{json, Value};
use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use uuid::Uuid;

const DEFAULT_CONCURRENCY: usize = 50;
const DEFAULT_ROUNDS: usize = 5;

/// Where the bookings go: an already running server, or one started here.
struct Target {
    base_url: String,
    tenant_id: String,
    service_id: String,
}

#[derive(Default)]
struct RoundOutcome {
    booked: usize,
    unavailable: usize,
    other: usize,
}

#[tokio::main]
async fn main() {
    println!("{}", "Starting concurrent booking load test".bold().green());

    let concurrency = env_usize("LOADTEST_CONCURRENCY", DEFAULT_CONCURRENCY);
    let rounds = env_usize("LOADTEST_ROUNDS", DEFAULT_ROUNDS);
    let capacity = env_usize("LOADTEST_CAPACITY", 1) as i32;

    let client = Client::builder()
        .pool_max_idle_per_host(1000)
        .timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to build HTTP client");

    let target = match (env::var("LOADTEST_BASE_URL"), env::var("LOADTEST_TENANT_ID"), env::var("LOADTEST_SERVICE_ID")) {
        (Ok(base_url), Ok(tenant_id), Ok(service_id)) => Target { base_url, tenant_id, service_id },
        _ => spawn_local_server(capacity).await,
    };

    if client.get(format!("{}/health", target.base_url)).send().await.is_err() {
        eprintln!("{}", format!("Server is NOT reachable at {}.", target.base_url).red().bold());
        return;
    }

    println!("Target URL:   {}", target.base_url);
    println!("Service:      {}", target.service_id);
    println!("Concurrency:  {} bookers per slot, {} rounds", concurrency, rounds);

    let slots = open_slots(&client, &target).await;
    if slots.is_empty() {
        eprintln!("{}", "No open slots in the next two weeks.".red().bold());
        return;
    }

    println!("\n{:<27} | {:<7} | {:<11} | {:<7} | {:<10} | {:<10}", "Slot", "Booked", "Unavailable", "Other", "Mean (ms)", "P99 (ms)");
    println!("{:-<27}-+-{:-<7}-+-{:-<11}-+-{:-<7}-+-{:-<10}-+-{:-<10}", "", "", "", "", "", "");

    let mut histogram = Histogram::<u64>::new(3).expect("Failed to create histogram");
    let mut overbooked = 0;

    for slot in slots.iter().take(rounds) {
        let (outcome, round_hist) = run_round(&client, &target, slot, concurrency).await;
        histogram.add(&round_hist).expect("Failed to merge histograms");

        let status = if outcome.booked > capacity as usize {
            overbooked += 1;
            outcome.booked.to_string().red().bold()
        } else {
            outcome.booked.to_string().green()
        };

        println!(
            "{:<27} | {:<7} | {:<11} | {:<7} | {:<10.2} | {:<10.2}",
            slot,
            status,
            outcome.unavailable,
            outcome.other,
            round_hist.mean() / 1000.0,
            round_hist.value_at_quantile(0.99) as f64 / 1000.0,
        );
    }

    println!("\nOverall mean {:.2} ms, p99 {:.2} ms over {} requests",
        histogram.mean() / 1000.0,
        histogram.value_at_quantile(0.99) as f64 / 1000.0,
        histogram.len(),
    );

    if overbooked == 0 {
        println!("{}", "No slot was booked beyond its capacity.".green().bold());
    } else {
        println!("{}", format!("{} slot(s) overbooked!", overbooked).red().bold());
    }
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Boots the engine in-process on an ephemeral port with one seeded service.
async fn spawn_local_server(capacity: i32) -> Target {
    let mut config = Config::in_memory("loadtest-token");
    if let Ok(url) = env::var("DATABASE_URL") {
        config.database_url = url;
    }
    let state = bootstrap_state(&config).await;

    let tenant_id = format!("bench-{}", Uuid::new_v4());
    let service = ServiceConfig::new(NewServiceParams {
        tenant_id: tenant_id.clone(),
        name: "Load test visit".into(),
        duration_minutes: 60,
        buffer_minutes: 0,
        working_hours: WeeklyHours::every_day(8 * 60, 18 * 60),
        timezone: Some("UTC".into()),
        timezone_offset_hours: 0,
        advance_booking_days: 30,
        same_day_booking_allowed: false,
        max_concurrent_bookings_per_slot: capacity,
        requires_confirmation: false,
    });
    let service = state.service_repo.create(&service).await.expect("Failed to seed service");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    let app = create_router(Arc::new(state));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    println!("{}", "Started in-process server with a seeded service.".yellow());

    Target {
        base_url: format!("http://{}", addr),
        tenant_id,
        service_id: service.id,
    }
}

async fn open_slots(client: &Client, target: &Target) -> Vec<String> {
    let start = (Utc::now() + ChronoDuration::days(1)).format("%Y-%m-%d");
    let url = format!(
        "{}/api/v1/{}/services/{}/availability?start={}",
        target.base_url, target.tenant_id, target.service_id, start
    );
    let res = client.get(&url).send().await.expect("Failed to fetch availability");
    if !res.status().is_success() {
        panic!("Availability request failed: status {}", res.status());
    }

    let body: Value = res.json().await.expect("Failed to parse availability");
    body["days"]
        .as_array()
        .into_iter()
        .flatten()
        .flat_map(|day| day["slots"].as_array().cloned().unwrap_or_default())
        .filter_map(|slot| slot["start"].as_str().map(String::from))
        .collect()
}

async fn run_round(client: &Client, target: &Target, slot: &str, concurrency: usize) -> (RoundOutcome, Histogram<u64>) {
    let url = format!("{}/api/v1/{}/services/{}/book", target.base_url, target.tenant_id, target.service_id);
    let (tx, mut rx) = mpsc::channel(concurrency.max(1));

    for i in 0..concurrency {
        let client = client.clone();
        let url = url.clone();
        let tx = tx.clone();
        let body = json!({
            "start_time": slot,
            "contact": {
                "name": format!("Load Tester {}", i),
                "email": format!("loadtest+{}@example.com", Uuid::new_v4()),
            },
        });

        tokio::spawn(async move {
            let req_start = Instant::now();
            let res = client.post(&url).json(&body).send().await;
            let latency = req_start.elapsed();

            let code = match res {
                Ok(r) if r.status().is_success() => Some("BOOKED".to_string()),
                Ok(r) => r.json::<Value>().await.ok().and_then(|b| b["code"].as_str().map(String::from)),
                Err(_) => None,
            };
            let _ = tx.send((latency, code)).await;
        });
    }
    drop(tx);

    let mut histogram = Histogram::<u64>::new(3).expect("Failed to create histogram");
    let mut outcome = RoundOutcome::default();

    while let Some((latency, code)) = rx.recv().await {
        let _ = histogram.record(latency.as_micros() as u64);
        match code.as_deref() {
            Some("BOOKED") => outcome.booked += 1,
            Some("SLOT_UNAVAILABLE") => outcome.unavailable += 1,
            _ => outcome.other += 1,
        }
    }

    (outcome, histogram)
}
