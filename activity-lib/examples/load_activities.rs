//! Loads the activities of one record and prints them as a table.
//!
//! Run with: cargo run --example load_activities -- [filter]
//!
//! Requires .env file with:
//! - ACTIVITY_BASE_URL
//! - ACTIVITY_SCOPE_ID
//!
//! Optional:
//! - ACTIVITY_ENDPOINT (default `activities`)
//! - ACTIVITY_TOKEN (sent as a bearer token)
//!
//! Logs are written to `load-activities.log`.

use std::env;
use std::fs::File;
use std::time::Duration;

use activity_lib::model::FieldKey;
use activity_lib::sink::LogErrorSink;
use activity_lib::source::HttpRecordSource;
use activity_lib::table::LoadOutcome;
use activity_lib::table::TableConfig;
use activity_lib::table::TableController;
use reqwest::header::AUTHORIZATION;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let log_file = File::create("load-activities.log").expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file).expect("Failed to initialize logger");

    let base_url = env::var("ACTIVITY_BASE_URL").expect("ACTIVITY_BASE_URL not set");
    let scope_id = env::var("ACTIVITY_SCOPE_ID").expect("ACTIVITY_SCOPE_ID not set");
    let endpoint = env::var("ACTIVITY_ENDPOINT").unwrap_or_else(|_| "activities".to_string());

    let mut builder = HttpRecordSource::builder()
        .url(base_url)
        .endpoint(endpoint)
        .connect_timeout(Duration::from_secs(10));

    if let Ok(token) = env::var("ACTIVITY_TOKEN") {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
        builder = builder.http_client(reqwest::Client::builder().default_headers(headers).build()?);
    }

    let controller = TableController::builder()
        .source(builder.build()?)
        .sink(LogErrorSink)
        .config(TableConfig::new().with_scope_id(scope_id))
        .build();

    println!("Loading activities...\n");

    match controller.activate().await {
        LoadOutcome::Loaded(count) => println!("Loaded {} activities\n", count),
        other => {
            println!("Load did not complete: {:?} (see load-activities.log)", other);
            return Ok(());
        }
    }

    if let Some(query) = env::args().nth(1) {
        controller.on_filter_change(query);
    }
    controller.on_sort_field(FieldKey::StartDateTime);

    let columns = controller.columns();
    let header: Vec<&str> = columns.iter().map(|c| c.label.as_str()).collect();
    println!("{}", header.join(" | "));

    for row in controller.visible_rows() {
        let cells: Vec<String> = columns.iter().map(|c| c.cell_text(&row)).collect();
        println!("{}", cells.join(" | "));
    }

    Ok(())
}
