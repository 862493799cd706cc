use std::path::PathBuf;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::info;

use allotment::engine::Engine;
use allotment::limits::MAX_REQUEST_LEN;
use allotment::{loader, tools};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries responses; logs go to stderr.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let metrics_port: Option<u16> = std::env::var("ALLOTMENT_METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok());
    allotment::observability::init(metrics_port);

    let data_dir = std::env::var("ALLOTMENT_DATA_DIR").unwrap_or_else(|_| "./data".into());

    let engine = Engine::new();
    loader::load_data_dir(&engine, &PathBuf::from(&data_dir)).await?;

    info!("allotment ready on stdio");
    info!("  data_dir: {data_dir}");
    let metrics_url = metrics_port.map_or("disabled".to_string(), |p| {
        format!("http://0.0.0.0:{p}/metrics")
    });
    info!("  metrics: {metrics_url}");

    let mut requests = FramedRead::new(
        tokio::io::stdin(),
        LinesCodec::new_with_max_length(MAX_REQUEST_LEN),
    );
    let mut stdout = tokio::io::stdout();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            next = requests.next() => {
                let line = match next {
                    Some(Ok(line)) => line,
                    Some(Err(e)) => {
                        // Over-long lines are discarded by the codec; keep serving.
                        tracing::warn!("request read error: {e}");
                        let body = serde_json::json!({ "error": e.to_string() }).to_string();
                        stdout.write_all(body.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;
                        continue;
                    }
                    None => break,
                };
                if line.trim().is_empty() {
                    continue;
                }
                let response = tools::handle_line(&engine, &line).await;
                stdout.write_all(response.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
            _ = &mut shutdown => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    info!("allotment stopped");
    Ok(())
}
