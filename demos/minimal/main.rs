use capsight::types::{CaptureFile, ExportFormat, FilterCriteria};
use capsight::{HttpAnalysisClient, Session};
use log::{LevelFilter, error, info};
use simple_logger::SimpleLogger;
use tokio;

#[tokio::main]
async fn main() {
    // Instantiate a simple logger
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .with_module_level("capsight", LevelFilter::Debug)
        .init()
        .unwrap();

    info!("Capsight Minimal Example");
    info!("=========================");
    info!("Uploads a capture to a local analysis service, filters the summary");
    info!("and writes both export artifacts to the working directory.");

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        error!("Usage: minimal <capture.pcap|capture.pcapng> [filter-text]");
        return;
    };
    let filter_text = args.next().unwrap_or_default();

    let contents = match tokio::fs::read(&path).await {
        Ok(contents) => contents,
        Err(err) => {
            error!("Failed to read {}: {}", path, err);
            return;
        }
    };
    let file_name = std::path::Path::new(&path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("capture.pcap")
        .to_string();

    // The analysis service is expected on the default local port
    let client = HttpAnalysisClient::new("http://127.0.0.1:8000");
    if client.is_err() {
        error!("Error: {}", client.err().unwrap());
        return;
    }

    let mut session = Session::new(client.unwrap());
    session.select_file(CaptureFile {
        file_name,
        contents: contents.into(),
    });

    if let Err(err) = session.upload().await {
        error!("Error: {}", err);
        return;
    }

    if !filter_text.is_empty() {
        info!("Applying filter {:?}", filter_text);
        let criteria = FilterCriteria {
            text: filter_text,
            ..FilterCriteria::default()
        };
        if let Err(err) = session.apply_filter(criteria) {
            error!("Error: {}", err);
            return;
        }
    }

    let view = session.filtered().unwrap();
    info!(
        "Current view: {} protocols, {} conversations, {} packets total",
        view.protocols.len(),
        view.ip_conversations.len(),
        view.packet_summary.total_packets
    );

    for format in [ExportFormat::Csv, ExportFormat::Json] {
        match session.export(format) {
            Ok(artifact) => {
                if let Err(err) = tokio::fs::write(artifact.file_name, &artifact.content).await {
                    error!("Failed to write {}: {}", artifact.file_name, err);
                } else {
                    info!("Wrote {} ({})", artifact.file_name, artifact.mime_type);
                }
            }
            Err(err) => error!("Error: {}", err),
        }
    }
}
