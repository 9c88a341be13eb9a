use capsight::types::{CaptureFile, ExportFormat, FilterCriteria};
use capsight::{CapsightError, HttpAnalysisClient, Session, SessionState};

use bytes::Bytes;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// One canned reply of the stub analysis service, selected by path prefix.
struct StubRoute {
    path: &'static str,
    status: &'static str,
    body: String,
}

/// Spawns a minimal in-process analysis service on a random local port and
/// returns its endpoint. Each connection gets the first route whose path
/// prefix matches the request line; unknown paths get a 404 with an empty
/// detail body.
async fn spawn_stub_service(routes: Vec<StubRoute>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub service");
    let endpoint = format!("http://{}", listener.local_addr().expect("No local addr"));

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };

            let request_path = match read_request(&mut socket).await {
                Some(path) => path,
                None => continue,
            };

            let (status, body) = routes
                .iter()
                .find(|route| request_path.starts_with(route.path))
                .map(|route| (route.status, route.body.clone()))
                .unwrap_or(("404 Not Found", "{}".to_string()));

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    endpoint
}

/// Reads one HTTP request (headers plus content-length body) and returns its
/// path, or None when the peer hangs up early.
async fn read_request(socket: &mut TcpStream) -> Option<String> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(position) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break position + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buffer[..header_end]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buffer.len() < header_end + content_length {
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }

    let request_line = String::from_utf8_lossy(&buffer)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string();
    request_line
        .split_whitespace()
        .nth(1)
        .map(|path| path.to_string())
}

fn sample_capture() -> CaptureFile {
    CaptureFile {
        file_name: "capture.pcap".to_string(),
        contents: Bytes::from_static(b"\xd4\xc3\xb2\xa1\x02\x00\x04\x00"),
    }
}

fn sample_summary_body() -> String {
    json!({
        "file_id": "temp_e2e.pcap",
        "protocols": [
            { "protocol": "tcp", "packets": 7, "bytes": 700 },
            { "protocol": "udp", "packets": 3, "bytes": 300 }
        ],
        "ip_conversations": [
            { "source": "10.0.0.1", "destination": "10.0.0.2", "protocol": "TCP", "bytes": 700 },
            { "source": "192.168.1.1", "destination": "8.8.8.8", "protocol": "UDP", "bytes": 300 }
        ],
        "packet_summary": { "total_packets": 10, "total_bytes": 1000 },
        "download_path": "/download/temp_e2e.pcap.summary.json"
    })
    .to_string()
}

#[tokio::test]
async fn full_session_round_trip() {
    let endpoint = spawn_stub_service(vec![
        StubRoute {
            path: "/upload",
            status: "200 OK",
            body: sample_summary_body(),
        },
        StubRoute {
            path: "/packets/",
            status: "200 OK",
            body: json!({
                "packets": [
                    {
                        "no": 1,
                        "time_ms": 0.0,
                        "src_ip": "10.0.0.1",
                        "dst_ip": "10.0.0.2",
                        "src_port": "51234",
                        "dst_port": "443",
                        "protocol": "TCP",
                        "length": "120",
                        "info": "Application Data"
                    }
                ]
            })
            .to_string(),
        },
    ])
    .await;

    let client = HttpAnalysisClient::new(&endpoint).expect("Failed to create client");
    let mut session = Session::new(client);

    session.select_file(sample_capture());
    session.upload().await.expect("Upload failed");

    // The fresh result arrives with the identity view derived over it.
    let view = match session.state() {
        SessionState::Ready(view) => view,
        state => panic!("Expected Ready state, got {:?}", state),
    };
    assert_eq!(view.result().packet_summary.total_packets, 10);
    assert_eq!(view.filtered().protocols, view.result().protocols);
    assert_eq!(
        view.filtered().ip_conversations,
        view.result().ip_conversations
    );
    assert_eq!(view.file_id(), Some("temp_e2e.pcap"));
    assert_eq!(
        view.download_path(),
        Some("/download/temp_e2e.pcap.summary.json")
    );

    // Narrow the view and export it both ways.
    session
        .apply_filter(FilterCriteria {
            text: "tcp".to_string(),
            ..FilterCriteria::default()
        })
        .expect("Filter failed");

    let csv = session.export(ExportFormat::Csv).expect("CSV export failed");
    assert_eq!(csv.file_name, "filtered_summary.csv");
    assert!(csv.content.starts_with("Summary,Total Packets,Total Bytes\nSummary,10,1000\n"));
    assert!(csv.content.contains("tcp,7,700\n"));
    assert!(csv.content.contains("10.0.0.1,10.0.0.2,TCP,700\n"));
    assert!(!csv.content.contains("udp,3,300"));

    let json_artifact = session.export(ExportFormat::Json).expect("JSON export failed");
    assert_eq!(json_artifact.file_name, "filtered_summary.json");
    let decoded: capsight::types::FilteredResult =
        serde_json::from_str(&json_artifact.content).expect("Artifact did not parse");
    assert_eq!(&decoded, session.filtered().expect("No view held"));

    // Follow-up query through the server-side handle.
    let packets = session.packet_details().await.expect("Packet details failed");
    assert_eq!(packets.len(), 1);
    assert_eq!(packets[0].dst_port, "443");
}

#[tokio::test]
async fn upload_failure_surfaces_the_service_detail() {
    let endpoint = spawn_stub_service(vec![StubRoute {
        path: "/upload",
        status: "422 Unprocessable Entity",
        body: json!({
            "detail": "Invalid file type. Please upload a .pcap or .pcapng file."
        })
        .to_string(),
    }])
    .await;

    let client = HttpAnalysisClient::new(&endpoint).expect("Failed to create client");
    let mut session = Session::new(client);

    session.select_file(CaptureFile {
        file_name: "notes.txt".to_string(),
        contents: Bytes::from_static(b"not a capture"),
    });
    let result = session.upload().await;

    assert!(matches!(result, Err(CapsightError::Service(_))));
    assert_eq!(
        session.error_message(),
        Some("Upload failed: Invalid file type. Please upload a .pcap or .pcapng file.")
    );
    assert!(session.result().is_none());
}

#[tokio::test]
async fn upload_failure_without_detail_falls_back_to_the_status_line() {
    let endpoint = spawn_stub_service(vec![StubRoute {
        path: "/upload",
        status: "500 Internal Server Error",
        body: "{}".to_string(),
    }])
    .await;

    let client = HttpAnalysisClient::new(&endpoint).expect("Failed to create client");
    let mut session = Session::new(client);

    session.select_file(sample_capture());
    let result = session.upload().await;

    assert!(matches!(result, Err(CapsightError::Service(_))));
    assert_eq!(
        session.error_message(),
        Some("Upload failed: Request failed with status 500 Internal Server Error")
    );
}

#[tokio::test]
async fn upload_failure_when_no_service_is_listening() {
    // Grab a free port, then close the listener so nothing answers on it.
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let endpoint = format!("http://{}", listener.local_addr().expect("No local addr"));
    drop(listener);

    let client = HttpAnalysisClient::new(&endpoint).expect("Failed to create client");
    let mut session = Session::new(client);

    session.select_file(sample_capture());
    let result = session.upload().await;

    assert!(matches!(result, Err(CapsightError::Network(_))));
    let message = session.error_message().expect("No error message");
    assert!(message.starts_with("Upload failed: "));
}
