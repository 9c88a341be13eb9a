use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// PacketSummary holds the capture-wide totals computed by the analysis
/// service. It is carried through filtering untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PacketSummary {
    /// Total number of packets in the capture
    #[serde(default)]
    pub total_packets: u64,
    /// Total number of bytes in the capture
    #[serde(default)]
    pub total_bytes: u64,
}

/// ProtocolStat holds the per-protocol frame and byte counts of one protocol
/// observed in the capture. Uniqueness of `protocol` within a result is
/// assumed, not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolStat {
    /// Protocol name as reported by the service, e.g. "tcp"
    #[serde(default)]
    pub protocol: String,
    /// Number of packets attributed to the protocol
    #[serde(default)]
    pub packets: u64,
    /// Number of bytes attributed to the protocol
    #[serde(default)]
    pub bytes: u64,
}

/// Conversation holds the aggregated byte count between a source and
/// destination address pair, scoped by protocol. Order as received from the
/// service is preserved through filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Source address
    #[serde(default)]
    pub source: String,
    /// Destination address
    #[serde(default)]
    pub destination: String,
    /// Protocol name
    #[serde(default)]
    pub protocol: String,
    /// Total bytes exchanged
    #[serde(default)]
    pub bytes: u64,
}

/// AnalysisResult is the computed summary for one uploaded capture file.
/// Produced wholesale by the analysis service, immutable once received, and
/// replaced wholesale by the next upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Capture-wide totals
    #[serde(default)]
    pub packet_summary: PacketSummary,
    /// Per-protocol breakdown, in service order
    #[serde(default)]
    pub protocols: Vec<ProtocolStat>,
    /// Per-conversation byte counts, in service order
    #[serde(default)]
    pub ip_conversations: Vec<Conversation>,
}

/// FilteredResult is the projection of an AnalysisResult under the active
/// FilterCriteria. `protocols` and `ip_conversations` are subsequences of
/// the original; `packet_summary` is the original, never recomputed from the
/// filtered rows. It has no identity of its own and is recomputed at will.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredResult {
    /// Capture-wide totals of the unfiltered result
    pub packet_summary: PacketSummary,
    /// Protocol rows that matched the criteria
    pub protocols: Vec<ProtocolStat>,
    /// Conversation rows that matched the criteria
    pub ip_conversations: Vec<Conversation>,
}

/// FilterCriteria configures the view derivation. Callers populate the
/// fields of the mode they want: the free-text iteration uses `text` alone,
/// the structured iteration uses `protocol` and `min_bytes`. Populated
/// predicates are conjoined; the default value filters nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring matched against row fields; empty = no filter
    #[serde(default)]
    pub text: String,
    /// Exact protocol name to keep; empty = all protocols
    #[serde(default)]
    pub protocol: String,
    /// Inclusive lower bound on row bytes
    #[serde(default)]
    pub min_bytes: u64,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        FilterCriteria {
            text: String::new(),
            protocol: String::new(),
            min_bytes: 0,
        }
    }
}

/// PacketDetail is one row of the per-packet breakdown served by the
/// analysis service for an uploaded capture. Port and length fields are
/// strings on the wire (absent layers come back empty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketDetail {
    /// Frame number
    #[serde(default)]
    pub no: u64,
    /// Capture-relative timestamp in milliseconds
    #[serde(default)]
    pub time_ms: f64,
    #[serde(default)]
    pub src_ip: String,
    #[serde(default)]
    pub dst_ip: String,
    #[serde(default)]
    pub src_port: String,
    #[serde(default)]
    pub dst_port: String,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub length: String,
    #[serde(default)]
    pub info: String,
}

/// CaptureFile is a capture selected for upload: the original file name and
/// the raw bytes. Extensions ".pcap"/".pcapng" are expected but not enforced
/// here; the service rejects anything else.
#[derive(Debug, Clone)]
pub struct CaptureFile {
    /// File name sent along with the multipart upload
    pub file_name: String,
    /// Raw capture bytes
    pub contents: Bytes,
}

/// ExportFormat selects the encoder used to serialize the current view.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// File name of the downloadable artifact for this format.
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "filtered_summary.csv",
            ExportFormat::Json => "filtered_summary.json",
        }
    }

    /// MIME type of the downloadable artifact for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
        }
    }
}
