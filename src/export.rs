use crate::error::CapsightError;
use crate::types::{ExportFormat, FilteredResult};

/// ExportArtifact is the downloadable rendition of a filtered view: the
/// encoded text plus the file name and MIME type to serve it under.
/// Writing it anywhere is the caller's concern.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub content: String,
}

/// Encodes the view in the requested format and wraps it as an artifact.
pub fn export(
    view: &FilteredResult,
    format: ExportFormat,
) -> Result<ExportArtifact, CapsightError> {
    let content = match format {
        ExportFormat::Csv => to_csv(view),
        ExportFormat::Json => to_json(view)?,
    };

    Ok(ExportArtifact {
        file_name: format.file_name(),
        mime_type: format.mime_type(),
        content,
    })
}

/// Encodes the view as CSV: a summary block, a protocol table and a
/// conversation table, blocks separated by a blank line. Cells are written
/// verbatim, no quoting or escaping — values are assumed comma-free.
/// Byte-identical output for identical input.
pub fn to_csv(view: &FilteredResult) -> String {
    let mut out = String::new();

    out.push_str("Summary,Total Packets,Total Bytes\n");
    out.push_str(&format!(
        "Summary,{},{}\n",
        view.packet_summary.total_packets, view.packet_summary.total_bytes
    ));
    out.push('\n');

    out.push_str("Protocol,Packets,Bytes\n");
    for stat in &view.protocols {
        out.push_str(&format!("{},{},{}\n", stat.protocol, stat.packets, stat.bytes));
    }
    out.push('\n');

    out.push_str("Source,Destination,Protocol,Bytes\n");
    for conv in &view.ip_conversations {
        out.push_str(&format!(
            "{},{},{},{}\n",
            conv.source, conv.destination, conv.protocol, conv.bytes
        ));
    }

    out
}

/// Encodes the view as pretty-printed JSON: 2-space indentation, keys in
/// declaration order (packet_summary, protocols, ip_conversations).
/// Byte-identical output for identical input.
pub fn to_json(view: &FilteredResult) -> Result<String, CapsightError> {
    serde_json::to_string_pretty(view)
        .map_err(|err| CapsightError::Parse(format!("Failed to encode filtered view: {}", err)))
}
