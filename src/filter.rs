use crate::types::{AnalysisResult, Conversation, FilterCriteria, FilteredResult, ProtocolStat};

/// Derives the filtered view of an analysis result under the given criteria.
///
/// Matching is a stable linear scan: kept rows appear in their original
/// order and are never mutated. `packet_summary` passes through unmodified,
/// whatever the criteria remove. Populated criteria fields are conjoined;
/// the default criteria reproduce the result unchanged.
pub fn filter(result: &AnalysisResult, criteria: &FilterCriteria) -> FilteredResult {
    let needle = criteria.text.to_lowercase();

    FilteredResult {
        packet_summary: result.packet_summary.clone(),
        protocols: result
            .protocols
            .iter()
            .filter(|stat| protocol_matches(stat, criteria, &needle))
            .cloned()
            .collect(),
        ip_conversations: result
            .ip_conversations
            .iter()
            .filter(|conv| conversation_matches(conv, criteria, &needle))
            .cloned()
            .collect(),
    }
}

fn protocol_matches(stat: &ProtocolStat, criteria: &FilterCriteria, needle: &str) -> bool {
    if stat.bytes < criteria.min_bytes {
        return false;
    }
    if !criteria.protocol.is_empty() && stat.protocol != criteria.protocol {
        return false;
    }
    needle.is_empty() || stat.protocol.to_lowercase().contains(needle)
}

fn conversation_matches(conv: &Conversation, criteria: &FilterCriteria, needle: &str) -> bool {
    if conv.bytes < criteria.min_bytes {
        return false;
    }
    needle.is_empty()
        || conv.source.to_lowercase().contains(needle)
        || conv.destination.to_lowercase().contains(needle)
        || conv.protocol.to_lowercase().contains(needle)
}
