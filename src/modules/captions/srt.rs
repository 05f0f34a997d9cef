use crate::services::transcript::TranscriptEntry;

/// Render transcript entries as SRT text.
///
/// Pure and order-preserving: one block per entry, numbered from 1 in
/// input order. The caller is responsible for chronological ordering.
pub fn to_srt(entries: &[TranscriptEntry]) -> String {
    let blocks: Vec<String> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let start = format_timestamp(entry.offset_ms);
            let end = format_timestamp(entry.offset_ms + entry.duration_ms);
            format!("{}\n{} --> {}\n{}\n", i + 1, start, end, entry.text.trim())
        })
        .collect();

    blocks.join("\n")
}

/// `HH:MM:SS,mmm` with millisecond precision. Hours are zero-padded
/// to two digits but grow unbounded past 99.
pub fn format_timestamp(total_ms: u64) -> String {
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}
