//! Event-set change detection
//!
//! A cheap order-independent signature over a fetched event batch. Two
//! batches with the same signature are treated as "no real change" so the
//! calendar can skip a re-render after background revalidation. This is a
//! heuristic, not a digest: collisions are acceptable, and the event count
//! is embedded so length changes can never collide.

use gts_domain::CalendarEvent;

/// Signature of the empty event set.
pub const EMPTY_SIGNATURE: &str = "empty";

/// Compute the signature of an event batch.
///
/// Events are sorted by `id` before hashing, so any permutation of the same
/// multiset produces the same signature. The hashed key per event covers the
/// fields whose change requires a re-render: id, start, end, title, and
/// background color.
pub fn signature(events: &[CalendarEvent]) -> String {
    if events.is_empty() {
        return EMPTY_SIGNATURE.to_string();
    }

    let mut ordered: Vec<&CalendarEvent> = events.iter().collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));

    let mut hash: u32 = 17;
    for event in ordered {
        for byte in event_key(event).bytes() {
            hash = hash.wrapping_mul(31).wrapping_add(u32::from(byte));
        }
        // Separator so adjacent events cannot blend into each other
        hash = hash.wrapping_mul(31).wrapping_add(u32::from(b'\n'));
    }

    format!("sig:{}:{}", events.len(), hash)
}

fn event_key(event: &CalendarEvent) -> String {
    let start = event.start.map(|t| t.timestamp_millis().to_string()).unwrap_or_default();
    let end = event.end.map(|t| t.timestamp_millis().to_string()).unwrap_or_default();
    format!(
        "{}|{}|{}|{}|{}",
        event.id,
        start,
        end,
        event.title,
        event.background_color.as_deref().unwrap_or(""),
    )
}
