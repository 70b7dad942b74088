/// Capacity of the per-loader event broadcast channel. A subscriber that
/// falls further behind than this misses the oldest events; the stream
/// adapter logs the gap and keeps going.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;
