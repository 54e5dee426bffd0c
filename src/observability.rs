use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("ollamus.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("ollamus.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("ollamus.client.request_duration_seconds");

pub(crate) static STREAM_CHUNKS: Counter = Counter::new("ollamus.stream.chunks");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("ollamus.stream.errors");

pub(crate) static CHAT_TURNS: Counter = Counter::new("ollamus.chat.turns");
pub(crate) static CHAT_TURN_ERRORS: Counter = Counter::new("ollamus.chat.turn_errors");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_CHUNKS);
    collector.register_counter(&STREAM_ERRORS);

    collector.register_counter(&CHAT_TURNS);
    collector.register_counter(&CHAT_TURN_ERRORS);
}
