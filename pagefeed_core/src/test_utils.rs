use crate::mapper::EntryMapper;

/// Installs the test tracing subscriber. Idempotent across tests in the
/// same binary.
pub(crate) fn logger() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Prefixes entries with a fixed tag, standing in for the context-heavy
/// mappers real presentation layers supply.
pub(crate) struct LabelMapper {
    pub prefix: &'static str,
}

impl EntryMapper<&'static str> for LabelMapper {
    type Item = String;

    fn map_entry(&self, entry: &'static str) -> String {
        format!("{}{entry}", self.prefix)
    }
}
