pub(crate) mod job;
pub(crate) mod progress;
pub(crate) mod sequence;
pub(crate) mod settings;
