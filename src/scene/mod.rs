pub(crate) mod context;
pub(crate) mod palette;
pub(crate) mod particles;
pub(crate) mod snapshot;
pub(crate) mod state;
pub(crate) mod style;
pub(crate) mod updater;
