pub(crate) mod derive;
pub(crate) mod features;
pub(crate) mod timeline;
