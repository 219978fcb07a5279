pub(crate) mod event;
pub(crate) mod mapper;
pub(crate) mod projection;
