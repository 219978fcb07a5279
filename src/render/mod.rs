pub(crate) mod font;
pub(crate) mod frame;
pub(crate) mod layers;
pub(crate) mod raster;
pub(crate) mod renderer;
