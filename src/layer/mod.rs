pub(crate) mod model;
pub(crate) mod raster;
pub(crate) mod svg;
