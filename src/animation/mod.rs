pub(crate) mod curve;
pub(crate) mod decor;
pub(crate) mod ease;
