pub(crate) mod proj;
pub(crate) mod wkb;
