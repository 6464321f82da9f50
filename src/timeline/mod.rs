pub(crate) mod commands;
pub(crate) mod editor;
pub(crate) mod model;
pub(crate) mod patch;
