//! Platform helpers shared by the mirror components.

pub(crate) mod mode;
