pub(crate) mod migrate;
pub(crate) mod repos;
pub(crate) mod sync;
