pub(crate) mod fields;
pub(crate) mod search;
pub(crate) mod serve;
