pub(crate) mod persistence;
