pub(crate) mod machine;
pub(crate) mod phase;
pub(crate) mod resolve;
