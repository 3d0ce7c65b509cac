pub(crate) mod model;
pub(crate) mod scheduler;
pub(crate) mod stage;
