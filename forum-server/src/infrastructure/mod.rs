pub(crate) mod clock;
pub(crate) mod database;
pub(crate) mod logging;
pub(crate) mod settings;
