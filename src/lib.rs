pub mod access;
pub mod derive;
pub mod errors;
pub mod forms;
pub mod init;
pub mod load;
pub mod logging;
pub mod mes_config;
