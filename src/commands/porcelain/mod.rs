pub mod append;
pub mod checkout;
pub mod history;
pub mod init;
pub mod status;
