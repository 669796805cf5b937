pub mod evaluate;
pub mod expand;
pub mod init;
pub mod validate;
