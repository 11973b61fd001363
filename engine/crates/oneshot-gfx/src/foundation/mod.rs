pub mod debug_messenger;
pub mod device;
pub mod init_info;
pub mod instance;
pub mod physical_device;
