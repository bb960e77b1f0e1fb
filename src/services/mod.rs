//! Real service implementations behind the launcher's DI traits

pub mod port_scanner;
pub mod probe;
pub mod process_manager;
pub mod shell;

pub use port_scanner::RealPortScanner;
pub use probe::RealServerProbe;
pub use process_manager::RealProcessManager;
pub use shell::BrowserShell;
