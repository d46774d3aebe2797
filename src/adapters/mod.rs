// Adapters layer: concrete implementations for external systems (ERP server, files, terminal).

pub mod console;
pub mod http;
pub mod storage;

pub use console::ConsoleHost;
pub use http::HttpShippingRpc;
pub use storage::LocalStorage;
