// Adapters layer: concrete implementations for external systems (Carta API, local storage).

pub mod http;
pub mod storage;
