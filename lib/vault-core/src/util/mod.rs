pub mod keyed_lock;
pub mod retry;
pub mod sort_key;
pub mod validity;
pub mod x509;
