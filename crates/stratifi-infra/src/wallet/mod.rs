//! EVM wallet generation for agents.

pub mod keygen;

pub use keygen::EthersKeyGenerator;
