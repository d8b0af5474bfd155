mod consistency;

pub use consistency::ConsistencyTokens;
