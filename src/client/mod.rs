pub mod contract;

pub use contract::{ContractApi, RpcContract};
