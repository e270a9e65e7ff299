pub mod mock;
pub mod subxt_client;

pub use mock::MockChainClient;
pub use subxt_client::SubxtChainClient;
