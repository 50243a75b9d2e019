mod capability;
pub use capability::Capability;

pub mod operation;
pub use operation::Operation;

mod response;
pub use response::{Response, Rows};

mod transaction_manager;
pub use transaction_manager::TransactionManager;

mod version;
pub use version::ServerVersion;

use crate::{async_trait, Result};

use std::fmt::Debug;

#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Describes the driver's capability, which informs statement shape
    /// selection.
    fn capability(&self) -> &Capability;

    /// Version of the database server the driver is connected to.
    async fn server_version(&self) -> Result<ServerVersion>;

    /// Execute a database operation
    async fn exec(&self, op: Operation) -> Result<Response>;
}
