pub mod column_resolver;
pub use column_resolver::*;

pub mod wildcard_resolver;
pub use wildcard_resolver::*;

pub mod scalar_resolver;
pub use scalar_resolver::*;

pub mod aggregate_resolver;
pub use aggregate_resolver::*;

pub mod group_by_resolver;
pub use group_by_resolver::*;

pub mod table_resolver;
pub use table_resolver::*;

pub mod join_resolver;
pub use join_resolver::*;

pub mod projection_resolver;
pub use projection_resolver::*;

pub mod order_by_resolver;
pub use order_by_resolver::*;

pub mod limit_resolver;
pub use limit_resolver::*;

pub mod values_resolver;
pub use values_resolver::*;

pub mod set_operation_resolver;
pub use set_operation_resolver::*;

pub mod select_resolver;
pub use select_resolver::*;
