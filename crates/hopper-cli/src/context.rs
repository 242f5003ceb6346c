use hopper_config::HopperConfig;
use hopper_warehouse::{WarehouseClient, WarehouseError};

/// Everything a command handler needs. Built once in `main` and dropped on
/// exit, which closes the warehouse connection.
pub struct AppContext {
    pub config: HopperConfig,
    pub warehouse: WarehouseClient,
}

impl AppContext {
    pub fn init(config: HopperConfig) -> Result<Self, WarehouseError> {
        tracing::debug!(backend = %config.warehouse.backend, "connecting to warehouse");
        let warehouse = WarehouseClient::connect(&config)?;
        Ok(Self { config, warehouse })
    }
}
