pub use crate::spim::SpimExt as _nrf528xx_spim_SpimExt;
pub use crate::time::U32Ext as _nrf528xx_spim_time_U32Ext;
pub use embedded_hal::spi::SpiBus as _embedded_hal_spi_SpiBus;
