pub mod readings;
pub mod text;

pub use readings::{load_sensor_table, load_sensor_table_or_empty, SensorTable, DEFAULT_COLUMNS};
