pub mod vibration;
