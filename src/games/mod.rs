pub mod jungle;
