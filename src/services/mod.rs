pub mod script_generation;
