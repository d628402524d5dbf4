//! Background simulation thread and the types exchanged with it.
//!
//! A UI or render collaborator sends `SimCommand`s and receives
//! `GrowthSnapshot`s; the thread owns the scheduler and the run.

pub mod commands;
pub mod sim_thread;
pub mod snapshot;

pub use commands::SimCommand;
pub use sim_thread::SimulationHandle;
pub use snapshot::GrowthSnapshot;
