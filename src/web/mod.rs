pub mod server;

pub use server::{intake_router, serve, IntakeState};
