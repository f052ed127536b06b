pub mod registration_manager;

pub use registration_manager::{
    create_shared_registration_manager, is_valid_email, RegistrationManager,
    SharedRegistrationManager,
};
