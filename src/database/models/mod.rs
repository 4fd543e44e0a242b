pub mod alert_record;
pub mod registration;

pub use alert_record::{AlertRecord, RegistrationAlert, WorkerProfile};
pub use registration::{
    NewRegistration, RecordDateMatch, Registration, RegistrationChanges, RegistrationKey,
};
