pub mod activity_repo;
pub mod ledger_repo;
pub mod notification_repo;
pub mod service_record_repo;
pub mod signup_repo;
pub mod user_repo;

pub use activity_repo::ActivityRepo;
pub use ledger_repo::LedgerRepo;
pub use notification_repo::NotificationRepo;
pub use service_record_repo::ServiceRecordRepo;
pub use signup_repo::SignupRepo;
pub use user_repo::UserRepo;
