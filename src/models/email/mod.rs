pub mod api_email;
pub mod db_email;
pub mod email_type;
pub mod new_email;

pub use api_email::ApiEmail;
pub use db_email::DbEmail;
pub use email_type::EmailType;
pub use new_email::NewEmail;
