mod resend;
mod smtp;

pub use self::resend::ResendMailer;
pub use self::smtp::SmtpMailer;
