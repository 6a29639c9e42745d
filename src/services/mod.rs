// Service layer

pub mod email;
pub mod jwt;
pub mod lifecycle;
pub mod notifier;
pub mod otp;
pub mod sms;

pub use email::{EmailError, EmailSender};
pub use jwt::{JwtError, JwtService};
pub use lifecycle::{
    CancelOutcome, InterestOutcome, LifecycleService, ResolvedTransaction, TransactionSource,
};
pub use notifier::Notifier;
pub use sms::{SmsError, SmsSender};
