// Data models

pub mod auth;
pub mod connection;
pub mod engagement;
pub mod lead;
pub mod notification;
pub mod property;
pub mod support;
pub mod transaction;
pub mod user;
pub mod viewing;

pub use auth::{AccessTokenClaims, AuthResponse, LoginRequest, RegisterRequest};
pub use connection::{BuyerAgentConnection, NewBuyerAgentConnection};
pub use engagement::{Favorite, Inquiry, NewFavorite, NewInquiry};
pub use lead::{NewPropertyLead, PropertyLead};
pub use notification::{
    NewNotification, NewTransactionNotification, Notification, TransactionNotification,
};
pub use property::{
    can_view_property, NewProperty, NewPropertyAvailability, Property, PropertyAvailability,
    PropertyStats, UpdateProperty, ViewerRelation,
};
pub use support::{NewSupportMessage, NewSupportTicket, SupportMessage, SupportTicket};
pub use transaction::{
    effective_stage, NewTransaction, NewTransactionProgress, Stage, Transaction,
    TransactionProgress,
};
pub use user::{NewUser, Role, User, UserError, UserProfile};
pub use viewing::{NewViewingRequest, ViewingRequest, ViewingStatus};
