pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService};
pub use auth_service_impl::SeaOrmAuthService;

pub mod reservation_service;
pub mod reservation_service_impl;
pub use reservation_service::{ReservationError, ReservationService};
pub use reservation_service_impl::SeaOrmReservationService;

pub mod email;
pub use email::EmailService;

pub mod slack;
pub use slack::SlackService;

pub mod notify;
pub use notify::{ClientInfo, Notifier, NotifyOutcome};
