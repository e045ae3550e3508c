pub use super::app_user::Entity as AppUser;
pub use super::equipment::Entity as Equipment;
pub use super::equipment_reservation::Entity as EquipmentReservation;
pub use super::password_reset_token::Entity as PasswordResetToken;
