//! Core domain vocabulary: roles, capabilities, equipment categories and
//! reservation statuses.
//!
//! Everything here is a pure function of its inputs so the authorization
//! rules can be tested without a database or a request in sight.

use serde::{Deserialize, Serialize};

/// A member's role. Stored as an uppercase string in `app_user.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Staff,
    Customer,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Staff => "STAFF",
            Self::Customer => "CUSTOMER",
        }
    }

    /// Parses a stored role string. Unknown or missing values fall back to
    /// `Customer`, matching the registration default.
    #[must_use]
    pub fn parse(role: &str) -> Self {
        match role.to_uppercase().as_str() {
            "ADMIN" => Self::Admin,
            "STAFF" => Self::Staff,
            _ => Self::Customer,
        }
    }

    /// The capability table. One place to answer "may this role do that?".
    #[must_use]
    pub const fn allows(self, capability: Capability) -> bool {
        matches!(
            (self, capability),
            (
                Self::Admin | Self::Staff,
                Capability::ManageUsers | Capability::ManageEquipment
            ) | (Self::Admin, Capability::CreateStaff)
                | (Self::Customer, Capability::ReserveEquipment)
        )
    }

    #[must_use]
    pub const fn can_manage_users(self) -> bool {
        self.allows(Capability::ManageUsers)
    }

    #[must_use]
    pub const fn can_create_staff(self) -> bool {
        self.allows(Capability::CreateStaff)
    }

    #[must_use]
    pub const fn can_manage_equipment(self) -> bool {
        self.allows(Capability::ManageEquipment)
    }

    #[must_use]
    pub const fn can_reserve_equipment(self) -> bool {
        self.allows(Capability::ReserveEquipment)
    }
}

/// A named permission derived purely from a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageUsers,
    CreateStaff,
    ManageEquipment,
    ReserveEquipment,
}

/// Equipment category. Unknown input coerces to `Other` instead of failing
/// validation; the inventory form is deliberately permissive here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentCategory {
    SingleBoardComputer,
    Sensors,
    Microcontroller,
    DevelopmentBoard,
    Cables,
    Tools,
    PowerSupply,
    Storage,
    Other,
}

impl EquipmentCategory {
    pub const ALL: [Self; 9] = [
        Self::SingleBoardComputer,
        Self::Sensors,
        Self::Microcontroller,
        Self::DevelopmentBoard,
        Self::Cables,
        Self::Tools,
        Self::PowerSupply,
        Self::Storage,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SingleBoardComputer => "SINGLE_BOARD_COMPUTER",
            Self::Sensors => "SENSORS",
            Self::Microcontroller => "MICROCONTROLLER",
            Self::DevelopmentBoard => "DEVELOPMENT_BOARD",
            Self::Cables => "CABLES",
            Self::Tools => "TOOLS",
            Self::PowerSupply => "POWER_SUPPLY",
            Self::Storage => "STORAGE",
            Self::Other => "OTHER",
        }
    }

    #[must_use]
    pub fn parse(category: &str) -> Self {
        match category.to_uppercase().as_str() {
            "SINGLE_BOARD_COMPUTER" => Self::SingleBoardComputer,
            "SENSORS" => Self::Sensors,
            "MICROCONTROLLER" => Self::Microcontroller,
            "DEVELOPMENT_BOARD" => Self::DevelopmentBoard,
            "CABLES" => Self::Cables,
            "TOOLS" => Self::Tools,
            "POWER_SUPPLY" => Self::PowerSupply,
            "STORAGE" => Self::Storage,
            _ => Self::Other,
        }
    }
}

/// Reservation lifecycle. The only transition is Active -> Cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Active,
    Cancelled,
}

impl ReservationStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Cancelled => "CANCELLED",
        }
    }

    #[must_use]
    pub fn parse(status: &str) -> Self {
        match status.to_uppercase().as_str() {
            "CANCELLED" => Self::Cancelled,
            _ => Self::Active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_table() {
        assert!(Role::Admin.can_manage_users());
        assert!(Role::Admin.can_create_staff());
        assert!(Role::Admin.can_manage_equipment());
        assert!(!Role::Admin.can_reserve_equipment());

        assert!(Role::Staff.can_manage_users());
        assert!(!Role::Staff.can_create_staff());
        assert!(Role::Staff.can_manage_equipment());
        assert!(!Role::Staff.can_reserve_equipment());

        assert!(!Role::Customer.can_manage_users());
        assert!(!Role::Customer.can_create_staff());
        assert!(!Role::Customer.can_manage_equipment());
        assert!(Role::Customer.can_reserve_equipment());
    }

    #[test]
    fn test_role_parse_defaults_to_customer() {
        assert_eq!(Role::parse("ADMIN"), Role::Admin);
        assert_eq!(Role::parse("staff"), Role::Staff);
        assert_eq!(Role::parse("gardener"), Role::Customer);
        assert_eq!(Role::parse(""), Role::Customer);
    }

    #[test]
    fn test_category_parse_is_lenient() {
        assert_eq!(EquipmentCategory::parse("tools"), EquipmentCategory::Tools);
        assert_eq!(EquipmentCategory::parse("TOOLS"), EquipmentCategory::Tools);
        assert_eq!(
            EquipmentCategory::parse("single_board_computer"),
            EquipmentCategory::SingleBoardComputer
        );
        assert_eq!(EquipmentCategory::parse("xyz"), EquipmentCategory::Other);
        assert_eq!(EquipmentCategory::parse(""), EquipmentCategory::Other);
    }

    #[test]
    fn test_category_round_trip() {
        for category in EquipmentCategory::ALL {
            assert_eq!(EquipmentCategory::parse(category.as_str()), category);
        }
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!(
            ReservationStatus::parse("ACTIVE"),
            ReservationStatus::Active
        );
        assert_eq!(
            ReservationStatus::parse("cancelled"),
            ReservationStatus::Cancelled
        );
    }
}
