use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "equipment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    /// Non-negative; validated at the form boundary
    pub purchase_price: Decimal,

    pub description: Option<String>,

    /// Uppercase category string; see `domain::EquipmentCategory`
    pub category: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::equipment_reservation::Entity")]
    EquipmentReservation,
}

impl Related<super::equipment_reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EquipmentReservation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
