use crate::Entity;
use evalkit_core::Passive;
use time::PrimitiveDateTime;

#[derive(Entity, Debug, Clone, PartialEq)]
pub struct Admin {
    #[evalkit(primary_key, auto_increment)]
    pub id: Passive<i32>,
    #[evalkit(name = "adminID", unique)]
    pub admin_id: String,
    pub name: String,
    pub password: String,
    #[evalkit(default = "CURRENT_TIMESTAMP")]
    pub created_at: Passive<PrimitiveDateTime>,
    #[evalkit(default = "CURRENT_TIMESTAMP", updated_at)]
    pub updated_at: Passive<PrimitiveDateTime>,
}

impl Admin {
    pub fn new(
        admin_id: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: Passive::NotSet,
            admin_id: admin_id.into(),
            name: name.into(),
            password: password.into(),
            created_at: Passive::NotSet,
            updated_at: Passive::NotSet,
        }
    }
}
